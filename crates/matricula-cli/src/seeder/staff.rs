//! Admin and teacher accounts.

use anyhow::{Context, bail};

use matricula_core::PasswordHasher;
use matricula_db::{Store, StoreError};
use matricula_models::auth::Role;
use matricula_models::{Email, NewStaff, StaffAccount};

pub struct StaffSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Creates a staff login. Only `admin` and `teacher` are staff roles.
pub async fn create_staff(
    store: &dyn Store,
    hasher: &dyn PasswordHasher,
    seed: StaffSeed,
) -> anyhow::Result<StaffAccount> {
    if !seed.role.is_staff() {
        bail!("{} is not a staff role", seed.role);
    }
    if seed.password.len() < 6 {
        bail!("Password must be at least 6 characters");
    }
    let email = Email::new(&seed.email).context("Invalid email address")?;

    let password_hash = hasher
        .hash(&seed.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e.error))?;

    let staff = NewStaff {
        first_name: seed.first_name.trim().to_string(),
        last_name: seed.last_name.trim().to_string(),
        email: email.into_inner(),
        role: seed.role,
        password_hash,
    };

    match store.insert_staff(&staff).await {
        Ok(account) => Ok(account),
        Err(StoreError::Duplicate { .. }) => bail!("A staff account with this email already exists"),
        Err(e) => Err(e.into()),
    }
}
