use tracing::{info, instrument, warn};
use uuid::Uuid;

use matricula_auth::create_access_token;
use matricula_db::Store;
use matricula_models::{ParentId, StaffId, StudentId};

use super::model::{Identity, IdentityProfile, LoginRequest, LoginResponse, Role};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::track_login;
use crate::state::AppState;

pub struct AuthService;

impl AuthService {
    /// Looks up the account `identifier` names within `role`'s collection.
    ///
    /// Staff sign in by email. Students use their roll number or
    /// institutional email. Parents use their email or any child's roll
    /// number.
    async fn find_identity(
        store: &dyn Store,
        role: Role,
        identifier: &str,
    ) -> ServiceResult<Option<Identity>> {
        let is_email = identifier.contains('@');

        let identity = match role {
            Role::Admin | Role::Teacher => {
                if !is_email {
                    return Ok(None);
                }
                store
                    .find_staff_by_email(&identifier.to_lowercase())
                    .await?
                    .filter(|staff| staff.role == role)
                    .map(Identity::from)
            }
            Role::Student => {
                let student = if is_email {
                    store.find_student_by_email(&identifier.to_lowercase()).await?
                } else {
                    store.find_student_by_roll_number(identifier).await?
                };
                student.map(Identity::from)
            }
            Role::Parent => {
                let parent = if is_email {
                    store.find_parent_by_email(&identifier.to_lowercase()).await?
                } else {
                    store.find_parent_by_child_roll_number(identifier).await?
                };
                parent.map(Identity::from)
            }
        };

        Ok(identity)
    }

    /// Every failure answers the same `InvalidCredentials` so callers cannot
    /// tell unknown accounts from wrong passwords.
    #[instrument(skip(state, dto), fields(role = %dto.role))]
    pub async fn login(state: &AppState, dto: LoginRequest) -> ServiceResult<LoginResponse> {
        let identity = Self::find_identity(state.store.as_ref(), dto.role, &dto.identifier).await?;

        let Some(identity) = identity else {
            state.hasher.verify_dummy(&dto.secret);
            warn!("Login failed: unknown identity");
            track_login(dto.role, false);
            return Err(ServiceError::InvalidCredentials);
        };

        if !state.hasher.verify(&dto.secret, &identity.password_hash)? {
            warn!(user_id = %identity.id, "Login failed: wrong secret");
            track_login(dto.role, false);
            return Err(ServiceError::InvalidCredentials);
        }

        if !identity.is_active {
            warn!(user_id = %identity.id, "Login failed: inactive account");
            track_login(dto.role, false);
            return Err(ServiceError::InvalidCredentials);
        }

        let token =
            create_access_token(identity.id, &identity.email, identity.role, &state.jwt_config)?;

        info!(user_id = %identity.id, "Login succeeded");
        track_login(dto.role, true);

        Ok(LoginResponse {
            token,
            user: identity.profile(),
        })
    }

    /// Resolves a verified token subject to its current profile.
    #[instrument(skip(store))]
    pub async fn profile(store: &dyn Store, id: Uuid, role: Role) -> ServiceResult<IdentityProfile> {
        let identity = match role {
            Role::Admin | Role::Teacher => store
                .get_staff(StaffId::from_uuid(id))
                .await?
                .map(Identity::from),
            Role::Student => store
                .get_student(StudentId::from_uuid(id))
                .await?
                .map(Identity::from),
            Role::Parent => store
                .get_parent(ParentId::from_uuid(id))
                .await?
                .map(Identity::from),
        };

        identity
            .map(|identity| identity.profile())
            .ok_or(ServiceError::NotFound("Account"))
    }
}
