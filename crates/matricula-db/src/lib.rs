//! # Matricula DB
//!
//! Persistence for the Matricula API: connection pool, embedded migrations,
//! the [`Store`]/[`StoreTx`] ports and their adapters.
//!
//! - [`PgStore`]: PostgreSQL through SQLx
//! - `MemoryStore`: in-process tables for tests (feature `memory`)
//!
//! # Example
//!
//! ```ignore
//! use matricula_config::DatabaseConfig;
//! use matricula_db::{PgStore, init_db_pool, run_migrations};
//!
//! let config = DatabaseConfig::from_env().expect("DATABASE_URL must be set");
//! let pool = init_db_pool(&config).await?;
//! run_migrations(&pool).await?;
//! let store = PgStore::new(pool);
//! ```

pub mod error;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod ports;
pub mod postgres;
pub mod sequence;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;

use matricula_config::DatabaseConfig;

pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryStore;
pub use ports::{Store, StoreTx};
pub use postgres::PgStore;
pub use sequence::insert_application_with_next_number;
pub use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a PostgreSQL connection pool.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
