//! PostgreSQL storage backend.
//!
//! - `PostgresLedgerRepository` - per-event write transactions
//! - `PostgresDirectoryReader` - pool reads for projections
//! - `PostgresAccessGate` - access code lookup by digest
//!
//! Schema lives in `migrations/` and is applied by [`run_migrations`].

mod access_gate;
mod directory_reader;
mod ledger_repository;
mod rows;

pub use access_gate::PostgresAccessGate;
pub use directory_reader::PostgresDirectoryReader;
pub use ledger_repository::PostgresLedgerRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Open a connection pool sized from `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
}

/// Apply pending schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
