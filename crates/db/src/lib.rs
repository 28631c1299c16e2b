//! Persistence for projects, training data, class tenants and service
//! credentials.
//!
//! The stores in [`store`] validate through the
//! [`ObjectFactory`](mlkids_core::ObjectFactory) and then talk to a backend
//! implementing the traits in [`backend`]. Two backends ship with the
//! crate: PostgreSQL (`PgPool`, see [`pg`]) and [`memory::MemoryBackend`].

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod pg;
pub mod repositories;
pub mod store;

pub use config::DbConfig;
pub use error::StoreError;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from configuration.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
