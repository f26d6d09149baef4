//! SeaORM storage backend
//!
//! Database persistence for tenancy records and the engagement event
//! log, supporting SQLite, MySQL/MariaDB and PostgreSQL.

mod accounts;
mod connection;
mod events;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::{CardtraceError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// Infer the database backend from a connection URL
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(CardtraceError::database_config(format!(
            "Cannot infer database backend from URL: {}. Supported URL schemes: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(CardtraceError::database_config("DATABASE_URL is not set"));
        }

        let backend_name = infer_backend_from_url(database_url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name).await?
        };

        let storage = SeaOrmStorage { db, backend_name };

        run_migrations(&storage.db).await?;

        info!("Storage initialized with {} backend", storage.backend_name);
        Ok(storage)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }
}
