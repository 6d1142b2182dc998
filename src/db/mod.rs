pub mod document_store;
pub mod repositories;

use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, Sqlite, SqlitePool, Transaction};

use crate::config::Settings;
use crate::utils::common;

pub use document_store::{DocumentStore, SqliteDocumentStore};

/// Shared relational connection. Owned by the caller and handed to whatever needs it.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
    pub db_path: String,
}

impl Database {
    pub async fn connect(settings: &Settings) -> Result<Self, sqlx::Error> {
        let (connect_options, db_path, max_connections) = if settings.is_in_memory() {
            // Every in-memory connection is its own database, so the pool holds exactly one.
            let options = SqliteConnectOptions::from_str(&settings.database_url())?;
            (options, settings.database_path.clone(), 1)
        } else {
            let db_path = resolve_db_path(&settings.database_path);

            // Ensure parent directory exists
            if let Some(parent) = Path::new(&db_path).parent() {
                std::fs::create_dir_all(parent).ok();
            }

            let options = SqliteConnectOptions::new()
                .filename(&db_path)
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
            (options, db_path, settings.database_pool_size)
        };

        let connect_options = connect_options
            .busy_timeout(Duration::from_secs(settings.database_pool_timeout))
            .pragma("foreign_keys", "ON")
            .pragma("temp_store", "MEMORY")
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(settings.database_pool_timeout))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await?;

        let db = Self {
            pool,
            db_path: db_path.clone(),
        };

        // Verify connection
        let version: (String,) = sqlx::query_as("SELECT sqlite_version()")
            .fetch_one(&db.pool)
            .await?;
        tracing::info!(
            sqlite_version = %version.0,
            path = %db_path,
            pool_size = max_connections,
            "Connected to SQLite database"
        );

        Ok(db)
    }

    /// Open a transaction on this connection.
    ///
    /// An in-memory database has a single pooled connection, so while the returned handle
    /// is open every other query on `pool` waits up to `database_pool_timeout` and then
    /// fails. Run statements through the handle until it is closed.
    pub async fn transaction(&self) -> Result<Transaction<'static, Sqlite>, crate::error::AppError> {
        common::fetch_sql_transaction_instance(&self.pool).await
    }

    pub async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => HealthCheckResult {
                status: "up".to_string(),
                latency_ms: Some(start.elapsed().as_millis() as i64),
                error: None,
            },
            Err(e) => HealthCheckResult {
                status: "down".to_string(),
                latency_ms: None,
                error: Some(e.to_string()),
            },
        }
    }
}

pub struct HealthCheckResult {
    pub status: String,
    pub latency_ms: Option<i64>,
    pub error: Option<String>,
}

pub async fn run_migrations(pool: &SqlitePool, migrations_dir: &str) -> Result<(), sqlx::Error> {
    let path = Path::new(migrations_dir);

    if !path.exists() {
        tracing::warn!(path = %migrations_dir, "Migrations directory not found, skipping");
        return Ok(());
    }

    let migrator = Migrator::new(path).await?;
    migrator.run(pool).await?;

    tracing::info!("Migrations applied successfully");
    Ok(())
}

fn resolve_db_path(db_path: &str) -> String {
    let path = Path::new(db_path);
    if path.is_absolute() {
        return db_path.to_string();
    }

    std::env::current_dir()
        .unwrap_or_else(|_| Path::new(".").to_path_buf())
        .join(db_path)
        .to_string_lossy()
        .into_owned()
}
