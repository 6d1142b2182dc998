//! Message document repository and common helpers (JSON, boolean coercion, UUIDs, SQL
//! transaction lifecycle) over SQLite.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod utils;

pub use config::Settings;
pub use db::repositories::MessageRepository;
pub use db::{Database, DocumentStore, SqliteDocumentStore};
pub use error::{AppError, AppResult};
pub use models::entities::Document;
pub use models::requests::{FindOptions, SortDirection, SortKey};

/// Install the global tracing subscriber. Later calls are no-ops.
pub fn init_tracing(settings: &Settings) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let installed = if settings.log_format == "json" {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };

    if installed.is_ok() {
        tracing::info!(
            app = %settings.app_name,
            environment = %settings.environment,
            "Tracing initialized"
        );
    }
}
