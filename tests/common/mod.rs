#![allow(dead_code)]

use std::sync::Mutex;

use group_chat_store::{
    AppError, AppResult, Database, Document, DocumentStore, FindOptions, Settings,
};
use serde_json::Value;

pub const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations/sqlite");

/// Fresh in-memory database with migrations applied.
pub async fn test_database() -> Database {
    let settings = Settings::default();
    group_chat_store::init_tracing(&settings);

    let db = Database::connect(&settings)
        .await
        .expect("Failed to open in-memory database");
    group_chat_store::db::run_migrations(&db.pool, MIGRATIONS_DIR)
        .await
        .expect("Failed to run migrations");
    db
}

/// Build a document from a `json!` object literal.
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FindCall {
    pub collection: String,
    pub filter: Document,
    pub projection: Option<Document>,
    pub options: FindOptions,
}

/// Store double that records `find` calls and replays one canned response.
pub struct RecordingStore {
    pub calls: Mutex<Vec<FindCall>>,
    response: Mutex<Option<AppResult<Vec<Document>>>>,
}

impl RecordingStore {
    pub fn returning(response: AppResult<Vec<Document>>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response: Mutex::new(Some(response)),
        }
    }

    pub fn calls(&self) -> Vec<FindCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl DocumentStore for RecordingStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Document,
        projection: Option<&Document>,
        options: &FindOptions,
    ) -> AppResult<Vec<Document>> {
        self.calls.lock().unwrap().push(FindCall {
            collection: collection.to_string(),
            filter: filter.clone(),
            projection: projection.cloned(),
            options: options.clone(),
        });
        self.response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn insert_one(&self, _collection: &str, _document: Document) -> AppResult<Document> {
        Err(AppError::invalid_document("RecordingStore is read-only"))
    }
}
