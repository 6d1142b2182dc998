use serde_json::Value;

use crate::config::Settings;
use crate::db::DocumentStore;
use crate::error::AppResult;
use crate::models::entities::{Document, GROUP_ID_FIELD};
use crate::models::requests::FindOptions;

/// Reads and writes message documents in one collection of a [`DocumentStore`].
pub struct MessageRepository<S> {
    store: S,
    collection: String,
}

impl<S: DocumentStore> MessageRepository<S> {
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Repository over the collection named by `messages_collection`.
    pub fn from_settings(store: S, settings: &Settings) -> Self {
        Self::new(store, settings.messages_collection.clone())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create(&self, message: Document) -> AppResult<Document> {
        self.store
            .insert_one(&self.collection, message)
            .await
            .inspect_err(|e| {
                tracing::error!(collection = %self.collection, error = %e, "Failed to create message");
            })
    }

    /// Messages matching `filter`, shaped by `projection`, ordered and paginated by `options`.
    /// Store errors come back unchanged.
    pub async fn fetch_all(
        &self,
        filter: &Document,
        projection: Option<&Document>,
        options: &FindOptions,
    ) -> AppResult<Vec<Document>> {
        let messages = self
            .store
            .find(&self.collection, filter, projection, options)
            .await
            .inspect_err(|e| {
                tracing::error!(collection = %self.collection, error = %e, "Failed to fetch messages");
            })?;

        tracing::debug!(
            collection = %self.collection,
            count = messages.len(),
            "Fetched messages"
        );
        Ok(messages)
    }

    /// One page of a group's messages, newest first.
    pub async fn fetch_all_with_group_id(
        &self,
        group_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> AppResult<Vec<Document>> {
        let mut filter = Document::new();
        filter.insert(GROUP_ID_FIELD.to_string(), Value::String(group_id.to_string()));

        let options = FindOptions {
            limit,
            offset,
            ..FindOptions::default()
        };

        self.fetch_all(&filter, None, &options).await
    }
}
