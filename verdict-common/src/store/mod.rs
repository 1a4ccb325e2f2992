//! Topic persistence
//!
//! Callers read a whole [`TopicDetail`], change it, and write the whole
//! aggregate back. There is no locking; concurrent writers to one topic race
//! and the last write wins.

mod json_file;
#[cfg(feature = "sqlx")]
mod sqlite;

pub use json_file::JsonFileStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::StorageBackend;
use crate::models::{NewTopic, Topic, TopicDetail};
use crate::Result;

/// Repository of topic aggregates keyed by id
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Index records, newest first
    async fn list(&self) -> Result<Vec<Topic>>;

    /// Whole aggregate, or `None` for an unknown id
    async fn get(&self, id: &str) -> Result<Option<TopicDetail>>;

    /// Create a topic with no ideas
    async fn create(&self, new_topic: NewTopic) -> Result<Topic>;

    /// Overwrite an existing aggregate; `None` when the id is unknown
    async fn replace(&self, detail: TopicDetail) -> Result<Option<TopicDetail>>;

    /// Remove a topic; `false` when the id is unknown
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Build the index record for a new topic with a fresh id
pub(crate) fn new_topic_record(new_topic: NewTopic) -> Topic {
    Topic {
        id: uuid::Uuid::new_v4().to_string(),
        name: new_topic.name,
        goal: new_topic.goal.filter(|g| !g.trim().is_empty()),
        axes: new_topic.axes,
    }
}

/// Open the configured backend rooted at `data_dir`
pub async fn open_store(
    backend: StorageBackend,
    data_dir: &Path,
) -> Result<Arc<dyn TopicRepository>> {
    match backend {
        StorageBackend::Json => Ok(Arc::new(JsonFileStore::open(data_dir).await?)),
        #[cfg(feature = "sqlx")]
        StorageBackend::Sqlite => {
            let store = SqliteStore::open(&data_dir.join("verdict.db")).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlx"))]
        StorageBackend::Sqlite => Err(crate::Error::Config(
            "SQLite backend requires the `sqlx` feature".to_string(),
        )),
    }
}

