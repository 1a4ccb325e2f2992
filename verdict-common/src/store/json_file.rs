//! Flat-file topic store
//!
//! Layout inside the data directory:
//! - `topics.json`: array of [`Topic`] index records, newest first
//! - `topic_<id>.json`: one [`TopicDetail`] per topic
//!
//! Files are rewritten whole on every change (temp file + rename).

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{new_topic_record, TopicRepository};
use crate::models::{NewTopic, Topic, TopicDetail};
use crate::Result;

const INDEX_FILE: &str = "topics.json";

/// JSON-file backed [`TopicRepository`]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

/// Ids become file names, so only plain tokens are accepted
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `data_dir`
    pub async fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).await?;

        let store = Self {
            data_dir: data_dir.to_path_buf(),
        };

        if fs::metadata(store.index_path()).await.is_err() {
            store.write_index(&[]).await?;
            debug!("Created empty topic index in {}", data_dir.display());
        }

        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn index_path(&self) -> PathBuf {
        self.data_dir.join(INDEX_FILE)
    }

    fn detail_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("topic_{}.json", id))
    }

    async fn read_index(&self) -> Result<Vec<Topic>> {
        match fs::read_to_string(self.index_path()).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_index(&self, topics: &[Topic]) -> Result<()> {
        write_json(&self.index_path(), &topics).await
    }

    /// Detail document for an indexed topic
    ///
    /// A missing or unreadable document falls back to the index record.
    async fn read_detail(&self, topic: &Topic) -> TopicDetail {
        let path = self.detail_path(&topic.id);
        match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(detail) => detail,
                Err(e) => {
                    warn!(topic_id = %topic.id, error = %e, "Unreadable topic document, using index record");
                    TopicDetail::from_topic(topic)
                }
            },
            Err(_) => TopicDetail::from_topic(topic),
        }
    }
}

/// Whole-file write via a sibling temp file
///
/// Each call gets its own temp name, so concurrent writers to one file never
/// share a temp file; the last rename wins.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    fs::write(&tmp, content).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl TopicRepository for JsonFileStore {
    async fn list(&self) -> Result<Vec<Topic>> {
        self.read_index().await
    }

    async fn get(&self, id: &str) -> Result<Option<TopicDetail>> {
        if !is_safe_id(id) {
            return Ok(None);
        }

        let topics = self.read_index().await?;
        match topics.iter().find(|t| t.id == id) {
            Some(topic) => Ok(Some(self.read_detail(topic).await)),
            None => Ok(None),
        }
    }

    async fn create(&self, new_topic: NewTopic) -> Result<Topic> {
        let topic = new_topic_record(new_topic);

        let mut topics = self.read_index().await?;
        topics.insert(0, topic.clone());
        self.write_index(&topics).await?;

        write_json(&self.detail_path(&topic.id), &TopicDetail::from_topic(&topic)).await?;

        debug!(topic_id = %topic.id, "Topic created");
        Ok(topic)
    }

    async fn replace(&self, detail: TopicDetail) -> Result<Option<TopicDetail>> {
        if !is_safe_id(&detail.id) {
            return Ok(None);
        }

        let mut topics = self.read_index().await?;
        let Some(record) = topics.iter_mut().find(|t| t.id == detail.id) else {
            return Ok(None);
        };

        write_json(&self.detail_path(&detail.id), &detail).await?;

        let summary = detail.summary();
        if *record != summary {
            *record = summary;
            self.write_index(&topics).await?;
        }

        Ok(Some(detail))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        if !is_safe_id(id) {
            return Ok(false);
        }

        let topics = self.read_index().await?;
        let remaining: Vec<Topic> = topics.iter().filter(|t| t.id != id).cloned().collect();
        if remaining.len() == topics.len() {
            return Ok(false);
        }

        self.write_index(&remaining).await?;

        match fs::remove_file(self.detail_path(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        debug!(topic_id = %id, "Topic deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_ids() {
        assert!(is_safe_id("0b5c2e1a-6f0e-4c1b-9d8a-111111111111"));
        assert!(is_safe_id("1717171717171"));
        assert!(!is_safe_id(""));
        assert!(!is_safe_id("../topics"));
        assert!(!is_safe_id("a/b"));
    }
}
