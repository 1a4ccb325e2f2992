//! Per-topic meeting transcript
//!
//! The log lives inside the topic aggregate; every change is a
//! read-modify-replace of the whole topic.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;
use verdict_common::models::{TranscriptData, TranscriptEntry};
use verdict_common::random::RandomSource;
use verdict_common::{Result, TopicRepository};

use super::speech::UNKNOWN_SPEAKER;

pub struct TranscriptLog<'a> {
    store: &'a dyn TopicRepository,
    random: &'a RandomSource,
}

impl<'a> TranscriptLog<'a> {
    pub fn new(store: &'a dyn TopicRepository, random: &'a RandomSource) -> Self {
        Self { store, random }
    }

    /// Current log, empty for a topic that has none; `None` for unknown topics
    pub async fn load(&self, topic_id: &str) -> Result<Option<TranscriptData>> {
        let topic = self.store.get(topic_id).await?;
        Ok(topic.map(|t| t.transcript_or_empty()))
    }

    /// Append an utterance; `None` for unknown topics
    pub async fn append(
        &self,
        topic_id: &str,
        text: &str,
        speaker: Option<&str>,
    ) -> Result<Option<TranscriptData>> {
        let mut topic = match self.store.get(topic_id).await? {
            Some(topic) => topic,
            None => return Ok(None),
        };

        let speaker = speaker
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SPEAKER);

        let mut transcript = topic.transcript_or_empty();
        transcript.push(TranscriptEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            speaker: Some(speaker.to_string()),
            text: text.trim().to_string(),
            confidence: Some(self.random.confidence()),
        });
        topic.transcript = Some(transcript.clone());

        if self.store.replace(topic).await?.is_none() {
            // Deleted between read and write
            return Ok(None);
        }

        info!(topic_id = %topic_id, entries = transcript.entries.len(), "Transcript entry added");
        Ok(Some(transcript))
    }

    /// Remove one entry; `None` for unknown topics
    ///
    /// Removing an id that is not in the log leaves it unchanged apart from
    /// the timestamp.
    pub async fn remove(&self, topic_id: &str, entry_id: &str) -> Result<Option<TranscriptData>> {
        let mut topic = match self.store.get(topic_id).await? {
            Some(topic) => topic,
            None => return Ok(None),
        };

        let mut transcript = topic.transcript_or_empty();

        if !transcript.remove(entry_id) {
            debug!(topic_id = %topic_id, entry_id = %entry_id, "Transcript entry not present");
        }
        topic.transcript = Some(transcript.clone());

        if self.store.replace(topic).await?.is_none() {
            return Ok(None);
        }

        Ok(Some(transcript))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use verdict_common::models::NewTopic;
    use verdict_common::store::JsonFileStore;

    async fn setup() -> (TempDir, JsonFileStore, String) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let topic = store
            .create(NewTopic {
                name: "Standup".to_string(),
                goal: None,
                axes: vec![],
            })
            .await
            .unwrap();
        (dir, store, topic.id)
    }

    #[tokio::test]
    async fn test_append_and_remove() {
        let (_dir, store, id) = setup().await;
        let random = RandomSource::seeded(9);
        let log = TranscriptLog::new(&store, &random);

        assert!(log.load(&id).await.unwrap().unwrap().entries.is_empty());

        let first = log.append(&id, "  Hello  ", None).await.unwrap().unwrap();
        assert_eq!(first.entries.len(), 1);
        assert_eq!(first.entries[0].text, "Hello");
        assert_eq!(first.entries[0].speaker.as_deref(), Some(UNKNOWN_SPEAKER));
        let confidence = first.entries[0].confidence.unwrap();
        assert!((0.8..1.0).contains(&confidence));
        assert_eq!(first.summary.as_deref(), Some("Hello"));

        let second = log.append(&id, "World", Some("Bob")).await.unwrap().unwrap();
        assert_eq!(second.summary.as_deref(), Some("Hello World"));

        let entry_id = second.entries[0].id.clone();
        let after = log.remove(&id, &entry_id).await.unwrap().unwrap();
        assert_eq!(after.entries.len(), 1);
        assert_eq!(after.summary.as_deref(), Some("World"));

        let stored = log.load(&id).await.unwrap().unwrap();
        assert_eq!(stored.entries, after.entries);
    }

    #[tokio::test]
    async fn test_unknown_topic() {
        let (_dir, store, _id) = setup().await;
        let random = RandomSource::seeded(9);
        let log = TranscriptLog::new(&store, &random);

        assert!(log.load("missing").await.unwrap().is_none());
        assert!(log.append("missing", "hi", None).await.unwrap().is_none());
        assert!(log.remove("missing", "e1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_without_log() {
        let (_dir, store, id) = setup().await;
        let random = RandomSource::seeded(9);
        let log = TranscriptLog::new(&store, &random);
        let transcript = log.remove(&id, "e1").await.unwrap().unwrap();
        assert!(transcript.entries.is_empty());
        assert!(transcript.summary.is_none());
    }
}
