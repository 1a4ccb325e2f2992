//! Domain model shared by the store and the HTTP service
//!
//! Wire names are camelCase to match the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Entries considered when building a transcript summary
const SUMMARY_WINDOW: usize = 10;

/// Summaries longer than this are truncated with an ellipsis
const SUMMARY_MAX_CHARS: usize = 100;

/// Topic index record (one per decision-making session)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default)]
    pub axes: Vec<String>,
}

/// Candidate option within a topic
///
/// `evaluations` maps axis name to free text. A missing axis means
/// "unevaluated"; keys are never checked against the topic's axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub evaluations: BTreeMap<String, String>,
}

impl Idea {
    /// Evaluation text recorded for `axis`, if any
    pub fn evaluation(&self, axis: &str) -> Option<&str> {
        self.evaluations.get(axis).map(String::as_str)
    }
}

/// Whole per-topic aggregate, persisted as one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetail {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default)]
    pub axes: Vec<String>,
    #[serde(default)]
    pub ideas: Vec<Idea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptData>,
}

impl TopicDetail {
    /// Fresh aggregate for a topic that has no ideas yet
    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            id: topic.id.clone(),
            name: topic.name.clone(),
            goal: topic.goal.clone(),
            axes: topic.axes.clone(),
            ideas: Vec::new(),
            transcript: None,
        }
    }

    /// Index record for this aggregate
    pub fn summary(&self) -> Topic {
        Topic {
            id: self.id.clone(),
            name: self.name.clone(),
            goal: self.goal.clone(),
            axes: self.axes.clone(),
        }
    }

    /// Transcript log, or an empty one if nothing was recorded yet
    pub fn transcript_or_empty(&self) -> TranscriptData {
        self.transcript
            .clone()
            .unwrap_or_else(TranscriptData::empty)
    }
}

/// Input for creating a topic
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTopic {
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    pub axes: Vec<String>,
}

/// Replacement fields for a whole-object topic update
///
/// Fields that are present overwrite the aggregate's; absent ones keep it.
/// The optional fields distinguish `null` (clear) from absent (keep):
/// `Some(None)` clears, `None` keeps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub goal: Option<Option<String>>,
    #[serde(default)]
    pub axes: Option<Vec<String>>,
    #[serde(default)]
    pub ideas: Option<Vec<Idea>>,
    #[serde(default, deserialize_with = "present")]
    pub transcript: Option<Option<TranscriptData>>,
}

/// Marks a field as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TopicUpdate {
    /// Apply to an aggregate read from the store
    pub fn apply_to(self, detail: &mut TopicDetail) {
        if let Some(name) = self.name {
            detail.name = name;
        }
        if let Some(goal) = self.goal {
            detail.goal = goal.filter(|g| !g.trim().is_empty());
        }
        if let Some(axes) = self.axes {
            detail.axes = axes;
        }
        if let Some(ideas) = self.ideas {
            detail.ideas = ideas;
        }
        if let Some(transcript) = self.transcript {
            detail.transcript = transcript;
        }
    }
}

/// One utterance in a topic's meeting log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub text: String,
    /// Placeholder value, not a recognizer measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Append-only transcript log with a rolling summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptData {
    #[serde(default)]
    pub entries: Vec<TranscriptEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl TranscriptData {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            summary: None,
            last_updated: Utc::now(),
        }
    }

    /// Append an entry and refresh summary and timestamp
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
        self.touch();
    }

    /// Remove the entry with `entry_id`; returns whether one was removed
    pub fn remove(&mut self, entry_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != entry_id);
        let removed = self.entries.len() != before;
        self.touch();
        removed
    }

    fn touch(&mut self) {
        self.summary = summarize_entries(&self.entries);
        self.last_updated = Utc::now();
    }
}

/// Rolling summary over the most recent entries
///
/// Joins the last ten texts with spaces; anything of 100 characters or more
/// is cut to its first 100 characters plus `...`.
pub fn summarize_entries(entries: &[TranscriptEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let start = entries.len().saturating_sub(SUMMARY_WINDOW);
    let joined = entries[start..]
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.chars().count() < SUMMARY_MAX_CHARS {
        return Some(joined);
    }

    let head: String = joined.chars().take(SUMMARY_MAX_CHARS).collect();
    Some(format!("{}...", head))
}

/// Reference to an idea by id and name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One row of a judgment ranking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedIdea {
    #[serde(default)]
    pub idea_id: String,
    #[serde(default)]
    pub idea_name: String,
    #[serde(default)]
    pub score: f64,
}

/// Best idea on a single axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisWinner {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reason: String,
}

/// Outcome of a judgment (derived, never persisted)
///
/// `ranking` holds one row per judged idea and `winner` mirrors its first
/// row. Every key of `axis_winners` is one of `used_axes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JudgeResult {
    pub winner: IdeaRef,
    pub ranking: Vec<RankedIdea>,
    pub axis_winners: BTreeMap<String, AxisWinner>,
    pub used_axes: Vec<String>,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_summary: Option<String>,
}

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of an evaluation dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Axis proposed by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAxis {
    pub name: String,
    #[serde(default)]
    pub reason: String,
}

/// Idea proposed by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedIdea {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, text: &str) -> TranscriptEntry {
        TranscriptEntry {
            id: id.to_string(),
            timestamp: Utc::now(),
            speaker: None,
            text: text.to_string(),
            confidence: None,
        }
    }

    #[test]
    fn test_summary_short_text_is_verbatim() {
        let entries = vec![entry("1", "hello"), entry("2", "world")];
        assert_eq!(summarize_entries(&entries).as_deref(), Some("hello world"));
    }

    #[test]
    fn test_summary_truncates_long_text() {
        let entries = vec![entry("1", &"x".repeat(150))];
        let summary = summarize_entries(&entries).unwrap();
        assert_eq!(summary.chars().count(), 103);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_summary_uses_last_ten_entries() {
        let entries: Vec<_> = (0..12).map(|i| entry(&i.to_string(), &i.to_string())).collect();
        assert_eq!(
            summarize_entries(&entries).as_deref(),
            Some("2 3 4 5 6 7 8 9 10 11")
        );
    }

    #[test]
    fn test_summary_absent_when_empty() {
        assert_eq!(summarize_entries(&[]), None);
    }

    #[test]
    fn test_remove_entry_refreshes_summary() {
        let mut data = TranscriptData::empty();
        data.push(entry("a", "first"));
        data.push(entry("b", "second"));

        assert!(data.remove("a"));
        assert!(!data.remove("missing"));
        assert_eq!(data.summary.as_deref(), Some("second"));

        assert!(data.remove("b"));
        assert_eq!(data.summary, None);
    }

    #[test]
    fn test_update_keeps_absent_fields() {
        let topic = Topic {
            id: "t1".to_string(),
            name: "Lunch".to_string(),
            goal: Some("Pick a place".to_string()),
            axes: vec!["cost".to_string()],
        };
        let mut detail = TopicDetail::from_topic(&topic);

        TopicUpdate {
            axes: Some(vec!["cost".to_string(), "distance".to_string()]),
            ..Default::default()
        }
        .apply_to(&mut detail);

        assert_eq!(detail.name, "Lunch");
        assert_eq!(detail.goal.as_deref(), Some("Pick a place"));
        assert_eq!(detail.axes, vec!["cost", "distance"]);
    }

    #[test]
    fn test_update_null_goal_clears_it() {
        let topic = Topic {
            id: "t1".to_string(),
            name: "Lunch".to_string(),
            goal: Some("Pick a place".to_string()),
            axes: vec!["cost".to_string()],
        };
        let mut detail = TopicDetail::from_topic(&topic);

        let keep: TopicUpdate = serde_json::from_str(r#"{"name": "Dinner"}"#).unwrap();
        assert!(keep.goal.is_none());
        keep.apply_to(&mut detail);
        assert_eq!(detail.goal.as_deref(), Some("Pick a place"));

        let clear: TopicUpdate = serde_json::from_str(r#"{"goal": null}"#).unwrap();
        assert_eq!(clear.goal, Some(None));
        clear.apply_to(&mut detail);
        assert_eq!(detail.name, "Dinner");
        assert_eq!(detail.goal, None);

        let blank: TopicUpdate = serde_json::from_str(r#"{"goal": "  "}"#).unwrap();
        detail.goal = Some("Pick a place".to_string());
        blank.apply_to(&mut detail);
        assert_eq!(detail.goal, None);
    }

    #[test]
    fn test_judge_result_wire_names() {
        let result = JudgeResult {
            winner: IdeaRef { id: "1".into(), name: "A".into() },
            ranking: vec![RankedIdea { idea_id: "1".into(), idea_name: "A".into(), score: 10.0 }],
            used_axes: vec!["cost".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ranking"][0]["ideaId"], "1");
        assert!(json.get("axisWinners").is_some());
        assert!(json.get("transcriptSummary").is_none());
    }
}
