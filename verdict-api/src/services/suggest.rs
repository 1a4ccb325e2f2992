//! Axis and idea suggestions
//!
//! At most three suggestions per call, from the model when it answers with
//! a JSON array, otherwise from fixed catalogues minus anything already
//! present.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;
use verdict_common::models::{SuggestedAxis, SuggestedIdea};

use super::templates::{self, names_overlap};
use crate::llm::{parse_json, prompts, GenerationRequest, LanguageModel, LlmOutput};

/// Suggestions returned per call
pub const MAX_SUGGESTIONS: usize = 3;

/// Idea named in a suggestion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaSketch {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Context shared by both suggestion kinds
#[derive(Debug, Clone, Copy)]
pub struct SuggestionContext<'a> {
    pub topic_name: &'a str,
    pub goal: Option<&'a str>,
    pub transcript: Option<&'a str>,
}

pub struct Suggester<'a> {
    llm: Option<&'a dyn LanguageModel>,
}

impl<'a> Suggester<'a> {
    pub fn new(llm: Option<&'a dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn suggest_axes(
        &self,
        context: SuggestionContext<'_>,
        existing_axes: &[String],
        ideas: &[IdeaSketch],
    ) -> Vec<SuggestedAxis> {
        let prompt = prompts::suggest_axes(
            context.topic_name,
            context.goal,
            existing_axes,
            ideas,
            context.transcript,
        );

        match self.ask::<SuggestedAxis>(prompt).await {
            Some(axes) => axes,
            None => filter_catalogue(templates::axis_catalogue(), existing_axes, |a| &a.name),
        }
    }

    pub async fn suggest_ideas(
        &self,
        context: SuggestionContext<'_>,
        axes: &[String],
        existing_ideas: &[IdeaSketch],
    ) -> Vec<SuggestedIdea> {
        let prompt = prompts::suggest_ideas(
            context.topic_name,
            context.goal,
            axes,
            existing_ideas,
            context.transcript,
        );

        match self.ask::<SuggestedIdea>(prompt).await {
            Some(ideas) => ideas,
            None => {
                let existing: Vec<String> = existing_ideas.iter().map(|i| i.name.clone()).collect();
                filter_catalogue(templates::idea_catalogue(), &existing, |i| &i.name)
            }
        }
    }

    /// Model answer as a capped array, `None` when unusable
    async fn ask<T: DeserializeOwned>(&self, prompt: String) -> Option<Vec<T>> {
        let llm = self.llm?;

        let raw = match llm.generate(GenerationRequest::text(prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Suggestion model call failed, using catalogue");
                return None;
            }
        };

        match parse_json::<Vec<T>>(&raw) {
            LlmOutput::Parsed(mut items) => {
                items.truncate(MAX_SUGGESTIONS);
                Some(items)
            }
            LlmOutput::Unparseable(_) => {
                warn!("Suggestion answer was not a JSON array, using catalogue");
                None
            }
        }
    }
}

/// Catalogue entries not overlapping any existing name, capped
fn filter_catalogue<T>(catalogue: Vec<T>, existing: &[String], name: impl Fn(&T) -> &String) -> Vec<T> {
    catalogue
        .into_iter()
        .filter(|entry| {
            !existing
                .iter()
                .filter(|e| !e.trim().is_empty())
                .any(|e| names_overlap(e, name(entry)))
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;

    struct CannedModel(&'static str);

    #[async_trait]
    impl LanguageModel for CannedModel {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _request: GenerationRequest) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    fn context() -> SuggestionContext<'static> {
        SuggestionContext {
            topic_name: "Office move",
            goal: None,
            transcript: None,
        }
    }

    #[tokio::test]
    async fn test_catalogue_skips_existing_axes() {
        let existing = vec!["cost".to_string(), "Overall feasibility".to_string()];
        let axes = Suggester::new(None).suggest_axes(context(), &existing, &[]).await;

        let names: Vec<&str> = axes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Impact", "Low risk", "Urgency"]);
    }

    #[tokio::test]
    async fn test_blank_existing_name_filters_nothing() {
        let existing = vec!["  ".to_string()];
        let axes = Suggester::new(None).suggest_axes(context(), &existing, &[]).await;
        assert_eq!(axes[0].name, "Cost efficiency");
    }

    #[tokio::test]
    async fn test_model_answer_is_capped() {
        let model = CannedModel(
            r#"```json
            [{"name": "A", "reason": "a"}, {"name": "B", "reason": "b"},
             {"name": "C", "reason": "c"}, {"name": "D", "reason": "d"}]
            ```"#,
        );
        let axes = Suggester::new(Some(&model)).suggest_axes(context(), &[], &[]).await;
        assert_eq!(axes.len(), 3);
        assert_eq!(axes[2].name, "C");
    }

    #[tokio::test]
    async fn test_idea_catalogue_fallback() {
        let model = CannedModel("Here are some thoughts...");
        let existing = vec![IdeaSketch {
            name: "Phased rollout".to_string(),
            description: None,
        }];
        let ideas = Suggester::new(Some(&model))
            .suggest_ideas(context(), &[], &existing)
            .await;

        assert_eq!(ideas.len(), 3);
        assert!(ideas.iter().all(|i| i.name != "Phased rollout"));
    }
}
