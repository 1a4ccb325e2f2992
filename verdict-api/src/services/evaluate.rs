//! Idea evaluation: one-shot per-axis evaluation and the guided dialogue

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use verdict_common::models::{ChatMessage, ChatRole};
use verdict_common::random::RandomSource;

use super::templates;
use crate::llm::parse::lenient;
use crate::llm::{
    parse_embedded_object, parse_json, prompts, GenerationRequest, LanguageModel, LlmOutput,
};

/// Reply to one chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub done: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_summary: Option<String>,
}

/// Model answer to a chat turn
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelChatReply {
    #[serde(default)]
    done: bool,
    message: String,
    #[serde(default, deserialize_with = "lenient")]
    evaluation: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    idea_summary: Option<String>,
}

/// Input of a one-shot evaluation
#[derive(Debug, Clone, Copy)]
pub struct EvaluationSubject<'a> {
    pub idea_name: &'a str,
    pub description: Option<&'a str>,
    pub axes: &'a [String],
    pub topic_name: Option<&'a str>,
    pub topic_goal: Option<&'a str>,
}

/// Input of one dialogue turn
#[derive(Debug, Clone, Copy)]
pub struct ChatTurn<'a> {
    pub messages: &'a [ChatMessage],
    pub idea_name: &'a str,
    pub current_axis: &'a str,
    pub axes: &'a [String],
}

impl ChatTurn<'_> {
    fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == ChatRole::User).count()
    }
}

pub struct Evaluator<'a> {
    llm: Option<&'a dyn LanguageModel>,
    random: &'a RandomSource,
}

impl<'a> Evaluator<'a> {
    pub fn new(llm: Option<&'a dyn LanguageModel>, random: &'a RandomSource) -> Self {
        Self { llm, random }
    }

    /// One evaluation text per axis, keyed by the requested axis names
    pub async fn auto_evaluate(&self, subject: EvaluationSubject<'_>) -> BTreeMap<String, String> {
        let llm = match self.llm {
            Some(llm) => llm,
            None => return self.template_evaluations(subject),
        };

        let prompt = prompts::auto_evaluate(
            subject.idea_name,
            subject.description,
            subject.axes,
            subject.topic_name,
            subject.topic_goal,
        );

        let raw = match llm.generate(GenerationRequest::text(prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Auto-evaluate model call failed, using templates");
                return self.template_evaluations(subject);
            }
        };

        let answer: BTreeMap<String, serde_json::Value> = match parse_embedded_object(&raw) {
            LlmOutput::Parsed(answer) => answer,
            LlmOutput::Unparseable(_) => {
                warn!("Auto-evaluate answer had no JSON object, using templates");
                return self.template_evaluations(subject);
            }
        };

        subject
            .axes
            .iter()
            .map(|axis| {
                let text = match_axis(&answer, axis)
                    .unwrap_or_else(|| self.template_evaluation(subject.idea_name, axis));
                (axis.clone(), text)
            })
            .collect()
    }

    fn template_evaluations(&self, subject: EvaluationSubject<'_>) -> BTreeMap<String, String> {
        subject
            .axes
            .iter()
            .map(|axis| (axis.clone(), self.template_evaluation(subject.idea_name, axis)))
            .collect()
    }

    fn template_evaluation(&self, idea_name: &str, axis: &str) -> String {
        let lines = templates::auto_evaluation_lines(axis);
        let line = self.random.pick(lines).copied().unwrap_or(lines[0]);
        line.replace("{idea}", idea_name)
    }

    /// Answer one dialogue turn
    pub async fn chat(&self, turn: ChatTurn<'_>) -> ChatReply {
        let llm = match self.llm {
            Some(llm) => llm,
            None => return self.fallback_reply(turn),
        };

        let prompt = if turn.user_message_count() == 0 {
            prompts::chat_opening(turn.idea_name, turn.current_axis, turn.axes)
        } else {
            prompts::chat_followup(turn.idea_name, turn.current_axis, turn.axes, turn.messages)
        };

        let raw = match llm.generate(GenerationRequest::json(prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Chat model call failed, using fallback reply");
                return self.fallback_reply(turn);
            }
        };

        match parse_json::<ModelChatReply>(&raw) {
            LlmOutput::Parsed(reply) => ChatReply {
                done: reply.done,
                message: reply.message,
                evaluation: reply.evaluation,
                idea_summary: reply.idea_summary,
            },
            LlmOutput::Unparseable(text) => {
                let message = if text.trim().is_empty() {
                    templates::chat_clarifying_question(turn.idea_name, turn.current_axis)
                } else {
                    text
                };
                ChatReply {
                    done: false,
                    message,
                    evaluation: None,
                    idea_summary: None,
                }
            }
        }
    }

    /// Scripted dialogue keyed by how many times the user has spoken
    fn fallback_reply(&self, turn: ChatTurn<'_>) -> ChatReply {
        let count = turn.user_message_count();
        let (idea, axis) = (turn.idea_name, turn.current_axis);

        if count == 0 {
            let (evaluation, reasoning) = self.initial_evaluation(idea, axis);
            return ChatReply {
                done: false,
                message: templates::chat_opening_message(idea, axis, &evaluation, &reasoning),
                evaluation: None,
                idea_summary: None,
            };
        }

        if count >= 2 {
            return ChatReply {
                done: true,
                message: templates::chat_closing_message(axis),
                evaluation: Some(self.closing_evaluation(axis)),
                idea_summary: Some(templates::chat_idea_summary(idea, axis)),
            };
        }

        let options = templates::continuation_messages(axis);
        let message = options[count % options.len()].clone();
        ChatReply {
            done: false,
            message,
            evaluation: None,
            idea_summary: None,
        }
    }

    fn initial_evaluation(&self, idea: &str, axis: &str) -> (String, String) {
        let seed = self.random.next_seed();
        let index = (seed % 3) as usize;

        match templates::find_chat_template(axis) {
            Some(template) => (
                template.evaluations[index].to_string(),
                template.reasonings[index].to_string(),
            ),
            None => {
                let reasonings = templates::default_reasonings(idea, axis);
                (
                    templates::DEFAULT_EVALUATIONS[index].to_string(),
                    reasonings[index].clone(),
                )
            }
        }
    }

    fn closing_evaluation(&self, axis: &str) -> String {
        let options: &[&str] = match templates::find_chat_template(axis) {
            Some(template) => &template.evaluations,
            None => &templates::DEFAULT_EVALUATIONS,
        };
        self.random
            .pick(options)
            .copied()
            .unwrap_or(templates::DEFAULT_EVALUATIONS[0])
            .to_string()
    }
}

/// Exact key, else a key containing or contained in the axis name
fn match_axis(answer: &BTreeMap<String, serde_json::Value>, axis: &str) -> Option<String> {
    let text_of = |value: &serde_json::Value| {
        value
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(text) = answer.get(axis).and_then(text_of) {
        return Some(text);
    }

    answer
        .iter()
        .filter(|(key, _)| !key.is_empty() && (key.contains(axis) || axis.contains(key.as_str())))
        .find_map(|(_, value)| text_of(value))
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

    fn message(role: ChatRole, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    fn axes() -> Vec<String> {
        vec!["Feasibility".to_string(), "Cost".to_string(), "Morale".to_string()]
    }

    #[tokio::test]
    async fn test_auto_evaluate_matches_keys() {
        let model = CannedModel(
            "Sure!\n{\"Feasibility\": \"Doable in a quarter.\", \"Cost efficiency\": \"Cheap to run.\"}",
        );
        let random = RandomSource::seeded(1);
        let axes = axes();
        let result = Evaluator::new(Some(&model), &random)
            .auto_evaluate(EvaluationSubject {
                idea_name: "Kiosk",
                description: None,
                axes: &axes,
                topic_name: None,
                topic_goal: None,
            })
            .await;

        assert_eq!(result["Feasibility"], "Doable in a quarter.");
        // "Cost efficiency" contains "Cost"
        assert_eq!(result["Cost"], "Cheap to run.");
        // no key for Morale: feasibility template
        assert!(result["Morale"].contains("\"Kiosk\""));
        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn test_auto_evaluate_without_model_covers_every_axis() {
        let random = RandomSource::seeded(1);
        let axes = axes();
        let result = Evaluator::new(None, &random)
            .auto_evaluate(EvaluationSubject {
                idea_name: "Kiosk",
                description: Some("Self-service terminal"),
                axes: &axes,
                topic_name: Some("Lobby"),
                topic_goal: None,
            })
            .await;

        assert_eq!(result.len(), 3);
        assert!(result.values().all(|text| text.contains("\"Kiosk\"")));
    }

    async fn fallback_turn(evaluator: &Evaluator<'_>, messages: &[ChatMessage]) -> ChatReply {
        let axes = axes();
        evaluator
            .chat(ChatTurn {
                messages,
                idea_name: "Kiosk",
                current_axis: "Cost",
                axes: &axes,
            })
            .await
    }

    #[tokio::test]
    async fn test_fallback_chat_progression() {
        let random = RandomSource::seeded(3);
        let evaluator = Evaluator::new(None, &random);
        let mut messages = Vec::new();

        let opening = fallback_turn(&evaluator, &messages).await;
        assert!(!opening.done);
        assert!(opening.message.contains("[Initial evaluation]"));

        messages.push(message(ChatRole::Assistant, &opening.message));
        messages.push(message(ChatRole::User, "Seems right"));
        let second = fallback_turn(&evaluator, &messages).await;
        assert!(!second.done);
        assert_eq!(second.message, templates::continuation_messages("Cost")[1]);

        messages.push(message(ChatRole::User, "Agreed"));
        let closing = fallback_turn(&evaluator, &messages).await;
        assert!(closing.done);
        assert!(closing.evaluation.is_some());
        assert_eq!(
            closing.idea_summary.as_deref(),
            Some("Kiosk was considered from the perspective of Cost.")
        );
    }

    #[tokio::test]
    async fn test_unparseable_chat_answer_is_passed_through() {
        let model = CannedModel("Could you say more about running costs?");
        let random = RandomSource::seeded(1);
        let axes = axes();
        let messages = vec![message(ChatRole::User, "It is cheap")];
        let reply = Evaluator::new(Some(&model), &random)
            .chat(ChatTurn {
                messages: &messages,
                idea_name: "Kiosk",
                current_axis: "Cost",
                axes: &axes,
            })
            .await;

        assert!(!reply.done);
        assert_eq!(reply.message, "Could you say more about running costs?");
    }

    #[tokio::test]
    async fn test_model_chat_answer() {
        let model = CannedModel(r#"{"done": true, "message": "Settled.", "evaluation": "Low cost", "ideaSummary": "A kiosk"}"#);
        let random = RandomSource::seeded(1);
        let axes = axes();
        let reply = Evaluator::new(Some(&model), &random)
            .chat(ChatTurn {
                messages: &[],
                idea_name: "Kiosk",
                current_axis: "Cost",
                axes: &axes,
            })
            .await;

        assert_eq!(
            reply,
            ChatReply {
                done: true,
                message: "Settled.".to_string(),
                evaluation: Some("Low cost".to_string()),
                idea_summary: Some("A kiosk".to_string()),
            }
        );
    }
}
