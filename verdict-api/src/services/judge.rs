//! Judgment orchestration
//!
//! The model's answer is never trusted wholesale. It is reconciled against
//! the fallback engine so the result always names every input idea once,
//! `winner` mirrors the first ranking row and axis winners stay inside the
//! selected axes.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};
use verdict_common::models::{AxisWinner, Idea, IdeaRef, JudgeResult, RankedIdea};
use verdict_common::FallbackJudge;

use crate::llm::parse::lenient;
use crate::llm::{parse_json, prompts, GenerationRequest, LanguageModel, LlmOutput};

/// Model answer; every field may be missing or mistyped
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelJudgement {
    #[serde(default, deserialize_with = "lenient")]
    ranking: Option<Vec<ModelRankRow>>,
    #[serde(default, deserialize_with = "lenient")]
    axis_winners: Option<BTreeMap<String, ModelAxisWinner>>,
    #[serde(default, deserialize_with = "lenient")]
    reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    transcript_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelRankRow {
    #[serde(default, deserialize_with = "lenient")]
    idea_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    idea_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelAxisWinner {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    reason: Option<String>,
}

/// Judge combining an optional model with the fallback engine
pub struct Judge<'a> {
    llm: Option<&'a dyn LanguageModel>,
    fallback: &'a FallbackJudge,
}

impl<'a> Judge<'a> {
    pub fn new(llm: Option<&'a dyn LanguageModel>, fallback: &'a FallbackJudge) -> Self {
        Self { llm, fallback }
    }

    /// Judge `ideas` on `axes`; `None` only when `ideas` is empty
    pub async fn judge(
        &self,
        axes: &[String],
        ideas: &[Idea],
        transcript: Option<&str>,
    ) -> Option<JudgeResult> {
        let transcript = transcript.filter(|t| !t.trim().is_empty());
        let fallback = self.fallback.judge(axes, ideas, transcript)?;

        let llm = match self.llm {
            Some(llm) => llm,
            None => return Some(fallback),
        };

        let prompt = prompts::judge(axes, ideas, transcript);
        let raw = match llm.generate(GenerationRequest::json(prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Judge model call failed, using fallback");
                return Some(fallback);
            }
        };

        match parse_json::<ModelJudgement>(&raw) {
            LlmOutput::Parsed(model) => Some(self.reconcile(model, fallback, axes, ideas, transcript)),
            LlmOutput::Unparseable(_) => {
                warn!("Judge model answer was not JSON, using fallback");
                Some(fallback)
            }
        }
    }

    fn reconcile(
        &self,
        model: ModelJudgement,
        fallback: JudgeResult,
        axes: &[String],
        ideas: &[Idea],
        transcript: Option<&str>,
    ) -> JudgeResult {
        let ranking = match model.ranking.filter(|rows| !rows.is_empty()) {
            Some(rows) => self.merge_ranking(rows, axes, ideas, transcript),
            None => fallback.ranking.clone(),
        };

        // ranking covers every idea and ideas is non-empty
        let winner = ranking
            .first()
            .map(|top| IdeaRef {
                id: top.idea_id.clone(),
                name: top.idea_name.clone(),
            })
            .unwrap_or_else(|| fallback.winner.clone());

        let axis_winners = model
            .axis_winners
            .map(|map| filter_axis_winners(map, &fallback.axis_winners, ideas))
            .filter(|map| !map.is_empty())
            .unwrap_or_else(|| fallback.axis_winners.clone());

        let reasoning = model
            .reasoning
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(fallback.reasoning);

        let transcript_summary = transcript.and_then(|_| {
            model
                .transcript_summary
                .filter(|s| !s.trim().is_empty())
                .or(fallback.transcript_summary)
        });

        JudgeResult {
            winner,
            ranking,
            axis_winners,
            used_axes: fallback.used_axes,
            reasoning,
            transcript_summary,
        }
    }

    /// Model order for recognised ideas, then the rest in fallback order
    fn merge_ranking(
        &self,
        rows: Vec<ModelRankRow>,
        axes: &[String],
        ideas: &[Idea],
        transcript: Option<&str>,
    ) -> Vec<RankedIdea> {
        let scores: Vec<f64> = ideas
            .iter()
            .map(|idea| self.fallback.idea_score(idea, axes, transcript))
            .collect();

        let mut seen = HashSet::new();
        let mut ranking = Vec::with_capacity(ideas.len());

        for row in rows {
            let index = match find_idea(ideas, row.idea_id.as_deref(), row.idea_name.as_deref(), &seen) {
                Some(index) => index,
                None => {
                    debug!(idea_id = ?row.idea_id, idea_name = ?row.idea_name, "Dropping unknown idea from model ranking");
                    continue;
                }
            };
            seen.insert(index);
            ranking.push(ranked(&ideas[index], row.score.unwrap_or(scores[index])));
        }

        let mut rest: Vec<usize> = (0..ideas.len()).filter(|i| !seen.contains(i)).collect();
        // sort_by is stable
        rest.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
        ranking.extend(rest.into_iter().map(|i| ranked(&ideas[i], scores[i])));

        ranking
    }
}

fn ranked(idea: &Idea, score: f64) -> RankedIdea {
    RankedIdea {
        idea_id: idea.id.clone(),
        idea_name: idea.name.clone(),
        score,
    }
}

/// First idea not yet used matching `id`, else matching `name`
fn find_idea(ideas: &[Idea], id: Option<&str>, name: Option<&str>, seen: &HashSet<usize>) -> Option<usize> {
    let unused = || (0..ideas.len()).filter(move |i| !seen.contains(i));

    let by_id = id
        .filter(|id| !id.is_empty())
        .and_then(|id| unused().find(|&i| ideas[i].id == id));

    by_id.or_else(|| {
        name.filter(|name| !name.is_empty())
            .and_then(|name| unused().find(|&i| ideas[i].name == name))
    })
}

/// Keep model axis winners for axes the engine can award and known ideas
fn filter_axis_winners(
    model: BTreeMap<String, ModelAxisWinner>,
    fallback: &BTreeMap<String, AxisWinner>,
    ideas: &[Idea],
) -> BTreeMap<String, AxisWinner> {
    let none = HashSet::new();

    model
        .into_iter()
        .filter_map(|(axis, winner)| {
            let engine_pick = fallback.get(&axis)?;
            let index = find_idea(ideas, winner.id.as_deref(), winner.name.as_deref(), &none)?;
            let idea = &ideas[index];
            let reason = winner
                .reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| engine_pick.reason.clone());

            Some((
                axis,
                AxisWinner {
                    id: idea.id.clone(),
                    name: idea.name.clone(),
                    reason,
                },
            ))
        })
        .collect()
}
