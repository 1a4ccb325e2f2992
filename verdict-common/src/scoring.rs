//! Rule-based fallback judgment
//!
//! Used whenever the language model is unavailable or its answer cannot be
//! used, and to fill in parts of a model answer that are missing.
//!
//! # Scoring Algorithm
//! - **Keyword score** (0-100): start at 50, add the rule weight for every
//!   distinct positive term found in the evaluation text, subtract it for
//!   every distinct negative term, clamp.
//! - **Idea score**: mean keyword score over the selected axes that carry a
//!   usable evaluation (0 when none do), plus a transcript bonus of 2 per
//!   mention of the idea name, capped at 10. Not reclamped.
//! - **Ranking**: stable sort by idea score, descending.
//! - **Axis winners**: best keyword score per axis among usable evaluations.
//!   Axes nobody has a usable evaluation for are left out.
//!
//! Matching is substring-based with no negation handling; "not good" scores
//! as "good".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{AxisWinner, Idea, IdeaRef, JudgeResult, RankedIdea};

/// Starting point of every keyword score
pub const BASE_SCORE: i64 = 50;

/// Upper bound of a keyword score
pub const MAX_SCORE: i64 = 100;

/// Bonus per idea-name mention in the transcript
pub const MENTION_BONUS: f64 = 2.0;

/// Cap on the transcript bonus
pub const MAX_TRANSCRIPT_BONUS: f64 = 10.0;

/// Sentences kept in a transcript summary
const SUMMARY_SENTENCES: usize = 3;

/// Sentence terminators recognised by the transcript summary
const SENTENCE_TERMINATORS: [char; 3] = ['。', '！', '？'];

/// Terminator used to rejoin summary sentences
const SUMMARY_JOINER: &str = "。";

/// Whether a rule raises or lowers the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

/// One row of the keyword table
///
/// `weight` is a magnitude; `category` decides the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: Polarity,
    pub terms: BTreeSet<String>,
    pub weight: i64,
}

impl KeywordRule {
    pub fn new(category: Polarity, terms: &[&str], weight: i64) -> Self {
        Self {
            category,
            terms: terms.iter().map(|t| t.to_string()).collect(),
            weight,
        }
    }

    /// Number of distinct terms found in already-lowercased text
    fn matches(&self, lowered: &str) -> usize {
        self.terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect::<BTreeSet<_>>()
            .iter()
            .filter(|t| lowered.contains(t.as_str()))
            .count()
    }

    fn signed_weight(&self) -> i64 {
        match self.category {
            Polarity::Positive => self.weight.abs(),
            Polarity::Negative => -self.weight.abs(),
        }
    }
}

/// Keyword table plus the "no evaluation" sentinel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTable {
    pub rules: Vec<KeywordRule>,
    pub unknown_marker: String,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            rules: vec![
                KeywordRule::new(
                    Polarity::Positive,
                    &[
                        "excellent",
                        "good",
                        "high",
                        "large",
                        "effective",
                        "valid",
                        "appropriate",
                        "strong",
                    ],
                    15,
                ),
                KeywordRule::new(
                    Polarity::Negative,
                    &[
                        "bad",
                        "low",
                        "small",
                        "difficult",
                        "problem",
                        "issue",
                        "weak",
                        "inappropriate",
                    ],
                    10,
                ),
            ],
            unknown_marker: "unknown".to_string(),
        }
    }
}

impl KeywordTable {
    /// Map evaluation text to a 0-100 score
    pub fn score(&self, evaluation: &str) -> f64 {
        let lowered = evaluation.to_lowercase();
        let delta: i64 = self
            .rules
            .iter()
            .map(|rule| rule.matches(&lowered) as i64 * rule.signed_weight())
            .sum();

        (BASE_SCORE + delta).clamp(0, MAX_SCORE) as f64
    }

    /// Evaluation is present, non-blank and not the sentinel
    pub fn is_usable(&self, evaluation: Option<&str>) -> bool {
        match evaluation {
            Some(text) => {
                let text = text.trim();
                !text.is_empty() && !text.eq_ignore_ascii_case(self.unknown_marker.trim())
            }
            None => false,
        }
    }
}

/// Case-insensitive, non-overlapping literal occurrences of `name`
pub fn count_mentions(name: &str, transcript: &str) -> usize {
    let needle = name.to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    transcript.to_lowercase().matches(needle.as_str()).count()
}

/// `min(2 * mentions, 10)`
pub fn transcript_bonus(name: &str, transcript: &str) -> f64 {
    (count_mentions(name, transcript) as f64 * MENTION_BONUS).min(MAX_TRANSCRIPT_BONUS)
}

/// First three sentences of the transcript
///
/// Splits on full-width terminators and rejoins with `。`.
pub fn summarize_transcript(transcript: &str) -> String {
    let sentences: Vec<&str> = transcript
        .split(|c| SENTENCE_TERMINATORS.contains(&c))
        .filter(|s| !s.trim().is_empty())
        .take(SUMMARY_SENTENCES)
        .collect();

    if sentences.is_empty() {
        return String::new();
    }

    format!("{}{}", sentences.join(SUMMARY_JOINER), SUMMARY_JOINER)
}

/// Deterministic judge over free-text evaluations
#[derive(Debug, Clone, Default)]
pub struct FallbackJudge {
    table: KeywordTable,
}

impl FallbackJudge {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Keyword score of the evaluation `idea` has on `axis`, if usable
    fn axis_score(&self, idea: &Idea, axis: &str) -> Option<f64> {
        let evaluation = idea.evaluation(axis);
        if self.table.is_usable(evaluation) {
            evaluation.map(|text| self.table.score(text))
        } else {
            None
        }
    }

    /// Mean axis score plus transcript bonus
    pub fn idea_score(&self, idea: &Idea, axes: &[String], transcript: Option<&str>) -> f64 {
        let scores: Vec<f64> = axes
            .iter()
            .filter_map(|axis| self.axis_score(idea, axis))
            .collect();

        let average = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        let bonus = transcript
            .map(|text| transcript_bonus(&idea.name, text))
            .unwrap_or(0.0);

        average + bonus
    }

    /// Ideas ordered by score, ties kept in input order
    pub fn rank(&self, axes: &[String], ideas: &[Idea], transcript: Option<&str>) -> Vec<RankedIdea> {
        let mut ranking: Vec<RankedIdea> = ideas
            .iter()
            .map(|idea| RankedIdea {
                idea_id: idea.id.clone(),
                idea_name: idea.name.clone(),
                score: self.idea_score(idea, axes, transcript),
            })
            .collect();

        // sort_by is stable
        ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranking
    }

    /// Best idea per axis; axes without usable evaluations are omitted
    pub fn axis_winners(&self, axes: &[String], ideas: &[Idea]) -> BTreeMap<String, AxisWinner> {
        let mut winners = BTreeMap::new();

        for axis in axes {
            let mut candidates: Vec<(&Idea, f64)> = ideas
                .iter()
                .filter_map(|idea| self.axis_score(idea, axis).map(|score| (idea, score)))
                .collect();
            candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

            if let Some((idea, _)) = candidates.first() {
                let evaluation = idea.evaluation(axis).unwrap_or_default();
                winners.insert(
                    axis.clone(),
                    AxisWinner {
                        id: idea.id.clone(),
                        name: idea.name.clone(),
                        reason: format!(
                            "highest score on this axis based on evaluation text: \"{}\"",
                            evaluation
                        ),
                    },
                );
            }
        }

        winners
    }

    /// Full judgment; `None` only for an empty idea list
    pub fn judge(&self, axes: &[String], ideas: &[Idea], transcript: Option<&str>) -> Option<JudgeResult> {
        let transcript = transcript.filter(|t| !t.trim().is_empty());

        let ranking = self.rank(axes, ideas, transcript);
        let top = ranking.first()?;
        let winner = IdeaRef {
            id: top.idea_id.clone(),
            name: top.idea_name.clone(),
        };

        let axis_winners = self.axis_winners(axes, ideas);
        let transcript_summary = transcript.map(summarize_transcript);
        let reasoning = compose_reasoning(
            &winner.name,
            axes,
            &axis_winners,
            transcript_summary.as_deref(),
        );

        Some(JudgeResult {
            winner,
            ranking,
            axis_winners,
            used_axes: axes.to_vec(),
            reasoning,
            transcript_summary,
        })
    }
}

/// Template explanation of a fallback judgment
pub fn compose_reasoning(
    winner_name: &str,
    axes: &[String],
    axis_winners: &BTreeMap<String, AxisWinner>,
    transcript_summary: Option<&str>,
) -> String {
    let mut reasoning = format!(
        "Weighing the selected axes \"{}\", \"{}\" was chosen as the strongest idea.\n\n",
        axes.join(", "),
        winner_name
    );

    reasoning.push_str("[Results by axis]\n");
    for axis in axes {
        if let Some(w) = axis_winners.get(axis) {
            reasoning.push_str(&format!("- {}: {} ranked first ({})\n", axis, w.name, w.reason));
        }
    }

    if let Some(summary) = transcript_summary {
        reasoning.push_str(&format!("\n[From the meeting transcript]\n{}\n", summary));
    }

    reasoning.push_str(&format!(
        "\nOverall, \"{}\" was judged the most balanced and strongest idea.",
        winner_name
    ));

    reasoning
}
