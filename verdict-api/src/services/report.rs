//! Judgment report export
//!
//! Builds a Markdown report for a topic and its judgment, then hands it to
//! an external converter (pandoc by default) to produce the PDF. Work files
//! live in a scratch directory and are removed whether or not the
//! conversion succeeds.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;
use verdict_common::config::PdfConfig;
use verdict_common::models::{JudgeResult, TopicDetail};

const NO_DATA: &str = "no data";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Converter exited with {status}: {stderr}")]
    ConverterFailed { status: String, stderr: String },

    #[error("Converter produced no output file")]
    MissingOutput,
}

/// Markdown report for `topic` and `judgment`
pub fn render_markdown(
    topic: &TopicDetail,
    judgment: Option<&JudgeResult>,
    model_name: &str,
    date: NaiveDate,
) -> String {
    let mut md = format!(
        "# Decision Report\n\n\
         **Topic**: {}  \n\
         **Date**: {}  \n\
         **Judged by**: {}\n\n\
         ---\n\n\
         ## Result\n\n\
         ### Overall winner\n\
         **{}**\n\n\
         ### Ranking\n",
        topic.name,
        date.format("%Y-%m-%d"),
        model_name,
        judgment
            .map(|j| j.winner.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(NO_DATA)
    );

    if let Some(judgment) = judgment {
        for (i, row) in judgment.ranking.iter().enumerate() {
            md.push_str(&format!("{}. **{}** (score: {:.1})\n", i + 1, row.idea_name, row.score));
        }
    }

    md.push_str("\n### Best per axis\n");
    if let Some(judgment) = judgment {
        for axis in &judgment.used_axes {
            if let Some(winner) = judgment.axis_winners.get(axis) {
                md.push_str(&format!("- **{}**: {}\n", axis, winner.name));
            }
        }
    }

    md.push_str(&format!(
        "\n### Reasoning\n{}\n\n---\n\n## Ideas\n\n",
        judgment
            .map(|j| j.reasoning.as_str())
            .filter(|r| !r.is_empty())
            .unwrap_or(NO_DATA)
    ));

    md.push_str(&format!("| Idea | {} |\n", topic.axes.join(" | ")));
    md.push_str(&format!(
        "|------|{}|\n",
        topic.axes.iter().map(|_| "------").collect::<Vec<_>>().join("|")
    ));
    for idea in &topic.ideas {
        let cells: Vec<String> = topic
            .axes
            .iter()
            .map(|axis| table_cell(idea.evaluation(axis).unwrap_or("-")))
            .collect();
        md.push_str(&format!("| {} | {} |\n", table_cell(&idea.name), cells.join(" | ")));
    }

    if let Some(transcript) = topic.transcript.as_ref().filter(|t| !t.entries.is_empty()) {
        md.push_str("\n---\n\n## Meeting transcript\n\n");
        for (i, entry) in transcript.entries.iter().enumerate() {
            let speaker = entry
                .speaker
                .as_deref()
                .map(|s| format!(" ({})", s))
                .unwrap_or_default();
            md.push_str(&format!(
                "### {}. {}{}\n{}\n\n",
                i + 1,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                speaker,
                entry.text
            ));
        }
    }

    md.push_str("\n---\n\n## Axes used\n");
    if let Some(judgment) = judgment {
        for axis in &judgment.used_axes {
            md.push_str(&format!("- {}\n", axis));
        }
    }

    md.push_str("\n---\n\n*Generated automatically by Verdict.*\n");
    md
}

/// Pipes and newlines would break the table row
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// ASCII download name: `verdict_<topic>_<date>.pdf`
pub fn attachment_filename(topic_name: &str, date: NaiveDate) -> String {
    let mut stem: String = topic_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    stem = stem.trim_matches('_').to_string();
    if stem.is_empty() {
        stem = "topic".to_string();
    }
    format!("verdict_{}_{}.pdf", stem, date.format("%Y-%m-%d"))
}

/// Markdown-to-PDF through an external program
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    converter: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl PdfRenderer {
    pub fn new(config: &PdfConfig, work_dir: PathBuf) -> Self {
        Self {
            converter: config.converter.clone(),
            args: config.args.clone(),
            work_dir,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Convert `markdown` and return the PDF bytes
    pub async fn render(&self, markdown: &str) -> Result<Vec<u8>, ReportError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;

        let stem = format!("report_{}", Uuid::new_v4().simple());
        let input = self.work_dir.join(format!("{}.md", stem));
        let output = self.work_dir.join(format!("{}.pdf", stem));

        let result = self.convert(markdown, &input, &output).await;

        for path in [&input, &output] {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to remove report work file");
                }
            }
        }

        result
    }

    async fn convert(&self, markdown: &str, input: &Path, output: &Path) -> Result<Vec<u8>, ReportError> {
        tokio::fs::write(input, markdown).await?;

        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
            })
            .collect();

        debug!(converter = %self.converter, ?args, "Running PDF converter");
        let result = Command::new(&self.converter).args(&args).output().await?;

        if !result.status.success() {
            return Err(ReportError::ConverterFailed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        match tokio::fs::read(output).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ReportError::MissingOutput),
            Err(e) => Err(e.into()),
        }
    }
}
