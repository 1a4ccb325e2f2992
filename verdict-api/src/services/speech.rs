//! Speech-to-text through the language model
//!
//! The model returns free text with `Speaker: utterance` lines; those are
//! split into speaker-attributed entries. Unlike other AI features there is
//! no fallback: failures surface as a classified message.

use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::llm::{prompts, GenerationRequest, InlineAudio, LanguageModel, LlmError};

/// Speaker used when a line carries no label
pub const UNKNOWN_SPEAKER: &str = "unknown";

/// MIME type assumed when the client sends none
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// `Label: text` with an ASCII or full-width colon
static SPEAKER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\p{L}\p{N}_.\- ]{1,32}?)\s*[:：]\s*(.+)$").expect("speaker pattern is valid")
});

/// One speaker-attributed utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerLine {
    pub speaker: String,
    pub text: String,
}

/// Parsed transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub entries: Vec<SpeakerLine>,
    pub full_transcript: String,
}

/// Client-facing transcription failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech recognition is not configured")]
    NotConfigured,
    #[error("The API key is invalid")]
    InvalidKey,
    #[error("The API usage quota has been reached")]
    QuotaExceeded,
    #[error("The audio format is not supported")]
    UnsupportedFormat,
    #[error("Transcription failed")]
    Failed,
}

impl From<&LlmError> for SpeechError {
    fn from(err: &LlmError) -> Self {
        match err {
            LlmError::NotConfigured => SpeechError::NotConfigured,
            LlmError::Status { status, body } => {
                if *status == 401 || *status == 403 || body.contains("API_KEY") {
                    SpeechError::InvalidKey
                } else if *status == 429 || body.to_lowercase().contains("quota") {
                    SpeechError::QuotaExceeded
                } else if body.to_lowercase().contains("format") || body.contains("mime") {
                    SpeechError::UnsupportedFormat
                } else {
                    SpeechError::Failed
                }
            }
            LlmError::Network(_) | LlmError::EmptyResponse => SpeechError::Failed,
        }
    }
}

/// Whether `data` is standard base64
pub fn is_valid_base64(data: &str) -> bool {
    base64::engine::general_purpose::STANDARD.decode(data.trim()).is_ok()
}

/// Split a raw transcript into speaker entries
///
/// Labelled lines open an entry; unlabelled lines extend the previous one
/// or open an `unknown` entry. A transcript with no entries at all becomes
/// a single `unknown` entry.
pub fn parse_speaker_lines(transcript: &str) -> Vec<SpeakerLine> {
    let mut entries: Vec<SpeakerLine> = Vec::new();

    for line in transcript.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = SPEAKER_LINE.captures(line) {
            let speaker = caps[1].trim();
            let text = caps[2].trim();
            if !speaker.is_empty() {
                if !text.is_empty() {
                    entries.push(SpeakerLine {
                        speaker: speaker.to_string(),
                        text: text.to_string(),
                    });
                }
                continue;
            }
        }

        match entries.last_mut() {
            Some(last) => {
                last.text.push(' ');
                last.text.push_str(line);
            }
            None => entries.push(SpeakerLine {
                speaker: UNKNOWN_SPEAKER.to_string(),
                text: line.to_string(),
            }),
        }
    }

    if entries.is_empty() {
        entries.push(SpeakerLine {
            speaker: UNKNOWN_SPEAKER.to_string(),
            text: transcript.trim().to_string(),
        });
    }

    entries
}

/// Transcribe base64 `audio` with the model
pub async fn transcribe(
    llm: Option<&dyn LanguageModel>,
    audio: &str,
    mime_type: Option<&str>,
) -> Result<Transcription, SpeechError> {
    let llm = llm.ok_or(SpeechError::NotConfigured)?;

    let mime_type = mime_type
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_AUDIO_MIME);

    let request = GenerationRequest::text(prompts::transcription()).with_audio(InlineAudio {
        data: audio.trim().to_string(),
        mime_type: mime_type.to_string(),
    });

    let transcript = llm.generate(request).await.map_err(|e| {
        error!(error = %e, "Transcription failed");
        SpeechError::from(&e)
    })?;

    Ok(Transcription {
        entries: parse_speaker_lines(&transcript),
        full_transcript: transcript,
    })
}
