//! Configuration loading and resolution
//!
//! Bootstrap settings come from a TOML file; everything has a compiled
//! default so a missing file never stops startup.
//!
//! # Resolution Priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::scoring::KeywordTable;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "VERDICT_DATA_DIR";

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable pointing at the config file
pub const CONFIG_PATH_ENV: &str = "VERDICT_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Read once at startup; restart to pick up changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub pdf: PdfConfig,
    /// Keyword table used by the fallback judge
    pub scoring: KeywordTable,
    pub logging: LoggingConfig,
    /// Fixed seed for template choice and placeholder confidence
    pub random_seed: Option<u64>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5730,
        }
    }
}

/// Which repository implementation backs the topic store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `topics.json` index plus one JSON document per topic
    #[default]
    Json,
    /// Single SQLite database in the data directory
    Sqlite,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
    pub backend: StorageBackend,
}

/// Hosted language model settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; without one every AI feature uses its fallback
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}

/// External Markdown-to-PDF converter
///
/// `{input}` and `{output}` in `args` are replaced with the file paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub converter: String,
    pub args: Vec<String>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            converter: "pandoc".to_string(),
            args: vec![
                "{input}".to_string(),
                "-o".to_string(),
                "{output}".to_string(),
            ],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file, failing on unreadable or invalid TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load `path` (or the default location); a missing file means defaults
    ///
    /// Returns the file actually read, or `None` when defaults were used.
    /// Nothing is logged here because this runs before tracing is set up.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => return Ok((Self::default(), None)),
        };

        if !path.exists() {
            return Ok((Self::default(), None));
        }

        let config = Self::load(&path)?;
        Ok((config, Some(path)))
    }
}

/// `<config_dir>/verdict/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("verdict").join("config.toml"))
}

/// OS-dependent default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("verdict"))
        .unwrap_or_else(|| PathBuf::from("./verdict_data"))
}

/// Resolve the data directory: CLI → `VERDICT_DATA_DIR` → TOML → default
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.storage.data_dir {
        return path.clone();
    }

    default_data_dir()
}

/// Resolve the API key: CLI → `GEMINI_API_KEY` → TOML
///
/// Blank keys are treated as absent.
pub fn resolve_api_key(cli_arg: Option<&str>, config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV).ok();

    [cli_arg.map(str::to_string), env_key, config.llm.api_key.clone()]
        .into_iter()
        .flatten()
        .find(|key| is_valid_key(key))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
