//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the service warns and starts with
//! defaults. A TOML file that exists but does not parse is a [`Error::Config`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the database path
pub const ENV_DATABASE: &str = "PHYLO_DATABASE";

/// Environment variable overriding the listen address
pub const ENV_BIND: &str = "PHYLO_BIND";

/// Environment variable carrying the semantic matcher API key
pub const ENV_MATCHER_API_KEY: &str = "PHYLO_MATCHER_API_KEY";

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:5780";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Listen address, e.g. "127.0.0.1:5780"
    #[serde(default)]
    pub bind: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Resolution tuning
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Semantic matcher (Phase 4) client settings
    #[serde(default)]
    pub matcher: MatcherConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Resolution tuning knobs
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound for any single store or matcher call
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Names per relational query (store query-size limit)
    #[serde(default = "default_fetch_chunk_size")]
    pub fetch_chunk_size: usize,

    /// Names per streamed batch
    #[serde(default = "default_stream_chunk_size")]
    pub stream_chunk_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            fetch_chunk_size: default_fetch_chunk_size(),
            stream_chunk_size: default_stream_chunk_size(),
        }
    }
}

/// Semantic matcher client settings
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    /// API key; Phase 4 is unavailable without one
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_matcher_base_url")]
    pub base_url: String,

    #[serde(default = "default_matcher_model")]
    pub model: String,

    #[serde(default = "default_matcher_max_tokens")]
    pub max_tokens: u32,

    /// Total calls for a rate-limited request, the first included (1 + 3 retries)
    #[serde(default = "default_matcher_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before retry N is `backoff_base_ms * N`
    #[serde(default = "default_matcher_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_matcher_base_url(),
            model: default_matcher_model(),
            max_tokens: default_matcher_max_tokens(),
            max_attempts: default_matcher_max_attempts(),
            backoff_base_ms: default_matcher_backoff_base_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

fn default_fetch_chunk_size() -> usize {
    100
}

fn default_stream_chunk_size() -> usize {
    50
}

fn default_matcher_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_matcher_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_matcher_max_tokens() -> u32 {
    1024
}

fn default_matcher_max_attempts() -> u32 {
    4
}

fn default_matcher_backoff_base_ms() -> u64 {
    2000
}

impl TomlConfig {
    /// Load configuration from `path`
    ///
    /// Missing file → warning + defaults. Unreadable or malformed file → error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file not found at {}, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the explicit path if given, else from the platform default location
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match ConfigSource::locate(explicit) {
            ConfigSource::File(path) | ConfigSource::Missing(path) => Self::load(&path),
            ConfigSource::Unavailable => {
                warn!("Could not determine config directory, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Database path: CLI → ENV → TOML → compiled default
    pub fn resolve_database_path(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(ENV_DATABASE) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        if let Some(path) = &self.database_path {
            return path.clone();
        }
        default_database_path()
    }

    /// Listen address: CLI → ENV → TOML → compiled default
    pub fn resolve_bind(&self, cli_arg: Option<&str>) -> String {
        if let Some(bind) = cli_arg {
            return bind.to_string();
        }
        if let Ok(bind) = std::env::var(ENV_BIND) {
            if !bind.trim().is_empty() {
                return bind;
            }
        }
        self.bind
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    /// Matcher API key: ENV → TOML
    ///
    /// Blank values count as absent.
    pub fn resolve_matcher_api_key(&self) -> Option<String> {
        let env_key = std::env::var(ENV_MATCHER_API_KEY).ok();
        env_key
            .into_iter()
            .chain(self.matcher.api_key.clone())
            .find(|key| !key.trim().is_empty())
    }
}

/// Where configuration came from
///
/// The binary loads config before tracing is initialised, so it reports the
/// source again through this once the subscriber exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Config file present at this path
    File(PathBuf),
    /// Nothing at this path, built-in defaults used
    Missing(PathBuf),
    /// No explicit path and no platform config directory
    Unavailable,
}

impl ConfigSource {
    /// Explicit path if given, else the platform default location
    pub fn locate(explicit: Option<&Path>) -> Self {
        match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) if path.exists() => ConfigSource::File(path),
            Some(path) => ConfigSource::Missing(path),
            None => ConfigSource::Unavailable,
        }
    }

    /// Emit the outcome at info (file used) or warn (defaults used)
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => {
                info!("Configuration loaded from {}", path.display())
            }
            ConfigSource::Missing(path) => warn!(
                "Config file not found at {}, using built-in defaults",
                path.display()
            ),
            ConfigSource::Unavailable => {
                warn!("Could not determine config directory, using built-in defaults")
            }
        }
    }
}

/// Platform config file location (`<config_dir>/phylo/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("phylo").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("phylo"))
        .unwrap_or_else(|| PathBuf::from("./phylo_data"))
        .join("phylo.db")
}
