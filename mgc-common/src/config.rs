//! Configuration loading and config-file resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Steps 1 and 2 are handled by the binaries' argument parsers; this module
//! owns the TOML model, the file lookup and the compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MGC_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; anything missing falls back to [`CompiledDefaults`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Listen address
    pub bind: Option<String>,

    /// HTTP server port
    pub port: Option<u16>,

    /// Staging directory for uploaded files
    pub upload_dir: Option<PathBuf>,

    /// Analysis limits
    pub analysis: AnalysisConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// `[analysis]` table
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Seconds of audio analysed from the start of the file
    pub max_duration_secs: Option<f64>,
    /// Upper bound on decode + extraction time per request
    pub timeout_secs: Option<u64>,
    /// Request body limit in bytes
    pub max_upload_bytes: Option<usize>,
    /// Accepted upload extensions (matched case-insensitively)
    pub allowed_extensions: Option<Vec<String>>,
}

/// `[logging]` table
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompiledDefaults::LOG_LEVEL.to_string(),
        }
    }
}

/// Built-in fallbacks used when neither CLI, ENV nor TOML provide a value
pub struct CompiledDefaults;

impl CompiledDefaults {
    pub const BIND: &'static str = "0.0.0.0";
    pub const PORT: u16 = 5001;
    pub const UPLOAD_DIR: &'static str = "temp_uploads";
    pub const MAX_DURATION_SECS: f64 = 15.0;
    /// Upper bound accepted for `analysis.max_duration_secs` (one day)
    pub const MAX_DURATION_LIMIT_SECS: f64 = 86_400.0;
    pub const TIMEOUT_SECS: u64 = 60;
    pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
    pub const ALLOWED_EXTENSIONS: [&'static str; 4] = ["mp3", "wav", "m4a", "flac"];
    pub const LOG_LEVEL: &'static str = "info";
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if let Some(secs) = self.analysis.max_duration_secs {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(Error::Config(format!(
                    "analysis.max_duration_secs must be positive, got {}",
                    secs
                )));
            }
            if secs > CompiledDefaults::MAX_DURATION_LIMIT_SECS {
                return Err(Error::Config(format!(
                    "analysis.max_duration_secs must be at most {}, got {}",
                    CompiledDefaults::MAX_DURATION_LIMIT_SECS,
                    secs
                )));
            }
        }
        if self.analysis.timeout_secs == Some(0) {
            return Err(Error::Config(
                "analysis.timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(exts) = &self.analysis.allowed_extensions {
            if exts.iter().all(|e| e.trim().is_empty()) {
                return Err(Error::Config(
                    "analysis.allowed_extensions must name at least one extension".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No file found; compiled defaults
    Defaults,
}

/// Parsed configuration plus its origin
///
/// Loading happens before the tracing subscriber exists, so the loader only
/// records the outcome and [`LoadedConfig::log_source`] reports it later.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// Log which file was used, or warn that defaults are in effect
    pub fn log_source(&self) {
        match &self.source {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Defaults => {
                warn!("No configuration file found, using built-in defaults")
            }
        }
    }
}

/// Load bootstrap configuration
///
/// An explicitly requested file (CLI or `MGC_CONFIG`) must exist. When no file
/// was requested the platform locations are tried, and a missing file means
/// compiled defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => locate_config_file(),
    };

    match path {
        Some(path) => Ok(LoadedConfig {
            config: TomlConfig::load(&path)?,
            source: ConfigSource::File(path),
        }),
        None => Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        }),
    }
}

/// Search the platform config locations for `mgc-analyzer.toml`
///
/// Linux: `~/.config/mgc/mgc-analyzer.toml`, then `/etc/mgc/mgc-analyzer.toml`.
/// Elsewhere: the user config directory only.
pub fn locate_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mgc").join("mgc-analyzer.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mgc/mgc-analyzer.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Pick the first available value: CLI/ENV, then TOML, then the default
pub fn resolve<T>(cli_or_env: Option<T>, toml: Option<T>, default: T) -> T {
    cli_or_env.or(toml).unwrap_or(default)
}
