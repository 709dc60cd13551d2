//! Resolved runtime configuration for mgc-analyzer
//!
//! Combines command-line/environment overrides with the TOML file and the
//! compiled defaults. Priority: CLI/ENV → TOML → compiled default.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mgc_common::config::{resolve, CompiledDefaults, TomlConfig};

/// Immutable settings shared by every request handler
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Directory where uploads are staged while they are analysed
    pub upload_dir: PathBuf,
    /// Lowercase file extensions accepted by the upload endpoints
    pub allowed_extensions: BTreeSet<String>,
    /// Only this much audio from the start of each file is analysed
    pub max_duration: Duration,
    /// Upper bound on decode + extraction + scoring for one request
    pub analysis_timeout: Duration,
    /// Request body cap in bytes
    pub max_upload_bytes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::resolve(None, &TomlConfig::default())
    }
}

impl AnalyzerConfig {
    /// Resolve the analyzer settings
    ///
    /// `upload_dir` is the CLI/ENV override, if any.
    pub fn resolve(upload_dir: Option<PathBuf>, toml: &TomlConfig) -> Self {
        let analysis = &toml.analysis;

        let upload_dir = resolve(
            upload_dir,
            toml.upload_dir.clone(),
            PathBuf::from(CompiledDefaults::UPLOAD_DIR),
        );

        let extensions = analysis.allowed_extensions.clone().unwrap_or_else(|| {
            CompiledDefaults::ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect()
        });

        let max_duration_secs = analysis
            .max_duration_secs
            .unwrap_or(CompiledDefaults::MAX_DURATION_SECS);
        let timeout_secs = analysis
            .timeout_secs
            .unwrap_or(CompiledDefaults::TIMEOUT_SECS);

        Self {
            upload_dir,
            allowed_extensions: extensions
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect(),
            max_duration: duration_or_default(max_duration_secs),
            analysis_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes: analysis
                .max_upload_bytes
                .unwrap_or(CompiledDefaults::MAX_UPLOAD_BYTES),
        }
    }

    /// Lowercased extension of `filename` if it is on the allow-list
    ///
    /// Only the text after the last `.` counts, so `archive.wav.txt` is rejected
    /// and a name with no dot never matches.
    pub fn allowed_extension(&self, filename: &str) -> Option<String> {
        let (_, extension) = filename.rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();
        self.allowed_extensions.contains(&extension).then_some(extension)
    }

    pub fn is_allowed(&self, filename: &str) -> bool {
        self.allowed_extension(filename).is_some()
    }

    /// Create the upload directory if it does not exist yet
    pub fn ensure_upload_dir(&self) -> std::io::Result<&Path> {
        std::fs::create_dir_all(&self.upload_dir)?;
        Ok(&self.upload_dir)
    }
}

/// Values the TOML validation would reject (negative, NaN, overflowing) fall
/// back to the compiled default instead of panicking
fn duration_or_default(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .unwrap_or_else(|| Duration::from_secs_f64(CompiledDefaults::MAX_DURATION_SECS))
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}
