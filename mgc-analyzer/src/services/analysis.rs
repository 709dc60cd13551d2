//! Decode → extract → classify for one staged upload
//!
//! The pipeline is CPU-bound, so the async entry point moves it onto the
//! blocking pool and bounds it with the configured timeout.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::classifier::{classify, ClassificationResult};
use crate::config::AnalyzerConfig;
use crate::features::{extract_features, FeatureError, FeatureVector, ANALYSIS_SAMPLE_RATE};
use crate::utils::{decode_audio_file, DecodeError};

/// Analysis pipeline errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Audio decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Feature extraction failed: {0}")]
    Features(#[from] FeatureError),

    #[error("Analysis timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Analysis worker failed: {0}")]
    Join(String),
}

impl AnalysisError {
    /// True when the upload itself could not be turned into features
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, AnalysisError::Decode(_) | AnalysisError::Features(_))
    }
}

/// Features and classification for one clip
#[derive(Debug, Clone, PartialEq)]
pub struct GenreAnalysis {
    pub features: FeatureVector,
    pub classification: ClassificationResult,
}

/// Genre analysis service
#[derive(Debug, Clone)]
pub struct GenreAnalyzer {
    max_duration: Duration,
    timeout: Duration,
}

impl GenreAnalyzer {
    pub fn new(max_duration: Duration, timeout: Duration) -> Self {
        Self {
            max_duration,
            timeout,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.max_duration, config.analysis_timeout)
    }

    /// Run the full pipeline on the calling thread
    pub fn analyze_file(&self, file_path: &Path) -> Result<GenreAnalysis, AnalysisError> {
        let started = Instant::now();

        let audio = decode_audio_file(file_path, self.max_duration, ANALYSIS_SAMPLE_RATE)?;
        tracing::debug!(
            path = %file_path.display(),
            samples = audio.samples.len(),
            sample_rate = audio.sample_rate,
            native_sample_rate = audio.native_sample_rate,
            channels = audio.channels,
            "Decoded upload"
        );

        let features = extract_features(&audio.samples, audio.sample_rate)?;
        let classification = classify(&features);

        tracing::info!(
            path = %file_path.display(),
            genre = %classification.genre,
            confidence = %classification.confidence,
            score = classification.score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(GenreAnalysis {
            features,
            classification,
        })
    }

    /// Run the pipeline on the blocking pool, bounded by the timeout
    ///
    /// On timeout the worker is left to finish in the background; its result
    /// is discarded.
    pub async fn analyze(&self, file_path: PathBuf) -> Result<GenreAnalysis, AnalysisError> {
        let analyzer = self.clone();
        let task = tokio::task::spawn_blocking(move || analyzer.analyze_file(&file_path));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AnalysisError::Join(join_error.to_string())),
            Err(_) => Err(AnalysisError::TimedOut(self.timeout)),
        }
    }
}
