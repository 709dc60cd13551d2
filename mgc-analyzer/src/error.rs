//! Error types for mgc-analyzer
//!
//! Every failure reaches the client as `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::AnalysisError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Multipart body has no `audio` field (400)
    #[error("No audio file provided")]
    NoAudioField,

    /// `audio` field present with an empty filename (400)
    #[error("No file selected")]
    NoFileSelected,

    /// Filename extension not on the allow-list (400)
    #[error("Invalid file type. Only MP3, WAV, M4A, FLAC allowed")]
    InvalidFileType,

    /// Upload could not be decoded or analysed (500)
    #[error("Failed to extract audio features")]
    ExtractionFailed,

    /// Any other failure on the analyze endpoint (500)
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Any other failure on the debug endpoint (500)
    #[error("Debug analysis failed: {0}")]
    DebugFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoAudioField | ApiError::NoFileSelected | ApiError::InvalidFileType => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ExtractionFailed | ApiError::AnalysisFailed(_) | ApiError::DebugFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Map an analysis failure on `/analyze`
    ///
    /// Decode and extraction errors collapse to the generic extraction message;
    /// timeouts and worker failures keep their detail.
    pub fn from_analysis(err: AnalysisError) -> Self {
        if err.is_extraction_failure() {
            ApiError::ExtractionFailed
        } else {
            ApiError::AnalysisFailed(err.to_string())
        }
    }

    /// Map an analysis failure on `/debug`
    pub fn from_debug_analysis(err: AnalysisError) -> Self {
        if err.is_extraction_failure() {
            ApiError::ExtractionFailed
        } else {
            ApiError::DebugFailed(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
