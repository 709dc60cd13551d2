//! POST /analyze

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use super::upload::stage_upload;
use crate::classifier::{Confidence, Genre, MODEL_NAME};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Successful classification
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub genre: Genre,
    pub confidence: Confidence,
    pub model: &'static str,
    pub features: FeatureSummary,
}

/// The three headline features echoed back to the caller
#[derive(Debug, Serialize)]
pub struct FeatureSummary {
    pub tempo: f64,
    pub spectral_centroid: f64,
    pub harmonic_ratio: f64,
}

/// POST /analyze
///
/// Classify the `audio` file of a multipart upload.
pub async fn analyze_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let upload = stage_upload(&state.config, multipart, ApiError::AnalysisFailed).await?;

    let analysis = state
        .analyzer
        .analyze(upload.path().to_path_buf())
        .await
        .map_err(|e| {
            tracing::warn!(
                request_id = %upload.request_id,
                filename = %upload.original_name,
                size_bytes = upload.size_bytes,
                error = %e,
                "Analysis failed"
            );
            ApiError::from_analysis(e)
        })?;

    // `upload` drops here, deleting the staged file
    Ok(Json(AnalyzeResponse {
        genre: analysis.classification.genre,
        confidence: analysis.classification.confidence,
        model: MODEL_NAME,
        features: FeatureSummary {
            tempo: analysis.features.tempo,
            spectral_centroid: analysis.features.spectral_centroid_mean,
            harmonic_ratio: analysis.features.harmonic_ratio,
        },
    }))
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_audio))
}
