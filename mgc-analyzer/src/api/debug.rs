//! POST /debug
//!
//! Same upload contract as `/analyze`, but returns every extracted feature and
//! the full score table behind the decision.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use super::upload::stage_upload;
use crate::classifier::{Confidence, Genre, GenreScores};
use crate::error::{ApiError, ApiResult};
use crate::features::MFCC_COUNT;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub features: DebugFeatures,
    pub genre_scores: GenreScores,
    pub best_genre: Genre,
    pub max_score: i32,
    pub confidence: Confidence,
}

#[derive(Debug, Serialize)]
pub struct DebugFeatures {
    pub tempo: f64,
    pub spectral_centroid: f64,
    pub harmonic_ratio: f64,
    pub zero_crossing_rate: f64,
    pub rms_energy: f64,
    pub spectral_rolloff: f64,
    pub spectral_bandwidth: f64,
    pub mfcc_mean: [f64; MFCC_COUNT],
}

/// POST /debug
pub async fn debug_analysis(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<DebugResponse>> {
    let upload = stage_upload(&state.config, multipart, ApiError::DebugFailed).await?;

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
                "Debug analysis failed"
            );
            ApiError::from_debug_analysis(e)
        })?;

    let features = analysis.features;
    let result = analysis.classification;

    Ok(Json(DebugResponse {
        features: DebugFeatures {
            tempo: features.tempo,
            spectral_centroid: features.spectral_centroid_mean,
            harmonic_ratio: features.harmonic_ratio,
            zero_crossing_rate: features.zero_crossing_rate_mean,
            rms_energy: features.rms_mean,
            spectral_rolloff: features.spectral_rolloff_mean,
            spectral_bandwidth: features.spectral_bandwidth_mean,
            mfcc_mean: features.mfcc_mean,
        },
        genre_scores: result.scores,
        best_genre: result.genre,
        max_score: result.score,
        confidence: result.confidence,
    }))
}

pub fn debug_routes() -> Router<AppState> {
    Router::new().route("/debug", post(debug_analysis))
}
