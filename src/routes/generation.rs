//! Clip generation endpoints.
//!
//! Each endpoint resolves a clip URL (provider-generated, or the canned
//! demo clip), then re-hosts the clip in our own blob storage so the
//! frontend never depends on the provider's short-lived signed URLs.

use axum::extract::State;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::generation::{ClipResponse, CoupleVideoRequest, SignVideoRequest};
use crate::routes::error::ApiError;

/// POST /api/create_sign_video — animate the wedding welcome sign.
pub async fn create_sign_video(
    State(state): State<AppState>,
    Json(req): Json<SignVideoRequest>,
) -> Result<Json<ClipResponse>, ApiError> {
    req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;

    tracing::info!(
        id = %req.id,
        partner1 = %req.partner1_name,
        partner2 = %req.partner2_name,
        demo = req.demo,
        "sign video requested"
    );

    let clip_url = if req.demo {
        state.config.demo_sign_video_url.clone().ok_or_else(|| {
            ApiError::BadRequest("demo requested but no demo sign clip is configured".to_string())
        })?
    } else {
        state.runway.create_sign_video(&req.image_url).await?
    };

    let filename = format!("vid_sign_{}.mp4", req.id);
    let video_url = fetch_and_store_clip(&state, &req.id, &filename, &clip_url).await?;

    Ok(Json(ClipResponse {
        status: "success".to_string(),
        video_url,
    }))
}

/// POST /api/create_couple_video — animate the couple portrait.
pub async fn create_couple_video(
    State(state): State<AppState>,
    Json(req): Json<CoupleVideoRequest>,
) -> Result<Json<ClipResponse>, ApiError> {
    req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;

    tracing::info!(id = %req.id, demo = req.demo, "couple video requested");

    let clip_url = if req.demo {
        state.config.demo_couple_video_url.clone().ok_or_else(|| {
            ApiError::BadRequest("demo requested but no demo couple clip is configured".to_string())
        })?
    } else {
        state.runway.create_couple_video(&req.image_url).await?
    };

    let filename = format!("vid_couple_{}.mp4", req.id);
    let video_url = fetch_and_store_clip(&state, &req.id, &filename, &clip_url).await?;

    Ok(Json(ClipResponse {
        status: "success".to_string(),
        video_url,
    }))
}

/// Download a clip URL into the temp dir, re-upload it under the record's
/// folder, and clean the local copy up.
async fn fetch_and_store_clip(
    state: &AppState,
    folder: &str,
    filename: &str,
    clip_url: &str,
) -> Result<String, ApiError> {
    let temp_dir = state.composer.temp_dir();
    let local = state.downloader.download_to_dir(clip_url, temp_dir).await?;

    let upload = state
        .storage
        .upload_file(folder, filename, &local, "video/mp4")
        .await;

    if let Err(e) = tokio::fs::remove_file(&local).await {
        tracing::warn!(path = %local.display(), error = %e, "failed to remove temp clip");
    }

    let video_url = upload?;
    tracing::info!(folder, filename, video_url = %video_url, "clip stored");
    Ok(video_url)
}
