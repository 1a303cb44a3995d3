//! Final video composition endpoint and job polling.
//!
//! Composition takes minutes (two downloads, an ffmpeg run, an upload and
//! the workflow notification), so the request only submits a work item to
//! the background queue and hands back a job id to poll.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use std::path::Path as FsPath;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::generation::{FinalVideoRequest, FinalVideoSubmitResponse};
use crate::models::job::JobStatusResponse;
use crate::routes::error::ApiError;
use crate::services::queue::WorkOutput;

/// POST /api/generate_final_video — queue composition of the deliverable.
pub async fn generate_final_video(
    State(state): State<AppState>,
    Json(req): Json<FinalVideoRequest>,
) -> Result<(StatusCode, Json<FinalVideoSubmitResponse>), ApiError> {
    req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;

    tracing::info!(
        id = %req.id,
        sign_video = %req.sign_video,
        couple_video = %req.couple_video,
        "final video requested"
    );

    let job_id = state
        .queue
        .submit(compose_and_deliver(state.clone(), req))
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(FinalVideoSubmitResponse {
            job_id,
            status: "queued".to_string(),
        }),
    ))
}

/// GET /api/jobs/{job_id} — poll a background job.
///
/// Unknown ids answer 200 with the `not_found` sentinel status; lookup
/// never fails.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Json<JobStatusResponse> {
    let snapshot = state.queue.status(job_id).await;
    Json(JobStatusResponse {
        job_id,
        status: snapshot.status,
        result: snapshot.result,
        error: snapshot.error,
    })
}

/// The queued work item: download both clips, compose, upload, notify.
async fn compose_and_deliver(state: AppState, req: FinalVideoRequest) -> WorkOutput {
    let temp_dir = state.composer.temp_dir().to_path_buf();

    let sign_local = state
        .downloader
        .download_to_dir(&req.sign_video, &temp_dir)
        .await?;
    let couple_local = match state
        .downloader
        .download_to_dir(&req.couple_video, &temp_dir)
        .await
    {
        Ok(path) => path,
        Err(e) => {
            remove_quietly(&sign_local).await;
            return Err(e.into());
        }
    };

    let outcome = compose_upload_notify(&state, &req, &sign_local, &couple_local).await;

    remove_quietly(&sign_local).await;
    remove_quietly(&couple_local).await;
    outcome
}

async fn compose_upload_notify(
    state: &AppState,
    req: &FinalVideoRequest,
    sign_local: &FsPath,
    couple_local: &FsPath,
) -> WorkOutput {
    let composed = state
        .composer
        .compose_final(&req.id, sign_local, couple_local)
        .await?;

    let filename = format!("final_{}.mp4", req.id);
    let upload = state
        .storage
        .upload_file(&req.id, &filename, &composed, "video/mp4")
        .await;

    remove_quietly(&composed).await;
    let video_url = upload?;

    state
        .notifier
        .notify_completion(
            &req.partner1_name,
            &req.partner2_name,
            &req.partner1_email,
            &req.partner2_email,
            &video_url,
        )
        .await?;

    tracing::info!(id = %req.id, video_url = %video_url, "final video delivered");
    Ok(serde_json::json!({
        "status": "success",
        "video_url": video_url,
    }))
}

async fn remove_quietly(path: &FsPath) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file");
    }
}
