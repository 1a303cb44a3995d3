use std::sync::Arc;
use uuid::Uuid;

use wedding_video_gen::config::AppConfig;
use wedding_video_gen::models::job::JobStatus;
use wedding_video_gen::services::{
    compose::VideoComposer, download::Downloader, queue::JobQueue, storage::BlobStorage,
};

/// Integration test: storage and download round-trip
///
/// Verifies against live services:
/// 1. Blob storage (upload/download/delete, public URL shape)
/// 2. Streaming download of the stored object over its public URL
///
/// Note: this requires reachable blob storage configured via environment
/// variables.
#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_storage_roundtrip() {
    let config = AppConfig::from_env().expect("Failed to load config");

    let storage = BlobStorage::new(
        &config.blob_bucket,
        &config.blob_endpoint,
        &config.blob_access_key,
        &config.blob_secret_key,
        &config.blob_public_base_url,
    )
    .expect("Failed to initialize blob storage");

    let folder = format!("test-{}", Uuid::new_v4());
    let payload = b"fake clip bytes for testing";

    // 1. Upload
    let public_url = storage
        .upload_bytes(&folder, "clip.mp4", payload, "video/mp4")
        .await
        .expect("upload failed");
    assert!(public_url.starts_with(&config.blob_public_base_url));
    assert!(public_url.ends_with(&format!("{}/clip.mp4", folder)));

    // 2. Download by key
    let key = format!("{}/clip.mp4", folder);
    let downloaded = storage.download(&key).await.expect("download failed");
    assert_eq!(downloaded, payload);

    // 3. Streaming download over the public URL
    let downloader = Downloader::new().expect("Failed to initialize downloader");
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let local = downloader
        .download_to_dir(&public_url, temp_dir.path())
        .await
        .expect("public download failed");
    let bytes = tokio::fs::read(&local).await.expect("read downloaded file");
    assert_eq!(bytes, payload);

    // Cleanup
    storage.delete(&key).await.expect("delete failed");
}

/// Integration test: full composition job through the queue
///
/// Requires ffmpeg on PATH plus the configured overlay and audio assets,
/// and two local input clips named in SIGN_CLIP / COUPLE_CLIP.
#[tokio::test]
#[ignore]
async fn test_composition_job() {
    let sign_clip = std::env::var("SIGN_CLIP").expect("SIGN_CLIP not set");
    let couple_clip = std::env::var("COUPLE_CLIP").expect("COUPLE_CLIP not set");
    let config = AppConfig::from_env().expect("Failed to load config");

    let temp_dir = tempfile::tempdir().expect("temp dir");
    let composer = Arc::new(VideoComposer::new(
        temp_dir.path(),
        std::path::Path::new(&config.overlay_path),
        std::path::Path::new(&config.audio_path),
    ));

    let queue = Arc::new(JobQueue::new());
    queue.start(1);

    let job_id = queue
        .submit(async move {
            let out = composer
                .compose_final(
                    "integration",
                    std::path::Path::new(&sign_clip),
                    std::path::Path::new(&couple_clip),
                )
                .await?;
            Ok(serde_json::json!({ "output": out.display().to_string() }))
        })
        .await
        .expect("submit composition job");

    let mut last = queue.status(job_id).await;
    for _ in 0..600 {
        last = queue.status(job_id).await;
        if matches!(last.status, JobStatus::Done | JobStatus::Error) {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }

    assert_eq!(last.status, JobStatus::Done, "error: {:?}", last.error);
    let output = last.result.expect("result present")["output"]
        .as_str()
        .expect("output path")
        .to_string();
    let metadata = tokio::fs::metadata(&output).await.expect("output exists");
    assert!(metadata.len() > 0);
}

/// Job status serializes with the wire-facing snake_case names.
#[test]
fn test_job_status_wire_format() {
    assert_eq!(
        serde_json::to_value(JobStatus::NotFound).expect("serialize"),
        serde_json::json!("not_found")
    );
    assert_eq!(
        serde_json::to_value(JobStatus::Queued).expect("serialize"),
        serde_json::json!("queued")
    );
    assert_eq!(JobStatus::Running.to_string(), "running");
}

/// The not-found sentinel carries neither result nor error.
#[test]
fn test_not_found_sentinel_shape() {
    let snapshot = wedding_video_gen::models::job::JobSnapshot::not_found();
    assert_eq!(snapshot.status, JobStatus::NotFound);
    assert!(snapshot.result.is_none());
    assert!(snapshot.error.is_none());
}
