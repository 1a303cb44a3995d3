mod app_state;
mod config;
mod models;
mod routes;
mod services;

use axum::http::HeaderValue;
use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::{
    compose::VideoComposer,
    download::Downloader,
    notify::WorkflowNotifier,
    queue::JobQueue,
    runway::RunwayClient,
    storage::BlobStorage,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing wedding-video-gen server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!(
        "video_jobs_submitted_total",
        "Total background jobs submitted to the queue"
    );
    metrics::describe_counter!(
        "video_jobs_completed_total",
        "Total background jobs that completed successfully"
    );
    metrics::describe_counter!(
        "video_jobs_failed_total",
        "Total background jobs that ended in error"
    );
    metrics::describe_gauge!(
        "job_queue_depth",
        "Jobs submitted but not yet fully processed"
    );
    metrics::describe_histogram!(
        "job_processing_seconds",
        "Time a worker spent executing one job"
    );
    metrics::describe_histogram!(
        "job_queue_wait_seconds",
        "Time a job spent queued before a worker picked it up"
    );
    metrics::describe_histogram!(
        "composition_seconds",
        "Time spent composing a final video with ffmpeg"
    );

    // Temp dir for downloaded clips and composition output
    tokio::fs::create_dir_all(&config.temp_dir)
        .await
        .expect("Failed to create temp directory");

    // Initialize blob storage client
    tracing::info!("Initializing blob storage client");
    let storage = BlobStorage::new(
        &config.blob_bucket,
        &config.blob_endpoint,
        &config.blob_access_key,
        &config.blob_secret_key,
        &config.blob_public_base_url,
    )
    .expect("Failed to initialize blob storage client");

    // Initialize Runway client
    tracing::info!("Initializing Runway client");
    let runway = RunwayClient::new(&config.runway_api_key, &config.runway_base_url)
        .expect("Failed to initialize Runway client");

    let downloader = Downloader::new().expect("Failed to initialize downloader");

    let composer = VideoComposer::new(
        std::path::Path::new(&config.temp_dir),
        std::path::Path::new(&config.overlay_path),
        std::path::Path::new(&config.audio_path),
    );

    let notifier = WorkflowNotifier::new(&config.workflow_webhook_url)
        .expect("Failed to initialize workflow notifier");

    // CORS from configured origins
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let worker_count = config.worker_count;
    let bind_addr = config.bind_addr.clone();

    // Create shared application state and start the queue workers
    let state = AppState::new(
        config,
        JobQueue::new(),
        storage,
        runway,
        downloader,
        composer,
        notifier,
    );
    state.queue.start(worker_count);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/upload_image", post(routes::media::upload_image))
        .route(
            "/api/create_sign_video",
            post(routes::generation::create_sign_video),
        )
        .route(
            "/api/create_couple_video",
            post(routes::generation::create_couple_video),
        )
        .route(
            "/api/generate_final_video",
            post(routes::final_video::generate_final_video),
        )
        .route("/api/jobs/{job_id}", get(routes::final_video::get_job_status))
        .with_state(state.clone())
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(25 * 1024 * 1024)); // 25 MB upload limit

    tracing::info!("Starting wedding-video-gen on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", bind_addr);

    let queue = Arc::clone(&state.queue);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            queue.shutdown();
        })
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
    }
    tracing::info!("shutdown signal received");
}
