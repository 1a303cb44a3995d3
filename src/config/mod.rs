use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Runway API key
    pub runway_api_key: String,

    /// Runway API base URL
    #[serde(default = "default_runway_base_url")]
    pub runway_base_url: String,

    /// Blob storage bucket name
    pub blob_bucket: String,

    /// Blob storage endpoint URL (S3-compatible)
    pub blob_endpoint: String,

    /// Blob storage access key ID
    pub blob_access_key: String,

    /// Blob storage secret access key
    pub blob_secret_key: String,

    /// Public base URL serving the bucket contents
    pub blob_public_base_url: String,

    /// Workflow-automation trigger URL for completion notifications
    pub workflow_webhook_url: String,

    /// Directory for downloaded clips and composition output
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,

    /// Branded overlay clip composited onto the final video
    #[serde(default = "default_overlay_path")]
    pub overlay_path: String,

    /// Licensed audio track for the final video
    #[serde(default = "default_audio_path")]
    pub audio_path: String,

    /// Canned sign clip returned for demo requests
    pub demo_sign_video_url: Option<String>,

    /// Canned couple clip returned for demo requests
    pub demo_couple_video_url: Option<String>,

    /// Worker tasks servicing the background job queue
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Allowed CORS origins (comma-separated in the environment)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_runway_base_url() -> String {
    "https://api.dev.runwayml.com".to_string()
}

fn default_temp_dir() -> String {
    "temp_files".to_string()
}

fn default_overlay_path() -> String {
    "static/overlay/lights-logo.mov".to_string()
}

fn default_audio_path() -> String {
    "static/audio/audio.mp4".to_string()
}

fn default_worker_count() -> usize {
    4
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
