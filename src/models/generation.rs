use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to generate the animated wedding welcome-sign clip.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignVideoRequest {
    /// Record id grouping all artifacts of one couple's session.
    #[garde(length(min = 1, max = 100))]
    pub id: String,

    #[garde(length(min = 1, max = 100))]
    pub partner1_name: String,

    #[garde(length(min = 1, max = 100))]
    pub partner2_name: String,

    /// Public URL of the rendered sign image to animate.
    #[garde(url)]
    pub image_url: String,

    /// When set, skip the provider and return the canned demo clip.
    #[garde(skip)]
    #[serde(default)]
    pub demo: bool,
}

/// Request to generate the animated couple-portrait clip.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CoupleVideoRequest {
    #[garde(length(min = 1, max = 100))]
    pub id: String,

    #[garde(url)]
    pub image_url: String,

    #[garde(skip)]
    #[serde(default)]
    pub demo: bool,
}

/// Response after a clip has been generated and re-uploaded to blob storage.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClipResponse {
    pub status: String,
    pub video_url: String,
}

/// Request to compose the final video from the two generated clips.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FinalVideoRequest {
    #[garde(length(min = 1, max = 100))]
    pub id: String,

    #[garde(url)]
    pub sign_video: String,

    #[garde(url)]
    pub couple_video: String,

    #[garde(length(min = 1, max = 100))]
    pub partner1_name: String,

    #[garde(length(min = 1, max = 100))]
    pub partner2_name: String,

    #[garde(email)]
    pub partner1_email: String,

    #[garde(email)]
    pub partner2_email: String,
}

/// Response after submitting final-video composition to the job queue.
#[derive(Debug, Serialize, Deserialize)]
pub struct FinalVideoSubmitResponse {
    pub job_id: Uuid,
    pub status: String,
}

/// Response after uploading a source image.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadImageResponse {
    pub status: String,
    pub image_url: String,
}
