//! Runway generative-video client.
//!
//! Thin wrapper over the Runway REST API: create an `image_to_video` task
//! for a public image URL, poll the task until it settles, return the
//! resulting clip URL. Generation semantics are entirely provider-side.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API version header required by Runway.
const API_VERSION: &str = "2024-11-06";

/// Interval between task status polls.
const TASK_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Overall deadline for one generation task.
const TASK_DEADLINE: Duration = Duration::from_secs(600);

/// Prompt animating the wedding welcome sign at the venue entrance.
const SIGN_PROMPT: &str = "At the venue entrance, a wedding welcome sign stands adorned with flowers and satin ribbons that gently sway in the breeze; petals and confetti quiver faintly. The camera performs a subtle, steady push-in with a soft zoom, introducing mild parallax and natural micro-movement. Ambient elements flutter: fairy lights flicker, dust motes drift in warm daylight. Cinematic live-action, elegant and romantic, golden hour glow, shallow depth of field with creamy bokeh, crisp yet delicate textures, tasteful filmic contrast, 24fps.";

/// Prompt animating the couple portrait.
const COUPLE_PROMPT: &str = "Subtle and affectionate movement between the subjects, maintaining the direct gaze towards the camera. They must share a gesture of affection without close physical contact, such as a slight head tilt, an exchange of glances, or a soft, warm smile. Strict preservation of the facial and bodily appearance of the people from the original image. Medium shot, soft lighting, cinematic.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest<'a> {
    model: &'a str,
    prompt_image: &'a str,
    prompt_text: &'a str,
    ratio: &'a str,
    duration: u32,
}

#[derive(Deserialize)]
struct CreateTaskResponse {
    id: String,
}

#[derive(Deserialize)]
struct TaskResponse {
    status: String,
    #[serde(default)]
    output: Vec<String>,
    #[serde(default)]
    failure: Option<String>,
}

/// Client for the Runway image-to-video API.
pub struct RunwayClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RunwayClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, RunwayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(RunwayError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Generate the animated welcome-sign clip from a rendered sign image.
    pub async fn create_sign_video(&self, image_url: &str) -> Result<String, RunwayError> {
        self.image_to_video(image_url, SIGN_PROMPT).await
    }

    /// Generate the animated couple clip from a couple portrait.
    pub async fn create_couple_video(&self, image_url: &str) -> Result<String, RunwayError> {
        self.image_to_video(image_url, COUPLE_PROMPT).await
    }

    /// Create an image-to-video task and poll it to completion.
    ///
    /// Returns the URL of the generated clip (a signed, time-limited URL
    /// on the provider's CDN).
    async fn image_to_video(&self, image_url: &str, prompt: &str) -> Result<String, RunwayError> {
        let task_id = self.create_task(image_url, prompt).await?;
        tracing::info!(task_id = %task_id, "runway task created");

        let deadline = tokio::time::Instant::now() + TASK_DEADLINE;
        loop {
            tokio::time::sleep(TASK_POLL_INTERVAL).await;
            if tokio::time::Instant::now() >= deadline {
                return Err(RunwayError::Timeout(task_id));
            }

            let task = self.get_task(&task_id).await?;
            if task.status == "SUCCEEDED" {
                tracing::info!(task_id = %task_id, "runway task succeeded");
                return task
                    .output
                    .into_iter()
                    .next()
                    .ok_or(RunwayError::EmptyOutput(task_id));
            } else if task.status == "FAILED" || task.status == "CANCELLED" {
                return Err(RunwayError::TaskFailed {
                    task_id,
                    reason: task.failure.unwrap_or(task.status),
                });
            } else {
                // PENDING / RUNNING / THROTTLED: keep polling.
                tracing::debug!(task_id = %task_id, status = %task.status, "runway task pending");
            }
        }
    }

    async fn create_task(&self, image_url: &str, prompt: &str) -> Result<String, RunwayError> {
        let body = CreateTaskRequest {
            model: "gen4_turbo",
            prompt_image: image_url,
            prompt_text: prompt,
            ratio: "1280:720",
            duration: 5,
        };

        let response = self
            .http
            .post(format!("{}/v1/image_to_video", self.base_url))
            .bearer_auth(&self.api_key)
            .header("X-Runway-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(RunwayError::Http)?;

        if !response.status().is_success() {
            return Err(RunwayError::Api {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let created: CreateTaskResponse = response.json().await.map_err(RunwayError::Http)?;
        Ok(created.id)
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskResponse, RunwayError> {
        let response = self
            .http
            .get(format!("{}/v1/tasks/{}", self.base_url, task_id))
            .bearer_auth(&self.api_key)
            .header("X-Runway-Version", API_VERSION)
            .send()
            .await
            .map_err(RunwayError::Http)?;

        if !response.status().is_success() {
            return Err(RunwayError::Api {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response.json().await.map_err(RunwayError::Http)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunwayError {
    #[error("HTTP request to Runway failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Runway API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Runway task {task_id} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    #[error("Runway task {0} did not settle before the deadline")]
    Timeout(String),

    #[error("Runway task {0} succeeded with no output")]
    EmptyOutput(String),
}
