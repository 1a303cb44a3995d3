//! Workflow-automation notification.
//!
//! The downstream automation flow (mail-out to the couple) is triggered by
//! POSTing a fixed JSON payload to its HTTP trigger URL. The payload keys
//! are the flow's contract and must not change.

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct NotifyPayload<'a> {
    #[serde(rename = "nombre1")]
    partner1_name: &'a str,
    #[serde(rename = "nombre2")]
    partner2_name: &'a str,
    #[serde(rename = "email1")]
    partner1_email: &'a str,
    #[serde(rename = "email2")]
    partner2_email: &'a str,
    #[serde(rename = "videoURI")]
    video_uri: &'a str,
}

/// Client for the external workflow-automation trigger endpoint.
pub struct WorkflowNotifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl WorkflowNotifier {
    pub fn new(webhook_url: &str) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(NotifyError::Http)?;
        Ok(Self {
            http,
            webhook_url: webhook_url.to_string(),
        })
    }

    /// Notify the automation flow that the final video is ready.
    pub async fn notify_completion(
        &self,
        partner1_name: &str,
        partner2_name: &str,
        partner1_email: &str,
        partner2_email: &str,
        video_uri: &str,
    ) -> Result<(), NotifyError> {
        let payload = NotifyPayload {
            partner1_name,
            partner2_name,
            partner1_email,
            partner2_email,
            video_uri,
        };

        let response = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(NotifyError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        tracing::info!(video_uri, "workflow notification delivered");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Workflow notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Workflow endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_flow_contract_keys() {
        let payload = NotifyPayload {
            partner1_name: "Ana",
            partner2_name: "Luis",
            partner1_email: "ana@example.com",
            partner2_email: "luis@example.com",
            video_uri: "https://cdn.example.com/x/final.mp4",
        };
        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(json["nombre1"], "Ana");
        assert_eq!(json["nombre2"], "Luis");
        assert_eq!(json["email1"], "ana@example.com");
        assert_eq!(json["videoURI"], "https://cdn.example.com/x/final.mp4");
    }
}
