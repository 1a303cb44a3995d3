use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Status of a background job in the in-process queue.
///
/// Transitions are strictly `Queued -> Running -> (Done | Error)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
    /// Lookup sentinel for unknown ids. Never stored on a record.
    NotFound,
}

/// Point-in-time view of a job record. `result` is present only when the
/// status is `Done`, `error` only when it is `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl JobSnapshot {
    pub fn not_found() -> Self {
        Self {
            status: JobStatus::NotFound,
            result: None,
            error: None,
        }
    }
}

/// Response for polling a job by id.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}
