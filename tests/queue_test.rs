use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use wedding_video_gen::models::job::{JobSnapshot, JobStatus};
use wedding_video_gen::services::queue::{JobQueue, QueueError};

/// Poll a job until it reaches a terminal status.
async fn wait_for_terminal(queue: &JobQueue, job_id: Uuid) -> JobSnapshot {
    for _ in 0..400 {
        let snapshot = queue.status(job_id).await;
        match snapshot.status {
            JobStatus::Done | JobStatus::Error => return snapshot,
            _ => sleep(Duration::from_millis(25)).await,
        }
    }
    panic!("job {job_id} did not reach a terminal status in time");
}

#[tokio::test]
async fn submit_before_start_fails_with_uninitialized() {
    let queue = Arc::new(JobQueue::new());

    let result = queue.submit(async { Ok(serde_json::json!(1)) }).await;
    assert!(matches!(result, Err(QueueError::Uninitialized)));
    assert_eq!(queue.depth(), 0);
}

#[tokio::test]
async fn submissions_return_distinct_job_ids() {
    let queue = Arc::new(JobQueue::new());
    queue.start(2);

    let mut ids = HashSet::new();
    for _ in 0..20 {
        let job_id = queue
            .submit(async { Ok(serde_json::json!("ok")) })
            .await
            .expect("submit");
        ids.insert(job_id);
    }
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn unknown_job_id_yields_not_found_sentinel() {
    let queue = Arc::new(JobQueue::new());
    queue.start(1);

    let snapshot = queue.status(Uuid::new_v4()).await;
    assert_eq!(snapshot.status, JobStatus::NotFound);
    assert!(snapshot.result.is_none());
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn successful_job_reaches_done_with_result() {
    let queue = Arc::new(JobQueue::new());
    queue.start(2);

    let job_id = queue
        .submit(async { Ok(serde_json::json!(1 + 1)) })
        .await
        .expect("submit");

    let snapshot = wait_for_terminal(&queue, job_id).await;
    assert_eq!(snapshot.status, JobStatus::Done);
    assert_eq!(snapshot.result, Some(serde_json::json!(2)));
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn failing_job_reaches_error_without_crashing_the_pool() {
    let queue = Arc::new(JobQueue::new());
    queue.start(1);

    let failing = queue
        .submit(async { Err("boom".into()) })
        .await
        .expect("submit failing job");

    let snapshot = wait_for_terminal(&queue, failing).await;
    assert_eq!(snapshot.status, JobStatus::Error);
    assert!(snapshot.result.is_none());
    assert!(snapshot.error.as_deref().unwrap_or_default().contains("boom"));

    // The single worker must still service subsequent submissions.
    let ok = queue
        .submit(async { Ok(serde_json::json!("alive")) })
        .await
        .expect("submit after failure");
    let snapshot = wait_for_terminal(&queue, ok).await;
    assert_eq!(snapshot.status, JobStatus::Done);
}

#[tokio::test]
async fn panicking_job_is_contained() {
    let queue = Arc::new(JobQueue::new());
    queue.start(1);

    let job_id = queue
        .submit(async { panic!("kaboom") })
        .await
        .expect("submit panicking job");

    let snapshot = wait_for_terminal(&queue, job_id).await;
    assert_eq!(snapshot.status, JobStatus::Error);
    assert!(snapshot.error.as_deref().unwrap_or_default().contains("kaboom"));

    let ok = queue
        .submit(async { Ok(serde_json::json!("still here")) })
        .await
        .expect("submit after panic");
    let snapshot = wait_for_terminal(&queue, ok).await;
    assert_eq!(snapshot.status, JobStatus::Done);
}

#[tokio::test]
async fn completion_order_can_differ_from_submission_order() {
    let queue = Arc::new(JobQueue::new());
    queue.start(2);

    let slow = queue
        .submit(async {
            sleep(Duration::from_millis(500)).await;
            Ok(serde_json::json!("slow"))
        })
        .await
        .expect("submit slow");
    let fast = queue
        .submit(async {
            sleep(Duration::from_millis(50)).await;
            Ok(serde_json::json!("fast"))
        })
        .await
        .expect("submit fast");

    let fast_snapshot = wait_for_terminal(&queue, fast).await;
    assert_eq!(fast_snapshot.status, JobStatus::Done);

    // The earlier submission is still in flight when the later one is done.
    let slow_snapshot = queue.status(slow).await;
    assert_ne!(slow_snapshot.status, JobStatus::Done);

    let slow_snapshot = wait_for_terminal(&queue, slow).await;
    assert_eq!(slow_snapshot.status, JobStatus::Done);
    assert_eq!(slow_snapshot.result, Some(serde_json::json!("slow")));
}

#[tokio::test]
async fn all_jobs_complete_with_wide_pool() {
    let queue = Arc::new(JobQueue::new());
    queue.start(8);

    let mut ids = Vec::new();
    for i in 0..8u64 {
        let job_id = queue
            .submit(async move {
                sleep(Duration::from_millis(20 * (i + 1))).await;
                Ok(serde_json::json!(i))
            })
            .await
            .expect("submit");
        ids.push((i, job_id));
    }

    for (i, job_id) in ids {
        let snapshot = wait_for_terminal(&queue, job_id).await;
        assert_eq!(snapshot.status, JobStatus::Done);
        assert_eq!(snapshot.result, Some(serde_json::json!(i)));
    }
}

#[tokio::test]
async fn start_is_idempotent() {
    let queue = Arc::new(JobQueue::new());
    queue.start(2);
    queue.start(8);

    let job_id = queue
        .submit(async { Ok(serde_json::json!("ok")) })
        .await
        .expect("submit after double start");
    let snapshot = wait_for_terminal(&queue, job_id).await;
    assert_eq!(snapshot.status, JobStatus::Done);
}

#[tokio::test]
async fn shutdown_preserves_completed_records_and_rejects_new_work() {
    let queue = Arc::new(JobQueue::new());
    queue.start(1);

    let job_id = queue
        .submit(async { Ok(serde_json::json!(7)) })
        .await
        .expect("submit");
    let snapshot = wait_for_terminal(&queue, job_id).await;
    assert_eq!(snapshot.status, JobStatus::Done);

    queue.shutdown();

    let snapshot = queue.status(job_id).await;
    assert_eq!(snapshot.status, JobStatus::Done);
    assert_eq!(snapshot.result, Some(serde_json::json!(7)));

    let result = queue.submit(async { Ok(serde_json::json!("late")) }).await;
    assert!(matches!(result, Err(QueueError::Uninitialized)));
}
