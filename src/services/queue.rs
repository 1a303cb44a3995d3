//! In-process background job queue.
//!
//! A fixed pool of worker tasks pulls deferred work items from a shared
//! FIFO channel. Callers submit a future, get back a job id immediately,
//! and poll for the outcome. Records live for the process lifetime; a
//! restart loses all job history.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::{mpsc, Mutex, RwLock};
use uuid::Uuid;

use crate::models::job::{JobSnapshot, JobStatus};

/// How long a worker waits on the channel before re-checking liveness.
/// Bounds shutdown latency.
const DEQUEUE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of one unit of deferred work.
pub type WorkOutput = Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>>;

type WorkFuture = Pin<Box<dyn Future<Output = WorkOutput> + Send>>;

struct QueuedItem {
    job_id: Uuid,
    work: WorkFuture,
}

#[derive(Debug, Clone)]
struct JobRecord {
    status: JobStatus,
    result: Option<serde_json::Value>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JobRecord {
    fn queued() -> Self {
        let now = Utc::now();
        Self {
            status: JobStatus::Queued,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// State shared between submitters, status readers and the worker tasks.
struct QueueShared {
    jobs: RwLock<HashMap<Uuid, JobRecord>>,
    alive: AtomicBool,
    depth: AtomicUsize,
}

/// In-process async job queue with a fixed worker pool.
///
/// Owned by `AppState`; one instance per process. Must be started with
/// [`JobQueue::start`] before jobs can be submitted.
pub struct JobQueue {
    shared: Arc<QueueShared>,
    tx: OnceLock<mpsc::UnboundedSender<QueuedItem>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(QueueShared {
                jobs: RwLock::new(HashMap::new()),
                alive: AtomicBool::new(false),
                depth: AtomicUsize::new(0),
            }),
            tx: OnceLock::new(),
        }
    }

    /// Spawn `worker_count` worker tasks sharing one FIFO channel.
    ///
    /// Calling this again while the queue is alive is a no-op: no extra
    /// workers are spawned and existing records are untouched.
    pub fn start(&self, worker_count: usize) {
        if self.shared.alive.swap(true, Ordering::SeqCst) {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        // Workers share the single consumer end behind a lock; whichever
        // worker holds it next receives the oldest item (FIFO).
        let rx = Arc::new(Mutex::new(rx));

        for worker_id in 0..worker_count {
            let shared = Arc::clone(&self.shared);
            let rx = Arc::clone(&rx);
            tokio::spawn(async move {
                worker_loop(worker_id, shared, rx).await;
            });
        }

        // The alive swap above lets only one caller reach this point, so
        // the slot is still empty.
        let _ = self.tx.set(tx);

        tracing::info!(worker_count, "job queue started");
    }

    /// Submit a unit of deferred work and return its job id immediately.
    ///
    /// Never blocks on worker availability; the channel is unbounded.
    /// Fails with [`QueueError::Uninitialized`] before [`JobQueue::start`]
    /// or after [`JobQueue::shutdown`], recording no partial state.
    pub async fn submit<F>(&self, work: F) -> Result<Uuid, QueueError>
    where
        F: Future<Output = WorkOutput> + Send + 'static,
    {
        if !self.shared.alive.load(Ordering::SeqCst) {
            return Err(QueueError::Uninitialized);
        }
        let tx = self.tx.get().ok_or(QueueError::Uninitialized)?;

        let job_id = Uuid::new_v4();
        // Record before enqueue so a worker can never dequeue an unknown id.
        self.shared
            .jobs
            .write()
            .await
            .insert(job_id, JobRecord::queued());

        if tx
            .send(QueuedItem {
                job_id,
                work: Box::pin(work),
            })
            .is_err()
        {
            // All workers exited between the liveness check and the send.
            self.shared.jobs.write().await.remove(&job_id);
            return Err(QueueError::Uninitialized);
        }

        let depth = self.shared.depth.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::counter!("video_jobs_submitted_total").increment(1);
        metrics::gauge!("job_queue_depth").set(depth as f64);

        tracing::info!(job_id = %job_id, depth, "job submitted");
        Ok(job_id)
    }

    /// Point-in-time snapshot of a job. Unknown ids yield the `not_found`
    /// sentinel; this never fails.
    pub async fn status(&self, job_id: Uuid) -> JobSnapshot {
        match self.shared.jobs.read().await.get(&job_id) {
            Some(record) => JobSnapshot {
                status: record.status,
                result: record.result.clone(),
                error: record.error.clone(),
            },
            None => JobSnapshot::not_found(),
        }
    }

    /// Items submitted but not yet fully processed.
    pub fn depth(&self) -> usize {
        self.shared.depth.load(Ordering::SeqCst)
    }

    /// Whether the queue accepts submissions.
    pub fn is_alive(&self) -> bool {
        self.shared.alive.load(Ordering::SeqCst)
    }

    /// Signal workers to stop pulling new work after their current item.
    ///
    /// Cooperative and eventual: in-flight work is not cancelled and
    /// worker tasks are not joined. Completed records stay queryable.
    pub fn shutdown(&self) {
        self.shared.alive.store(false, Ordering::SeqCst);
        tracing::info!("job queue shutdown signalled");
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

async fn worker_loop(
    worker_id: usize,
    shared: Arc<QueueShared>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<QueuedItem>>>,
) {
    tracing::debug!(worker_id, "queue worker started");
    loop {
        if !shared.alive.load(Ordering::SeqCst) {
            break;
        }
        let item = {
            let mut rx = rx.lock().await;
            match tokio::time::timeout(DEQUEUE_POLL_INTERVAL, rx.recv()).await {
                Ok(Some(item)) => item,
                Ok(None) => break,
                // Nothing to dequeue; re-check liveness.
                Err(_) => continue,
            }
        };
        run_item(&shared, item).await;
    }
    tracing::debug!(worker_id, "queue worker stopped");
}

/// Execute one work item, containing any failure on the job record.
async fn run_item(shared: &QueueShared, item: QueuedItem) {
    let QueuedItem { job_id, work } = item;

    let created_at = shared
        .jobs
        .read()
        .await
        .get(&job_id)
        .map(|record| record.created_at);

    transition(shared, job_id, JobStatus::Running, None, None).await;
    if let Some(created_at) = created_at {
        let waited = (Utc::now() - created_at).num_milliseconds().max(0);
        metrics::histogram!("job_queue_wait_seconds").record(waited as f64 / 1000.0);
        tracing::info!(job_id = %job_id, waited_ms = waited, "job running");
    }

    let started = std::time::Instant::now();
    let outcome = std::panic::AssertUnwindSafe(work).catch_unwind().await;

    match outcome {
        Ok(Ok(value)) => {
            transition(shared, job_id, JobStatus::Done, Some(value), None).await;
            metrics::counter!("video_jobs_completed_total").increment(1);
            tracing::info!(
                job_id = %job_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "job done"
            );
        }
        Ok(Err(e)) => {
            transition(shared, job_id, JobStatus::Error, None, Some(e.to_string())).await;
            metrics::counter!("video_jobs_failed_total").increment(1);
            tracing::error!(job_id = %job_id, error = %e, "job failed");
        }
        Err(panic) => {
            let message = panic_message(panic);
            transition(shared, job_id, JobStatus::Error, None, Some(message.clone())).await;
            metrics::counter!("video_jobs_failed_total").increment(1);
            tracing::error!(job_id = %job_id, error = %message, "job panicked");
        }
    }

    // Acknowledge the item as fully processed.
    let depth = shared.depth.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
    metrics::gauge!("job_queue_depth").set(depth as f64);
    metrics::histogram!("job_processing_seconds").record(started.elapsed().as_secs_f64());
}

async fn transition(
    shared: &QueueShared,
    job_id: Uuid,
    status: JobStatus,
    result: Option<serde_json::Value>,
    error: Option<String>,
) {
    if let Some(record) = shared.jobs.write().await.get_mut(&job_id) {
        record.status = status;
        record.result = result;
        record.error = error;
        record.updated_at = Utc::now();
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "work item panicked".to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("job queue not initialized")]
    Uninitialized,
}
