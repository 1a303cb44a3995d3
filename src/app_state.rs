use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    compose::VideoComposer,
    download::Downloader,
    notify::WorkflowNotifier,
    queue::JobQueue,
    runway::RunwayClient,
    storage::BlobStorage,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub queue: Arc<JobQueue>,
    pub storage: Arc<BlobStorage>,
    pub runway: Arc<RunwayClient>,
    pub downloader: Arc<Downloader>,
    pub composer: Arc<VideoComposer>,
    pub notifier: Arc<WorkflowNotifier>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        queue: JobQueue,
        storage: BlobStorage,
        runway: RunwayClient,
        downloader: Downloader,
        composer: VideoComposer,
        notifier: WorkflowNotifier,
    ) -> Self {
        Self {
            config: Arc::new(config),
            queue: Arc::new(queue),
            storage: Arc::new(storage),
            runway: Arc::new(runway),
            downloader: Arc::new(downloader),
            composer: Arc::new(composer),
            notifier: Arc::new(notifier),
        }
    }
}
