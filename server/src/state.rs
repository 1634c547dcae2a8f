use dashmap::DashMap;
use page_extract_cli::{fetch::PageFetcher, page::PageContent, ProcessorRegistry};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

// Lifecycle of an analysis job; polled as `{"status": "...", ...}`
#[derive(Clone, Serialize, Debug)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Done { content: Box<PageContent> },
    Failed { error: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<DashMap<Uuid, JobStatus>>,
    pub registry: Arc<ProcessorRegistry>,
    pub fetcher: Arc<dyn PageFetcher>,
}

impl AppState {
    pub fn new(registry: ProcessorRegistry, fetcher: Arc<dyn PageFetcher>) -> Self {
        AppState {
            jobs: Arc::new(DashMap::new()),
            registry: Arc::new(registry),
            fetcher,
        }
    }
}
