use std::sync::Arc;
use std::time::Duration;

use chrono::{
    DateTime,
    Utc,
};
use jenkins_exporter_core::Collector;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
pub struct LastScrape {
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,
    pub jobs: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<Collector>,
    pub last_scrape: Arc<RwLock<Option<LastScrape>>>,
}

impl AppState {
    pub fn new(collector: Collector) -> Self {
        Self {
            collector: Arc::new(collector),
            last_scrape: Arc::new(RwLock::new(None)),
        }
    }

    pub fn target(&self) -> &str {
        self.collector.root_url()
    }

    pub async fn record_scrape(&self, duration: Duration, jobs: usize) {
        *self.last_scrape.write().await = Some(LastScrape {
            finished_at: Utc::now(),
            duration,
            jobs,
        });
    }
}
