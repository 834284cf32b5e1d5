//! One scrape cycle: flatten, aggregate, project

use std::sync::Arc;
use std::time::{
    Duration,
    Instant,
};

use prometheus::proto::MetricFamily;
use prometheus::{
    Histogram,
    HistogramOpts,
    Registry,
};

use crate::client::{
    JenkinsApi,
    JenkinsClient,
};
use crate::config::JenkinsConfig;
use crate::error::{
    ExporterError,
    ExporterResult,
};
use crate::exposition::{
    encode_text,
    metric_families,
};
use crate::projection::{
    project,
    MetricSample,
};
use crate::tree::TreeFlattener;
use crate::types::JobNode;

const COLLECT_SECONDS_NAME: &str = "jenkins_collector_collect_seconds";
const COLLECT_SECONDS_HELP: &str = "Time spent to collect metrics from Jenkins";

/// The result of one successful scrape cycle. Owned by the caller and
/// dropped once rendered; nothing from it is retained between scrapes.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub jobs: Vec<JobNode>,
    pub samples: Vec<MetricSample>,
    pub duration: Duration,
}

impl Scrape {
    pub fn families(&self) -> Vec<MetricFamily> {
        metric_families(&self.samples)
    }
}

pub struct Collector {
    api: Arc<dyn JenkinsApi>,
    root_url: String,
    max_concurrent_builds: usize,
    registry: Registry,
    collect_seconds: Histogram,
}

impl Collector {
    pub fn new(
        api: Arc<dyn JenkinsApi>,
        root_url: impl Into<String>,
        max_concurrent_builds: usize,
    ) -> ExporterResult<Self> {
        let registry = Registry::new();
        let collect_seconds =
            Histogram::with_opts(HistogramOpts::new(COLLECT_SECONDS_NAME, COLLECT_SECONDS_HELP))?;
        registry.register(Box::new(collect_seconds.clone()))?;

        Ok(Self {
            api,
            root_url: root_url.into().trim_end_matches('/').to_string(),
            max_concurrent_builds,
            registry,
            collect_seconds,
        })
    }

    pub fn from_config(config: &JenkinsConfig) -> ExporterResult<Self> {
        let client = JenkinsClient::new(config)?;
        let root_url = client.server_url().to_string();
        Self::new(Arc::new(client), root_url, config.max_concurrent_builds)
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Runs a full scrape cycle. Any failure aborts the cycle and is
    /// returned as `ExporterError::ScrapeAborted`; no samples survive it.
    pub async fn collect(&self) -> ExporterResult<Scrape> {
        let started = Instant::now();

        let flattener = TreeFlattener::new(self.api.as_ref(), self.max_concurrent_builds);
        let jobs = flattener
            .flatten(&self.root_url)
            .await
            .map_err(ExporterError::abort)?;
        let samples = project(&jobs);

        let duration = started.elapsed();
        self.collect_seconds.observe(duration.as_secs_f64());

        tracing::info!(
            jobs = jobs.len(),
            samples = samples.len(),
            duration_ms = duration.as_millis() as u64,
            "Collected metrics from Jenkins"
        );

        Ok(Scrape {
            jobs,
            samples,
            duration,
        })
    }

    /// Text exposition of a scrape followed by the collector's own metrics.
    pub fn render(&self, scrape: &Scrape) -> ExporterResult<String> {
        let mut families = scrape.families();
        families.extend(self.registry.gather());
        encode_text(&families)
    }
}
