pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod exposition;
pub mod logging;
pub mod projection;
pub mod runs;
pub mod tree;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{
    api_url,
    JenkinsApi,
    JenkinsClient,
};
pub use collector::{
    Collector,
    Scrape,
};
pub use config::{
    ConfigLoader,
    ExporterConfig,
    JenkinsConfig,
    ServerConfig,
};
pub use error::{
    ExporterError,
    ExporterResult,
};
pub use projection::{
    project,
    MetricKey,
    MetricSample,
    SnapshotField,
};
pub use tree::{
    tree_selector,
    TreeFlattener,
};
pub use types::{
    ActionCounters,
    BuildRef,
    BuildSnapshot,
    JobKind,
    JobNode,
    RunOutcome,
    RunOutcomeCounts,
    StatusKind,
};
