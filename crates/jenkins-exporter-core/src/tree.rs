//! Flattens the Jenkins folder hierarchy into leaf jobs

use std::sync::LazyLock;

use crate::client::{
    api_url,
    JenkinsApi,
};
use crate::error::{
    ExporterError,
    ExporterResult,
};
use crate::runs::RunAggregator;
use crate::types::{
    JobEntry,
    JobNode,
    JobsResponse,
    StatusKind,
};

const SNAPSHOT_FIELDS: &str = "[fullName,number,timestamp,duration,actions[queuingDurationMillis,\
                               totalDurationMillis,skipCount,failCount,totalCount,passCount]]";

static TREE_SELECTOR: LazyLock<String> = LazyLock::new(|| {
    let statuses = StatusKind::ALL
        .iter()
        .map(|status| format!("{}{SNAPSHOT_FIELDS}", status.api_field()))
        .collect::<Vec<_>>()
        .join(",");
    format!("jobs[fullName,url,builds[url],{statuses}]")
});

/// The `tree` query parameter sent on every folder call. It requests only
/// what the metric projection reads.
pub fn tree_selector() -> &'static str {
    &TREE_SELECTOR
}

pub struct TreeFlattener<'a> {
    api: &'a dyn JenkinsApi,
    runs: RunAggregator<'a>,
    tree: &'a str,
}

/// Children of one folder still waiting to be visited.
struct Frame {
    url: String,
    children: std::vec::IntoIter<JobEntry>,
}

impl<'a> TreeFlattener<'a> {
    pub fn new(api: &'a dyn JenkinsApi, max_concurrent_builds: usize) -> Self {
        Self {
            api,
            runs: RunAggregator::new(api, max_concurrent_builds),
            tree: tree_selector(),
        }
    }

    /// Walks the hierarchy below `root_url` and returns every non-folder
    /// job, depth first, in the order Jenkins lists them.
    ///
    /// Uses an explicit stack so nesting depth is bounded only by memory.
    pub async fn flatten(&self, root_url: &str) -> ExporterResult<Vec<JobNode>> {
        let mut jobs = Vec::new();
        let mut stack = vec![self.fetch_folder(&api_url(root_url)).await?];

        while let Some(frame) = stack.last_mut() {
            let Some(entry) = frame.children.next() else {
                stack.pop();
                continue;
            };
            let parent_url = frame.url.clone();
            let kind = entry.kind();

            if kind.is_folder() {
                let folder_url = entry.url.as_deref().ok_or_else(|| {
                    ExporterError::malformed(
                        &parent_url,
                        format!("folder {} has no url", entry.full_name),
                    )
                })?;
                tracing::debug!(folder = %entry.full_name, kind = %kind, "Descending into folder");
                let child = self.fetch_folder(&api_url(folder_url)).await?;
                stack.push(child);
                continue;
            }

            let mut job = entry
                .into_node()
                .map_err(|e| ExporterError::malformed(&parent_url, e))?;
            job.run_outcomes = self.runs.aggregate(&job).await?;

            tracing::debug!(job = %job.full_name, kind = %job.kind, "Found job");
            tracing::trace!(?job);

            jobs.push(job);
        }

        Ok(jobs)
    }

    async fn fetch_folder(&self, url: &str) -> ExporterResult<Frame> {
        let value = self.api.fetch(url, &[("tree", self.tree)]).await?;
        let response: JobsResponse =
            serde_json::from_value(value).map_err(|e| ExporterError::malformed(url, e))?;

        Ok(Frame {
            url: url.to_string(),
            children: response.jobs.into_iter(),
        })
    }
}
