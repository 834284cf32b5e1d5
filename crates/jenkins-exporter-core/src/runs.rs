//! Classifies a job's build history into success/failure totals

use futures::stream::{
    self,
    StreamExt,
    TryStreamExt,
};

use crate::client::{
    api_url,
    JenkinsApi,
};
use crate::error::{
    ExporterError,
    ExporterResult,
};
use crate::types::{
    BuildRef,
    BuildResult,
    JobNode,
    RunOutcome,
    RunOutcomeCounts,
};

pub struct RunAggregator<'a> {
    api: &'a dyn JenkinsApi,
    max_concurrent: usize,
}

impl<'a> RunAggregator<'a> {
    pub fn new(api: &'a dyn JenkinsApi, max_concurrent: usize) -> Self {
        Self {
            api,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetches every build in `job.builds` and counts `SUCCESS` / `FAILURE`
    /// results. Returns `None` for kinds that do not track runs. The first
    /// failed call aborts the whole aggregation.
    pub async fn aggregate(&self, job: &JobNode) -> ExporterResult<Option<RunOutcomeCounts>> {
        if !job.kind.tracks_runs() {
            return Ok(None);
        }

        let pending: Vec<_> = job
            .builds
            .iter()
            .map(|build| self.fetch_outcome(build))
            .collect();

        let counts = stream::iter(pending)
            .buffer_unordered(self.max_concurrent)
            .try_fold(RunOutcomeCounts::default(), |mut counts, outcome| async move {
                counts.record(outcome);
                Ok(counts)
            })
            .await?;

        tracing::debug!(
            job = %job.full_name,
            builds = job.builds.len(),
            successful = counts.successful_total,
            failed = counts.failed_total,
            "Aggregated run outcomes"
        );

        Ok(Some(counts))
    }

    async fn fetch_outcome(&self, build: &BuildRef) -> ExporterResult<RunOutcome> {
        let url = api_url(&build.url);
        let value = self.api.fetch(&url, &[]).await?;
        let build: BuildResult =
            serde_json::from_value(value).map_err(|e| ExporterError::malformed(&url, e))?;

        tracing::trace!(number = ?build.number, result = ?build.result, "Build result");

        Ok(RunOutcome::from_result(build.result.as_deref()))
    }
}
