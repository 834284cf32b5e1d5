//! Maps flattened jobs onto the fixed metric schema

use crate::types::{
    ActionCounters,
    BuildSnapshot,
    JobNode,
    StatusKind,
};

const JOB_METRIC_PREFIX: &str = "jenkins_job_";

/// One projected field of a status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapshotField {
    Number,
    Duration,
    Timestamp,
    QueuingDuration,
    TotalDuration,
    SkipCount,
    FailCount,
    TotalCount,
    PassCount,
}

impl SnapshotField {
    fn suffix(self) -> &'static str {
        match self {
            Self::Number => "",
            Self::Duration => "_duration_seconds",
            Self::Timestamp => "_timestamp_seconds",
            Self::QueuingDuration => "_queuing_duration_seconds",
            Self::TotalDuration => "_total_duration_seconds",
            Self::SkipCount => "_skip_count",
            Self::FailCount => "_fail_count",
            Self::TotalCount => "_total_count",
            Self::PassCount => "_pass_count",
        }
    }

    fn help_subject(self) -> &'static str {
        match self {
            Self::Number => "build number",
            Self::Duration => "build duration in seconds",
            Self::Timestamp => "build timestamp in unixtime",
            Self::QueuingDuration => "build queuing duration in seconds",
            Self::TotalDuration => "build total duration in seconds",
            Self::SkipCount => "build skip counts",
            Self::FailCount => "build fail counts",
            Self::TotalCount => "build total counts",
            Self::PassCount => "build pass counts",
        }
    }
}

/// Identifies the metric family a sample belongs to. The derived ordering
/// is the order families are exposed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricKey {
    Snapshot(StatusKind, SnapshotField),
    RunsSuccessful,
    RunsFailed,
}

impl MetricKey {
    /// `jenkins_job_<status>` plus the field suffix, or one of the two
    /// run counters. Existing dashboards depend on these names.
    pub fn name(self) -> String {
        match self {
            Self::Snapshot(status, field) => {
                format!("{JOB_METRIC_PREFIX}{}{}", status.snake_case(), field.suffix())
            }
            Self::RunsSuccessful => "jenkins_runs_successful_total".to_string(),
            Self::RunsFailed => "jenkins_runs_failed_total".to_string(),
        }
    }

    pub fn help(self) -> String {
        match self {
            Self::Snapshot(status, field) => {
                format!("Jenkins {} for {status}", field.help_subject())
            }
            Self::RunsSuccessful => "Jenkins total job successful runs".to_string(),
            Self::RunsFailed => "Jenkins total job failed runs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub key: MetricKey,
    /// The job's full name.
    pub label_value: String,
    pub value: f64,
}

impl MetricSample {
    pub fn metric_name(&self) -> String {
        self.key.name()
    }
}

/// Projects every job's snapshots and run outcomes into samples.
///
/// Samples come out status by status, each status covering every job in
/// input order, followed by the run counters. A zero value is treated the
/// same as an absent one and produces no sample; the derived pass count is
/// the only exception, since it is emitted whenever a total count is.
pub fn project(jobs: &[JobNode]) -> Vec<MetricSample> {
    let mut samples = Vec::new();

    for status in StatusKind::ALL {
        for job in jobs {
            if let Some(Some(snapshot)) = job.snapshots.get(&status) {
                project_snapshot(&mut samples, status, &job.full_name, snapshot);
            }
        }
    }

    for job in jobs {
        let Some(outcomes) = job.run_outcomes else {
            continue;
        };
        let mut emit = |key, count: u64| {
            if count != 0 {
                samples.push(MetricSample {
                    key,
                    label_value: job.full_name.clone(),
                    value: count as f64,
                });
            }
        };
        emit(MetricKey::RunsSuccessful, outcomes.successful_total);
        emit(MetricKey::RunsFailed, outcomes.failed_total);
    }

    samples
}

fn project_snapshot(
    samples: &mut Vec<MetricSample>,
    status: StatusKind,
    job_name: &str,
    snapshot: &BuildSnapshot,
) {
    let mut emit = |field, value: Option<f64>| {
        if let Some(value) = value {
            samples.push(MetricSample {
                key: MetricKey::Snapshot(status, field),
                label_value: job_name.to_string(),
                value,
            });
        }
    };

    emit(SnapshotField::Duration, seconds(snapshot.duration_millis.map(|ms| ms as f64)));
    emit(SnapshotField::Timestamp, seconds(snapshot.timestamp_millis.map(|ms| ms as f64)));
    emit(SnapshotField::Number, present(snapshot.number.map(|n| n as f64)));

    for action in &snapshot.actions {
        project_action(&mut emit, action);
    }
}

fn project_action(emit: &mut impl FnMut(SnapshotField, Option<f64>), action: &ActionCounters) {
    emit(SnapshotField::QueuingDuration, seconds(action.queuing_duration_millis));
    emit(SnapshotField::TotalDuration, seconds(action.total_duration_millis));
    emit(SnapshotField::SkipCount, present(action.skip_count));
    emit(SnapshotField::FailCount, present(action.fail_count));

    if let Some(total) = present(action.total_count) {
        emit(SnapshotField::TotalCount, Some(total));
        emit(SnapshotField::PassCount, action.pass_count());
    }
}

/// Zero carries no information upstream and is dropped like a missing field.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

fn seconds(millis: Option<f64>) -> Option<f64> {
    present(millis).map(|ms| ms / 1000.0)
}
