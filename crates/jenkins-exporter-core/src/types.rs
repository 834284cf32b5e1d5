//! Job tree model and Jenkins API response types

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::{
    Map,
    Value,
};

const FOLDER_CLASS: &str = "com.cloudbees.hudson.plugins.folder.Folder";
const ORGANIZATION_FOLDER_CLASS: &str = "jenkins.branch.OrganizationFolder";
const MULTIBRANCH_PROJECT_CLASS: &str =
    "org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject";
const WORKFLOW_JOB_CLASS: &str = "org.jenkinsci.plugins.workflow.job.WorkflowJob";
const FREESTYLE_PROJECT_CLASS: &str = "hudson.model.FreeStyleProject";

/// Node kind, decoded from the `_class` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Folder,
    OrganizationFolder,
    MultiBranchProject,
    WorkflowJob,
    FreestyleProject,
    Other(String),
}

impl JobKind {
    pub fn from_class(class: &str) -> Self {
        match class {
            FOLDER_CLASS => Self::Folder,
            ORGANIZATION_FOLDER_CLASS => Self::OrganizationFolder,
            MULTIBRANCH_PROJECT_CLASS => Self::MultiBranchProject,
            WORKFLOW_JOB_CLASS => Self::WorkflowJob,
            FREESTYLE_PROJECT_CLASS => Self::FreestyleProject,
            other => Self::Other(other.to_string()),
        }
    }

    /// Folder-like nodes are descended into, never emitted.
    pub fn is_folder(&self) -> bool {
        matches!(
            self,
            Self::Folder | Self::OrganizationFolder | Self::MultiBranchProject
        )
    }

    /// Kinds whose build history is classified into run outcomes.
    pub fn tracks_runs(&self) -> bool {
        matches!(self, Self::WorkflowJob | Self::FreestyleProject)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder => write!(f, "{FOLDER_CLASS}"),
            Self::OrganizationFolder => write!(f, "{ORGANIZATION_FOLDER_CLASS}"),
            Self::MultiBranchProject => write!(f, "{MULTIBRANCH_PROJECT_CLASS}"),
            Self::WorkflowJob => write!(f, "{WORKFLOW_JOB_CLASS}"),
            Self::FreestyleProject => write!(f, "{FREESTYLE_PROJECT_CLASS}"),
            Self::Other(class) => write!(f, "{class}"),
        }
    }
}

/// The build pointers tracked on every job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusKind {
    LastBuild,
    LastCompletedBuild,
    LastFailedBuild,
    LastStableBuild,
    LastSuccessfulBuild,
    LastUnstableBuild,
    LastUnsuccessfulBuild,
}

impl StatusKind {
    pub const ALL: [StatusKind; 7] = [
        StatusKind::LastBuild,
        StatusKind::LastCompletedBuild,
        StatusKind::LastFailedBuild,
        StatusKind::LastStableBuild,
        StatusKind::LastSuccessfulBuild,
        StatusKind::LastUnstableBuild,
        StatusKind::LastUnsuccessfulBuild,
    ];

    /// Field name in the Jenkins job payload.
    pub fn api_field(self) -> &'static str {
        match self {
            Self::LastBuild => "lastBuild",
            Self::LastCompletedBuild => "lastCompletedBuild",
            Self::LastFailedBuild => "lastFailedBuild",
            Self::LastStableBuild => "lastStableBuild",
            Self::LastSuccessfulBuild => "lastSuccessfulBuild",
            Self::LastUnstableBuild => "lastUnstableBuild",
            Self::LastUnsuccessfulBuild => "lastUnsuccessfulBuild",
        }
    }

    /// `lastFailedBuild` -> `last_failed_build`
    pub fn snake_case(self) -> String {
        snake_case(self.api_field())
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_field())
    }
}

pub(crate) fn snake_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for c in identifier.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Counter block attached to a build's `actions` list. Every field is
/// optional; action entries without any of them are inert.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCounters {
    #[serde(default)]
    pub queuing_duration_millis: Option<f64>,
    #[serde(default)]
    pub total_duration_millis: Option<f64>,
    #[serde(default)]
    pub skip_count: Option<f64>,
    #[serde(default)]
    pub fail_count: Option<f64>,
    #[serde(default)]
    pub total_count: Option<f64>,
}

impl ActionCounters {
    /// `totalCount - failCount - skipCount`, missing terms counted as zero.
    /// Any `passCount` sent by Jenkins is ignored.
    pub fn pass_count(&self) -> Option<f64> {
        self.total_count.map(|total| {
            total - self.fail_count.unwrap_or_default() - self.skip_count.unwrap_or_default()
        })
    }
}

/// Point-in-time data for one status kind of one job.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BuildSnapshot {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(rename = "timestamp", default)]
    pub timestamp_millis: Option<u64>,
    #[serde(rename = "duration", default)]
    pub duration_millis: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub actions: Vec<ActionCounters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildRef {
    pub url: String,
}

/// Aggregated outcomes over a job's build history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcomeCounts {
    pub successful_total: u64,
    pub failed_total: u64,
}

impl RunOutcomeCounts {
    pub fn record(&mut self, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Success => self.successful_total += 1,
            RunOutcome::Failure => self.failed_total += 1,
            RunOutcome::Other => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failure,
    Other,
}

impl RunOutcome {
    pub fn from_result(result: Option<&str>) -> Self {
        match result {
            Some("SUCCESS") => Self::Success,
            Some("FAILURE") => Self::Failure,
            _ => Self::Other,
        }
    }
}

/// A leaf job as produced by the tree flattener.
#[derive(Debug, Clone, PartialEq)]
pub struct JobNode {
    pub full_name: String,
    pub url: String,
    pub kind: JobKind,
    pub builds: Vec<BuildRef>,
    /// Only kinds present in the payload have an entry; a `null` payload
    /// value is kept as `None`.
    pub snapshots: BTreeMap<StatusKind, Option<BuildSnapshot>>,
    /// `Some` only for kinds that track runs.
    pub run_outcomes: Option<RunOutcomeCounts>,
}

/// `GET {folder}/api/json?tree=jobs[...]`
#[derive(Debug, Deserialize)]
pub(crate) struct JobsResponse {
    pub jobs: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobEntry {
    #[serde(rename = "_class", default)]
    pub class: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub builds: Vec<BuildRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobEntry {
    pub fn kind(&self) -> JobKind {
        JobKind::from_class(&self.class)
    }

    pub fn into_node(mut self) -> Result<JobNode, serde_json::Error> {
        let mut snapshots = BTreeMap::new();
        for status in StatusKind::ALL {
            if let Some(value) = self.extra.remove(status.api_field()) {
                let snapshot: Option<BuildSnapshot> = serde_json::from_value(value)?;
                snapshots.insert(status, snapshot);
            }
        }

        Ok(JobNode {
            kind: self.kind(),
            full_name: self.full_name,
            url: self.url.unwrap_or_default(),
            builds: self.builds,
            snapshots,
            run_outcomes: None,
        })
    }
}

/// `GET {build}/api/json`
#[derive(Debug, Deserialize)]
pub(crate) struct BuildResult {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
