use thiserror::Error;

/// Exporter error types
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Call to url {url} failed with status: {status}")]
    Upstream { url: String, status: u16 },

    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("Network error calling {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scrape aborted: {0}")]
    ScrapeAborted(#[source] Box<ExporterError>),

    #[error("Encoding error: {0}")]
    Encoding(#[from] prometheus::Error),
}

pub type ExporterResult<T> = Result<T, ExporterError>;

impl ExporterError {
    pub fn malformed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Wraps a pipeline failure so callers of a full scrape see one variant.
    pub fn abort(self) -> Self {
        match self {
            Self::ScrapeAborted(_) => self,
            other => Self::ScrapeAborted(Box::new(other)),
        }
    }

    /// The innermost error, looking through `ScrapeAborted`.
    pub fn root(&self) -> &ExporterError {
        match self {
            Self::ScrapeAborted(inner) => inner.root(),
            other => other,
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self.root(), Self::Upstream { .. })
    }

    pub fn failing_url(&self) -> Option<&str> {
        match self.root() {
            Self::Upstream { url, .. }
            | Self::MalformedResponse { url, .. }
            | Self::Network { url, .. } => Some(url),
            _ => None,
        }
    }
}
