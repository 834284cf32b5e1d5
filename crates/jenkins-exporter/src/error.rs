use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
};
use jenkins_exporter_core::ExporterError;

/// A failed request. Scrape failures surface as a plain-text 502 so the
/// Prometheus server marks the target down for that cycle.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<ExporterError> for AppError {
    fn from(err: ExporterError) -> Self {
        match &err {
            ExporterError::ScrapeAborted(_) => {
                match err.root() {
                    ExporterError::Upstream { url, status } => {
                        tracing::error!(url = %url, status, "Scrape failed: upstream error");
                    }
                    root => {
                        tracing::error!(url = ?err.failing_url(), error = %root, "Scrape failed");
                    }
                }
                AppError::new(StatusCode::BAD_GATEWAY, err.to_string())
            }
            _ => {
                tracing::error!(error = %err, "Failed to render metrics");
                AppError::internal(err.to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, AppError>;
