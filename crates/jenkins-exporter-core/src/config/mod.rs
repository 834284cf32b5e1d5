mod interpolation;
mod loader;
mod schema;

pub use interpolation::InterpolationError;
pub use loader::{
    ConfigLoadError,
    ConfigLoadResult,
    ConfigLoader,
};
pub use schema::{
    ExporterConfig,
    JenkinsConfig,
    ServerConfig,
    DEFAULT_JENKINS_URL,
    DEFAULT_MAX_CONCURRENT_BUILDS,
    DEFAULT_PORT,
    DEFAULT_TIMEOUT_SECS,
};
