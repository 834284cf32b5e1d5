use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use super::interpolation::{
    interpolate_toml,
    InterpolationError,
};
use super::schema::ExporterConfig;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Environment variable interpolation failed: {0}")]
    InterpolationError(#[from] InterpolationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ConfigLoadResult<T> = Result<T, ConfigLoadError>;

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> ConfigLoadResult<ExporterConfig> {
        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;

        tracing::debug!(path = %path.display(), "Loaded config");

        Ok(config)
    }

    /// Loads `path` when given, otherwise starts from defaults.
    pub fn load_optional(path: Option<&Path>) -> ConfigLoadResult<ExporterConfig> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(ExporterConfig::default()),
        }
    }

    pub fn parse(content: &str) -> ConfigLoadResult<ExporterConfig> {
        let mut value: toml::Value = toml::from_str(content)?;

        interpolate_toml(&mut value)?;

        let config: ExporterConfig = value.try_into().map_err(|e| {
            ConfigLoadError::InvalidConfig(format!("Failed to deserialize config: {}", e))
        })?;

        tracing::debug!(target_url = %config.jenkins.url, "Parsed config");

        Ok(config)
    }
}
