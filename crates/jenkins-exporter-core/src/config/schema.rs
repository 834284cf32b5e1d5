use std::net::SocketAddr;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    ExporterError,
    ExporterResult,
};

pub const DEFAULT_JENKINS_URL: &str = "http://jenkins:8080";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 9118;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_MAX_CONCURRENT_BUILDS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExporterConfig {
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JenkinsConfig {
    #[serde(default = "default_jenkins_url")]
    pub url: String,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on build status requests in flight for one job.
    #[serde(default = "default_max_concurrent_builds")]
    pub max_concurrent_builds: usize,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: default_jenkins_url(),
            user: None,
            password: None,
            insecure: false,
            timeout_secs: default_timeout_secs(),
            max_concurrent_builds: default_max_concurrent_builds(),
        }
    }
}

impl JenkinsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Credentials are only used when both halves are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> ExporterResult<SocketAddr> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|e| {
                ExporterError::InvalidConfig(format!(
                    "Invalid bind address {}:{}: {e}",
                    self.bind_addr, self.port
                ))
            })
    }
}

fn default_jenkins_url() -> String {
    DEFAULT_JENKINS_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_concurrent_builds() -> usize {
    DEFAULT_MAX_CONCURRENT_BUILDS
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ExporterConfig {
    pub fn validate(&self) -> ExporterResult<()> {
        let url = reqwest::Url::parse(&self.jenkins.url).map_err(|e| {
            ExporterError::InvalidConfig(format!("jenkins.url {:?}: {e}", self.jenkins.url))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExporterError::InvalidConfig(format!(
                "jenkins.url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.jenkins.timeout_secs == 0 {
            return Err(ExporterError::InvalidConfig(
                "jenkins.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.jenkins.max_concurrent_builds == 0 {
            return Err(ExporterError::InvalidConfig(
                "jenkins.max_concurrent_builds must be greater than zero".to_string(),
            ));
        }

        self.server.socket_addr()?;

        if self.jenkins.credentials().is_none()
            && (self.jenkins.user.is_some() || self.jenkins.password.is_some())
        {
            tracing::warn!("Only one of user/password is set; requests will be unauthenticated");
        }

        Ok(())
    }
}
