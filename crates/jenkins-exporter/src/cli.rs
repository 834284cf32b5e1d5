use std::path::PathBuf;

use clap::Parser;
use jenkins_exporter_core::ExporterConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "jenkins-exporter")]
#[command(author, version, about = "Jenkins exporter for Prometheus", long_about = None)]
pub struct Args {
    /// TOML configuration file; flags and their environment variables override it
    #[arg(short, long, env = "JENKINS_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server url from the Jenkins API
    #[arg(short, long, env = "JENKINS_SERVER")]
    pub jenkins: Option<String>,

    /// Jenkins API user
    #[arg(long, env = "JENKINS_USER")]
    pub user: Option<String>,

    /// Jenkins API password or token
    #[arg(long, env = "JENKINS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Listen to this port
    #[arg(short, long, env = "VIRTUAL_PORT")]
    pub port: Option<u16>,

    /// Listen on this address
    #[arg(long)]
    pub bind: Option<String>,

    /// Allow connection to insecure Jenkins API
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Per-request timeout in seconds for calls to Jenkins
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Build status requests allowed in flight per job
    #[arg(long)]
    pub max_concurrent_builds: Option<usize>,
}

impl Args {
    /// Applies every flag that was given on top of `config`.
    pub fn merge_into(self, mut config: ExporterConfig) -> ExporterConfig {
        if let Some(url) = self.jenkins {
            config.jenkins.url = url;
        }
        if let Some(user) = self.user {
            config.jenkins.user = Some(user);
        }
        if let Some(password) = self.password {
            config.jenkins.password = Some(password);
        }
        if self.insecure {
            config.jenkins.insecure = true;
        }
        if let Some(timeout) = self.timeout {
            config.jenkins.timeout_secs = timeout;
        }
        if let Some(limit) = self.max_concurrent_builds {
            config.jenkins.max_concurrent_builds = limit;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = self.bind {
            config.server.bind_addr = bind;
        }
        config
    }
}
