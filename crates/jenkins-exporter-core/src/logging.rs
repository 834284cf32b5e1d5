use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const DEFAULT_LOG_FILTER: &str =
    "jenkins_exporter=info,jenkins_exporter_core=info,tower_http=info";

pub const DEBUG_LOG_FILTER: &str =
    "jenkins_exporter=debug,jenkins_exporter_core=debug,tower_http=debug";

/// Installs the global subscriber. `DEBUG=1` switches to the debug filter;
/// `RUST_LOG` wins over both.
pub fn init() {
    if debug_enabled(std::env::var("DEBUG").ok().as_deref()) {
        init_with_default(DEBUG_LOG_FILTER);
    } else {
        init_with_default(DEFAULT_LOG_FILTER);
    }
}

pub fn init_with_default(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .init();
}

fn debug_enabled(value: Option<&str>) -> bool {
    value
        .map(|v| v.trim().parse::<i64>().map(|n| n != 0).unwrap_or(false))
        .unwrap_or(false)
}
