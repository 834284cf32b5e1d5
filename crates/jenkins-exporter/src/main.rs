mod cli;
mod error;
mod routes;
mod state;

use anyhow::Context;
use clap::Parser;
use jenkins_exporter_core::{
    Collector,
    ConfigLoader,
};
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::cli::Args;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    jenkins_exporter_core::logging::init();

    let args = Args::parse();

    let file_config = ConfigLoader::load_optional(args.config.as_deref())
        .context("Failed to load config")?;
    let config = args.merge_into(file_config);
    config.validate().context("Invalid configuration")?;

    let bind_addr = config.server.socket_addr()?;
    let collector =
        Collector::from_config(&config.jenkins).context("Failed to create Jenkins client")?;

    tracing::info!(
        target_url = %collector.root_url(),
        insecure = config.jenkins.insecure,
        authenticated = config.jenkins.credentials().is_some(),
        timeout_secs = config.jenkins.timeout_secs,
        max_concurrent_builds = config.jenkins.max_concurrent_builds,
        "Starting Jenkins exporter"
    );

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(collector));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;

    tracing::info!("Serving metrics at http://{}/metrics", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Interrupted, shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
