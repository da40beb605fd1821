// Render proxy HTTP server
//
// Loads a URL in headless Chrome on behalf of the caller and returns the
// rendered DOM, status code and response headers.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

use render_proxy::{ChromeBackend, Cli, LifecycleManager, ServerConfig, http, telemetry};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_startup_error(&error);
        process::exit(1);
    }
}

fn report_startup_error(error: &anyhow::Error) {
    if dispatcher::has_been_set() {
        error!(error = ?error, "render proxy failed");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = ?error, "render proxy failed");
    });
}

async fn run() -> Result<()> {
    let config = ServerConfig::from_cli(Cli::parse()).context("invalid configuration")?;
    telemetry::init(&config.logging)?;

    let addr = config.listen_addr()?;
    let backend = ChromeBackend::launch(&config.browser_options())
        .await
        .context("failed to start Chrome")?;
    let executor = Arc::new(
        LifecycleManager::launch(backend, &config.executor)
            .await
            .context("failed to start worker pool")?,
    );

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            executor.shutdown().await;
            return Err(e).with_context(|| format!("failed to bind {addr}"));
        }
    };
    info!("Server is running on {}", addr);

    let app = http::router(Arc::clone(&executor));
    let draining = Arc::clone(&executor);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Termination signal received, draining");
            draining.begin_drain();
        })
        .await;

    // In-flight handlers are done; finish whatever is still queued and close Chrome
    executor.shutdown().await;
    served.context("HTTP server error")?;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
