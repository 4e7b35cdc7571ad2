use std::future::Future;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use surveygen_core::SurveyService;

use crate::api;

pub async fn handle_serve(service: Arc<SurveyService>, port: u16) -> Result<()> {
    let router = api::create_router(service);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("API listening on http://localhost:{}", port).bold()
    );
    eprintln!("  {}", "Press Ctrl+C to stop.".dimmed());
    tracing::info!(port, "API server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
    eprintln!("\nShutting down...");
}

/// Resolves once `signal` fires. If the handler cannot be installed this
/// never resolves and the server keeps running.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C, graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_resolves_on_signal() {
        let waited =
            tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(async { Ok(()) })).await;
        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn test_failed_signal_keeps_server_running() {
        let failing = async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) };
        let waited =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(failing)).await;
        assert!(waited.is_err());
    }
}
