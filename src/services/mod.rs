//! Long-running services and the plumbing that starts and stops them.

use tokio::sync::broadcast;
use tracing::{error, info, warn};

pub mod janitor;
pub mod manager;
pub mod signals;
pub mod web;

#[derive(Debug)]
pub enum ServiceResult {
    GracefulShutdown,
    NormalCompletion,
    Error(anyhow::Error),
}

/// Common trait for all services in the application
#[async_trait::async_trait]
pub trait Service: Send + Sync {
    /// The name of the service for logging
    fn name(&self) -> &'static str;

    /// Run the service's main work loop
    async fn run(&mut self) -> Result<(), anyhow::Error>;

    /// Gracefully shutdown the service
    ///
    /// Called after `run` has been abandoned because a shutdown was requested.
    async fn shutdown(&mut self) -> Result<(), anyhow::Error>;
}

/// Run a service until it finishes on its own or a shutdown is broadcast.
pub async fn run_service(
    mut service: Box<dyn Service>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> ServiceResult {
    let name = service.name();
    info!(service = name, "service started");

    tokio::select! {
        result = service.run() => {
            match result {
                Ok(()) => {
                    warn!(service = name, "service completed unexpectedly");
                    ServiceResult::NormalCompletion
                }
                Err(e) => {
                    error!(service = name, error = ?e, "service failed");
                    ServiceResult::Error(e)
                }
            }
        }
        _ = shutdown_rx.recv() => {
            info!(service = name, "shutting down");
            match service.shutdown().await {
                Ok(()) => {
                    info!(service = name, "service shut down gracefully");
                    ServiceResult::GracefulShutdown
                }
                Err(e) => {
                    error!(service = name, error = ?e, "service shutdown failed");
                    ServiceResult::Error(e)
                }
            }
        }
    }
}
