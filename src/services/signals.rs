use std::process::ExitCode;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

use crate::services::ServiceResult;
use crate::services::manager::ServiceManager;
use crate::utils::fmt_duration;

/// Wait for Ctrl+C, SIGTERM or a service exiting, then shut everything down
/// within `shutdown_timeout`.
pub async fn handle_shutdown_signals(
    mut service_manager: ServiceManager,
    shutdown_timeout: Duration,
) -> ExitCode {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = ?e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = ?e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    let mut exit_code = ExitCode::SUCCESS;

    tokio::select! {
        (service_name, result) = service_manager.run() => {
            match result {
                ServiceResult::GracefulShutdown => {
                    info!(service = %service_name, "service completed gracefully");
                }
                ServiceResult::NormalCompletion => {
                    warn!(service = %service_name, "service completed unexpectedly");
                    exit_code = ExitCode::FAILURE;
                }
                ServiceResult::Error(e) => {
                    error!(service = %service_name, error = ?e, "service failed");
                    exit_code = ExitCode::FAILURE;
                }
            }
        }
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down");
        }
        _ = sigterm => {
            info!("received SIGTERM, shutting down");
        }
    }

    match service_manager.shutdown(shutdown_timeout).await {
        Ok(elapsed) => {
            info!(elapsed = fmt_duration(elapsed), "graceful shutdown complete");
        }
        Err(pending) => {
            warn!(
                pending_services = ?pending,
                timeout = fmt_duration(shutdown_timeout),
                "graceful shutdown elapsed, some services did not stop"
            );
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}
