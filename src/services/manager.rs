use futures::future::select_all;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::services::{Service, ServiceResult, run_service};
use crate::utils::fmt_duration;

/// Owns every service, spawns them, and fans out the shutdown signal.
pub struct ServiceManager {
    registered_services: HashMap<String, Box<dyn Service>>,
    running_services: HashMap<String, JoinHandle<ServiceResult>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            registered_services: HashMap::new(),
            running_services: HashMap::new(),
            shutdown_tx,
        }
    }

    /// Register a service to be started by [`spawn_all`](Self::spawn_all).
    pub fn register_service(&mut self, name: &str, service: Box<dyn Service>) {
        self.registered_services.insert(name.to_owned(), service);
    }

    pub fn has_services(&self) -> bool {
        !self.registered_services.is_empty() || !self.running_services.is_empty()
    }

    /// Spawn every registered service on its own task.
    pub fn spawn_all(&mut self) {
        let names: Vec<String> = self.registered_services.keys().cloned().collect();
        for (name, service) in self.registered_services.drain() {
            let shutdown_rx = self.shutdown_tx.subscribe();
            let handle = tokio::spawn(run_service(service, shutdown_rx));
            trace!(service = %name, "service spawned");
            self.running_services.insert(name, handle);
        }
        info!(services = ?names, "spawned {} services", names.len());
    }

    /// Wait until the first running service exits and report its result.
    ///
    /// Pending forever when nothing is running.
    pub async fn run(&mut self) -> (String, ServiceResult) {
        if self.running_services.is_empty() {
            return std::future::pending().await;
        }

        let (names, handles): (Vec<String>, Vec<&mut JoinHandle<ServiceResult>>) = self
            .running_services
            .iter_mut()
            .map(|(name, handle)| (name.clone(), handle))
            .unzip();

        let (joined, index, _) = select_all(handles).await;
        let name = names[index].clone();
        self.running_services.remove(&name);

        let result = joined.unwrap_or_else(|e| {
            ServiceResult::Error(anyhow::anyhow!("service task panicked: {e}"))
        });
        (name, result)
    }

    /// Broadcast shutdown and wait for running services, at most `timeout`
    /// in total. Returns the elapsed time, or the names of services that did
    /// not stop in time.
    pub async fn shutdown(&mut self, timeout: Duration) -> Result<Duration, Vec<String>> {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + timeout;

        info!(
            services = self.running_services.len(),
            timeout = fmt_duration(timeout),
            "shutting down services"
        );
        // No receivers just means every service already exited.
        let _ = self.shutdown_tx.send(());

        let mut pending = Vec::new();
        for (name, handle) in self.running_services.drain() {
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(result)) => debug!(service = %name, ?result, "service stopped"),
                Ok(Err(e)) => warn!(service = %name, error = %e, "service task failed during shutdown"),
                Err(_) => {
                    warn!(service = %name, "service did not stop in time");
                    pending.push(name);
                }
            }
        }

        if pending.is_empty() {
            Ok(started.elapsed())
        } else {
            Err(pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Either idles until shutdown or fails straight away.
    struct Stub {
        fail: bool,
    }

    #[async_trait]
    impl Service for Stub {
        fn name(&self) -> &'static str {
            if self.fail { "failing" } else { "idle" }
        }

        async fn run(&mut self) -> Result<(), anyhow::Error> {
            if self.fail {
                anyhow::bail!("boom");
            }
            std::future::pending().await
        }

        async fn shutdown(&mut self) -> Result<(), anyhow::Error> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_reports_first_exit() {
        let mut manager = ServiceManager::new();
        manager.register_service("idle", Box::new(Stub { fail: false }));
        manager.register_service("failing", Box::new(Stub { fail: true }));
        manager.spawn_all();

        let (name, result) = manager.run().await;
        assert_eq!(name, "failing");
        assert!(matches!(result, ServiceResult::Error(_)));
        assert!(manager.has_services());

        assert!(manager.shutdown(Duration::from_secs(1)).await.is_ok());
        assert!(!manager.has_services());
    }

    #[test]
    fn empty_manager_has_no_services() {
        assert!(!ServiceManager::new().has_services());
    }
}
