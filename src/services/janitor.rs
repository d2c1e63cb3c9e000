use anyhow::Context;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::services::Service;
use crate::source::RaceCache;
use crate::utils::fmt_duration;

/// How long shutdown waits for the eviction task after cancelling it.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Periodically drops expired race cache entries.
///
/// The eviction loop runs on its own task so that it outlives the `run`
/// future; `shutdown` cancels it through the token and joins it.
pub struct CacheJanitor {
    cache: RaceCache,
    interval: Duration,
    token: CancellationToken,
    eviction: Option<JoinHandle<()>>,
}

impl CacheJanitor {
    pub fn new(cache: RaceCache, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            token: CancellationToken::new(),
            eviction: None,
        }
    }
}

#[async_trait::async_trait]
impl Service for CacheJanitor {
    fn name(&self) -> &'static str {
        "janitor"
    }

    async fn run(&mut self) -> Result<(), anyhow::Error> {
        debug!(
            interval = fmt_duration(self.interval),
            ttl = fmt_duration(self.cache.ttl()),
            "race cache janitor started"
        );

        let cache = self.cache.clone();
        let interval = self.interval;
        let token = self.token.clone();
        self.eviction = Some(tokio::spawn(async move {
            cache.run_eviction(interval, token).await;
        }));

        if let Some(eviction) = self.eviction.as_mut() {
            let joined = eviction.await;
            self.eviction = None;
            joined.context("race cache eviction task failed")?;
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), anyhow::Error> {
        self.token.cancel();

        if let Some(eviction) = self.eviction.take() {
            match tokio::time::timeout(STOP_GRACE, eviction).await {
                Ok(joined) => {
                    joined.context("race cache eviction task failed")?;
                    trace!("race cache eviction stopped gracefully");
                }
                Err(_) => warn!("race cache eviction did not stop within 5s, abandoning"),
            }
        }
        Ok(())
    }
}
