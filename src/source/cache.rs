//! TTL cache of parsed races, one snapshot per source.
//!
//! Each source owns a slot behind an async mutex, so a stale entry is
//! refreshed by exactly one caller while concurrent callers wait for it.
//! Readers get an `Arc<[RaceRecord]>` and never see a half-written entry.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::race::RaceRecord;
use crate::source::SourceKind;

#[derive(Debug)]
struct CacheEntry {
    fetched_at: Instant,
    races: Arc<[RaceRecord]>,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

#[derive(Debug, Clone)]
pub struct RaceCache {
    ttl: Duration,
    entries: Arc<DashMap<SourceKind, Slot>>,
}

impl RaceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn slot(&self, kind: SourceKind) -> Slot {
        self.entries.entry(kind).or_default().clone()
    }

    /// Return the cached races for `kind`, running `fetch` first when the
    /// entry is missing or at least `ttl` old.
    ///
    /// A failed fetch is returned to the caller as-is; the old entry is
    /// neither served nor refreshed.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        kind: SourceKind,
        fetch: F,
    ) -> Result<Arc<[RaceRecord]>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<RaceRecord>, E>>,
    {
        let slot = self.slot(kind);
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref()
            && cached.fetched_at.elapsed() < self.ttl
        {
            trace!(source = %kind, races = cached.races.len(), "Race cache hit");
            return Ok(cached.races.clone());
        }

        debug!(source = %kind, "Race cache miss, fetching");
        let races: Arc<[RaceRecord]> = fetch().await?.into();
        *entry = Some(CacheEntry {
            fetched_at: Instant::now(),
            races: races.clone(),
        });
        info!(source = %kind, races = races.len(), "Race cache refreshed");
        Ok(races)
    }

    /// Cached races for `kind` if present and fresh.
    pub async fn get(&self, kind: SourceKind) -> Option<Arc<[RaceRecord]>> {
        let slot = self.entries.get(&kind)?.clone();
        let entry = slot.lock().await;
        entry
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.races.clone())
    }

    /// Drop every entry at least `ttl` old. Slots that are mid-refresh are
    /// left alone. Returns how many entries were dropped.
    pub fn evict_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, slot| match slot.try_lock() {
            Ok(entry) => entry
                .as_ref()
                .is_some_and(|cached| cached.fetched_at.elapsed() < self.ttl),
            Err(_) => true,
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict expired entries every `interval` until `token` is cancelled.
    /// Cancellation is observed between ticks.
    pub async fn run_eviction(&self, interval: Duration, token: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // skip the immediate first tick

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Race cache eviction stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = self.evict_expired();
                    if evicted > 0 {
                        info!(evicted, remaining = self.len(), "Evicted expired race cache entries");
                    } else {
                        trace!("No expired race cache entries");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn races(name: &str) -> Vec<RaceRecord> {
        vec![RaceRecord {
            name: name.into(),
            ..Default::default()
        }]
    }

    #[tokio::test(start_paused = true)]
    async fn serves_fresh_entry_without_refetching() {
        let cache = RaceCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(races("Omloop"))
        };

        let first = cache.get_or_fetch(SourceKind::Tiz, fetch).await.unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        let second = cache.get_or_fetch(SourceKind::Tiz, fetch).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn refetches_at_ttl() {
        let cache = RaceCache::new(Duration::from_secs(60));
        cache
            .get_or_fetch(SourceKind::Tiz, || async { Ok::<_, Infallible>(races("old")) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        let refreshed = cache
            .get_or_fetch(SourceKind::Tiz, || async { Ok::<_, Infallible>(races("new")) })
            .await
            .unwrap();
        assert_eq!(refreshed[0].name, "new");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_does_not_serve_stale_entry() {
        let cache = RaceCache::new(Duration::from_secs(60));
        cache
            .get_or_fetch(SourceKind::Tiz, || async { Ok::<_, &str>(races("old")) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(120)).await;
        let result = cache
            .get_or_fetch(SourceKind::Tiz, || async { Err::<Vec<RaceRecord>, _>("down") })
            .await;
        assert_eq!(result.unwrap_err(), "down");
        assert!(cache.get(SourceKind::Tiz).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn sources_are_cached_separately() {
        let cache = RaceCache::new(Duration::from_secs(60));
        cache
            .get_or_fetch(SourceKind::Tiz, || async { Ok::<_, Infallible>(races("tiz")) })
            .await
            .unwrap();
        assert!(cache.get(SourceKind::Schedule).await.is_none());
        assert_eq!(cache.get(SourceKind::Tiz).await.unwrap()[0].name, "tiz");
    }

    #[tokio::test(start_paused = true)]
    async fn evicts_only_expired_entries() {
        let cache = RaceCache::new(Duration::from_secs(60));
        cache
            .get_or_fetch(SourceKind::Tiz, || async { Ok::<_, Infallible>(races("tiz")) })
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        cache
            .get_or_fetch(SourceKind::Schedule, || async {
                Ok::<_, Infallible>(races("schedule"))
            })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(SourceKind::Schedule).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn eviction_loop_stops_on_cancel() {
        let cache = RaceCache::new(Duration::from_secs(10));
        cache
            .get_or_fetch(SourceKind::Tiz, || async { Ok::<_, Infallible>(races("tiz")) })
            .await
            .unwrap();

        let token = CancellationToken::new();
        let task = tokio::spawn({
            let cache = cache.clone();
            let token = token.clone();
            async move { cache.run_eviction(Duration::from_secs(5), token).await }
        });

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(cache.is_empty());

        token.cancel();
        task.await.unwrap();
    }
}
