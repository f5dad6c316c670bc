//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::store::Shared;
use crate::cache::EvictionPolicy;

/// Owning handle to a running sweeper task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task to exit and aborts it.
    pub fn stop(self) {
        let _ = self.shutdown_tx.send(());
        self.handle.abort();
        info!("TTL sweeper stopped");
    }
}

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs on the Tokio runtime the caller is inside of, and holds
/// only a weak reference to the cache, exiting once the cache is gone.
/// Each pass runs under the cache's sweep gate, so a pass never starts
/// after shutdown.
///
/// Returns `None` when called outside a Tokio runtime, or when the first
/// tick would not fit in an `Instant`.
pub(crate) fn spawn_sweeper<K, V, P>(
    shared: &Arc<Shared<K, V, P>>,
    sweep_interval: Duration,
) -> Option<SweeperHandle>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    P: EvictionPolicy<K, V> + 'static,
{
    let Ok(runtime) = Handle::try_current() else {
        warn!("No Tokio runtime available, TTL sweeper disabled; expired entries are removed on access");
        return None;
    };

    let Some(first_tick) = first_tick(sweep_interval) else {
        warn!(
            "Sweep interval of {} ms is out of range, TTL sweeper disabled",
            sweep_interval.as_millis()
        );
        return None;
    };

    let shared: Weak<Shared<K, V, P>> = Arc::downgrade(shared);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let handle = runtime.spawn(async move {
        info!(
            "Starting TTL sweeper with interval of {} ms",
            sweep_interval.as_millis()
        );

        let mut ticker = interval_at(first_tick, sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {}
            }

            let Some(cache) = shared.upgrade() else {
                break;
            };

            match cache.sweep_if_active() {
                Some(0) => debug!("TTL sweep: no expired entries found"),
                Some(removed) => info!("TTL sweep: removed {} expired entries", removed),
                None => break,
            }
        }

        debug!("TTL sweeper exiting");
    });

    Some(SweeperHandle {
        shutdown_tx,
        handle,
    })
}

/// Deadline of the first sweep, `None` if it overflows `Instant`.
fn first_tick(sweep_interval: Duration) -> Option<Instant> {
    Instant::now().checked_add(sweep_interval)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::cache::{Cache, LruPolicy, ManualClock};
    use crate::config::CacheConfig;

    fn swept_cache(interval_ms: u64) -> (Cache<String, String>, ManualClock) {
        let clock = ManualClock::new(0);
        let config = CacheConfig::new(100).with_sweep_interval(Duration::from_millis(interval_ms));
        let cache = Cache::with_clock(config, LruPolicy::new(), Arc::new(clock.clone())).unwrap();
        (cache, clock)
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let (cache, clock) = swept_cache(20);

        cache.put("expire_soon".to_string(), "value".to_string(), 100);
        clock.advance(Duration::from_millis(150));

        // Wait for a few sweep passes
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.len(), 0, "Expired entry should have been swept");
        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
    }

    #[tokio::test]
    async fn test_sweeper_preserves_valid_entries() {
        let (cache, clock) = swept_cache(20);

        cache.put("long_lived".to_string(), "value".to_string(), 3_600_000);
        cache.put("forever".to_string(), "value".to_string(), 0);
        clock.advance(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"long_lived".to_string()), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_no_sweep_after_shutdown() {
        let (cache, clock) = swept_cache(20);

        cache.shutdown();
        cache.shutdown();

        cache.put("expired".to_string(), "value".to_string(), 10);
        clock.advance(Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(150)).await;

        // Still present: only a read or an explicit cleanup can remove it now
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expirations, 0);
        assert_eq!(cache.get(&"expired".to_string()), None);
    }

    #[test]
    fn test_first_tick_rejects_unrepresentable_interval() {
        assert!(super::first_tick(Duration::from_millis(20)).is_some());
        assert!(super::first_tick(Duration::MAX).is_none());
    }

    #[tokio::test]
    async fn test_dropping_cache_stops_sweeper() {
        let (cache, clock) = swept_cache(10);
        cache.put("k".to_string(), "v".to_string(), 5);
        drop(cache);
        clock.advance(Duration::from_millis(20));

        // The task must neither panic nor keep the cache alive
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
