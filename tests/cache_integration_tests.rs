//! Integration Tests for the Cache
//!
//! Exercises the public API end to end: concurrent callers, custom eviction
//! policies, and the background sweeper on a multi-threaded runtime.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mini_cache::{Cache, CacheConfig, CacheError, EvictionPolicy, LruPolicy, ManualClock};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// First-in, first-out policy written against the public trait only.
#[derive(Default)]
struct FifoPolicy {
    queue: VecDeque<String>,
}

impl<V> EvictionPolicy<String, V> for FifoPolicy {
    fn on_add(&mut self, key: &String, _value: &V) {
        if !self.queue.contains(key) {
            self.queue.push_back(key.clone());
        }
    }

    fn on_access(&mut self, _key: &String, _value: &V) {}

    fn evict_candidate(&mut self) -> Option<String> {
        self.queue.front().cloned()
    }

    fn on_remove(&mut self, key: &String) {
        self.queue.retain(|k| k != key);
    }
}

// == Public API ==

#[test]
fn test_lru_scenario() {
    init_tracing();
    let cache = Cache::lru(2);

    cache.put("a", 1, 0);
    cache.put("b", 2, 0);
    assert_eq!(cache.get(&"a"), Some(1));
    cache.put("c", 3, 0);

    assert_eq!(cache.get(&"a"), Some(1));
    assert_eq!(cache.get(&"b"), None);
    assert_eq!(cache.get(&"c"), Some(3));
}

#[test]
fn test_stats_scenario() {
    let cache = Cache::lru(10);

    assert_eq!(cache.get(&"k"), None);
    cache.put("k", "v", 0);
    assert_eq!(cache.get(&"k"), Some("v"));
    assert_eq!(cache.get(&"k2"), None);

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.puts), (1, 2, 1));
    assert!((stats.hit_rate - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_custom_policy_is_pluggable() {
    let cache = Cache::new(2, FifoPolicy::default());

    cache.put("a".to_string(), 1, 0);
    cache.put("b".to_string(), 2, 0);
    // Access does not protect "a" under FIFO
    assert_eq!(cache.get(&"a".to_string()), Some(1));
    cache.put("c".to_string(), 3, 0);

    assert_eq!(cache.get(&"a".to_string()), None);
    assert_eq!(cache.get(&"b".to_string()), Some(2));
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result: Result<Cache<String, u8>, CacheError> =
        Cache::with_config(CacheConfig::new(0), LruPolicy::new());

    assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
}

#[test]
fn test_ttl_with_manual_clock() {
    let clock = ManualClock::new(0);
    let cache = Cache::with_clock(
        CacheConfig::new(10),
        LruPolicy::new(),
        Arc::new(clock.clone()),
    )
    .unwrap();

    cache.put("session", 7u64, 100);
    clock.advance(Duration::from_millis(50));
    assert_eq!(cache.get(&"session"), Some(7));

    clock.advance(Duration::from_millis(100));
    assert_eq!(cache.get(&"session"), None);
    assert_eq!(cache.stats().expirations, 1);
}

#[test]
fn test_ttl_with_system_clock() {
    let cache = Cache::lru(10);

    cache.put("short", 1, 100);
    assert_eq!(cache.get(&"short"), Some(1));

    thread::sleep(Duration::from_millis(150));
    assert_eq!(cache.get(&"short"), None);
}

// == Concurrency ==

#[test]
fn test_concurrent_puts_respect_capacity() {
    let cache = Arc::new(Cache::lru(64));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..500 {
                    cache.put(format!("{t}-{i}"), i, 0);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Only meaningful once writers are done: len() is not a point-in-time read
    let stats = cache.stats();
    assert_eq!(cache.len(), 64);
    assert_eq!(stats.entries, 64);
    assert_eq!(stats.puts, 4_000);
    assert_eq!(stats.evictions, 4_000 - 64);
}

#[test]
fn test_concurrent_readers_and_writers() {
    let cache = Arc::new(Cache::lru(32));
    for i in 0..32u64 {
        cache.put(i, i * 10, 0);
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut hits = 0u64;
                for round in 0..2_000u64 {
                    let key = round % 48;
                    if let Some(value) = cache.get(&key) {
                        assert_eq!(value, key * 10);
                        hits += 1;
                    }
                }
                hits
            })
        })
        .collect();

    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..2_000u64 {
                let key = i % 48;
                cache.put(key, key * 10, 0);
            }
        })
    };

    writer.join().unwrap();
    let total_hits: u64 = readers.into_iter().map(|r| r.join().unwrap()).sum();

    let stats = cache.stats();
    assert_eq!(stats.hits, total_hits);
    assert_eq!(stats.hits + stats.misses, 8_000);
    assert!(cache.len() <= 32);
}

// == Background Sweeper ==

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sweeper_on_multi_thread_runtime() {
    init_tracing();
    let clock = ManualClock::new(0);
    let config = CacheConfig::new(100).with_sweep_interval(Duration::from_millis(25));
    let cache = Cache::with_clock(config, LruPolicy::new(), Arc::new(clock.clone())).unwrap();

    for i in 0..10 {
        cache.put(i, i, 100);
    }
    cache.put(99, 99, 0);
    clock.advance(Duration::from_millis(200));

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(cache.len(), 1);
    let stats = cache.stats();
    assert_eq!(stats.expirations, 10);
    assert_eq!(stats.hits + stats.misses, 0);

    cache.shutdown();
    cache.put(1, 1, 10);
    clock.advance(Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_sweeper_under_block_on() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    rt.block_on(async {
        let clock = ManualClock::new(0);
        let config = CacheConfig::new(10).with_sweep_interval(Duration::from_millis(10));
        let cache = Cache::with_clock(config, LruPolicy::new(), Arc::new(clock.clone())).unwrap();

        cache.put("gone", 1, 5);
        clock.set(10);
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(cache.is_empty());
        cache.shutdown();
    });
}
