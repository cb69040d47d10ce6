// ==============================================
// LOADER CONCURRENCY TESTS (integration)
// ==============================================
//
// Exercises CachingContextLoader and ConcurrentHierarchyCache from many
// threads at once: shared loading over a small key universe, builder failure
// propagation, and sweeps racing against loads.

#![cfg(feature = "concurrency")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

mod shared_loading {
    use ctxcache::prelude::*;

    use super::*;

    struct CountingBuilder {
        builds: AtomicUsize,
    }

    impl CountingBuilder {
        fn new() -> Self {
            Self {
                builds: AtomicUsize::new(0),
            }
        }
    }

    impl ContextBuilder<SimpleKey, String> for CountingBuilder {
        type Error = CloseError;

        fn build(&self, key: &SimpleKey) -> Result<String, Self::Error> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(format!("context:{}", key))
        }
    }

    #[test]
    fn many_threads_share_one_small_key_universe() {
        let cache = Arc::new(ConcurrentHierarchyCache::new());
        let loader = Arc::new(CachingContextLoader::new(
            Arc::clone(&cache),
            CountingBuilder::new(),
        ));

        let root = SimpleKey::root("app");
        let universe: Vec<SimpleKey> = (0..8).map(|i| root.child(format!("env-{}", i))).collect();
        let num_threads = 8;
        let rounds = 100;

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let loader = Arc::clone(&loader);
                let universe = universe.clone();

                thread::spawn(move || {
                    for round in 0..rounds {
                        for key in &universe {
                            let context = loader.load(key).unwrap();
                            assert!(context.starts_with("context:"), "round {}", round);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Racing loaders may build a key more than once, but the cache never
        // holds more than one entry per key.
        assert_eq!(cache.len(), universe.len());
        assert_eq!(cache.parent_context_count(), 1);
        assert!(cache.hit_count() > 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn a_warm_cache_serves_hits_without_rebuilding() {
        let cache = Arc::new(ConcurrentHierarchyCache::new());
        let loader = Arc::new(CachingContextLoader::new(
            Arc::clone(&cache),
            CountingBuilder::new(),
        ));

        let key = SimpleKey::root("warm");
        loader.load(&key).unwrap();
        assert_eq!(cache.len(), 1);

        let num_threads = 8;
        let reads = 200;

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let loader = Arc::clone(&loader);
                let key = key.clone();

                thread::spawn(move || {
                    for _ in 0..reads {
                        let context = loader.load(&key).unwrap();
                        assert_eq!(*context, "context:warm");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Everything after warmup was a hit against the single cached entry.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hit_count(), (num_threads * reads) as u64);
    }
}

mod builder_failures {
    use ctxcache::prelude::*;

    use super::*;

    struct FlakyBuilder;

    impl ContextBuilder<SimpleKey, String> for FlakyBuilder {
        type Error = CloseError;

        fn build(&self, key: &SimpleKey) -> Result<String, Self::Error> {
            if key.name().starts_with("broken") {
                Err(CloseError::new(format!("cannot wire {}", key.name())))
            } else {
                Ok(format!("context:{}", key.name()))
            }
        }
    }

    #[test]
    fn failures_propagate_to_every_caller_and_cache_nothing() {
        let cache = Arc::new(ConcurrentHierarchyCache::new());
        let loader = Arc::new(CachingContextLoader::new(Arc::clone(&cache), FlakyBuilder));

        let root = SimpleKey::root("app");
        let broken = root.child("broken-db");
        let healthy = root.child("healthy");

        let failures = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                let broken = broken.clone();
                let healthy = healthy.clone();
                let failures = Arc::clone(&failures);

                thread::spawn(move || {
                    for _ in 0..50 {
                        if loader.load(&broken).is_err() {
                            failures.fetch_add(1, Ordering::SeqCst);
                        }
                        assert!(loader.load(&healthy).is_ok());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Every broken load failed, and none of them left a cache entry.
        assert_eq!(failures.load(Ordering::SeqCst), 8 * 50);
        assert!(!cache.contains(&broken));
        assert_eq!(cache.len(), 1);
        cache.check_invariants().unwrap();
    }
}

mod sweeps_under_load {
    use ctxcache::prelude::*;

    use super::*;

    struct EchoBuilder;

    impl ContextBuilder<SimpleKey, String> for EchoBuilder {
        type Error = CloseError;

        fn build(&self, key: &SimpleKey) -> Result<String, Self::Error> {
            Ok(key.to_string())
        }
    }

    #[test]
    fn removal_sweeps_race_loads_without_corrupting_the_index() {
        let cache = Arc::new(ConcurrentHierarchyCache::new());
        let loader = Arc::new(CachingContextLoader::new(Arc::clone(&cache), EchoBuilder));

        let root = SimpleKey::root("svc");
        let num_loaders = 6;
        let rounds = 150;

        let loader_handles: Vec<_> = (0..num_loaders)
            .map(|thread_id| {
                let loader = Arc::clone(&loader);
                let root = root.clone();

                thread::spawn(move || {
                    for round in 0..rounds {
                        let key = root
                            .child(format!("worker-{}", thread_id))
                            .child(format!("task-{}", round % 10));
                        let context = loader.load(&key).unwrap();
                        assert!(context.ends_with(&format!("task-{}", round % 10)));
                    }
                })
            })
            .collect();

        let sweeper = {
            let loader = Arc::clone(&loader);
            let root = root.clone();

            thread::spawn(move || {
                for i in 0..40 {
                    let target = root.child(format!("worker-{}", i % num_loaders));
                    let report = loader.close(&target, HierarchyMode::CurrentLevel);
                    assert!(report.close_failures.is_empty());
                    thread::yield_now();
                }
            })
        };

        for handle in loader_handles {
            handle.join().unwrap();
        }
        sweeper.join().unwrap();

        cache.check_invariants().unwrap();

        // A final exhaustive sweep from anywhere in the tree empties it.
        loader.close(
            &root.child("worker-0").child("task-0"),
            HierarchyMode::Exhaustive,
        );
        assert!(cache.is_empty());
        assert_eq!(cache.parent_context_count(), 0);
    }

    #[test]
    fn evicted_handles_stay_usable() {
        let cache = Arc::new(ConcurrentHierarchyCache::new());
        let loader = CachingContextLoader::new(Arc::clone(&cache), EchoBuilder);

        let key = SimpleKey::root("ephemeral");
        let handle = loader.load(&key).unwrap();

        let report = loader.close(&key, HierarchyMode::CurrentLevel);
        assert_eq!(report.evicted_len(), 1);

        // The loader's caller still owns a live handle.
        assert_eq!(*handle, "ephemeral");
        assert!(cache.is_empty());
    }
}
