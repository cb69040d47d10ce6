// ==============================================
// HIERARCHY INVALIDATION TESTS (integration)
// ==============================================
//
// End-to-end scenarios for the single-threaded cache: ancestor registration,
// subtree sweeps under both removal modes, close ordering, survivor
// bookkeeping, and statistics. These chain several operations together and
// belong here rather than in any single source file.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ctxcache::prelude::*;

/// Context that records every close into a shared log.
#[derive(Debug)]
struct TrackedContext {
    name: &'static str,
    closes: Arc<AtomicUsize>,
    order: Arc<Mutex<Vec<&'static str>>>,
    fail_close: bool,
}

impl Context for TrackedContext {
    fn close(&self) -> Result<(), CloseError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.order.lock().unwrap().push(self.name);
        if self.fail_close {
            Err(CloseError::new(format!("{} refused to close", self.name)))
        } else {
            Ok(())
        }
    }
}

/// Shared bookkeeping handed to every [`TrackedContext`] in a test.
#[derive(Default)]
struct CloseLog {
    closes: Arc<AtomicUsize>,
    order: Arc<Mutex<Vec<&'static str>>>,
}

impl CloseLog {
    fn context(&self, name: &'static str) -> TrackedContext {
        TrackedContext {
            name,
            closes: Arc::clone(&self.closes),
            order: Arc::clone(&self.order),
            fail_close: false,
        }
    }

    fn failing(&self, name: &'static str) -> TrackedContext {
        TrackedContext {
            fail_close: true,
            ..self.context(name)
        }
    }

    fn total_closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn order(&self) -> Vec<&'static str> {
        self.order.lock().unwrap().clone()
    }
}

fn position(order: &[&'static str], name: &'static str) -> usize {
    order
        .iter()
        .position(|entry| *entry == name)
        .unwrap_or_else(|| panic!("{} never closed; order was {:?}", name, order))
}

// ==============================================
// Ancestor Registration
// ==============================================

mod ancestor_registration {
    use super::*;

    #[test]
    fn leaf_insert_registers_every_ancestor() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let leaf = SimpleKey::root("app").child("web").child("request");
        cache.insert(leaf, log.context("request"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.parent_context_count(), 2);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn siblings_share_one_parent_slot() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let root = SimpleKey::root("app");
        for name in ["a", "b", "c"] {
            cache.insert(root.child(name), log.context("child"));
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.parent_context_count(), 1);
    }

    #[test]
    fn replacing_an_entry_does_not_close_the_old_context() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();
        let key = SimpleKey::root("app");

        let old = cache.insert(key.clone(), log.context("old"));
        assert!(old.is_none());

        let previous = cache.insert(key.clone(), log.context("new"));
        assert!(previous.is_some());
        assert_eq!(log.total_closes(), 0);
        assert_eq!(cache.len(), 1);
    }
}

// ==============================================
// Exhaustive Removal
// ==============================================

mod exhaustive_removal {
    use super::*;

    #[test]
    fn removing_a_mid_level_key_sweeps_from_the_root() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let root = SimpleKey::root("root");
        let mid = root.child("mid");
        let leaf = mid.child("leaf");
        let sibling = root.child("sibling");

        cache.insert(root.clone(), log.context("root"));
        cache.insert(mid.clone(), log.context("mid"));
        cache.insert(leaf.clone(), log.context("leaf"));
        cache.insert(sibling.clone(), log.context("sibling"));

        let report = cache.remove(&mid, HierarchyMode::Exhaustive);

        assert_eq!(report.evicted_len(), 4);
        assert!(cache.is_empty());
        assert_eq!(cache.parent_context_count(), 0);
        cache.check_invariants().unwrap();

        let order = log.order();
        assert!(position(&order, "leaf") < position(&order, "mid"));
        assert!(position(&order, "mid") < position(&order, "root"));
        assert!(position(&order, "sibling") < position(&order, "root"));
    }

    #[test]
    fn uncached_ancestors_still_anchor_the_sweep() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        // Only the leaves are cached; root and branch exist purely as
        // hierarchy bookkeeping.
        let root = SimpleKey::root("root");
        let branch = root.child("branch");
        let left = branch.child("left");
        let right = branch.child("right");

        cache.insert(left.clone(), log.context("left"));
        cache.insert(right.clone(), log.context("right"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.parent_context_count(), 2);

        let report = cache.remove(&left, HierarchyMode::Exhaustive);

        assert_eq!(report.evicted_len(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.parent_context_count(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn removing_an_unknown_key_under_a_known_root_still_sweeps() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let root = SimpleKey::root("root");
        cache.insert(root.clone(), log.context("root"));

        // Never inserted, but shares the cached root.
        let phantom = root.child("phantom");
        let report = cache.remove(&phantom, HierarchyMode::Exhaustive);

        assert_eq!(report.evicted_len(), 1);
        assert!(cache.is_empty());
    }
}

// ==============================================
// Current-Level Removal
// ==============================================

mod current_level_removal {
    use super::*;

    #[test]
    fn only_the_subtree_below_the_key_is_swept() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let root = SimpleKey::root("root");
        let mid = root.child("mid");
        let leaf = mid.child("leaf");
        let sibling = root.child("sibling");

        cache.insert(root.clone(), log.context("root"));
        cache.insert(mid.clone(), log.context("mid"));
        cache.insert(leaf.clone(), log.context("leaf"));
        cache.insert(sibling.clone(), log.context("sibling"));

        let report = cache.remove(&mid, HierarchyMode::CurrentLevel);

        assert_eq!(report.evicted_len(), 2);
        assert!(cache.contains(&root));
        assert!(cache.contains(&sibling));
        assert!(!cache.contains(&mid));
        assert!(!cache.contains(&leaf));
        cache.check_invariants().unwrap();

        let order = log.order();
        assert_eq!(position(&order, "leaf") + 1, position(&order, "mid"));
    }

    #[test]
    fn survivors_keep_working_after_a_partial_sweep() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let root = SimpleKey::root("root");
        let gone = root.child("gone");
        let kept = root.child("kept");

        cache.insert(root.clone(), log.context("root"));
        cache.insert(gone.clone(), log.context("gone"));
        cache.insert(kept.clone(), log.context("kept"));

        cache.remove(&gone, HierarchyMode::CurrentLevel);

        // The surviving branch is still reachable and re-insertion under the
        // removed branch works from a clean slate.
        assert!(cache.get(&kept).is_some());
        cache.insert(gone.child("reborn"), log.context("reborn"));
        assert_eq!(cache.len(), 3);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn second_removal_of_the_same_key_is_a_no_op() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let key = SimpleKey::root("once");
        cache.insert(key.clone(), log.context("once"));

        let first = cache.remove(&key, HierarchyMode::CurrentLevel);
        let second = cache.remove(&key, HierarchyMode::CurrentLevel);

        assert_eq!(first.evicted_len(), 1);
        assert!(second.is_empty());
        assert_eq!(log.total_closes(), 1);
    }
}

// ==============================================
// Close Failures
// ==============================================

mod close_failures {
    use super::*;

    #[test]
    fn a_failing_close_does_not_stop_the_sweep() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let root = SimpleKey::root("root");
        let bad = root.child("bad");
        let good = root.child("good");

        cache.insert(root.clone(), log.context("root"));
        cache.insert(bad.clone(), log.failing("bad"));
        cache.insert(good.clone(), log.context("good"));

        let report = cache.remove(&root, HierarchyMode::CurrentLevel);

        // Everything is evicted even though one close failed.
        assert_eq!(report.evicted_len(), 3);
        assert_eq!(report.failed_len(), 1);
        assert!(cache.is_empty());

        let (failed_key, err) = &report.close_failures[0];
        assert_eq!(failed_key.name(), "bad");
        assert_eq!(err.message(), "bad refused to close");
    }

    #[test]
    fn every_context_is_closed_exactly_once_even_with_failures() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let root = SimpleKey::root("root");
        cache.insert(root.clone(), log.failing("root"));
        for name in ["a", "b", "c"] {
            cache.insert(root.child(name), log.failing("child"));
        }

        let report = cache.remove(&root, HierarchyMode::Exhaustive);

        assert_eq!(report.evicted_len(), 4);
        assert_eq!(report.failed_len(), 4);
        assert_eq!(log.total_closes(), 4);
        assert!(cache.remove(&root, HierarchyMode::Exhaustive).is_empty());
    }
}

// ==============================================
// Clearing
// ==============================================

mod clearing {
    use super::*;

    #[test]
    fn clear_drops_everything_without_closing() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();

        let root = SimpleKey::root("root");
        cache.insert(root.clone(), log.context("root"));
        cache.insert(root.child("a"), log.context("a"));
        cache.insert(root.child("b"), log.context("b"));

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.parent_context_count(), 0);
        assert_eq!(log.total_closes(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn handles_outlive_a_clear() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();
        let key = SimpleKey::root("survivor");

        cache.insert(key.clone(), log.context("survivor"));
        let handle = cache.get(&key).unwrap();

        cache.clear();

        // The caller's handle still works after the cache dropped its own.
        assert_eq!(handle.name, "survivor");
    }
}

// ==============================================
// Statistics Lifecycle
// ==============================================

mod statistics_lifecycle {
    use super::*;

    #[test]
    fn hits_and_misses_accumulate_across_operations() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();
        let key = SimpleKey::root("stats");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), log.context("stats"));
        assert!(cache.get(&key).is_some());
        assert!(cache.get(&key).is_some());
        assert!(cache.get(&SimpleKey::root("other")).is_none());

        let stats = cache.statistics();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.len, 1);
    }

    #[test]
    fn clearing_statistics_leaves_contents_alone() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();
        let key = SimpleKey::root("stats");

        cache.insert(key.clone(), log.context("stats"));
        cache.get(&key);
        cache.get(&SimpleKey::root("missing"));

        cache.clear_statistics();

        let stats = cache.statistics();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.len, 1);
        assert!(cache.contains(&key));
    }

    #[test]
    fn peek_and_contains_never_move_the_counters() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();
        let key = SimpleKey::root("quiet");

        cache.insert(key.clone(), log.context("quiet"));
        assert!(cache.peek(&key).is_some());
        assert!(cache.contains(&key));
        assert!(cache.peek(&SimpleKey::root("absent")).is_none());

        assert_eq!(cache.hit_count(), 0);
        assert_eq!(cache.miss_count(), 0);
    }
}

// ==============================================
// Larger Workloads
// ==============================================

mod larger_workloads {
    use super::*;

    #[test]
    fn three_level_fanout_builds_and_tears_down_cleanly() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();
        let fanout = 8;

        let root = SimpleKey::root("root");
        cache.insert(root.clone(), log.context("root"));
        for b in 0..fanout {
            let branch = root.child(format!("branch-{}", b));
            cache.insert(branch.clone(), log.context("branch"));
            for l in 0..fanout {
                cache.insert(branch.child(format!("leaf-{}", l)), log.context("leaf"));
            }
        }

        assert_eq!(cache.len(), 1 + fanout + fanout * fanout);
        assert_eq!(cache.parent_context_count(), 1 + fanout);
        cache.check_invariants().unwrap();

        // Tear down branch by branch; the root must survive until the end.
        for b in 0..fanout {
            let branch = root.child(format!("branch-{}", b));
            let report = cache.remove(&branch, HierarchyMode::CurrentLevel);
            assert_eq!(report.evicted_len(), 1 + fanout);
            assert!(cache.contains(&root));
            cache.check_invariants().unwrap();
        }

        let report = cache.remove(&root, HierarchyMode::CurrentLevel);
        assert_eq!(report.evicted_len(), 1);
        assert!(cache.is_empty());
        assert_eq!(log.total_closes(), 1 + fanout + fanout * fanout);
    }

    #[test]
    fn interleaved_insert_and_remove_keeps_the_index_consistent() {
        let log = CloseLog::default();
        let mut cache = HierarchyCache::new();
        let root = SimpleKey::root("churn");

        for round in 0..50 {
            let branch = root.child(format!("round-{}", round % 5));
            cache.insert(branch.clone(), log.context("branch"));
            cache.insert(branch.child("leaf"), log.context("leaf"));

            if round % 3 == 0 {
                cache.remove(&branch, HierarchyMode::CurrentLevel);
            }
            cache.check_invariants().unwrap();
        }

        // Final exhaustive sweep from any surviving key empties everything.
        let report = cache.remove(&root.child("round-1"), HierarchyMode::Exhaustive);
        assert!(!report.is_empty());
        assert!(cache.is_empty());
        assert_eq!(cache.parent_context_count(), 0);
    }
}
