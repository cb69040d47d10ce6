//! Parent → children index over hierarchical keys.
//!
//! Tracks, for every parent key, the set of direct child keys seen by the
//! cache. The cache consults it during a removal sweep to find the subtree
//! that must go, then asks it to scrub the evicted keys from whatever sets
//! remain. Holds key identities only, never container handles, so an index
//! entry keeps no container alive.
//!
//! ## Architecture
//!
//! ```text
//!   children: HashMap<K, HashSet<K>>        key chains (embedder-owned)
//!   ┌──────────┬───────────────┐
//!   │ root     │ {child_a,     │                  root
//!   │          │  child_b}     │                 /    \
//!   │ child_a  │ {grandchild}  │           child_a   child_b
//!   └──────────┴───────────────┘              │
//!                                        grandchild
//! ```
//!
//! ## Behavior
//! - `register(k)`: walks `k`'s parent chain to the root, filing each key
//!   under its parent. Runs on every insert, whether or not the ancestors are
//!   themselves cached, so the index may hold entries for keys the primary
//!   map has never seen.
//! - `take_children(k)`: detaches and returns `k`'s direct-child set.
//! - `strip(keys)` + `prune_empty()`: post-sweep scrub. No removed key may
//!   stay referenced, no empty set may remain.
//!
//! ## Performance
//! - `register`: O(depth) hash operations
//! - `take_children` / `contains_parent`: O(1) average
//! - `strip`: O(parents × stripped keys); `prune_empty`: O(parents)
//!
//! ## Example Usage
//!
//! ```
//! use ctxcache::ds::HierarchyIndex;
//! use ctxcache::key::SimpleKey;
//!
//! let root = SimpleKey::root("r");
//! let child = root.child("c");
//!
//! let mut index = HierarchyIndex::new();
//! index.register(&child);
//!
//! assert!(index.contains_parent(&root));
//! assert_eq!(index.parent_count(), 1);
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::InvariantError;
use crate::traits::ContextKey;

/// Derived mapping from parent keys to their direct children.
#[derive(Debug, Clone)]
pub struct HierarchyIndex<K> {
    children: FxHashMap<K, FxHashSet<K>>,
}

impl<K: ContextKey> HierarchyIndex<K> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            children: FxHashMap::default(),
        }
    }

    /// Files `key` under its parent, and every ancestor under its own parent,
    /// up to the root.
    ///
    /// Idempotent: re-registering an already-known chain changes nothing.
    pub fn register(&mut self, key: &K) {
        let mut child = key;
        while let Some(parent) = child.parent() {
            self.children
                .entry(parent.clone())
                .or_default()
                .insert(child.clone());
            child = parent;
        }
    }

    /// Returns the direct children recorded for `key`, if any.
    #[inline]
    pub fn children(&self, key: &K) -> Option<&FxHashSet<K>> {
        self.children.get(key)
    }

    /// Detaches and returns the direct-child set recorded for `key`.
    #[inline]
    pub fn take_children(&mut self, key: &K) -> Option<FxHashSet<K>> {
        self.children.remove(key)
    }

    /// True when `key` currently has at least one recorded child.
    #[inline]
    pub fn contains_parent(&self, key: &K) -> bool {
        self.children.contains_key(key)
    }

    /// Number of distinct parent keys currently tracked.
    #[inline]
    pub fn parent_count(&self) -> usize {
        self.children.len()
    }

    /// True when no parent is tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates over the tracked parent keys.
    pub fn parents(&self) -> impl Iterator<Item = &K> {
        self.children.keys()
    }

    /// Removes every key in `removed` from every remaining child set.
    pub fn strip(&mut self, removed: &[K]) {
        for set in self.children.values_mut() {
            for key in removed {
                set.remove(key);
            }
        }
    }

    /// Deletes parent entries whose child set has become empty.
    pub fn prune_empty(&mut self) {
        self.children.retain(|_, set| !set.is_empty());
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Verifies structural invariants; for debug and test use.
    ///
    /// Checked: no child set is empty (callers must prune after stripping),
    /// and every recorded edge agrees with the child's own parent link.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (parent, set) in &self.children {
            if set.is_empty() {
                return Err(InvariantError::new("empty child set left unpruned"));
            }
            for child in set {
                if child.parent() != Some(parent) {
                    return Err(InvariantError::new(
                        "child filed under a key that is not its parent",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl<K: ContextKey> Default for HierarchyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
