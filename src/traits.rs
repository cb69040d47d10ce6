//! # Context Cache Trait Hierarchy
//!
//! This module defines the seams between the cache and its embedder: how keys
//! expose their place in a configuration hierarchy, how cached containers
//! advertise an optional shutdown capability, and how container construction
//! is delegated to external code.
//!
//! ## Architecture
//!
//! ```text
//!   Embedder-provided                      ctxcache-provided
//!   ─────────────────                      ─────────────────
//!
//!   ┌──────────────────┐   keys    ┌─────────────────────────────┐
//!   │    ContextKey    ├──────────►│       HierarchyCache        │
//!   │ Clone+Eq+Hash    │           │  primary map + child index  │
//!   │ parent() link    │           └──────────────┬──────────────┘
//!   └──────────────────┘                          │ eviction sweep
//!                                                 ▼
//!   ┌──────────────────┐   values  ┌─────────────────────────────┐
//!   │     Context      ├──────────►│    close() on each entry    │
//!   │ close() no-op by │           │   (children before parent)  │
//!   │ default          │           └─────────────────────────────┘
//!   └──────────────────┘
//!
//!   ┌──────────────────┐   build   ┌─────────────────────────────┐
//!   │  ContextBuilder  ├──────────►│    CachingContextLoader     │
//!   │ expensive setup  │           │  contains → get → build     │
//!   └──────────────────┘           └─────────────────────────────┘
//! ```
//!
//! ## Design Goals
//!
//! - **Keys are consumed, never produced**: the cache needs equality, hashing,
//!   cloning, and a parent link. How a key is derived from configuration is
//!   the embedder's business.
//! - **Shutdown is a capability, not a type**: [`Context::close`] has a no-op
//!   default body. Containers that hold real resources override it; everything
//!   else participates in eviction without ceremony.
//! - **Construction stays outside**: [`ContextBuilder`] carries its own error
//!   type, and the loader propagates build failures unchanged.

use std::hash::Hash;

use crate::error::CloseError;

/// Identity of a cached container, with an optional link to a parent key.
///
/// Two keys that compare equal address the same cache slot. Parent links form
/// finite chains ending at a root key (`parent()` returns `None`). A cyclic
/// chain is a construction bug in the embedder's key type and is not defended
/// against.
///
/// # Example
///
/// ```
/// use ctxcache::key::SimpleKey;
/// use ctxcache::traits::ContextKey;
///
/// let root = SimpleKey::root("app");
/// let child = root.child("web");
///
/// assert!(root.parent().is_none());
/// assert_eq!(child.parent(), Some(&root));
/// ```
pub trait ContextKey: Clone + Eq + Hash {
    /// Returns the immediate parent key, or `None` for a root key.
    fn parent(&self) -> Option<&Self>;

    /// True when this key has no parent.
    #[inline]
    fn is_root(&self) -> bool {
        self.parent().is_none()
    }
}

/// A cacheable container.
///
/// The single capability is [`close`](Context::close), invoked by the cache
/// exactly once per evicted entry, children before parents. The default body
/// does nothing, so plain value types cache fine without writing any code:
///
/// ```
/// use ctxcache::cache::HierarchyCache;
/// use ctxcache::key::SimpleKey;
///
/// let mut cache: HierarchyCache<SimpleKey, String> = HierarchyCache::new();
/// cache.insert(SimpleKey::root("app"), "wired beans".to_string());
/// assert_eq!(cache.len(), 1);
/// ```
///
/// Containers owning real resources override `close`. A failure is reported
/// through [`RemovalReport::close_failures`](crate::cache::RemovalReport) and
/// never aborts the surrounding sweep; the entry is evicted regardless.
pub trait Context {
    /// Releases resources held by this container.
    ///
    /// Called once when the entry is evicted by
    /// [`remove`](crate::cache::HierarchyCache::remove). Not called by
    /// [`clear`](crate::cache::HierarchyCache::clear), which is a hard reset.
    fn close(&self) -> Result<(), CloseError> {
        Ok(())
    }
}

impl Context for String {}
impl Context for &'static str {}
impl Context for () {}
impl Context for Vec<u8> {}

/// Constructs a container from a key.
///
/// This is the expensive collaborator the cache exists to amortize: wiring a
/// full application context, starting an embedded server, loading fixtures.
/// The loader invokes it only on a cache miss.
///
/// `Error` carries no bounds; build failures flow through
/// [`CachingContextLoader::load`](crate::loader::CachingContextLoader::load)
/// untouched, so the embedder keeps its own error type end to end.
///
/// # Example
///
/// ```
/// use ctxcache::key::SimpleKey;
/// use ctxcache::traits::ContextBuilder;
///
/// struct FixtureBuilder;
///
/// impl ContextBuilder<SimpleKey, String> for FixtureBuilder {
///     type Error = std::io::Error;
///
///     fn build(&self, key: &SimpleKey) -> Result<String, Self::Error> {
///         Ok(format!("context for {}", key.name()))
///     }
/// }
///
/// let built = FixtureBuilder.build(&SimpleKey::root("app"));
/// assert_eq!(built.unwrap(), "context for app");
/// ```
pub trait ContextBuilder<K, V> {
    /// Error produced when construction fails.
    type Error;

    /// Builds the container identified by `key`.
    fn build(&self, key: &K) -> Result<V, Self::Error>;
}

/// Where a removal sweep starts relative to the given key.
///
/// - `CurrentLevel`: sweep the given key and its transitive children. Parent
///   and sibling contexts stay cached.
/// - `Exhaustive`: first walk parent links to the root, then sweep the whole
///   tree from there. Evicts every context sharing an ancestry with the given
///   key, siblings included.
///
/// `Exhaustive` is the default: when a context is declared dirty it is rarely
/// knowable whether the damage stopped at the current level.
///
/// # Example
///
/// ```
/// use ctxcache::cache::HierarchyCache;
/// use ctxcache::key::SimpleKey;
/// use ctxcache::traits::HierarchyMode;
///
/// let root = SimpleKey::root("r");
/// let child = root.child("c");
/// let grandchild = child.child("g");
///
/// let mut cache = HierarchyCache::new();
/// cache.insert(root.clone(), "r".to_string());
/// cache.insert(child.clone(), "c".to_string());
/// cache.insert(grandchild.clone(), "g".to_string());
///
/// // Exhaustive from the grandchild tears down the whole tree.
/// let report = cache.remove(&grandchild, HierarchyMode::Exhaustive);
/// assert_eq!(report.evicted.len(), 3);
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HierarchyMode {
    /// Sweep the given key and its transitive children only.
    CurrentLevel,
    /// Walk to the root key first, then sweep the entire tree.
    #[default]
    Exhaustive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::SimpleKey;

    struct NoopBuilder;

    impl ContextBuilder<SimpleKey, ()> for NoopBuilder {
        type Error = CloseError;

        fn build(&self, _key: &SimpleKey) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn default_close_is_noop() {
        let ctx = "plain".to_string();
        assert!(ctx.close().is_ok());
    }

    #[test]
    fn std_types_implement_context() {
        fn assert_context<T: Context>() {}
        assert_context::<String>();
        assert_context::<&'static str>();
        assert_context::<()>();
        assert_context::<Vec<u8>>();
    }

    #[test]
    fn is_root_follows_parent_link() {
        let root = SimpleKey::root("r");
        let child = root.child("c");
        assert!(root.is_root());
        assert!(!child.is_root());
    }

    #[test]
    fn builder_is_usable_through_the_trait() {
        fn build_with<B: ContextBuilder<SimpleKey, ()>>(builder: &B) -> Result<(), B::Error> {
            builder.build(&SimpleKey::root("k"))
        }
        assert!(build_with(&NoopBuilder).is_ok());
    }

    #[test]
    fn hierarchy_mode_defaults_to_exhaustive() {
        assert_eq!(HierarchyMode::default(), HierarchyMode::Exhaustive);
    }
}
