//! Error types for the ctxcache library.
//!
//! ## Key Components
//!
//! - [`CloseError`]: Returned by [`Context::close`](crate::traits::Context::close)
//!   implementations when a container fails to shut down cleanly. Carried in
//!   [`RemovalReport::close_failures`](crate::cache::RemovalReport) so one bad
//!   container never aborts a hierarchy sweep.
//! - [`InvariantError`]: Returned when internal bookkeeping invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use ctxcache::cache::HierarchyCache;
//! use ctxcache::error::CloseError;
//! use ctxcache::key::SimpleKey;
//! use ctxcache::traits::{Context, HierarchyMode};
//!
//! struct Flaky;
//!
//! impl Context for Flaky {
//!     fn close(&self) -> Result<(), CloseError> {
//!         Err(CloseError::new("connection pool already torn down"))
//!     }
//! }
//!
//! let mut cache = HierarchyCache::new();
//! let key = SimpleKey::root("flaky");
//! cache.insert(key.clone(), Flaky);
//!
//! // The entry is evicted even though close failed; the failure is reported.
//! let report = cache.remove(&key, HierarchyMode::CurrentLevel);
//! assert_eq!(report.evicted.len(), 1);
//! assert_eq!(report.close_failures.len(), 1);
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// CloseError
// ---------------------------------------------------------------------------

/// Error returned when a cached container fails to shut down cleanly.
///
/// Produced by [`Context::close`](crate::traits::Context::close) overrides.
/// During a removal sweep the cache records each failure alongside the key it
/// belongs to and keeps sweeping; the failing entry is still evicted. Carries
/// a human-readable description of what went wrong.
///
/// # Example
///
/// ```
/// use ctxcache::error::CloseError;
///
/// let err = CloseError::new("listener thread did not join");
/// assert!(err.to_string().contains("listener"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseError(String);

impl CloseError {
    /// Creates a new `CloseError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CloseError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by debug-only `check_invariants` methods on
/// [`HierarchyCache`](crate::cache::HierarchyCache) and
/// [`HierarchyIndex`](crate::ds::HierarchyIndex). Carries a human-readable
/// description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
