//! Ready-made hierarchical key for embedders without their own key type.
//!
//! [`SimpleKey`] is a name plus an optional parent link, cheap to clone
//! (`Arc`-backed) and usable as-is for tests, demos, and small embeddings.
//! Production embedders with a real configuration fingerprint implement
//! [`ContextKey`](crate::traits::ContextKey) on their own type instead.

use std::fmt;
use std::sync::Arc;

use crate::traits::ContextKey;

/// A named key in a context hierarchy.
///
/// Equality and hashing cover the whole chain: two keys are the same slot
/// only when their names and all ancestor names agree.
///
/// # Example
///
/// ```
/// use ctxcache::key::SimpleKey;
///
/// let root = SimpleKey::root("app");
/// let web = root.child("web");
/// let api = root.child("api");
///
/// assert_eq!(web, root.child("web"));
/// assert_ne!(web, api);
/// assert_eq!(web.depth(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleKey {
    name: Arc<str>,
    parent: Option<Arc<SimpleKey>>,
}

impl SimpleKey {
    /// Creates a root key with no parent.
    pub fn root(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Creates a child of this key.
    pub fn child(&self, name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            parent: Some(Arc::new(self.clone())),
        }
    }

    /// Returns the key's own name (not the full path).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of ancestors above this key. A root key has depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }
}

impl ContextKey for SimpleKey {
    #[inline]
    fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }
}

impl fmt::Display for SimpleKey {
    /// Writes the full path from the root, slash-separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent.as_deref() {
            write!(f, "{}/{}", parent, self.name)?;
        } else {
            f.write_str(&self.name)?;
        }
        Ok(())
    }
}
