//! Example demonstrating CachingContextLoader over a shared cache.
//!
//! Run with: cargo run --example caching_loader

use std::sync::Arc;

use ctxcache::error::CloseError;
use ctxcache::prelude::*;

struct EnvBuilder;

impl ContextBuilder<SimpleKey, String> for EnvBuilder {
    type Error = CloseError;

    fn build(&self, key: &SimpleKey) -> Result<String, Self::Error> {
        if key.name() == "broken" {
            return Err(CloseError::new("missing configuration"));
        }
        println!("   building {}", key);
        Ok(format!("context for {}", key))
    }
}

fn main() {
    println!("=== Caching Loader Example ===\n");

    let cache = Arc::new(ConcurrentHierarchyCache::new());
    let loader = CachingContextLoader::new(Arc::clone(&cache), EnvBuilder);

    let app = SimpleKey::root("app");
    let web = app.child("web");

    println!("1. First load builds");
    let first = loader.load(&web).unwrap();
    println!("   got: {}", first);
    println!();

    println!("2. Second load hits the cache (no build line)");
    let second = loader.load(&web).unwrap();
    println!("   same handle? {}", Arc::ptr_eq(&first, &second));
    println!("   hits so far: {}", cache.hit_count());
    println!();

    println!("3. Builder failures propagate and cache nothing");
    match loader.load(&app.child("broken")) {
        Ok(_) => println!("   unexpected success"),
        Err(err) => println!("   load failed: {}", err),
    }
    println!("   len: {}", cache.len());
    println!();

    println!("4. Loading a parent later joins the same hierarchy");
    loader.load(&app).unwrap();
    println!(
        "   len: {}, parent contexts: {}",
        cache.len(),
        cache.parent_context_count()
    );
    println!();

    println!("5. Closing the root evicts the whole tree");
    let report = loader.close(&app, HierarchyMode::Exhaustive);
    println!("   evicted {} entries", report.evicted_len());
    println!("   is_empty: {}", cache.is_empty());
    println!("   handle still readable: {}", first);
}

// Expected output:
// === Caching Loader Example ===
//
// 1. First load builds
//    building app/web
//    got: context for app/web
//
// 2. Second load hits the cache (no build line)
//    same handle? true
//    hits so far: 1
//
// 3. Builder failures propagate and cache nothing
//    load failed: missing configuration
//    len: 1
//
// 4. Loading a parent later joins the same hierarchy
//    building app
//    len: 2, parent contexts: 1
//
// 5. Closing the root evicts the whole tree
//    evicted 2 entries
//    is_empty: true
//    handle still readable: context for app/web
