//! Example walking through hierarchical insert, lookup, and removal.
//!
//! Run with: cargo run --example basic_hierarchy

use ctxcache::error::CloseError;
use ctxcache::prelude::*;

struct Service {
    name: &'static str,
}

impl Context for Service {
    fn close(&self) -> Result<(), CloseError> {
        println!("   closing {}", self.name);
        Ok(())
    }
}

fn main() {
    println!("=== Hierarchy Cache Example ===\n");

    let mut cache: HierarchyCache<SimpleKey, Service> = HierarchyCache::new();

    // root -> web -> sessions, root -> batch
    let root = SimpleKey::root("root");
    let web = root.child("web");
    let sessions = web.child("sessions");
    let batch = root.child("batch");

    println!("1. Building the tree");
    cache.insert(root.clone(), Service { name: "root" });
    cache.insert(web.clone(), Service { name: "web" });
    cache.insert(sessions.clone(), Service { name: "sessions" });
    cache.insert(batch.clone(), Service { name: "batch" });
    println!(
        "   len: {}, parent contexts: {}",
        cache.len(),
        cache.parent_context_count()
    );
    println!();

    println!("2. Lookups");
    if let Some(service) = cache.get(&web) {
        println!("   hit web: {}", service.name);
    }
    println!("   contains batch? {}", cache.contains(&batch));
    println!();

    println!("3. Current-level removal of web (children close first)");
    let report = cache.remove(&web, HierarchyMode::CurrentLevel);
    println!(
        "   evicted {} entries, {} close failures",
        report.evicted_len(),
        report.failed_len()
    );
    println!("   root survives? {}", cache.contains(&root));
    println!();

    println!("4. Exhaustive removal from a leaf sweeps the whole tree");
    let report = cache.remove(&batch, HierarchyMode::Exhaustive);
    println!("   evicted {} entries", report.evicted_len());
    println!("   is_empty: {}", cache.is_empty());
    println!();

    println!("5. Statistics");
    let stats = cache.statistics();
    println!(
        "   hits: {}, misses: {}, len: {}, parent contexts: {}",
        stats.hits, stats.misses, stats.len, stats.parent_contexts
    );
}

// Expected output:
// === Hierarchy Cache Example ===
//
// 1. Building the tree
//    len: 4, parent contexts: 2
//
// 2. Lookups
//    hit web: web
//    contains batch? true
//
// 3. Current-level removal of web (children close first)
//    closing sessions
//    closing web
//    evicted 2 entries, 0 close failures
//    root survives? true
//
// 4. Exhaustive removal from a leaf sweeps the whole tree
//    closing batch
//    closing root
//    evicted 2 entries
//    is_empty: true
//
// 5. Statistics
//    hits: 1, misses: 0, len: 0, parent contexts: 0
//
// Explanation: removal order is post-order, so children always close before
// their parents. Exhaustive mode walks up to the root key first, then sweeps
// everything registered beneath it.
