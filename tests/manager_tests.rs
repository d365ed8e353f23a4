//! Concurrency Tests for the Cache Manager
//!
//! Exercises the shared registry lock from many threads at once.

use std::sync::Arc;
use std::thread;

use cacheman::CacheManager;

const THREADS: usize = 8;
const KEYS_PER_THREAD: usize = 200;

#[test]
fn test_concurrent_first_writes_share_one_store() {
    let cm: Arc<CacheManager> = Arc::new(CacheManager::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cm = Arc::clone(&cm);
            thread::spawn(move || {
                for i in 0..KEYS_PER_THREAD {
                    cm.set(&format!("t{t}:{i}"), b"value").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cm.registered_len(), THREADS * KEYS_PER_THREAD);
    assert_eq!(cm.stats().total_entries, THREADS * KEYS_PER_THREAD);
    for t in 0..THREADS {
        for i in 0..KEYS_PER_THREAD {
            assert!(cm.has(&format!("t{t}:{i}")));
        }
    }
}

#[test]
fn test_prefix_delete_racing_sets_keeps_registry_consistent() {
    let cm: Arc<CacheManager> = Arc::new(CacheManager::new(0));

    let writers: Vec<_> = (0..THREADS)
        .map(|t| {
            let cm = Arc::clone(&cm);
            thread::spawn(move || {
                for i in 0..KEYS_PER_THREAD {
                    cm.set(&format!("t{t}:{i}"), format!("{t}-{i}").as_bytes())
                        .unwrap();
                }
            })
        })
        .collect();

    let deleter = {
        let cm = Arc::clone(&cm);
        thread::spawn(move || {
            for _ in 0..50 {
                cm.del("t0:*").unwrap();
                thread::yield_now();
            }
        })
    };

    for handle in writers {
        handle.join().unwrap();
    }
    deleter.join().unwrap();
    cm.del("t0:*").unwrap();

    let keys = cm.list_keys();
    assert!(keys.iter().all(|k| !k.starts_with("t0:")));
    assert_eq!(keys.len(), (THREADS - 1) * KEYS_PER_THREAD);

    // Every registered key is still backed by the store.
    for key in &keys {
        assert!(cm.has(key), "registered key {key} missing from store");
    }
    for i in 0..KEYS_PER_THREAD {
        assert!(!cm.has(&format!("t0:{i}")));
    }
}

#[test]
fn test_exact_deletes_racing_sets() {
    let cm: Arc<CacheManager> = Arc::new(CacheManager::new(0));
    for i in 0..KEYS_PER_THREAD {
        cm.set(&format!("doomed:{i}"), b"x").unwrap();
    }

    let deleter = {
        let cm = Arc::clone(&cm);
        thread::spawn(move || {
            for i in 0..KEYS_PER_THREAD {
                cm.del(&format!("doomed:{i}")).unwrap();
            }
        })
    };
    let writer = {
        let cm = Arc::clone(&cm);
        thread::spawn(move || {
            for i in 0..KEYS_PER_THREAD {
                cm.set(&format!("kept:{i}"), b"y").unwrap();
            }
        })
    };
    deleter.join().unwrap();
    writer.join().unwrap();

    let keys = cm.list_keys();
    assert_eq!(keys.len(), KEYS_PER_THREAD);
    assert!(keys.iter().all(|k| k.starts_with("kept:")));
}

#[test]
fn test_reset_racing_sets_leaves_no_orphans() {
    let cm: Arc<CacheManager> = Arc::new(CacheManager::new(0));

    let writer = {
        let cm = Arc::clone(&cm);
        thread::spawn(move || {
            for i in 0..KEYS_PER_THREAD * 4 {
                cm.set(&format!("k{i}"), b"v").unwrap();
            }
        })
    };
    let resetter = {
        let cm = Arc::clone(&cm);
        thread::spawn(move || {
            for _ in 0..20 {
                cm.reset();
                thread::yield_now();
            }
        })
    };
    writer.join().unwrap();
    resetter.join().unwrap();

    // Registry and store agree regardless of how the resets interleaved.
    let keys = cm.list_keys();
    assert_eq!(cm.stats().total_entries, keys.len());
    for key in &keys {
        assert!(cm.has(key));
    }
}

#[test]
fn test_managers_are_independent() {
    let first: CacheManager = CacheManager::new(0);
    let second: CacheManager = CacheManager::new(0);
    first.set("user:1", b"a").unwrap();
    second.set("user:1", b"b").unwrap();

    first.del("user:*").unwrap();

    assert!(!first.has("user:1"));
    assert_eq!(second.get(Vec::new(), "user:1"), b"b");
    assert_eq!(second.list_keys(), vec!["user:1"]);
}
