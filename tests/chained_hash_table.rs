// ChainedHashTable integration suite.
//
// Each test documents the behavior it verifies. The core invariants
// exercised:
// - Uniqueness: a key is stored at most once; duplicates without replace
//   are rejected and the rejected value comes back.
// - Replace protocol: the destructor sees the old value exactly once.
// - Removal: both the return-ownership and destroy-in-place variants.
// - Lifecycle: destroy releases every entry exactly once, values held as
//   `Rc` handles are released when the table lets go of them.
// - Fixed capacity: size never changes regardless of load.
mod common;

use chained_hash_table::{ChainedHashTable, CreateError, InsertError, KeyHasher};
use common::init_test_logger;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;

// Test: the worked scenario on a four-bucket table.
// Verifies: count/find after inserts, remove returns the old value, and a
// removed key can be inserted again without replace.
#[test]
fn four_bucket_scenario() {
    init_test_logger();
    let mut t = ChainedHashTable::create(4).expect("create");
    assert_eq!(t.insert("a", 1, false).unwrap(), None);
    assert_eq!(t.insert("b", 2, false).unwrap(), None);
    assert_eq!(t.insert("e", 3, false).unwrap(), None);

    // "a" and "e" share bucket 0 under DJB2.
    assert_eq!(t.bucket_of("a"), t.bucket_of("e"));
    assert_eq!(t.count(), 3);
    assert_eq!(t.find("b"), Some(&2));
    assert_eq!(t.find("c"), None);

    assert_eq!(t.remove("a"), Some(1));
    assert_eq!(t.count(), 2);
    assert_eq!(t.find("e"), Some(&3), "chain neighbour survives removal");

    assert_eq!(t.insert("a", 9, false).unwrap(), None);
    assert_eq!(t.find("a"), Some(&9));
    assert_eq!(t.count(), 3);
    assert_eq!(t.size(), 4);
}

// Test: zero capacity is refused instead of producing an unusable table.
#[test]
fn zero_capacity_rejected() {
    match ChainedHashTable::<u8>::create(0) {
        Err(CreateError::ZeroCapacity) => {}
        other => panic!("unexpected result: {:?}", other.map(|t| t.size())),
    }
}

// Test: a bucket array that cannot be allocated is reported, not aborted on.
// Verifies: the error carries the requested capacity and its source.
#[test]
fn unallocatable_capacity_reported() {
    match ChainedHashTable::<u8>::create(usize::MAX) {
        Err(CreateError::AllocationFailed { capacity, .. }) => assert_eq!(capacity, usize::MAX),
        other => panic!("unexpected result: {:?}", other.map(|t| t.size())),
    }
}

// Test: capacity is fixed; heavy load only lengthens chains.
#[test]
fn capacity_never_changes() {
    init_test_logger();
    let mut t = ChainedHashTable::create(3).unwrap();
    for i in 0..300 {
        t.insert(&format!("key-{}", i), i, false).unwrap();
    }
    assert_eq!(t.size(), 3);
    assert_eq!(t.count(), 300);
    assert_eq!(t.load_factor(), 100.0);
    let chained: usize = (0..t.size()).map(|b| t.chain_len(b)).sum();
    assert_eq!(chained, 300);
    for i in 0..300 {
        assert_eq!(t.find(&format!("key-{}", i)), Some(&i));
    }
}

// Test: duplicate without replace is a defined negative result, distinct
// from allocation failure, and leaves the table as it was.
#[test]
fn duplicate_without_replace_is_rejected() {
    let mut t = ChainedHashTable::create(8).unwrap();
    t.insert("k", "first".to_string(), false).unwrap();
    let err = t.insert("k", "second".to_string(), false).unwrap_err();
    assert!(matches!(err, InsertError::DuplicateKey(_)));
    assert_eq!(err.into_value(), "second");
    assert_eq!(t.find("k").map(String::as_str), Some("first"));
    assert_eq!(t.count(), 1);
}

// Test: value handles are stored, not cloned; the table releases its hold
// only when it lets the value go.
// Assumes: values are `Rc` handles shared with the caller.
#[test]
fn values_are_moved_not_cloned() {
    let shared = Rc::new(5);
    let mut t = ChainedHashTable::create(4).unwrap();
    t.insert("x", Rc::clone(&shared), false).unwrap();
    assert_eq!(Rc::strong_count(&shared), 2);
    assert!(Rc::ptr_eq(t.find("x").unwrap(), &shared));

    let back = t.remove("x").expect("present");
    assert_eq!(Rc::strong_count(&shared), 2, "ownership moved back to caller");
    drop(back);
    assert_eq!(Rc::strong_count(&shared), 1);
}

// Test: replace with a destructor releases exactly the old handle.
#[test]
fn replace_with_destructor_releases_old_handle() {
    let old = Rc::new("old");
    let new = Rc::new("new");
    let calls = Cell::new(0);
    let mut t = ChainedHashTable::create(2).unwrap();
    t.insert("k", Rc::clone(&old), false).unwrap();

    t.insert_with_destructor("k", Rc::clone(&new), true, |v| {
        calls.set(calls.get() + 1);
        assert!(Rc::ptr_eq(&v, &old));
    })
    .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(Rc::strong_count(&old), 1);
    assert_eq!(Rc::strong_count(&new), 2);
    assert!(Rc::ptr_eq(t.find("k").unwrap(), &new));
}

// Test: remove-and-destroy runs the destructor once and reports presence.
#[test]
fn remove_with_destructor_variant() {
    let mut t = ChainedHashTable::create(4).unwrap();
    t.insert("a", 1, false).unwrap();
    t.insert("b", 2, false).unwrap();
    let mut destroyed = Vec::new();
    assert!(t.remove_with_destructor("a", |v| destroyed.push(v)));
    assert!(!t.remove_with_destructor("a", |v| destroyed.push(v)));
    assert_eq!(destroyed, vec![1]);
    assert_eq!(t.count(), 1);
}

// Test: destroy with a destructor reaches every entry in every bucket,
// including long collision chains.
#[test]
fn destroy_covers_every_bucket() {
    #[derive(Clone, Copy)]
    struct TwoBuckets;
    impl KeyHasher for TwoBuckets {
        fn hash_key(&self, key: &str) -> u64 {
            key.len() as u64 % 2
        }
    }

    init_test_logger();
    let mut t = ChainedHashTable::with_hasher(16, TwoBuckets).unwrap();
    for i in 0..50 {
        t.insert(&"x".repeat(i + 1), i, false).unwrap();
    }
    assert_eq!((2..16).map(|b| t.chain_len(b)).sum::<usize>(), 0);

    let mut seen = vec![0u32; 50];
    t.destroy_with_destructor(|i| seen[i] += 1);
    assert!(seen.iter().all(|&n| n == 1));
}

// Test: plain destroy drops every value the table still owns.
#[test]
fn destroy_drops_owned_values() {
    let token = Rc::new(());
    let mut t = ChainedHashTable::create(5).unwrap();
    for i in 0..10 {
        t.insert(&i.to_string(), Rc::clone(&token), false).unwrap();
    }
    assert_eq!(Rc::strong_count(&token), 11);
    t.destroy();
    assert_eq!(Rc::strong_count(&token), 1);
}

// Test: keys are compared byte for byte; near-miss keys never match.
#[test]
fn exact_key_equality() {
    let mut t = ChainedHashTable::create(1).unwrap();
    t.insert("key", 1, false).unwrap();
    t.insert("Key", 2, false).unwrap();
    t.insert("key ", 3, false).unwrap();
    t.insert("", 4, false).unwrap();
    assert_eq!(t.find("key"), Some(&1));
    assert_eq!(t.find("Key"), Some(&2));
    assert_eq!(t.find("key "), Some(&3));
    assert_eq!(t.find(""), Some(&4));
    assert_eq!(t.find("ke"), None);
    assert_eq!(t.count(), 4);
}

// Test: concurrent use goes through one external lock held per operation.
#[test]
fn shared_behind_a_mutex() {
    let table = Arc::new(Mutex::new(ChainedHashTable::create(32).unwrap()));
    let workers: Vec<_> = (0..4)
        .map(|w| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("w{}-{}", w, i);
                    table.lock().unwrap().insert(&key, i, false).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let t = table.lock().unwrap();
    assert_eq!(t.count(), 400);
    assert_eq!(t.find("w3-99"), Some(&99));
}
