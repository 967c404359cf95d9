#![cfg(test)]

// Property tests for ChainedHashTable kept inside the crate so they can
// reach chain-level accessors alongside the public operations.

use crate::chained_hash_table::ChainedHashTable;
use crate::error::InsertError;
use crate::hashing::KeyHasher;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Ops address keys by index into a small generated pool, so distinct ops
// keep hitting the same keys and chains actually collide.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32, bool),
    InsertDestroying(usize, i32, bool),
    Remove(usize),
    RemoveDestroying(usize),
    Find(usize),
    Contains(String),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-e]{0,3}", 1..=10).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let known_key = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>(), any::<bool>()).prop_map(|(i, v, r)| OpI::Insert(i, v, r)),
            (idx.clone(), any::<i32>(), any::<bool>())
                .prop_map(|(i, v, r)| OpI::InsertDestroying(i, v, r)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::RemoveDestroying),
            idx.clone().prop_map(OpI::Find),
            prop_oneof![known_key, "[a-e]{0,3}"].prop_map(OpI::Contains),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

#[derive(Clone, Copy, Default)]
struct ConstHasher;
impl KeyHasher for ConstHasher {
    fn hash_key(&self, _key: &str) -> u64 {
        0
    }
}

// Drive one scenario against a std HashMap model.
// Invariants exercised after every op:
// - At most one entry per key across all chains.
// - `find`/`contains_key` parity with the model.
// - Replace semantics: the destructor (or return value) sees the old value
//   exactly once; without replace the stored value is untouched.
// - Count equals the sum of chain lengths and the model size.
fn run_scenario<H: KeyHasher>(
    mut sut: ChainedHashTable<i32, H>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v, replace) => {
                let k = &pool[i];
                let before = model.get(k).copied();
                match sut.insert(k, v, replace) {
                    Ok(prev) => {
                        prop_assert!(before.is_none() || replace);
                        prop_assert_eq!(prev, before);
                        model.insert(k.clone(), v);
                    }
                    Err(InsertError::DuplicateKey(back)) => {
                        prop_assert!(before.is_some() && !replace);
                        prop_assert_eq!(back, v);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {:?}", e),
                }
            }
            OpI::InsertDestroying(i, v, replace) => {
                let k = &pool[i];
                let before = model.get(k).copied();
                let mut destroyed = Vec::new();
                let res = sut.insert_with_destructor(k, v, replace, |old| destroyed.push(old));
                match res {
                    Ok(()) => {
                        prop_assert!(before.is_none() || replace);
                        prop_assert_eq!(destroyed, before.into_iter().collect::<Vec<_>>());
                        model.insert(k.clone(), v);
                    }
                    Err(e) => {
                        prop_assert!(e.is_duplicate());
                        prop_assert!(before.is_some() && !replace);
                        prop_assert!(destroyed.is_empty());
                    }
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert!(sut.find(k).is_none());
            }
            OpI::RemoveDestroying(i) => {
                let k = &pool[i];
                let mut destroyed = Vec::new();
                let found = sut.remove_with_destructor(k, |old| destroyed.push(old));
                let expected = model.remove(k);
                prop_assert_eq!(found, expected.is_some());
                prop_assert_eq!(destroyed, expected.into_iter().collect::<Vec<_>>());
            }
            OpI::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k), model.get(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.keys().map(str::to_owned).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op
        let keys: Vec<&str> = sut.keys().collect();
        let unique: BTreeSet<&str> = keys.iter().copied().collect();
        prop_assert_eq!(keys.len(), unique.len(), "duplicate key in chains");
        let chained: usize = (0..sut.size()).map(|b| sut.chain_len(b)).sum();
        prop_assert_eq!(chained, sut.count());
        prop_assert_eq!(sut.count(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        for (b, (k, _)) in (0..sut.size()).flat_map(|b| sut.chain(b).map(move |e| (b, e))) {
            prop_assert_eq!(sut.bucket_of(k), b, "entry filed under the wrong bucket");
        }
    }

    // Destroy covers every remaining entry exactly once.
    let mut remaining: Vec<i32> = Vec::new();
    sut.destroy_with_destructor(|v| remaining.push(v));
    let mut expected: Vec<i32> = model.into_values().collect();
    remaining.sort_unstable();
    expected.sort_unstable();
    prop_assert_eq!(remaining, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), capacity in 1usize..=16) {
        let sut: ChainedHashTable<i32> = ChainedHashTable::create(capacity).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}

// Same invariants under worst-case collisions: every key shares one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainedHashTable::with_hasher(4, ConstHasher).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}

// Identical keys map to identical buckets for a fixed bucket count.
proptest! {
    #[test]
    fn prop_bucket_is_deterministic(key in ".{0,24}", capacity in 1usize..=1024) {
        let a: ChainedHashTable<()> = ChainedHashTable::create(capacity).unwrap();
        let b: ChainedHashTable<()> = ChainedHashTable::create(capacity).unwrap();
        let expected = (crate::hashing::djb2(key.as_bytes()) as usize) % capacity;
        prop_assert_eq!(a.bucket_of(&key), expected);
        prop_assert_eq!(a.bucket_of(&key), b.bucket_of(&key));
    }
}
