#![cfg(test)]

// Property tests for KeyedHashTable kept inside the crate so they can
// check chain links, which are not part of the public API.

use crate::error::TableError;
use crate::keyed_hash_table::KeyedHashTable;
use crate::secret::Secret;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations: indices shrink to earlier keys, the pool
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, Vec<u8>),
    Retrieve(usize),
    Update(usize, Vec<u8>),
    Delete(usize),
    Contains(usize),
}

fn arb_value() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 1..6)
}

// Small alphabet and short keys so pools hold near-duplicates: shared
// prefixes, trailing NULs, equal bytes of different length.
fn arb_scenario() -> impl Strategy<Value = (usize, [u8; 16], Vec<Vec<u8>>, Vec<OpI>)> {
    let pool = proptest::collection::vec(proptest::collection::vec(0u8..3, 1..4), 1..=8);
    (1usize..=4, any::<[u8; 16]>(), pool).prop_flat_map(|(buckets, secret, pool)| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            (idx.clone(), arb_value()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Retrieve),
            (idx.clone(), arb_value()).prop_map(|(i, v)| OpI::Update(i, v)),
            idx.clone().prop_map(OpI::Delete),
            idx.prop_map(OpI::Contains),
        ];
        proptest::collection::vec(op, 1..60)
            .prop_map(move |ops| (buckets, secret, pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert rejects duplicates and never overwrites.
// - retrieve returns exactly the model's bytes, or NotFound.
// - update replaces only the targeted value; delete removes only its key.
// - chain links stay consistent and every entry lives in its hash bucket.
// - len parity with the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((buckets, secret, pool, ops) in arb_scenario()) {
        let mut sut = KeyedHashTable::create(buckets, Secret::new(secret)).unwrap();
        let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = &pool[i];
                    let res = sut.insert(k, &v);
                    if model.contains_key(k) {
                        prop_assert_eq!(res, Err(TableError::DuplicateKey));
                    } else {
                        prop_assert_eq!(res, Ok(()));
                        model.insert(k.clone(), v);
                    }
                }
                OpI::Retrieve(i) => {
                    let k = &pool[i];
                    match (sut.retrieve(k), model.get(k)) {
                        (Ok(h), Some(v)) => prop_assert_eq!(h.as_bytes(), v.as_slice()),
                        (Err(TableError::NotFound), None) => {}
                        (got, want) => prop_assert!(false, "retrieve {:?}: got {:?}, want {:?}", k, got, want),
                    }
                }
                OpI::Update(i, v) => {
                    let k = &pool[i];
                    let res = sut.update(k, &v);
                    match model.get_mut(k) {
                        Some(slot) => {
                            prop_assert_eq!(res, Ok(()));
                            *slot = v;
                        }
                        None => prop_assert_eq!(res, Err(TableError::NotFound)),
                    }
                }
                OpI::Delete(i) => {
                    let k = &pool[i];
                    let res = sut.delete(k);
                    if model.remove(k).is_some() {
                        prop_assert_eq!(res, Ok(()));
                    } else {
                        prop_assert_eq!(res, Err(TableError::NotFound));
                    }
                }
                OpI::Contains(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            sut.chains().check_links();
        }

        // Every surviving key is in the bucket its hash names, with the model's value.
        for (k, v) in &model {
            let bucket = sut.bucket_index(k);
            prop_assert!(sut.chains().chain_keys(bucket).contains(k));
            prop_assert_eq!(sut.retrieve(k).unwrap().as_bytes(), v.as_slice());
        }
        prop_assert_eq!(sut.destroy(), model.len());
    }
}

// Property: distinct keys never observe each other's values, whatever the
// collision pattern.
proptest! {
    #[test]
    fn prop_distinct_keys_do_not_alias(
        buckets in 1usize..=3,
        keys in proptest::collection::hash_set(proptest::collection::vec(any::<u8>(), 1..4), 1..24),
    ) {
        let mut t = KeyedHashTable::create(buckets, Secret::new([7; 16])).unwrap();
        let keys: Vec<Vec<u8>> = keys.into_iter().collect();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k, &(i as u32).to_le_bytes()).unwrap();
        }
        for (i, k) in keys.iter().enumerate() {
            let want = (i as u32).to_le_bytes();
            prop_assert_eq!(t.retrieve(k).unwrap().as_bytes(), &want[..]);
        }
    }
}
