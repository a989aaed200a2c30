#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate next to the unit
// tests, driven against std::collections::HashMap as the model.

use crate::error::MapError;
use crate::hash_map::{ChainedHashMap, DEFAULT_BUCKET_COUNT};
use crate::strategy::KeyHasher;
use core::ops::ControlFlow;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

const VALUES: usize = 16;

// Pool-indexed operations so failing cases shrink toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Set(usize, usize),
    Insert(usize, usize),
    Delete(usize),
    Get(usize),
    Traverse,
    BreakAt(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let n = pool.len();
        let op = prop_oneof![
            (0..n, 0..VALUES).prop_map(|(k, v)| Op::Set(k, v)),
            (0..n, 0..VALUES).prop_map(|(k, v)| Op::Insert(k, v)),
            (0..n).prop_map(Op::Delete),
            (0..n).prop_map(Op::Get),
            Just(Op::Traverse),
            (1..10usize).prop_map(Op::BreakAt),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives one scenario. `Set` is only issued for absent keys so the model can
// stay a plain map; shadowing is covered by the unit tests.
fn run<H: KeyHasher<str>>(hasher: H, pool: &[String], ops: &[Op]) -> Result<(), TestCaseError> {
    let values: Vec<i32> = (0..VALUES as i32).collect();
    let mut sut = ChainedHashMap::<str, i32, H>::with_hasher(hasher).unwrap();
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match *op {
            Op::Set(k, v) => {
                let key = &pool[k];
                if model.contains_key(key) {
                    prop_assert_eq!(sut.insert(key, &values[v]), Err(MapError::DuplicateKey));
                } else {
                    sut.set(key, &values[v]).unwrap();
                    model.insert(key.clone(), values[v]);
                    // Round-trip.
                    prop_assert_eq!(sut.get(key), Some(&values[v]));
                }
            }
            Op::Insert(k, v) => {
                let key = &pool[k];
                let already = model.contains_key(key);
                match sut.insert(key, &values[v]) {
                    Ok(()) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        model.insert(key.clone(), values[v]);
                    }
                    Err(MapError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }
            }
            Op::Delete(k) => {
                let key = &pool[k];
                prop_assert_eq!(sut.delete(key).copied(), model.remove(key));
                // Delete-then-get.
                prop_assert!(sut.get(key).is_none());
            }
            Op::Get(k) => {
                let key = &pool[k];
                prop_assert_eq!(sut.get(key).copied(), model.get(key).copied());
            }
            Op::Traverse => {
                let mut seen = BTreeSet::new();
                let mut buckets = Vec::new();
                let flow = sut.traverse(|n| {
                    seen.insert(n.key().to_string());
                    buckets.push(n.hash() as usize % DEFAULT_BUCKET_COUNT);
                    ControlFlow::<()>::Continue(())
                });
                prop_assert_eq!(flow, ControlFlow::Continue(()));
                let expected: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(seen, expected);
                prop_assert_eq!(buckets.len(), model.len());
                prop_assert!(buckets.windows(2).all(|w| w[0] <= w[1]), "bucket order");
            }
            Op::BreakAt(at) => {
                let mut visits = 0usize;
                let flow = sut.traverse(|_| {
                    visits += 1;
                    if visits == at {
                        ControlFlow::Break(at)
                    } else {
                        ControlFlow::Continue(())
                    }
                });
                if at <= model.len() {
                    prop_assert_eq!(flow, ControlFlow::Break(at));
                    prop_assert_eq!(visits, at);
                } else {
                    prop_assert_eq!(flow, ControlFlow::Continue(()));
                    prop_assert_eq!(visits, model.len());
                }
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.iter().count(), model.len());
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// - Round-trip, delete-then-get and miss behavior match the model.
// - Traversal visits every live key exactly once, in bucket-index order.
// - A visitor breaking on the Nth node stops after exactly N visits.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(crate::strategy::JenkinsOneAtATime, &pool, &ops)?;
    }
}

// Property: same invariants with every key in a single bucket, which stresses
// chain scanning and swap-delete.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(|_: &str| 0u32, &pool, &ops)?;
    }
}
