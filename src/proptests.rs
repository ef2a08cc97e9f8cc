use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{HashMap, HashSet};

fn validate_table(t: &HashTable) {
    let cap = t.capacity();
    let mut occupied = 0usize;
    let mut seen: HashSet<Vec<u8>> = HashSet::new();

    for i in 0..cap {
        let Some((locator, _)) = t.slot(i) else {
            continue;
        };
        occupied += 1;

        let key = t
            .keys()
            .get(locator)
            .expect("occupied slot must hold a locator issued by the arena");
        assert!(seen.insert(key.to_vec()), "duplicate key in table: {key:?}");

        // Every slot between the home bucket and `i` must be occupied,
        // otherwise lookups would stop before reaching this slot.
        let mut j = hash::bucket(hash::fnv1a(key), cap);
        while j != i {
            assert!(t.slot(j).is_some(), "empty slot {j} breaks probe run to {i}");
            j = (j + 1) % cap;
        }
    }

    assert_eq!(occupied, t.len(), "occupied slots must match HashTable::len");
    assert_eq!(t.keys().len(), t.len(), "arena must hold one record per key");
    assert!(t.len() < cap, "table must keep an empty slot");
}

fn key_strategy() -> impl Strategy<Value = String> {
    // Mostly a tiny alphabet so the same keys come back and get overwritten.
    prop_oneof![
        4 => "[a-d]{0,6}",
        1 => "\\PC{0,16}",
    ]
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 3)]
    Put(#[proptest(strategy = "key_strategy()")] String, i32),
    Get(#[proptest(strategy = "key_strategy()")] String),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(cap in 0usize..64, ops in prop::collection::vec(any::<Op>(), 0..=2000)) {
        let mut t = HashTable::new(cap);
        let mut m: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    let old_t = t.insert(&key, value).unwrap();
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key).copied());
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert!(t.load_factor() <= 0.55 + 1.0 / t.capacity() as f64);
        }

        validate_table(&t);
        for (key, value) in &m {
            prop_assert_eq!(t.get(key), Some(*value));
        }
    }

    #[test]
    fn prop_arena_locators_stable(keys in prop::collection::vec("\\PC{0,40}", 0..500)) {
        let mut arena = KeyArena::with_capacity(1, 1);
        let locators: Vec<Locator> = keys
            .iter()
            .map(|k| arena.add(k.as_bytes()).unwrap())
            .collect();

        prop_assert_eq!(arena.len(), keys.len());
        for (loc, key) in locators.iter().zip(&keys) {
            prop_assert_eq!(arena.get(*loc).unwrap(), key.as_bytes());
        }
        prop_assert!(arena.get(Locator::from_raw(keys.len() as u32)).is_err());
    }
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = ["a", "b", "c", "aa", "ab", "ba"];

    // Every permutation at the minimum capacity, so each order goes through
    // at least one resize.
    fn rec(keys: &[&str], used: &mut [bool], order: &mut Vec<usize>) {
        if order.len() == keys.len() {
            let mut t = HashTable::new(1);
            for (v, &k) in order.iter().enumerate() {
                assert_eq!(t.insert(keys[k], v as i32).unwrap(), None);
            }
            validate_table(&t);
            for (v, &k) in order.iter().enumerate() {
                assert_eq!(t.get(keys[k]), Some(v as i32));
            }
            return;
        }
        for i in 0..keys.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            order.push(i);
            rec(keys, used, order);
            order.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; keys.len()];
    rec(&keys, &mut used, &mut Vec::new());
}
