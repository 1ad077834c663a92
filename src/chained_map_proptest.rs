#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can call
// the structural invariant check.

use crate::chained_map::ChainedHashMap;
use crate::config::MapConfig;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations: indices shrink toward earlier keys, the pool and
// the op list shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Get(usize),
    Mutate(usize, i32),
    Remove(usize),
    Contains(String),
    Clear,
    Iterate,
    Stats,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<Op>)> {
    (0usize..5, proptest::collection::vec("[a-z]{0,4}", 1..=40)).prop_flat_map(
        |(capacity, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
                2 => idx.clone().prop_map(Op::Get),
                2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
                3 => idx.clone().prop_map(Op::Remove),
                1 => "[a-z]{0,4}".prop_map(Op::Contains),
                1 => Just(Op::Iterate),
                1 => Just(Op::Stats),
                1 => Just(Op::Clear),
            ];
            proptest::collection::vec(op, 1..120)
                .prop_map(move |ops| (capacity, pool.clone(), ops))
        },
    )
}

// Model check: the map behaves like std's HashMap under any sequence of
// operations, and after every step
// - capacity is a power of two and every entry sits in the bucket its
//   stored hash selects,
// - the number of reachable entries equals `len`,
// - `get`/`contains_key` agree with the model, including borrowed lookups.
fn run_scenario<S: BuildHasher>(
    mut sut: ChainedHashMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = key_from(pool, i);
                let cap_before = sut.capacity();
                let must_grow = !model.contains_key(&k) && sut.len() >= sut.threshold();
                prop_assert_eq!(sut.put(k.clone(), v), model.insert(k, v));
                if must_grow {
                    prop_assert_eq!(sut.capacity(), cap_before * 2);
                } else {
                    prop_assert_eq!(sut.capacity(), cap_before);
                }
            }
            Op::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
                prop_assert_eq!(sut.get(k.0.as_str()), model.get(&k));
            }
            Op::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", s, m),
                }
            }
            Op::Remove(i) => {
                let k = key_from(pool, i);
                let len_before = sut.len();
                let removed = sut.remove(&k);
                prop_assert_eq!(removed, model.remove(&k));
                if removed.is_none() {
                    prop_assert_eq!(sut.len(), len_before);
                }
            }
            Op::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            Op::Clear => {
                let cap = sut.capacity();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap);
            }
            Op::Iterate => {
                let seen: BTreeMap<Key, i32> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen.len(), sut.len(), "iteration yields no duplicates");
                let expected: BTreeMap<Key, i32> = model.clone().into_iter().collect();
                prop_assert_eq!(seen, expected);
            }
            Op::Stats => {
                let stats = sut.statistics();
                prop_assert_eq!(stats.size, model.len());
                prop_assert_eq!(stats.capacity, sut.capacity());
                prop_assert!(stats.used_buckets <= stats.size);
                prop_assert!(stats.max_chain_length <= stats.size);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((capacity, pool, ops) in arb_scenario()) {
        run_scenario(ChainedHashMap::with_capacity(capacity), &pool, ops)?;
    }
}

// Collision variant using a constant hasher: every key shares one chain, so
// equality alone resolves lookups.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((capacity, pool, ops) in arb_scenario()) {
        let sut = ChainedHashMap::with_capacity_and_hasher(capacity, ConstBuildHasher);
        run_scenario(sut, &pool, ops)?;
    }
}

// Growth law: under any load factor, a put doubles the table exactly when a
// new key arrives at `len >= threshold`, and never more than once. Every
// previously inserted key keeps its value right after each doubling.
proptest! {
    #[test]
    fn prop_growth_preserves_entries(
        n in 1usize..400,
        capacity in 0i64..8,
        load_factor in 0.05f64..4.0,
    ) {
        let config = MapConfig { initial_capacity: capacity, load_factor };
        let mut m: ChainedHashMap<usize, usize> = ChainedHashMap::from_config(&config).unwrap();
        for i in 0..n {
            let cap_before = m.capacity();
            let must_grow = m.len() >= m.threshold();
            m.put(i, i * 7);
            if must_grow {
                prop_assert_eq!(m.capacity(), cap_before * 2);
                for j in 0..=i {
                    prop_assert_eq!(m.get(&j), Some(&(j * 7)));
                }
            } else {
                prop_assert_eq!(m.capacity(), cap_before);
            }
            // Overwrites never grow.
            let cap_after = m.capacity();
            prop_assert_eq!(m.put(i, i * 7), Some(i * 7));
            prop_assert_eq!(m.capacity(), cap_after);
        }
        prop_assert_eq!(m.len(), n);
        m.assert_invariants();
    }
}
