//! Stress tests for the balanced index and the distribution sort.
//!
//! These tests verify:
//! 1. The AVL invariants hold after every insert and delete
//! 2. The index agrees with `BTreeMap` on long random operation sequences
//! 3. Runs are deterministic for a given seed
//! 4. The distribution sort matches a reference stable sort, including on
//!    keys at the limits of their type
//!
//! ## Running Stress Tests
//!
//! ```bash
//! cargo test --release --test index_stress -- --nocapture
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use bistro::{BalancedIndex, DistributionSort, SortOutcome};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Operations per randomized run
const OPERATION_COUNT: usize = 20_000;

/// Key space; small enough that overwrites and deletes hit existing keys
const KEY_SPACE: u64 = 2_000;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Insert(u64, u64),
    Delete(u64),
    Update(u64, u64),
}

/// Generate a deterministic operation sequence.
fn generate_ops(count: usize, seed: u64) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let key = rng.gen_range(1..=KEY_SPACE);
            match rng.gen_range(0..10) {
                0..=5 => Op::Insert(key, rng.gen()),
                6..=8 => Op::Delete(key),
                _ => Op::Update(key, rng.gen()),
            }
        })
        .collect()
}

/// Value patch for the stress runs: overwrite with a new number
struct Set(u64);

impl bistro::Patch<u64> for Set {
    fn apply(self, target: &mut u64) {
        *target = self.0;
    }
}

/// Apply `ops` to both maps, checking agreement after each step.
fn run_against_reference(ops: &[Op], check_every: usize) -> BalancedIndex<u64, u64> {
    let mut index = BalancedIndex::new();
    let mut reference = BTreeMap::new();

    for (step, op) in ops.iter().enumerate() {
        match *op {
            Op::Insert(key, value) => {
                assert_eq!(index.insert(key, value), reference.insert(key, value));
            }
            Op::Delete(key) => {
                assert_eq!(index.delete(&key), reference.remove(&key).is_some());
            }
            Op::Update(key, value) => {
                let expected = match reference.get_mut(&key) {
                    Some(slot) => {
                        *slot = value;
                        true
                    }
                    None => false,
                };
                assert_eq!(index.update(&key, Set(value)), expected);
            }
        }

        assert_eq!(index.len(), reference.len());
        if step % check_every == 0 {
            assert!(index.is_valid(), "invariants broken at step {}: {:?}", step, op);
        }
    }

    assert!(index.is_valid());
    let pairs: Vec<(u64, u64)> = index.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<(u64, u64)> = reference.into_iter().collect();
    assert_eq!(pairs, expected);

    index
}

/// Upper bound on AVL height for n keys: 1.4405 * log2(n + 2)
fn avl_height_bound(len: usize) -> u32 {
    (1.4405 * ((len + 2) as f64).log2()).floor() as u32
}

// ============================================================================
// INDEX STRESS TESTS
// ============================================================================

/// Random inserts/deletes/updates agree with BTreeMap, invariants checked
/// after every operation.
#[test]
fn stress_random_operations() {
    println!("\n=== STRESS TEST: random index operations ===\n");

    let ops = generate_ops(OPERATION_COUNT, 42);

    let start = Instant::now();
    let index = run_against_reference(&ops, 1);
    let elapsed = start.elapsed();

    println!("  Operations:        {:>12}", OPERATION_COUNT);
    println!("  Final size:        {:>12}", index.len());
    println!("  Final height:      {:>12}", index.height());
    println!("  Elapsed time:      {:>12.2?}", elapsed);

    assert!(index.height() <= avl_height_bound(index.len()));
}

/// Several seeds, invariants checked periodically.
#[test]
fn stress_many_seeds() {
    for seed in 0..8 {
        let ops = generate_ops(OPERATION_COUNT / 4, seed);
        let index = run_against_reference(&ops, 64);
        assert!(index.height() <= avl_height_bound(index.len()), "seed {}", seed);
    }
}

/// Same seed, same final tree contents.
#[test]
fn verify_determinism() {
    const SEED: u64 = 12345;

    let first = run_against_reference(&generate_ops(5_000, SEED), 256);
    let second = run_against_reference(&generate_ops(5_000, SEED), 256);
    let other = run_against_reference(&generate_ops(5_000, SEED + 1), 256);

    let contents = |index: &BalancedIndex<u64, u64>| -> Vec<(u64, u64)> {
        index.iter().map(|(k, v)| (*k, *v)).collect()
    };

    assert_eq!(contents(&first), contents(&second));
    assert_eq!(first.height(), second.height());
    assert_ne!(contents(&first), contents(&other));
}

/// Monotonic key streams are the worst case for an unbalanced tree.
#[test]
fn stress_sequential_keys() {
    const COUNT: u64 = 100_000;

    let mut ascending = BalancedIndex::with_capacity(COUNT as usize);
    let mut descending = BalancedIndex::with_capacity(COUNT as usize);
    for key in 1..=COUNT {
        ascending.insert(key, ());
        descending.insert(COUNT + 1 - key, ());
    }

    let bound = avl_height_bound(COUNT as usize);
    assert!(ascending.height() <= bound);
    assert!(descending.height() <= bound);
    assert_eq!(ascending.max_key(), COUNT);
    assert_eq!(descending.max_key(), COUNT);
    assert!(ascending.is_valid());
    assert!(descending.is_valid());

    // Drain every other key
    for key in (1..=COUNT).step_by(2) {
        assert!(ascending.delete(&key));
    }
    assert_eq!(ascending.len(), (COUNT / 2) as usize);
    assert!(ascending.is_valid());
    assert!(ascending.keys().all(|key| key % 2 == 0));
}

/// Traversal yields strictly increasing keys and one entry per key.
#[test]
fn traversal_is_strictly_ascending() {
    let index = run_against_reference(&generate_ops(3_000, 7), 500);

    let keys: Vec<u64> = index.keys().copied().collect();

    assert_eq!(keys.len(), index.len());
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(index.traverse_ascending().len(), index.len());
    assert_eq!(index.max_key(), keys.last().copied().unwrap_or(0));
}

// ============================================================================
// DISTRIBUTION SORT STRESS TESTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Ticket {
    seq: usize,
    total: Decimal,
}

/// Random decimal totals with plenty of ties; the result must equal a
/// stable reference sort (same multiset, ties in input order).
#[test]
fn sort_matches_stable_reference() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    for bucket_count in [1, 3, 10, 64] {
        let tickets: Vec<Ticket> = (0..2_000)
            .map(|seq| Ticket {
                seq,
                total: Decimal::new(rng.gen_range(0..5_000), 2),
            })
            .collect();

        let mut expected = tickets.clone();
        expected.sort_by(|a, b| a.total.cmp(&b.total));

        let (sorted, outcome) =
            DistributionSort::new(bucket_count).sort_with_outcome(tickets, |t| t.total);

        assert_eq!(outcome, SortOutcome::Sorted);
        assert_eq!(sorted, expected, "bucket_count {}", bucket_count);
    }
}

/// Integer ids spread over a wide range.
#[test]
fn sort_wide_integer_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let ids: Vec<u64> = (0..10_000).map(|_| rng.gen_range(0..u64::from(u32::MAX))).collect();

    let mut expected = ids.clone();
    expected.sort();

    let sorted = DistributionSort::default().sort(ids, |id| *id);

    assert_eq!(sorted, expected);
}

/// Sort `keys` with several bucket counts and compare against a stable
/// comparison sort using the same ordering.
fn check_sort_against_reference<K, F>(keys: Vec<K>, cmp: F)
where
    K: bistro::SortKey + Copy + PartialEq + std::fmt::Debug,
    F: Fn(&K, &K) -> std::cmp::Ordering,
{
    let mut expected = keys.clone();
    expected.sort_by(&cmp);

    for bucket_count in [1, 7, 10, 256] {
        let sorted = DistributionSort::new(bucket_count).sort(keys.clone(), |k| *k);

        assert_eq!(sorted.len(), keys.len());
        assert!(
            sorted.windows(2).all(|pair| cmp(&pair[0], &pair[1]).is_le()),
            "bucket_count {} not ascending",
            bucket_count
        );
        assert_eq!(sorted, expected, "bucket_count {}", bucket_count);
    }
}

/// Integer keys drawn from the whole range of the type.
#[test]
fn sort_full_range_integers() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let signed: Vec<i64> = (0..5_000)
        .map(|i| match i % 50 {
            0 => i64::MIN,
            1 => i64::MAX,
            _ => rng.gen(),
        })
        .collect();
    check_sort_against_reference(signed, |a, b| a.cmp(b));

    let unsigned: Vec<u64> = (0..5_000)
        .map(|i| match i % 50 {
            0 => 0,
            1 => u64::MAX,
            _ => rng.gen(),
        })
        .collect();
    check_sort_against_reference(unsigned, |a, b| a.cmp(b));
}

/// Floats from random bit patterns: huge, tiny, subnormal and signed zeros.
#[test]
fn sort_arbitrary_finite_floats() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);

    let wide: Vec<f64> = std::iter::repeat_with(|| f64::from_bits(rng.gen()))
        .filter(|k| k.is_finite())
        .take(5_000)
        .collect();
    check_sort_against_reference(wide, |a, b| a.total_cmp(b));

    // Subnormals only
    let tiny: Vec<f64> = (0..2_000)
        .map(|_| {
            let key = f64::from_bits(rng.gen_range(0..(1u64 << 52)));
            if rng.gen_bool(0.5) { -key } else { key }
        })
        .collect();
    check_sort_against_reference(tiny, |a, b| a.total_cmp(b));

    // Inside the decimal range, where buckets are used
    let moderate: Vec<f64> = (0..5_000).map(|_| rng.gen_range(-1e12..1e12)).collect();
    check_sort_against_reference(moderate, |a, b| a.total_cmp(b));

    let single: Vec<f32> = std::iter::repeat_with(|| f32::from_bits(rng.gen()))
        .filter(|k| k.is_finite())
        .take(5_000)
        .collect();
    check_sort_against_reference(single, |a, b| a.total_cmp(b));
}

/// Decimals spanning every scale, including the type's limits.
#[test]
fn sort_extreme_decimals() {
    let mut rng = ChaCha8Rng::seed_from_u64(55);

    let random_decimal = |rng: &mut ChaCha8Rng| {
        Decimal::from_parts(rng.gen(), rng.gen(), rng.gen(), rng.gen_bool(0.5), rng.gen_range(0..=28))
    };

    let mut full: Vec<Decimal> = (0..5_000).map(|_| random_decimal(&mut rng)).collect();
    full.extend([Decimal::MAX, Decimal::MIN, Decimal::ZERO]);
    check_sort_against_reference(full, |a, b| a.cmp(b));

    // Non-negative only: the span still fits, so the bucket path runs
    let half: Vec<Decimal> = (0..5_000)
        .map(|_| random_decimal(&mut rng).abs() / Decimal::from(2))
        .collect();
    check_sort_against_reference(half, |a, b| a.cmp(b));
}
