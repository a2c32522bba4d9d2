//! Bucket distribution sort.
//!
//! ## Algorithm
//!
//! 1. Extract every key once; bail out with the input untouched if any key
//!    is not a finite number or all keys are equal
//! 2. Split `[min, max + 1)` into `bucket_count` equal-width ranges
//!    (width forced to 1 if it evaluates to 0)
//! 3. Drop each item into the bucket covering its key (the last bucket
//!    absorbs anything past the end)
//! 4. Stable-sort each bucket, concatenate in bucket order
//!
//! Equal keys always fall in the same bucket, so the result is stable.
//!
//! Keys are compared in their own type. Bucket placement goes through
//! [`Decimal`], so fractional keys such as order totals bucket exactly. A key
//! range that `Decimal` cannot represent (floats beyond about `7.9e28`, a
//! span wider than `Decimal::MAX`) is sorted by a plain stable comparison
//! sort instead; the result is the same.
//!
//! ## Example
//!
//! ```
//! use bistro::sort::DistributionSort;
//!
//! let ids = vec![5u64, 1, 9, 1];
//! let sorted = DistributionSort::new(3).sort(ids, |id| *id);
//!
//! assert_eq!(sorted, vec![1, 1, 5, 9]);
//! ```

use std::cmp::Ordering;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Default number of buckets
pub const DEFAULT_BUCKET_COUNT: usize = 10;

// ============================================================================
// Sort keys
// ============================================================================

/// A value usable as a distribution key.
pub trait SortKey {
    /// False for values that are not finite numbers; the sort then leaves
    /// its input unsorted.
    fn is_numeric(&self) -> bool {
        true
    }

    /// Order between two numeric keys
    fn cmp_key(&self, other: &Self) -> Ordering;

    /// Position on the decimal line used for bucket placement.
    ///
    /// `None` if the value is outside what `Decimal` can hold.
    fn to_decimal(&self) -> Option<Decimal>;
}

macro_rules! int_sort_key {
    ($($ty:ty),*) => {
        $(
            impl SortKey for $ty {
                #[inline]
                fn cmp_key(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                #[inline]
                fn to_decimal(&self) -> Option<Decimal> {
                    Some(Decimal::from(*self))
                }
            }
        )*
    };
}

int_sort_key!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl SortKey for Decimal {
    #[inline]
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    #[inline]
    fn to_decimal(&self) -> Option<Decimal> {
        Some(*self)
    }
}

impl SortKey for f64 {
    fn is_numeric(&self) -> bool {
        self.is_finite()
    }

    fn cmp_key(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_f64(*self)
    }
}

impl SortKey for f32 {
    fn is_numeric(&self) -> bool {
        self.is_finite()
    }

    fn cmp_key(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_f32(*self)
    }
}

/// A missing key is not numeric.
impl<T: SortKey> SortKey for Option<T> {
    fn is_numeric(&self) -> bool {
        self.as_ref().is_some_and(SortKey::is_numeric)
    }

    fn cmp_key(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Some(a), Some(b)) => a.cmp_key(b),
            _ => self.is_some().cmp(&other.is_some()),
        }
    }

    fn to_decimal(&self) -> Option<Decimal> {
        self.as_ref().and_then(SortKey::to_decimal)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Which path a sort took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    /// Nothing to sort
    Empty,
    /// Some key was not numeric; input returned untouched
    NonNumericKey,
    /// Every key was equal; input returned untouched
    DegenerateRange,
    /// Items were distributed and sorted
    Sorted,
}

// ============================================================================
// DistributionSort
// ============================================================================

/// Bucket sort configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionSort {
    bucket_count: usize,
}

impl Default for DistributionSort {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_COUNT)
    }
}

impl DistributionSort {
    /// Create a sorter with `bucket_count` buckets (0 is treated as 1)
    pub fn new(bucket_count: usize) -> Self {
        Self {
            bucket_count: bucket_count.max(1),
        }
    }

    /// Number of buckets
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Sort `items` ascending by `key_of`.
    ///
    /// Returns the input unchanged when a key is non-numeric or every key is
    /// equal.
    pub fn sort<T, K, F>(&self, items: Vec<T>, key_of: F) -> Vec<T>
    where
        K: SortKey,
        F: Fn(&T) -> K,
    {
        self.sort_with_outcome(items, key_of).0
    }

    /// Like [`sort`](Self::sort), also reporting which path was taken.
    ///
    /// # Example
    ///
    /// ```
    /// use bistro::sort::{DistributionSort, SortOutcome};
    ///
    /// let sorter = DistributionSort::default();
    ///
    /// let (out, outcome) = sorter.sort_with_outcome(vec![4u32, 4, 4], |k| *k);
    /// assert_eq!(out, vec![4, 4, 4]);
    /// assert_eq!(outcome, SortOutcome::DegenerateRange);
    ///
    /// let (out, outcome) = sorter.sort_with_outcome(vec![2.0f64, f64::NAN], |k| *k);
    /// assert_eq!(out.len(), 2);
    /// assert_eq!(outcome, SortOutcome::NonNumericKey);
    /// ```
    pub fn sort_with_outcome<T, K, F>(&self, items: Vec<T>, key_of: F) -> (Vec<T>, SortOutcome)
    where
        K: SortKey,
        F: Fn(&T) -> K,
    {
        if items.is_empty() {
            return (items, SortOutcome::Empty);
        }

        let keys: Vec<K> = items.iter().map(|item| key_of(item)).collect();
        if !keys.iter().all(SortKey::is_numeric) {
            tracing::warn!(
                items = items.len(),
                "sort key is not numeric, leaving input unsorted"
            );
            return (items, SortOutcome::NonNumericKey);
        }

        let (mut lo, mut hi) = (0, 0);
        for (i, key) in keys.iter().enumerate().skip(1) {
            if key.cmp_key(&keys[lo]) == Ordering::Less {
                lo = i;
            }
            if key.cmp_key(&keys[hi]) == Ordering::Greater {
                hi = i;
            }
        }

        if keys[lo].cmp_key(&keys[hi]) == Ordering::Equal {
            return (items, SortOutcome::DegenerateRange);
        }

        let Some(slots) = self.bucket_slots(&keys, &keys[lo], &keys[hi]) else {
            tracing::debug!(
                items = items.len(),
                "key range exceeds decimal bounds, using comparison sort"
            );
            let mut pairs: Vec<(K, T)> = keys.into_iter().zip(items).collect();
            pairs.sort_by(|a, b| a.0.cmp_key(&b.0));
            return (pairs.into_iter().map(|(_, item)| item).collect(), SortOutcome::Sorted);
        };

        let mut buckets: Vec<Vec<(K, T)>> = (0..self.bucket_count).map(|_| Vec::new()).collect();
        for ((slot, key), item) in slots.into_iter().zip(keys).zip(items) {
            buckets[slot].push((key, item));
        }

        let mut sorted = Vec::with_capacity(buckets.iter().map(Vec::len).sum());
        for mut bucket in buckets {
            // stable
            bucket.sort_by(|a, b| a.0.cmp_key(&b.0));
            sorted.extend(bucket.into_iter().map(|(_, item)| item));
        }

        (sorted, SortOutcome::Sorted)
    }

    /// Bucket of every key, `None` if some step leaves the `Decimal` range.
    ///
    /// Placement is monotonic in the key, so equal keys share a bucket and a
    /// smaller key never lands in a later bucket.
    fn bucket_slots<K: SortKey>(&self, keys: &[K], min: &K, max: &K) -> Option<Vec<usize>> {
        let min = min.to_decimal()?;
        let width = bucket_width(min, max.to_decimal()?, self.bucket_count)?;
        let last = self.bucket_count - 1;

        keys.iter()
            .map(|key| {
                let offset = key.to_decimal()?.checked_sub(min)?;
                let slot = offset.checked_div(width)?.floor().max(Decimal::ZERO);
                Some(slot.to_usize().map_or(last, |slot| slot.min(last)))
            })
            .collect()
    }
}

/// Bucket width: `(max - min + 1) / bucket_count`, forced to 1 if zero.
///
/// `None` when the span overflows `Decimal`.
fn bucket_width(min: Decimal, max: Decimal, bucket_count: usize) -> Option<Decimal> {
    let span = max.checked_sub(min)?.checked_add(Decimal::ONE)?;
    let width = span.checked_div(Decimal::from(bucket_count))?;
    Some(if width.is_zero() { Decimal::ONE } else { width })
}

/// Sort with [`DEFAULT_BUCKET_COUNT`] buckets.
pub fn distribution_sort<T, K, F>(items: Vec<T>, key_of: F) -> Vec<T>
where
    K: SortKey,
    F: Fn(&T) -> K,
{
    DistributionSort::default().sort(items, key_of)
}

// ============================================================================
// Unit Tests
// ============================================================================
