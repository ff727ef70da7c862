//! Randomized quickselect-style partitioning over `f64` buffers.
//!
//! Everything here mutates the buffer it works on, so the public entry points
//! take an owned `Vec<f64>`: callers hand over a private copy and get back a
//! fresh vector. Values compare under IEEE total ordering, so NaNs sort after
//! every finite value instead of stalling the scan.
//!
//! The random pivot only changes how many rounds a call takes. The returned
//! multiset never depends on the pivot sequence.

use std::cmp::Ordering;

use rand::Rng;

#[inline]
fn le(a: f64, b: f64) -> bool {
    a.total_cmp(&b) != Ordering::Greater
}

#[inline]
fn ge(a: f64, b: f64) -> bool {
    a.total_cmp(&b) != Ordering::Less
}

/// Partitions `data` around a uniformly chosen pivot.
///
/// Returns the elements left of the pivot (all `<=` pivot), the pivot value,
/// and the elements right of it (all `>=` pivot). Both slices borrow from
/// `data`, which is reordered in place. `data` must not be empty.
pub fn partition<'a, R: Rng + ?Sized>(
    data: &'a mut [f64],
    rng: &mut R,
) -> (&'a mut [f64], f64, &'a mut [f64]) {
    let length = data.len();
    debug_assert!(length > 0, "partition requires a non-empty slice");

    let pivot_index = rng.gen_range(0..length);
    let pivot_value = data[pivot_index];
    data.swap(pivot_index, 0);

    let mut low = 1usize;
    let mut high = length - 1;

    // `high` is only decremented while `high >= low >= 1`, so it cannot wrap.
    while low <= high {
        while low <= high && le(data[low], pivot_value) {
            low += 1;
        }
        while high >= low && ge(data[high], pivot_value) {
            high -= 1;
        }
        if low < high {
            data.swap(low, high);
        }
    }

    // The scan always ends with high == low - 1.
    let (head, highs) = data.split_at_mut(low);
    (&mut head[1..], pivot_value, highs)
}

/// Drops the `k` smallest elements without sorting; returns the other
/// `len - k` elements in no particular order. Expected O(n).
pub fn discard_lower_range<R: Rng + ?Sized>(mut data: Vec<f64>, k: usize, rng: &mut R) -> Vec<f64> {
    let mut k = k.min(data.len());
    let mut out = Vec::with_capacity(data.len() - k);
    let mut window: &mut [f64] = &mut data;

    while k > 0 {
        let (lows, pivot, highs) = partition(std::mem::take(&mut window), rng);
        if lows.len() > k {
            // the boundary lies inside the lows: keep pivot and highs
            out.push(pivot);
            out.extend_from_slice(highs);
            window = lows;
        } else {
            k -= lows.len();
            if k == 0 {
                out.push(pivot);
            } else {
                k -= 1;
            }
            window = highs;
        }
    }
    out.extend_from_slice(window);
    out
}

/// Drops the `k` largest elements without sorting; mirror of
/// [`discard_lower_range`].
pub fn discard_upper_range<R: Rng + ?Sized>(mut data: Vec<f64>, k: usize, rng: &mut R) -> Vec<f64> {
    let mut k = k.min(data.len());
    let mut out = Vec::with_capacity(data.len() - k);
    let mut window: &mut [f64] = &mut data;

    while k > 0 {
        let (lows, pivot, highs) = partition(std::mem::take(&mut window), rng);
        if highs.len() > k {
            out.push(pivot);
            out.extend_from_slice(lows);
            window = highs;
        } else {
            k -= highs.len();
            if k == 0 {
                out.push(pivot);
            } else {
                k -= 1;
            }
            window = lows;
        }
    }
    out.extend_from_slice(window);
    out
}

/// Returns the elements at sorted positions `start..start + count`, sorted.
///
/// Costs O(n + count log count) on average instead of a full O(n log n) sort:
/// - bottom N: `sorted_range(data, 0, n)`
/// - top N: `sorted_range(data, len - n, n)`
/// - middle element: `sorted_range(data, len / 2, 1)`
pub fn sorted_range<R: Rng + ?Sized>(
    data: Vec<f64>,
    start: usize,
    count: usize,
    rng: &mut R,
) -> Vec<f64> {
    let mut out = discard_lower_range(data, start, rng);
    let k = out.len().saturating_sub(count);
    if k > 0 {
        out = discard_upper_range(out, k, rng);
    }
    out.sort_by(f64::total_cmp);
    out
}
