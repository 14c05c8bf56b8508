//! Generic top-down merge sort.
//!
//! The slice is copied once into a scratch buffer of the same length. Each level
//! of the recursion then sorts its halves into one buffer and merges them into
//! the other, alternating roles, so no per-level allocation or copy-back is
//! needed. Odd lengths split into unequal halves.
//!
//! Runs of at most [`INSERTION_THRESHOLD`] elements are finished with insertion
//! sort. Ties keep their input order.
//!
//! # References
//!
//! - D. E. Knuth, "The Art of Computer Programming, Vol. 3", section 5.2.4

use std::cmp::Ordering;

/// Runs this short or shorter are insertion-sorted in place.
pub const INSERTION_THRESHOLD: usize = 12;

/// Sorts `slice` in ascending order.
pub fn merge_sort<T: Ord + Clone>(slice: &mut [T]) {
    merge_sort_by(slice, T::cmp);
}

/// Sorts `slice` with a comparator.
pub fn merge_sort_by<T, F>(slice: &mut [T], mut compare: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if slice.len() <= 1 {
        return;
    }
    let mut scratch = slice.to_vec();
    split_merge(&mut scratch, slice, &mut compare);
}

/// Sorts `slice` by the key `f` extracts.
pub fn merge_sort_by_key<T, K, F>(slice: &mut [T], mut f: F)
where
    T: Clone,
    K: Ord,
    F: FnMut(&T) -> K,
{
    merge_sort_by(slice, |a, b| f(a).cmp(&f(b)));
}

/// `src` and `dst` hold the same elements on entry; `dst` ends sorted.
fn split_merge<T, F>(src: &mut [T], dst: &mut [T], compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if dst.len() <= INSERTION_THRESHOLD {
        insertion_sort(dst, compare);
        return;
    }
    let mid = dst.len() / 2;
    {
        let (src_left, src_right) = src.split_at_mut(mid);
        let (dst_left, dst_right) = dst.split_at_mut(mid);
        split_merge(dst_left, src_left, compare);
        split_merge(dst_right, src_right, compare);
    }
    let (left, right) = src.split_at(mid);
    merge(left, right, dst, compare);
}

fn merge<T, F>(left: &[T], right: &[T], out: &mut [T], compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        // Prefer the left run on ties.
        let take_left =
            j == right.len() || (i < left.len() && compare(&right[j], &left[i]) != Ordering::Less);
        if take_left {
            *slot = left[i].clone();
            i += 1;
        } else {
            *slot = right[j].clone();
            j += 1;
        }
    }
}

fn insertion_sort<T, F>(v: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && compare(&v[j], &v[j - 1]) == Ordering::Less {
            v.swap(j, j - 1);
            j -= 1;
        }
    }
}
