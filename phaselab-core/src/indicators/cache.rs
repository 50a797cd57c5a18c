//! Per-index memoization for incrementally evaluated indicators.

use std::cell::RefCell;

/// Lazily grown slot table mapping bar index to a computed value.
///
/// `get_or_compute` fills every absent slot at most once: when index `i` is
/// requested it scans backward to the start of the contiguous absent run
/// ending at `i`, then fills forward. Filling in ascending order keeps
/// recursive definitions (value at `i` reading value at `i - 1`) iterative
/// in practice: each backward dependency is already cached by the time it
/// is needed, so query cost stays O(gap), not O(i) per lookup.
///
/// Interior mutability via `RefCell` keeps the indicator API `&self`. No
/// borrow is held across a compute callback, so a callback may re-enter the
/// same cache (for earlier indices) or query other indicators freely.
#[derive(Debug, Default)]
pub struct SlotCache<T> {
    slots: RefCell<Vec<Option<T>>>,
}

impl<T: Clone> SlotCache<T> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
        }
    }

    /// Cached value at `index`, if already computed.
    pub fn get(&self, index: usize) -> Option<T> {
        self.slots.borrow().get(index).and_then(Clone::clone)
    }

    /// Value at `index`, computing (and caching) any absent slots in the
    /// contiguous run ending at `index` first. `compute` is invoked at most
    /// once per slot over the cache's lifetime.
    pub fn get_or_compute<F>(&self, index: usize, mut compute: F) -> T
    where
        F: FnMut(usize) -> T,
    {
        {
            let mut slots = self.slots.borrow_mut();
            if slots.len() <= index {
                slots.resize(index + 1, None);
            }
            if let Some(value) = &slots[index] {
                return value.clone();
            }
        }

        let mut run_start = index;
        {
            let slots = self.slots.borrow();
            while run_start > 0 && slots[run_start - 1].is_none() {
                run_start -= 1;
            }
        }

        for i in run_start..index {
            // A reentrant callback may have filled this slot already.
            if self.slots.borrow()[i].is_some() {
                continue;
            }
            let value = compute(i);
            let mut slots = self.slots.borrow_mut();
            if slots[i].is_none() {
                slots[i] = Some(value);
            }
        }

        if let Some(value) = self.slots.borrow()[index].clone() {
            return value;
        }
        let value = compute(index);
        self.slots.borrow_mut()[index] = Some(value.clone());
        value
    }

    /// Number of slots currently allocated (computed or not).
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn computes_each_index_once() {
        let cache = SlotCache::new();
        let calls = Cell::new(0usize);
        let compute = |i: usize| {
            calls.set(calls.get() + 1);
            i as f64 * 2.0
        };

        assert_eq!(cache.get_or_compute(3, compute), 6.0);
        assert_eq!(calls.get(), 4); // backfilled 0..=3

        assert_eq!(cache.get_or_compute(3, compute), 6.0);
        assert_eq!(cache.get_or_compute(1, compute), 2.0);
        assert_eq!(calls.get(), 4);

        assert_eq!(cache.get_or_compute(5, compute), 10.0);
        assert_eq!(calls.get(), 6); // only 4 and 5 were absent
    }

    #[test]
    fn out_of_order_access_matches_ascending() {
        let descending = SlotCache::new();
        let ascending = SlotCache::new();
        let square = |i: usize| (i * i) as f64;

        let mut from_descending: Vec<f64> = Vec::new();
        for i in (0..8).rev() {
            from_descending.push(descending.get_or_compute(i, square));
        }
        from_descending.reverse();

        let from_ascending: Vec<f64> =
            (0..8).map(|i| ascending.get_or_compute(i, square)).collect();
        assert_eq!(from_descending, from_ascending);
    }

    #[test]
    fn nan_is_a_valid_cached_value() {
        let cache = SlotCache::new();
        let calls = Cell::new(0usize);
        let compute = |_: usize| {
            calls.set(calls.get() + 1);
            f64::NAN
        };

        assert!(cache.get_or_compute(0, compute).is_nan());
        assert!(cache.get_or_compute(0, compute).is_nan());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn reentrant_compute_is_supported() {
        // value(i) = value(i - 1) + 1, expressed through the cache itself.
        let cache = SlotCache::new();
        fn value(cache: &SlotCache<u64>, index: usize) -> u64 {
            cache.get_or_compute(index, |i| {
                if i == 0 {
                    0
                } else {
                    value(cache, i - 1) + 1
                }
            })
        }
        assert_eq!(value(&cache, 6), 6);
        assert_eq!(cache.get(3), Some(3));
    }
}
