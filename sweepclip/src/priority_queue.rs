//! A binary max-heap ordered by an injected [`Comparator`].

use std::cmp::Ordering;

use crate::compare::Comparator;

/// A binary max-heap.
///
/// `cmp.compare(ctx, a, b) == Ordering::Greater` means that `a` gets popped
/// before `b`. To pop the smallest element first, wrap the comparator in
/// [`Reversed`](crate::compare::Reversed).
///
/// The comparator's context isn't stored in the queue; it's passed to every
/// operation that compares. It must not change in a way that reorders queued
/// elements while they're queued.
#[derive(Clone, Debug)]
pub struct PriorityQueue<T, C> {
    heap: Vec<T>,
    cmp: C,
}

impl<T, C: Comparator<T>> PriorityQueue<T, C> {
    pub fn new(cmp: C) -> Self {
        Self {
            heap: Vec::new(),
            cmp,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The element that the next `pop` would return.
    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    pub fn push(&mut self, ctx: &C::Context, item: T) {
        self.heap.push(item);
        self.sift_up(ctx, self.heap.len() - 1);
    }

    pub fn pop(&mut self, ctx: &C::Context) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let ret = self.heap.swap_remove(0);
        self.sift_down(ctx, 0);
        Some(ret)
    }

    fn greater(&self, ctx: &C::Context, i: usize, j: usize) -> bool {
        self.cmp.compare(ctx, &self.heap[i], &self.heap[j]) == Ordering::Greater
    }

    fn sift_up(&mut self, ctx: &C::Context, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.greater(ctx, i, parent) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, ctx: &C::Context, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut largest = i;
            if left < len && self.greater(ctx, left, largest) {
                largest = left;
            }
            if right < len && self.greater(ctx, right, largest) {
                largest = right;
            }
            if largest == i {
                break;
            }
            self.heap.swap(i, largest);
            i = largest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{Natural, Reversed};
    use proptest::prelude::*;

    #[test]
    fn pops_greatest_first() {
        let mut q = PriorityQueue::new(Natural);
        for x in [3, 1, 4, 1, 5, 9, 2, 6] {
            q.push(&(), x);
        }
        assert_eq!(q.len(), 8);
        assert_eq!(q.peek(), Some(&9));
        let popped: Vec<_> = std::iter::from_fn(|| q.pop(&())).collect();
        assert_eq!(popped, vec![9, 6, 5, 4, 3, 2, 1, 1]);
        assert!(q.is_empty());
        assert_eq!(q.pop(&()), None);
    }

    #[test]
    fn comparator_with_context() {
        // Indices into a table of keys, popped smallest key first.
        let keys = [2.5, -1.0, 7.0, 0.0];
        let by_key = |a: &usize, b: &usize| f64::total_cmp(&keys[*a], &keys[*b]);
        let mut q = PriorityQueue::new(Reversed(by_key));
        for i in 0..keys.len() {
            q.push(&(), i);
        }
        assert_eq!(q.pop(&()), Some(1));
        assert_eq!(q.pop(&()), Some(3));
        assert_eq!(q.pop(&()), Some(0));
        assert_eq!(q.pop(&()), Some(2));
    }

    proptest! {
        #[test]
        fn sorts(mut xs in proptest::collection::vec(any::<i32>(), 0..100)) {
            let mut q = PriorityQueue::new(Reversed(Natural));
            for &x in &xs {
                q.push(&(), x);
            }
            prop_assert_eq!(q.len(), xs.len());
            let popped: Vec<_> = std::iter::from_fn(|| q.pop(&())).collect();
            xs.sort();
            prop_assert_eq!(popped, xs);
        }
    }
}
