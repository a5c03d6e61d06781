//! Orderings that can be injected into the ordered containers.
//!
//! The sweep needs to order things (events, active segments) by rules that
//! depend on data stored elsewhere: an event index means nothing without the
//! event arena. So instead of requiring `T: Ord`, the [`PriorityQueue`] and
//! [`RbTree`] take a [`Comparator`], and every operation that compares gets
//! handed the comparator's context.
//!
//! [`PriorityQueue`]: crate::priority_queue::PriorityQueue
//! [`RbTree`]: crate::rb_tree::RbTree

use std::cmp::Ordering;

/// A total order on `T`, possibly depending on some external context.
pub trait Comparator<T> {
    type Context: ?Sized;

    fn compare(&self, ctx: &Self::Context, a: &T, b: &T) -> Ordering;
}

/// Plain closures are comparators that don't need any context.
impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    type Context = ();

    fn compare(&self, _ctx: &(), a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// The natural order of `T`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Natural;

impl<T: Ord> Comparator<T> for Natural {
    type Context = ();

    fn compare(&self, _ctx: &(), a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Flips the order of another comparator.
///
/// The priority queue pops its greatest element, so wrapping an order in this
/// makes the queue pop the smallest one instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reversed<C>(pub C);

impl<T, C: Comparator<T>> Comparator<T> for Reversed<C> {
    type Context = C::Context;

    fn compare(&self, ctx: &C::Context, a: &T, b: &T) -> Ordering {
        self.0.compare(ctx, a, b).reverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_and_adapters() {
        let by_abs = |a: &i32, b: &i32| a.abs().cmp(&b.abs());
        assert_eq!(by_abs.compare(&(), &-3, &2), Ordering::Greater);
        assert_eq!(Reversed(by_abs).compare(&(), &-3, &2), Ordering::Less);
        assert_eq!(Natural.compare(&(), &-3, &2), Ordering::Less);
        assert_eq!(Reversed(Natural).compare(&(), &1, &1), Ordering::Equal);
    }

    struct ByKey;

    impl Comparator<usize> for ByKey {
        type Context = [i32];

        fn compare(&self, keys: &[i32], a: &usize, b: &usize) -> Ordering {
            keys[*a].cmp(&keys[*b])
        }
    }

    #[test]
    fn context() {
        let keys = [5, -1, 3];
        assert_eq!(ByKey.compare(&keys[..], &0, &1), Ordering::Greater);
        assert_eq!(Reversed(ByKey).compare(&keys[..], &1, &2), Ordering::Greater);
    }
}
