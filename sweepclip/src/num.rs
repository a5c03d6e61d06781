//! The numerical type we compute with, and the tolerances that go with it.

use ordered_float::NotNan;

use crate::Error;

/// Coordinates are finite `f64`s.
///
/// Wrapping them in [`NotNan`] gives us `Ord` and `Hash`, which the sweep
/// uses to order points. Arithmetic happens on the inner `f64`s; everything
/// that comes back out of a computation is re-checked by [`computed`].
pub type Float = NotNan<f64>;

/// Segment parameters this far outside of `[0, 1]` still count as hitting the segment.
pub const PARAM_EPSILON: f64 = 1e-9;

/// Computed points closer than this to an input endpoint are replaced by that endpoint.
///
/// Point equality is exact everywhere else, so this snapping is what makes an
/// intersection point compare equal to the vertex it "really" is.
pub const SNAP_EPSILON: f64 = 1e-9;

/// Two directions are parallel if the squared sine of their angle is below this.
pub const SQR_PARALLEL_EPSILON: f64 = 1e-7;

/// Converts a user-supplied coordinate, rejecting NaNs and infinities.
pub fn finite(x: f64) -> Result<Float, Error> {
    if x.is_infinite() {
        return Err(Error::Infinity);
    }
    NotNan::new(x).map_err(|_| Error::NaN)
}

/// Converts the result of a computation, which is only usable if it's finite.
pub(crate) fn computed(x: f64) -> Option<Float> {
    if x.is_finite() {
        NotNan::new(x).ok()
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    // Kind of like Arbitrary, but
    // - it's a local trait, so we can impl it for whatever we want, and
    // - it only returns "reasonable" values.
    pub trait Reasonable {
        type Strategy: Strategy<Value = Self>;
        fn reasonable() -> Self::Strategy;
    }

    impl<S: Reasonable, T: Reasonable> Reasonable for (S, T) {
        type Strategy = (S::Strategy, T::Strategy);

        fn reasonable() -> Self::Strategy {
            (S::reasonable(), T::reasonable())
        }
    }

    impl Reasonable for Float {
        type Strategy = BoxedStrategy<Float>;

        fn reasonable() -> Self::Strategy {
            (-1e6..1e6).prop_map(|x| NotNan::new(x).unwrap()).boxed()
        }
    }

    #[test]
    fn rejects_non_finite() {
        assert_matches!(finite(f64::NAN), Err(Error::NaN));
        assert_matches!(finite(f64::INFINITY), Err(Error::Infinity));
        assert_matches!(finite(f64::NEG_INFINITY), Err(Error::Infinity));
        assert_eq!(finite(-2.5).unwrap().into_inner(), -2.5);
    }

    #[test]
    fn computed_values() {
        assert!(computed(f64::NAN).is_none());
        assert!(computed(f64::INFINITY).is_none());
        assert_eq!(computed(0.25), Some(NotNan::new(0.25).unwrap()));
    }
}
