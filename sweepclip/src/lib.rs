#![doc = include_str!("../README.md")]

pub mod clipper;
pub mod compare;
pub mod connector;
pub mod geom;
pub mod linked_list;
mod num;
pub mod options;
pub mod path;
pub mod polygon;
pub mod priority_queue;
pub mod rb_tree;
pub mod sweep;

pub use clipper::Clipper;
pub use geom::{Point, Segment};
pub use num::Float;
pub use options::{ClipOptions, LeftoverChains};
pub use polygon::{Contour, Polygon};

#[cfg(test)]
mod perturbation;

/// Binary operations between sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    /// A point is in the union of two sets if it is in either one.
    Union,
    /// A point is in the intersection of two sets if it is in both.
    Intersection,
    /// A point is in the difference of two sets if it is in the first but not the second.
    Difference,
    /// A point is in the exclusive-or of two sets if it is in one or the other, but not both.
    Xor,
}

/// Something went wrong with a boolean operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("at least one of the inputs was infinite")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("at least one of the inputs was not a number")]
    NaN,
    /// Some edges of the result didn't close up into contours.
    #[error("{count} chain(s) of result edges didn't close")]
    OpenChains { count: usize },
    /// The sweep got into a state it should never be in.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

/// Computes a boolean operation between two sets, each of which is described
/// as a collection of closed polylines.
///
/// The polylines are interpreted with the even-odd rule.
pub fn boolean_op(
    subject: &[Vec<(f64, f64)>],
    clipping: &[Vec<(f64, f64)>],
    op: BooleanOp,
) -> Result<Polygon, Error> {
    let subject = Polygon::try_from_coords(subject)?;
    let clipping = Polygon::try_from_coords(clipping)?;
    Clipper::new(subject, clipping).compute(op)
}
