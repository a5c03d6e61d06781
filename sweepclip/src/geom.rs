use serde::{Deserialize, Serialize};

use crate::{
    num::{self, Float, PARAM_EPSILON, SNAP_EPSILON, SQR_PARALLEL_EPSILON},
    Error,
};

// Points are sorted by `x` and then by `y`, which is the order in which the
// sweep line meets them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Float,
    pub y: Float,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x.into_inner(), self.y.into_inner())
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Point {
    pub fn new(x: Float, y: Float) -> Self {
        Point { x, y }
    }

    /// Builds a point from raw coordinates, which must be finite.
    pub fn try_new(x: f64, y: f64) -> Result<Self, Error> {
        Ok(Point {
            x: num::finite(x)?,
            y: num::finite(y)?,
        })
    }

    pub(crate) fn computed(x: f64, y: f64) -> Option<Self> {
        Some(Point {
            x: num::computed(x)?,
            y: num::computed(y)?,
        })
    }

    pub fn to_f64(self) -> (f64, f64) {
        (self.x.into_inner(), self.y.into_inner())
    }

    pub fn dist_sq(&self, other: &Point) -> f64 {
        (*other - *self).square_length()
    }
}

impl TryFrom<(f64, f64)> for Point {
    type Error = Error;

    fn try_from((x, y): (f64, f64)) -> Result<Self, Error> {
        Point::try_new(x, y)
    }
}

impl std::ops::Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x.into_inner() - rhs.x.into_inner(),
            y: self.y.into_inner() - rhs.y.into_inner(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub fn cross(&self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(&self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn square_length(&self) -> f64 {
        self.dot(*self)
    }
}

/// A segment between two points, in the orientation it was given.
///
/// Unlike the sweep events built from it, a segment doesn't know which of its
/// endpoints comes first in sweep order.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub source: Point,
    pub target: Point,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.source, self.target)
    }
}

impl Segment {
    pub fn new(source: Point, target: Point) -> Self {
        Segment { source, target }
    }

    pub fn is_degenerate(&self) -> bool {
        self.source == self.target
    }

    pub fn reversed(&self) -> Self {
        Segment {
            source: self.target,
            target: self.source,
        }
    }

    /// The endpoint that comes first in sweep order.
    pub fn min(&self) -> Point {
        self.source.min(self.target)
    }

    /// The endpoint that comes last in sweep order.
    pub fn max(&self) -> Point {
        self.source.max(self.target)
    }

    fn eval(&self, t: f64) -> Option<Point> {
        let (x0, y0) = self.source.to_f64();
        let d = self.target - self.source;
        Point::computed(x0 + t * d.x, y0 + t * d.y)
    }

    fn endpoints(&self) -> [Point; 2] {
        [self.source, self.target]
    }
}

/// Twice the signed area of the triangle `abc`.
///
/// This is positive if `a`, `b`, `c` go around counter-clockwise, negative if
/// they go clockwise, and zero exactly when they are collinear. The sign is
/// computed with adaptive precision, so it's reliable even when the triangle is
/// very thin.
pub fn signed_area(a: Point, b: Point, c: Point) -> f64 {
    let coord = |p: Point| robust::Coord {
        x: p.x.into_inner(),
        y: p.y.into_inner(),
    };
    robust::orient2d(coord(a), coord(b), coord(c))
}

/// How two segments meet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intersection {
    /// The segments are disjoint.
    None,
    /// The segments meet in exactly one point.
    Point(Point),
    /// The segments are collinear and share the sub-segment between these two points.
    Overlap(Point, Point),
}

/// Returns the endpoint within [`SNAP_EPSILON`] of `p`, if there is one.
fn snap(p: Point, candidates: impl IntoIterator<Item = Point>) -> Point {
    let eps_sq = SNAP_EPSILON * SNAP_EPSILON;
    candidates
        .into_iter()
        .map(|q| (q.dist_sq(&p), q))
        .filter(|(d, _)| *d < eps_sq)
        .min_by(|(d0, _), (d1, _)| d0.total_cmp(d1))
        .map_or(p, |(_, q)| q)
}

fn param_outside(t: f64) -> bool {
    t < -PARAM_EPSILON || t > 1.0 + PARAM_EPSILON
}

/// Intersects a single point with a non-degenerate segment.
fn point_on_segment(p: Point, seg: &Segment) -> Intersection {
    let d = seg.target - seg.source;
    let e = p - seg.source;
    let sqr_len = d.square_length();
    let kross = d.cross(e);
    if kross * kross > SQR_PARALLEL_EPSILON * sqr_len * e.square_length() {
        return Intersection::None;
    }
    let t = d.dot(e) / sqr_len;
    if param_outside(t) {
        Intersection::None
    } else {
        Intersection::Point(snap(p, seg.endpoints()))
    }
}

/// Finds the intersection of two segments.
///
/// Transversal intersections are clipped to both segments (with a tolerance of
/// [`PARAM_EPSILON`] in the segment parameters) and snapped to any endpoint
/// within [`SNAP_EPSILON`]. For collinear segments the overlap is reported by
/// its boundary points, which are always endpoints of the inputs, so they
/// compare exactly equal to those endpoints.
pub fn find_intersection(seg0: &Segment, seg1: &Segment) -> Intersection {
    match (seg0.is_degenerate(), seg1.is_degenerate()) {
        (true, true) => {
            return if seg0.source == seg1.source {
                Intersection::Point(seg0.source)
            } else {
                Intersection::None
            };
        }
        (true, false) => return point_on_segment(seg0.source, seg1),
        (false, true) => return point_on_segment(seg1.source, seg0),
        (false, false) => {}
    }

    let d0 = seg0.target - seg0.source;
    let d1 = seg1.target - seg1.source;
    let e = seg1.source - seg0.source;
    let sqr_len0 = d0.square_length();
    let sqr_len1 = d1.square_length();
    let kross = d0.cross(d1);

    if kross * kross > SQR_PARALLEL_EPSILON * sqr_len0 * sqr_len1 {
        // The lines aren't parallel, so they cross in exactly one place.
        let s = e.cross(d1) / kross;
        if param_outside(s) {
            return Intersection::None;
        }
        let t = e.cross(d0) / kross;
        if param_outside(t) {
            return Intersection::None;
        }

        // Parameters that are (almost) at the ends of their range mean we hit an
        // endpoint, and we'd better return that endpoint exactly.
        let p = if s <= PARAM_EPSILON {
            seg0.source
        } else if s >= 1.0 - PARAM_EPSILON {
            seg0.target
        } else if t <= PARAM_EPSILON {
            seg1.source
        } else if t >= 1.0 - PARAM_EPSILON {
            seg1.target
        } else {
            let Some(p) = seg0.eval(s) else {
                return Intersection::None;
            };
            snap(p, seg0.endpoints().into_iter().chain(seg1.endpoints()))
        };
        return Intersection::Point(p);
    }

    // The lines are parallel. Are they the same line?
    let kross = e.cross(d0);
    if kross * kross > SQR_PARALLEL_EPSILON * sqr_len0 * e.square_length() {
        return Intersection::None;
    }

    // They're the same line. Parametrize seg1's endpoints along seg0 and
    // intersect the parameter ranges.
    let s0 = d0.dot(e) / sqr_len0;
    let s1 = s0 + d0.dot(d1) / sqr_len0;
    let (smin, min_pt, smax, max_pt) = if s0 <= s1 {
        (s0, seg1.source, s1, seg1.target)
    } else {
        (s1, seg1.target, s0, seg1.source)
    };

    if smin > 1.0 + PARAM_EPSILON || smax < -PARAM_EPSILON {
        return Intersection::None;
    }
    // Overlaps too short to matter are treated as touching at seg0's endpoint.
    if smin >= 1.0 - PARAM_EPSILON {
        return Intersection::Point(seg0.target);
    }
    if smax <= PARAM_EPSILON {
        return Intersection::Point(seg0.source);
    }
    let lower = if smin > 0.0 { min_pt } else { seg0.source };
    let upper = if smax < 1.0 { max_pt } else { seg0.target };
    if lower == upper {
        Intersection::Point(lower)
    } else {
        Intersection::Overlap(lower, upper)
    }
}

/// An axis-aligned bounding box. Boxes that touch count as overlapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: Float,
    pub min_y: Float,
    pub max_x: Float,
    pub max_y: Float,
}

impl BoundingBox {
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let init = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.fold(init, |b, p| BoundingBox {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !(self.min_x > other.max_x
            || other.min_x > self.max_x
            || self.min_y > other.max_y
            || other.min_y > self.max_y)
    }
}
