//! Polygons, as lists of closed contours.

use serde::{Deserialize, Serialize};

use crate::{
    geom::{signed_area, BoundingBox, Point, Segment},
    num, Error,
};

pub(crate) fn cyclic_pairs<T>(xs: &[T]) -> impl Iterator<Item = (&T, &T)> {
    xs.windows(2)
        .map(|pair| (&pair[0], &pair[1]))
        .chain(xs.last().zip(xs.first()))
}

/// A closed polyline. The last point connects back to the first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Contour { points }
    }

    /// Builds a contour from raw coordinates, which must be finite.
    pub fn try_from_coords(coords: impl IntoIterator<Item = (f64, f64)>) -> Result<Self, Error> {
        let points = coords
            .into_iter()
            .map(Point::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Contour { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    /// The edges of this contour, including the closing one.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        cyclic_pairs(&self.points).map(|(p, q)| Segment::new(*p, *q))
    }

    /// The signed area, positive if the contour goes counter-clockwise.
    ///
    /// For self-intersecting contours, this is the integral of the winding number.
    pub fn signed_area(&self) -> f64 {
        let twice: f64 = cyclic_pairs(&self.points)
            .map(|(p, q)| {
                let (x0, y0) = p.to_f64();
                let (x1, y1) = q.to_f64();
                x0 * y1 - x1 * y0
            })
            .sum();
        twice / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn set_counter_clockwise(&mut self) {
        if !self.is_counter_clockwise() {
            self.reverse();
        }
    }

    pub fn set_clockwise(&mut self) {
        if self.is_counter_clockwise() {
            self.reverse();
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter().copied())
    }

    pub fn translate(&mut self, dx: f64, dy: f64) -> Result<(), Error> {
        for p in &mut self.points {
            let (x, y) = p.to_f64();
            *p = Point::new(num::finite(x + dx)?, num::finite(y + dy)?);
        }
        Ok(())
    }

    /// Is `p` inside this contour, by the even-odd rule?
    ///
    /// Points on the boundary may be reported either way.
    pub fn contains(&self, p: Point) -> bool {
        let (px, py) = p.to_f64();
        let mut inside = false;
        for (a, b) in cyclic_pairs(&self.points) {
            let (x0, y0) = a.to_f64();
            let (x1, y1) = b.to_f64();
            if (y0 > py) != (y1 > py) {
                let x = x0 + (py - y0) * (x1 - x0) / (y1 - y0);
                if px < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn on_boundary(&self, p: Point) -> bool {
        self.segments().any(|s| {
            signed_area(s.source, s.target, p) == 0.0 && s.min() <= p && p <= s.max()
        })
    }
}

impl FromIterator<Point> for Contour {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Contour {
            points: iter.into_iter().collect(),
        }
    }
}

/// Where a contour sits among the other contours of its polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContourNesting {
    /// The innermost contour containing this one.
    pub parent: Option<usize>,
    /// The number of contours containing this one. Holes have odd depth.
    pub depth: usize,
}

/// A set of closed contours.
///
/// Holes are contours inside other contours. By convention they go around in
/// the opposite direction of the contour they're in, but nothing here relies
/// on that.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    contours: Vec<Contour>,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a polygon from raw coordinates, one `Vec` per contour.
    pub fn try_from_coords(contours: &[Vec<(f64, f64)>]) -> Result<Self, Error> {
        contours
            .iter()
            .map(|c| Contour::try_from_coords(c.iter().copied()))
            .collect()
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub fn push(&mut self, contour: Contour) {
        self.contours.push(contour);
    }

    /// Has this polygon got no contours?
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.contours
            .iter()
            .filter_map(Contour::bounding_box)
            .reduce(|a, b| a.union(&b))
    }

    pub fn translate(&mut self, dx: f64, dy: f64) -> Result<(), Error> {
        for c in &mut self.contours {
            c.translate(dx, dy)?;
        }
        Ok(())
    }

    /// Is `p` inside this polygon, by the even-odd rule over all contours?
    pub fn contains(&self, p: Point) -> bool {
        self.contours.iter().filter(|c| c.contains(p)).count() % 2 == 1
    }

    /// Works out which contours are inside which.
    ///
    /// A contour is inside another if one of its vertices that isn't on the
    /// other's boundary is inside the other. Contours are assumed not to
    /// cross one another, as in the output of a boolean operation.
    pub fn hole_structure(&self) -> Vec<ContourNesting> {
        let areas: Vec<f64> = self.contours.iter().map(Contour::area).collect();
        let inside = |i: usize, j: usize| {
            let outer = &self.contours[j];
            self.contours[i]
                .points()
                .iter()
                .find(|p| !outer.on_boundary(**p))
                .is_some_and(|p| outer.contains(*p))
        };

        (0..self.contours.len())
            .map(|i| {
                let containing: Vec<usize> = (0..self.contours.len())
                    .filter(|&j| j != i && inside(i, j))
                    .collect();
                let parent = containing
                    .iter()
                    .copied()
                    .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
                ContourNesting {
                    parent,
                    depth: containing.len(),
                }
            })
            .collect()
    }

    /// Orients outer contours counter-clockwise and holes clockwise.
    pub fn normalize_orientation(&mut self) {
        let structure = self.hole_structure();
        for (c, nesting) in self.contours.iter_mut().zip(structure) {
            if nesting.depth % 2 == 0 {
                c.set_counter_clockwise();
            } else {
                c.set_clockwise();
            }
        }
    }

    /// The area, counting holes as holes whichever way they're oriented.
    pub fn area(&self) -> f64 {
        self.contours
            .iter()
            .zip(self.hole_structure())
            .map(|(c, nesting)| {
                if nesting.depth % 2 == 0 {
                    c.area()
                } else {
                    -c.area()
                }
            })
            .sum()
    }
}

impl From<Vec<Contour>> for Polygon {
    fn from(contours: Vec<Contour>) -> Self {
        Polygon { contours }
    }
}

impl FromIterator<Contour> for Polygon {
    fn from_iter<I: IntoIterator<Item = Contour>>(iter: I) -> Self {
        Polygon {
            contours: iter.into_iter().collect(),
        }
    }
}

impl Extend<Contour> for Polygon {
    fn extend<I: IntoIterator<Item = Contour>>(&mut self, iter: I) {
        self.contours.extend(iter);
    }
}

impl IntoIterator for Polygon {
    type Item = Contour;
    type IntoIter = std::vec::IntoIter<Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.into_iter()
    }
}

impl<'a> IntoIterator for &'a Polygon {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}

impl std::fmt::Display for Contour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

/// One contour per line.
impl std::fmt::Display for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, c) in self.contours.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
