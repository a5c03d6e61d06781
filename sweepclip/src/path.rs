//! Converting between polygons and [`kurbo`] paths.

use kurbo::{BezPath, PathEl};

use crate::{
    geom::Point,
    polygon::{Contour, Polygon},
    Error,
};

fn point(p: kurbo::Point) -> Result<Point, Error> {
    Point::try_new(p.x, p.y)
}

// Ends the current subpath. Anything with fewer than three points has
// nothing inside it, and is dropped.
fn finish(points: &mut Vec<Point>, contours: &mut Vec<Contour>) {
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    let points = std::mem::take(points);
    if points.len() >= 3 {
        contours.push(Contour::new(points));
    }
}

/// Flattens a path into a polygon, approximating curves by line segments to
/// within `tolerance`.
///
/// Every subpath becomes a contour, whether or not it was explicitly closed.
///
/// ```
/// use kurbo::Shape;
/// use sweepclip::path::polygon_from_path;
///
/// let square = kurbo::Rect::new(0.0, 0.0, 2.0, 2.0);
/// let poly = polygon_from_path(square.path_elements(0.1), 0.1)?;
/// assert_eq!(poly.area(), 4.0);
/// # Ok::<(), sweepclip::Error>(())
/// ```
pub fn polygon_from_path(
    elements: impl IntoIterator<Item = PathEl>,
    tolerance: f64,
) -> Result<Polygon, Error> {
    let mut contours = Vec::new();
    let mut points = Vec::new();
    let mut result = Ok(());

    kurbo::flatten(elements, tolerance, |el| {
        if result.is_err() {
            return;
        }
        match el {
            PathEl::MoveTo(p) => {
                finish(&mut points, &mut contours);
                result = point(p).map(|p| points.push(p));
            }
            PathEl::LineTo(p) => {
                result = point(p).map(|p| points.push(p));
            }
            PathEl::ClosePath => {
                // A subpath that carries on after closing starts where the closed one did.
                let start = points.first().copied();
                finish(&mut points, &mut contours);
                points.extend(start);
            }
            // `flatten` only produces lines.
            PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
        }
    });
    result?;
    finish(&mut points, &mut contours);

    Ok(Polygon::from(contours))
}

/// Turns each contour of a polygon into a closed subpath.
pub fn polygon_to_path(polygon: &Polygon) -> BezPath {
    let mut path = BezPath::new();
    for contour in polygon {
        let mut points = contour.points().iter().map(|p| {
            let (x, y) = p.to_f64();
            kurbo::Point::new(x, y)
        });
        let Some(first) = points.next() else {
            continue;
        };
        path.move_to(first);
        for p in points {
            path.line_to(p);
        }
        path.close_path();
    }
    path
}
