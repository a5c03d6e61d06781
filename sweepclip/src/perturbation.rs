//! Strategies for rewriting a contour without changing the region it bounds.
//!
//! A boolean operation only cares about the region, so its result (or at
//! least the result's area) shouldn't notice any of these.

use proptest::{arbitrary::any, prop_oneof, strategy::Strategy};

use crate::{geom::Point, polygon::Contour};

#[derive(Clone, Debug)]
pub enum Perturbation {
    Base {
        idx: usize,
    },
    /// Insert the midpoint of an edge.
    Subdivision {
        idx: usize,
        next: Box<Perturbation>,
    },
    /// Start the contour at a different vertex.
    Rotation {
        by: usize,
        next: Box<Perturbation>,
    },
    /// Go around the other way.
    Reversal {
        next: Box<Perturbation>,
    },
}

pub fn perturbation() -> impl Strategy<Value = Perturbation> {
    let leaf = any::<usize>().prop_map(|idx| Perturbation::Base { idx });
    leaf.prop_recursive(4, 16, 1, |inner| {
        prop_oneof![
            (any::<usize>(), inner.clone()).prop_map(|(idx, next)| Perturbation::Subdivision {
                idx,
                next: Box::new(next),
            }),
            (any::<usize>(), inner.clone()).prop_map(|(by, next)| Perturbation::Rotation {
                by,
                next: Box::new(next),
            }),
            inner.prop_map(|next| Perturbation::Reversal {
                next: Box::new(next),
            }),
        ]
    })
}

fn index<T>(arr: &[T], idx: usize) -> &T {
    &arr[idx % arr.len()]
}

// The base cases have small integer coordinates, so midpoints are exact and
// land exactly on their edges.
fn midpoint(p: Point, q: Point) -> Point {
    let ((x0, y0), (x1, y1)) = (p.to_f64(), q.to_f64());
    Point::try_new((x0 + x1) / 2.0, (y0 + y1) / 2.0).unwrap()
}

pub fn realize_perturbation(base_cases: &[Contour], pert: &Perturbation) -> Contour {
    match pert {
        Perturbation::Base { idx } => index(base_cases, *idx).clone(),
        Perturbation::Subdivision { idx, next } => {
            let mut points = realize_perturbation(base_cases, next).points().to_vec();
            let idx = *idx % points.len();
            let p0 = points[idx];
            let p1 = *index(&points, idx + 1);
            points.insert(idx + 1, midpoint(p0, p1));
            Contour::new(points)
        }
        Perturbation::Rotation { by, next } => {
            let mut points = realize_perturbation(base_cases, next).points().to_vec();
            let by = *by % points.len();
            points.rotate_left(by);
            Contour::new(points)
        }
        Perturbation::Reversal { next } => {
            let mut contour = realize_perturbation(base_cases, next);
            contour.reverse();
            contour
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::tests::{contour, rect};

    #[test]
    fn subdivision_keeps_the_region() {
        let base = [rect(0.0, 0.0, 2.0, 2.0)];
        let pert = Perturbation::Reversal {
            next: Box::new(Perturbation::Subdivision {
                idx: 1,
                next: Box::new(Perturbation::Base { idx: 0 }),
            }),
        };
        let c = realize_perturbation(&base, &pert);
        assert_eq!(
            c,
            contour(&[(0.0, 2.0), (2.0, 2.0), (2.0, 1.0), (2.0, 0.0), (0.0, 0.0)])
        );
        assert_eq!(c.area(), 4.0);
    }
}
