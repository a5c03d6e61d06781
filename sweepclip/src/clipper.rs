//! The sweep itself.
//!
//! We sweep a vertical line from left to right across both polygons. The
//! sweep line stops at every segment endpoint (the events, in a priority
//! queue) and keeps track of the segments crossing it (the status, in a
//! red-black tree ordered from bottom to top). When a segment enters the sweep
//! line we work out, from the segment just below it, whether it's inside the
//! other polygon. When it leaves, we know whether it belongs to the result.
//!
//! Segments that cross are split at their intersection point, so that by the
//! time a segment leaves the sweep line nothing crosses it. Segments of the two
//! polygons that overlap are split so that the overlapping parts coincide
//! exactly, and then only one of each overlapping pair is allowed to
//! contribute.

use std::cmp::Ordering;

use crate::{
    compare::Reversed,
    connector::Connector,
    geom::{find_intersection, BoundingBox, Intersection, Point, Segment},
    num::Float,
    options::ClipOptions,
    polygon::Polygon,
    priority_queue::PriorityQueue,
    rb_tree::{self, RbTree},
    sweep::{EdgeType, EventIdx, Events, PolygonKind, SegmentOrder, SweepEvent, SweepEventOrder},
    BooleanOp, Error,
};

/// Computes one boolean operation between two polygons.
///
/// ```
/// use sweepclip::{BooleanOp, Clipper, Polygon};
///
/// let subject = Polygon::try_from_coords(&[vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]])?;
/// let clipping = Polygon::try_from_coords(&[vec![(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]])?;
/// let union = Clipper::new(subject, clipping).compute(BooleanOp::Union)?;
/// assert_eq!(union.area(), 7.0);
/// # Ok::<(), sweepclip::Error>(())
/// ```
#[derive(Debug)]
pub struct Clipper {
    subject: Polygon,
    clipping: Polygon,
    options: ClipOptions,
    events: Events,
    queue: PriorityQueue<EventIdx, Reversed<SweepEventOrder>>,
    status: RbTree<EventIdx, SegmentOrder>,
    connector: Connector,
}

impl Clipper {
    pub fn new(subject: Polygon, clipping: Polygon) -> Self {
        Self::with_options(subject, clipping, ClipOptions::default())
    }

    pub fn with_options(subject: Polygon, clipping: Polygon, options: ClipOptions) -> Self {
        Clipper {
            subject,
            clipping,
            options,
            events: Events::new(),
            queue: PriorityQueue::new(Reversed(SweepEventOrder)),
            status: RbTree::new(SegmentOrder),
            connector: Connector::new(),
        }
    }

    /// Runs the sweep and returns the result of `op`.
    ///
    /// The result's contours are closed, and don't cross one another or
    /// themselves, but they aren't oriented in any particular way; see
    /// [`Polygon::normalize_orientation`].
    pub fn compute(mut self, op: BooleanOp) -> Result<Polygon, Error> {
        let (subject_bbox, clipping_bbox) =
            match (self.subject.bounding_box(), self.clipping.bounding_box()) {
                (Some(s), Some(c)) => (s, c),
                _ => {
                    log::debug!("{op:?} with an empty operand");
                    return Ok(self.with_empty_operand(op));
                }
            };
        if !subject_bbox.overlaps(&clipping_bbox) {
            log::debug!("{op:?} of polygons with disjoint bounding boxes");
            return Ok(self.disjoint(op));
        }

        let segments: Vec<(Segment, PolygonKind)> = self
            .subject
            .contours()
            .iter()
            .flat_map(|c| c.segments())
            .map(|s| (s, PolygonKind::Subject))
            .chain(
                self.clipping
                    .contours()
                    .iter()
                    .flat_map(|c| c.segments())
                    .map(|s| (s, PolygonKind::Clipping)),
            )
            .collect();
        for (seg, kind) in &segments {
            self.process_segment(seg, *kind);
        }

        let min_max_x = subject_bbox.max_x.min(clipping_bbox.max_x);
        while let Some(e) = self.queue.pop(&self.events) {
            let x = self.events[e].point.x;
            if self.past_the_end(op, x, min_max_x, &subject_bbox) {
                if op == BooleanOp::Union {
                    self.drain_right_events(e);
                }
                break;
            }

            log::trace!(
                "{e:?}: {} event at {:?}",
                if self.events[e].left { "left" } else { "right" },
                self.events[e].point,
            );
            if self.events[e].left {
                self.handle_left(e)?;
            } else {
                self.handle_right(e, op)?;
            }
        }

        self.connector.into_polygon(self.options.leftover_chains)
    }

    fn with_empty_operand(self, op: BooleanOp) -> Polygon {
        match op {
            BooleanOp::Intersection => Polygon::new(),
            BooleanOp::Difference => self.subject,
            BooleanOp::Union | BooleanOp::Xor => {
                if self.subject.bounding_box().is_none() {
                    self.clipping
                } else {
                    self.subject
                }
            }
        }
    }

    fn disjoint(mut self, op: BooleanOp) -> Polygon {
        match op {
            BooleanOp::Intersection => Polygon::new(),
            BooleanOp::Difference => self.subject,
            BooleanOp::Union | BooleanOp::Xor => {
                self.subject.extend(self.clipping);
                self.subject
            }
        }
    }

    // Once the sweep line is past the end of one of the polygons, the rest of
    // the result doesn't depend on the sweep anymore.
    fn past_the_end(
        &self,
        op: BooleanOp,
        x: Float,
        min_max_x: Float,
        subject_bbox: &BoundingBox,
    ) -> bool {
        let past = match op {
            BooleanOp::Intersection | BooleanOp::Union => x > min_max_x,
            BooleanOp::Difference => x > subject_bbox.max_x,
            BooleanOp::Xor => false,
        };
        if past {
            log::debug!("{op:?}: stopping the sweep early at x = {x}");
        }
        past
    }

    // Everything right of both polygons' overlap belongs to the union.
    fn drain_right_events(&mut self, first: EventIdx) {
        let mut next = Some(first);
        while let Some(e) = next {
            if !self.events[e].left {
                self.connector.add(self.events.segment(e));
            }
            next = self.queue.pop(&self.events);
        }
    }

    /// Adds the two events of a segment to the queue. Degenerate segments are ignored.
    fn process_segment(&mut self, seg: &Segment, polygon: PolygonKind) {
        if let Some((left, right)) = self.events.push_segment(seg, polygon) {
            self.queue.push(&self.events, left);
            self.queue.push(&self.events, right);
        }
    }

    fn key(&self, node: rb_tree::NodeIdx) -> Result<EventIdx, Error> {
        self.status
            .get(node)
            .copied()
            .ok_or(Error::Internal("stale sweep-line handle"))
    }

    fn handle_left(&mut self, e: EventIdx) -> Result<(), Error> {
        let (node, inserted) = self.status.insert(&self.events, e);
        if !inserted {
            return Err(Error::Internal("segment entered the sweep line twice"));
        }
        self.events[e].status = Some(node);

        let prev = self.status.prev(node);
        let next = self.status.next(node).map(|n| self.key(n)).transpose()?;
        self.compute_fields(e, prev)?;

        if let Some(next) = next {
            self.possible_intersection(e, next);
        }
        if let Some(prev) = prev {
            let prev = self.key(prev)?;
            self.possible_intersection(prev, e);
        }
        Ok(())
    }

    fn handle_right(&mut self, e: EventIdx, op: BooleanOp) -> Result<(), Error> {
        let left = self.events[e].other;
        let node = self.events[left]
            .status
            .ok_or(Error::Internal("segment left the sweep line without entering it"))?;
        let prev = self.status.prev(node).map(|n| self.key(n)).transpose()?;
        let next = self.status.next(node).map(|n| self.key(n)).transpose()?;

        if self.contributes(e, op) {
            log::trace!("{e:?} contributes {:?}", self.events.segment(e));
            self.connector.add(self.events.segment(e));
        }

        self.status
            .erase_node(node)
            .ok_or(Error::Internal("segment missing from the sweep line"))?;
        self.events[left].status = None;

        if let (Some(prev), Some(next)) = (prev, next) {
            self.possible_intersection(prev, next);
        }
        Ok(())
    }

    /// Sets the `inside` and `in_out` flags of a left event that just entered
    /// the sweep line, given the node just below it.
    fn compute_fields(&mut self, e: EventIdx, prev: Option<rb_tree::NodeIdx>) -> Result<(), Error> {
        let Some(prev_node) = prev else {
            let ev = &mut self.events[e];
            ev.inside = false;
            ev.in_out = false;
            return Ok(());
        };
        let prev = &self.events[self.key(prev_node)?];
        let same_polygon = prev.polygon == self.events[e].polygon;

        let (inside, in_out) = if prev.edge_type != EdgeType::Normal {
            // `prev` overlaps with the segment below it, and only one of them
            // tells the truth about its own polygon: look past both.
            match self.status.prev(prev_node) {
                None => (true, false),
                Some(pp_node) => {
                    let pp = &self.events[self.key(pp_node)?];
                    if same_polygon {
                        (!pp.in_out, !prev.in_out)
                    } else {
                        (!prev.in_out, !pp.in_out)
                    }
                }
            }
        } else if same_polygon {
            (prev.inside, !prev.in_out)
        } else {
            (!prev.in_out, prev.inside)
        };

        let ev = &mut self.events[e];
        ev.inside = inside;
        ev.in_out = in_out;
        Ok(())
    }

    /// Does the segment of the right event `e` belong to the result of `op`?
    fn contributes(&self, e: EventIdx, op: BooleanOp) -> bool {
        let ev = &self.events[e];
        let inside = self.events[ev.other].inside;
        match ev.edge_type {
            EdgeType::Normal => match op {
                BooleanOp::Intersection => inside,
                BooleanOp::Union => !inside,
                BooleanOp::Difference => match ev.polygon {
                    PolygonKind::Subject => !inside,
                    PolygonKind::Clipping => inside,
                },
                BooleanOp::Xor => true,
            },
            EdgeType::SameTransition => {
                matches!(op, BooleanOp::Intersection | BooleanOp::Union)
            }
            EdgeType::DifferentTransition => op == BooleanOp::Difference,
            EdgeType::NonContributing => false,
        }
    }

    /// Splits the segments of two left events that are neighbors on the sweep
    /// line, so that they don't cross and any overlap between them is shared
    /// exactly.
    fn possible_intersection(&mut self, e1: EventIdx, e2: EventIdx) {
        let (o1, o2) = (self.events.other(e1), self.events.other(e2));
        let pt = |e: EventIdx| self.events[e].point;
        let (p1, p2, q1, q2) = (pt(e1), pt(e2), pt(o1), pt(o2));

        match find_intersection(&self.events.segment(e1), &self.events.segment(e2)) {
            Intersection::None => {}
            Intersection::Point(ip) => {
                if p1 == p2 || q1 == q2 {
                    // They touch at a shared endpoint.
                    return;
                }
                if ip != p1 && ip != q1 {
                    self.divide_segment(e1, ip);
                }
                if ip != p2 && ip != q2 {
                    self.divide_segment(e2, ip);
                }
            }
            Intersection::Overlap(..) => {
                if self.events[e1].polygon == self.events[e2].polygon {
                    log::trace!("{e1:?} and {e2:?} overlap, but they're in the same polygon");
                    return;
                }
                self.split_overlap(e1, e2);
            }
        }
    }

    fn split_overlap(&mut self, e1: EventIdx, e2: EventIdx) {
        let (o1, o2) = (self.events.other(e1), self.events.other(e2));

        // The endpoints of both segments in sweep order, with `None` standing
        // for a pair of endpoints that coincide.
        let mut sorted: Vec<Option<EventIdx>> = Vec::with_capacity(4);
        for (a, b) in [(e1, e2), (o1, o2)] {
            if self.events[a].point == self.events[b].point {
                sorted.push(None);
            } else if self.events.sweep_order(a, b) == Ordering::Greater {
                sorted.extend([Some(b), Some(a)]);
            } else {
                sorted.extend([Some(a), Some(b)]);
            }
        }

        let transition = if self.events[e1].in_out == self.events[e2].in_out {
            EdgeType::SameTransition
        } else {
            EdgeType::DifferentTransition
        };
        let set_type = |events: &mut Events, e: EventIdx, edge_type: EdgeType| {
            events[e].edge_type = edge_type;
        };
        let set_pair_type = |events: &mut Events, e: EventIdx, edge_type: EdgeType| {
            let other = events.other(e);
            events[e].edge_type = edge_type;
            events[other].edge_type = edge_type;
        };

        match sorted[..] {
            // The segments are the same.
            [None, None] => {
                set_pair_type(&mut self.events, e1, EdgeType::NonContributing);
                set_pair_type(&mut self.events, e2, transition);
            }
            // They share their left endpoint.
            [None, Some(a), Some(b)] => {
                set_pair_type(&mut self.events, a, EdgeType::NonContributing);
                let longer = self.events.other(b);
                set_type(&mut self.events, longer, transition);
                let p = self.events[a].point;
                self.divide_segment(longer, p);
            }
            // They share their right endpoint.
            [Some(a), Some(b), None] => {
                set_pair_type(&mut self.events, b, EdgeType::NonContributing);
                let longer_right = self.events.other(a);
                set_type(&mut self.events, longer_right, transition);
                let p = self.events[b].point;
                self.divide_segment(a, p);
            }
            [Some(s0), Some(s1), Some(s2), Some(s3)] => {
                let (p1, p2) = (self.events[s1].point, self.events[s2].point);
                if s0 != self.events.other(s3) {
                    // Neither contains the other.
                    set_type(&mut self.events, s1, EdgeType::NonContributing);
                    set_type(&mut self.events, s2, transition);
                    self.divide_segment(s0, p1);
                    self.divide_segment(s1, p2);
                } else {
                    // The segment of `s0` contains the other one.
                    set_pair_type(&mut self.events, s1, EdgeType::NonContributing);
                    self.divide_segment(s0, p1);
                    let middle = self.events.other(s3);
                    set_type(&mut self.events, middle, transition);
                    self.divide_segment(middle, p2);
                }
            }
            _ => {
                log::warn!("unexpected overlap between {e1:?} and {e2:?}: {sorted:?}");
            }
        }
    }

    /// Splits the segment of the left event `e` at `p`.
    fn divide_segment(&mut self, e: EventIdx, p: Point) {
        let other = self.events.other(e);
        if p == self.events[e].point || p == self.events[other].point {
            return;
        }
        log::trace!("dividing {:?} at {p:?}", self.events.segment(e));

        let polygon = self.events[e].polygon;
        // The right end of the first half, and the left end of the second half.
        let r = self.events.push(SweepEvent::new(
            p,
            false,
            polygon,
            e,
            self.events[e].edge_type,
        ));
        let l = self.events.push(SweepEvent::new(
            p,
            true,
            polygon,
            other,
            self.events[other].edge_type,
        ));
        if self.events.sweep_order(l, other) == Ordering::Greater {
            // Rounding moved `p` past the end of the segment.
            log::trace!("{l:?} sorts after {other:?}; swapping their sides");
            self.events[other].left = true;
            self.events[l].left = false;
        }
        self.events[other].other = l;
        self.events[e].other = r;

        self.queue.push(&self.events, l);
        self.queue.push(&self.events, r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LeftoverChains;
    use crate::perturbation::{perturbation, realize_perturbation};
    use crate::polygon::tests::{contour, rect};
    use proptest::prelude::*;

    fn poly(contours: Vec<crate::polygon::Contour>) -> Polygon {
        Polygon::from(contours)
    }

    fn run(a: &Polygon, b: &Polygon, op: BooleanOp) -> Polygon {
        let options = ClipOptions {
            leftover_chains: LeftoverChains::Error,
        };
        Clipper::with_options(a.clone(), b.clone(), options)
            .compute(op)
            .unwrap()
    }

    #[test]
    fn offset_squares() {
        let a = poly(vec![rect(0.0, 0.0, 1.0, 1.0)]);
        let b = poly(vec![rect(0.5, 0.5, 1.5, 1.5)]);

        let inter = run(&a, &b, BooleanOp::Intersection);
        assert_eq!(inter.contours().len(), 1);
        assert_eq!(inter.vertex_count(), 4);
        assert_eq!(inter.area(), 0.25);

        let union = run(&a, &b, BooleanOp::Union);
        assert_eq!(union.contours().len(), 1);
        assert_eq!(union.vertex_count(), 8);
        assert_eq!(union.area(), 1.75);

        let diff = run(&a, &b, BooleanOp::Difference);
        assert_eq!(diff.contours().len(), 1);
        assert_eq!(diff.area(), 0.75);

        let diff = run(&b, &a, BooleanOp::Difference);
        assert_eq!(diff.area(), 0.75);
    }

    #[test]
    fn adjacent_squares() {
        let a = poly(vec![rect(0.0, 0.0, 1.0, 1.0)]);
        let b = poly(vec![rect(1.0, 0.0, 2.0, 1.0)]);

        let union = run(&a, &b, BooleanOp::Union);
        assert_eq!(union.contours().len(), 1);
        assert_eq!(union.vertex_count(), 6);
        assert_eq!(union.area(), 2.0);

        assert!(run(&a, &b, BooleanOp::Intersection).is_empty());
        assert_eq!(run(&a, &b, BooleanOp::Difference).area(), 1.0);
    }

    #[test]
    fn identical_squares() {
        let a = poly(vec![rect(0.0, 0.0, 1.0, 1.0)]);
        assert_eq!(run(&a, &a, BooleanOp::Intersection).area(), 1.0);
        assert_eq!(run(&a, &a, BooleanOp::Union).area(), 1.0);
        assert!(run(&a, &a, BooleanOp::Difference).is_empty());
    }

    #[test]
    fn crossing_triangles() {
        // Two triangles making a star of David.
        let a = poly(vec![contour(&[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0)])]);
        let b = poly(vec![contour(&[(0.0, 2.0), (2.0, -1.0), (4.0, 2.0)])]);
        let inter = run(&a, &b, BooleanOp::Intersection);
        let union = run(&a, &b, BooleanOp::Union);
        assert_eq!(inter.contours().len(), 1);
        assert!(inter.area() > 0.0);
        let sum = a.area() + b.area();
        assert!((union.area() + inter.area() - sum).abs() < 1e-9);
    }

    #[test]
    fn hole() {
        let outer = poly(vec![rect(0.0, 0.0, 4.0, 4.0)]);
        let inner = poly(vec![rect(1.0, 1.0, 3.0, 3.0)]);
        let diff = run(&outer, &inner, BooleanOp::Difference);
        assert_eq!(diff.contours().len(), 2);
        assert_eq!(diff.area(), 12.0);
        let nesting = diff.hole_structure();
        assert_eq!(nesting.iter().filter(|n| n.depth == 1).count(), 1);

        assert_eq!(run(&inner, &outer, BooleanOp::Difference).area(), 0.0);
        assert_eq!(run(&outer, &inner, BooleanOp::Intersection).area(), 4.0);
    }

    #[test]
    fn trivial_cases() {
        let a = poly(vec![rect(0.0, 0.0, 1.0, 1.0)]);
        let far = poly(vec![rect(5.0, 5.0, 6.0, 6.0)]);
        let empty = Polygon::new();

        assert_eq!(run(&a, &empty, BooleanOp::Union), a);
        assert_eq!(run(&empty, &a, BooleanOp::Union), a);
        assert_eq!(run(&empty, &a, BooleanOp::Xor), a);
        assert_eq!(run(&a, &empty, BooleanOp::Difference), a);
        assert!(run(&empty, &a, BooleanOp::Difference).is_empty());
        assert!(run(&a, &empty, BooleanOp::Intersection).is_empty());

        assert!(run(&a, &far, BooleanOp::Intersection).is_empty());
        assert_eq!(run(&a, &far, BooleanOp::Difference), a);
        let union = run(&a, &far, BooleanOp::Union);
        assert_eq!(union.contours(), &[a.contours()[0].clone(), far.contours()[0].clone()]);
        assert_eq!(run(&a, &far, BooleanOp::Xor), union);
    }

    #[test]
    fn degenerate_segments_are_ignored() {
        // A repeated vertex makes a zero-length edge.
        let a = poly(vec![contour(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ])]);
        let b = poly(vec![rect(0.5, 0.5, 1.5, 1.5)]);
        assert_eq!(run(&a, &b, BooleanOp::Intersection).area(), 0.25);
    }

    proptest! {
        #[test]
        fn area_ignores_how_contours_are_drawn(pa in perturbation(), pb in perturbation()) {
            let a = poly(vec![realize_perturbation(&[rect(0.0, 0.0, 2.0, 2.0)], &pa)]);
            let b = poly(vec![realize_perturbation(&[rect(1.0, 1.0, 3.0, 3.0)], &pb)]);
            for (op, expected) in [
                (BooleanOp::Intersection, 1.0),
                (BooleanOp::Union, 7.0),
                (BooleanOp::Difference, 3.0),
            ] {
                let area = run(&a, &b, op).area();
                prop_assert!((area - expected).abs() < 1e-9, "{op:?}: {area}");
            }
        }
    }
}
