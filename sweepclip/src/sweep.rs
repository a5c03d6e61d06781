//! Sweep events, and the two orders that drive the sweep.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
    compare::Comparator,
    geom::{signed_area, Point, Segment},
    rb_tree,
};

/// An index into our event arena.
///
/// Every event of a sweep lives in one [`Events`] arena, and events refer to
/// one another by index. Indices are handed out in creation order, and that
/// order is the last-resort tie-breaker between segments that can't be told
/// apart geometrically.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct EventIdx(pub usize);

impl std::fmt::Debug for EventIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e_{}", self.0)
    }
}

/// Which of the two input polygons a segment came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PolygonKind {
    Subject,
    Clipping,
}

/// How a segment takes part in the result, once overlaps are accounted for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeType {
    /// Not overlapping any segment of the other polygon.
    #[default]
    Normal,
    /// One of two overlapping segments, whose partner stands in for both.
    NonContributing,
    /// Overlapping a segment of the other polygon, with both polygons on the
    /// same side of it.
    SameTransition,
    /// Overlapping a segment of the other polygon, with the polygons on
    /// opposite sides of it.
    DifferentTransition,
}

/// One endpoint of a segment.
#[derive(Clone, Debug)]
pub struct SweepEvent {
    pub point: Point,
    /// Is this the endpoint that the sweep meets first?
    pub left: bool,
    pub polygon: PolygonKind,
    /// The event at the segment's other endpoint.
    pub other: EventIdx,
    pub edge_type: EdgeType,
    /// Whether the segment lies inside the other polygon.
    ///
    /// Only meaningful on left events, after they've entered the sweep line.
    pub inside: bool,
    /// Whether a vertical ray going upwards crosses from the inside of the
    /// segment's own polygon to its outside when it crosses this segment.
    ///
    /// Only meaningful on left events, after they've entered the sweep line.
    pub in_out: bool,
    /// Where the segment sits in the sweep line, while it's there.
    pub status: Option<rb_tree::NodeIdx>,
}

/// The arena holding all the events of a sweep.
#[derive(Clone, Debug, Default)]
pub struct Events {
    events: Vec<SweepEvent>,
}

impl std::ops::Index<EventIdx> for Events {
    type Output = SweepEvent;

    fn index(&self, idx: EventIdx) -> &SweepEvent {
        &self.events[idx.0]
    }
}

impl std::ops::IndexMut<EventIdx> for Events {
    fn index_mut(&mut self, idx: EventIdx) -> &mut SweepEvent {
        &mut self.events[idx.0]
    }
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Adds a linked pair of events for a segment.
    ///
    /// Returns the left and right events, or `None` if the segment is degenerate.
    pub fn push_segment(
        &mut self,
        seg: &Segment,
        polygon: PolygonKind,
    ) -> Option<(EventIdx, EventIdx)> {
        if seg.is_degenerate() {
            return None;
        }
        let left = EventIdx(self.events.len());
        let right = EventIdx(left.0 + 1);
        self.push(SweepEvent::new(seg.min(), true, polygon, right, EdgeType::Normal));
        self.push(SweepEvent::new(seg.max(), false, polygon, left, EdgeType::Normal));
        Some((left, right))
    }

    pub(crate) fn push(&mut self, event: SweepEvent) -> EventIdx {
        self.events.push(event);
        EventIdx(self.events.len() - 1)
    }

    pub fn other(&self, e: EventIdx) -> EventIdx {
        self[e].other
    }

    /// The segment from this event's point to its partner's.
    pub fn segment(&self, e: EventIdx) -> Segment {
        Segment::new(self[e].point, self[self[e].other].point)
    }

    /// The segment of `e`, oriented from its left endpoint to its right endpoint.
    fn left_to_right(&self, e: EventIdx) -> (Point, Point) {
        let ev = &self[e];
        let other = self[ev.other].point;
        if ev.left {
            (ev.point, other)
        } else {
            (other, ev.point)
        }
    }

    /// Is `e`'s segment strictly below `p`?
    pub fn below(&self, e: EventIdx, p: Point) -> bool {
        let (a, b) = self.left_to_right(e);
        signed_area(a, b, p) > 0.0
    }

    /// Is `e`'s segment above `p` (or is `p` on the segment's line)?
    pub fn above(&self, e: EventIdx, p: Point) -> bool {
        !self.below(e, p)
    }

    fn collinear(&self, e1: EventIdx, e2: EventIdx) -> bool {
        let (a, b) = self.left_to_right(e1);
        let (c, d) = self.left_to_right(e2);
        signed_area(a, b, c) == 0.0 && signed_area(a, b, d) == 0.0
    }

    /// The order in which events are processed: `Greater` means that `e1` is
    /// processed after `e2`.
    ///
    /// Events are ordered by their point. At the same point, right events
    /// come first, and then events whose segments are lower. Collinear
    /// segments starting at the same point put the subject first, and
    /// otherwise go in creation order.
    pub fn sweep_order(&self, e1: EventIdx, e2: EventIdx) -> Ordering {
        if e1 == e2 {
            return Ordering::Equal;
        }
        let (ev1, ev2) = (&self[e1], &self[e2]);
        ev1.point
            .cmp(&ev2.point)
            .then_with(|| ev1.left.cmp(&ev2.left))
            .then_with(|| {
                if signed_area(ev1.point, self[ev1.other].point, self[ev2.other].point) == 0.0 {
                    ev1.polygon.cmp(&ev2.polygon).then(e1.cmp(&e2))
                } else if self.above(e1, self[ev2.other].point) {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            })
    }

    /// The order of segments on the sweep line: `Less` means that the segment
    /// of `e1` is below the segment of `e2`.
    ///
    /// Both events must be left events whose segments are both crossed by the
    /// sweep line.
    pub fn segment_order(&self, e1: EventIdx, e2: EventIdx) -> Ordering {
        if e1 == e2 {
            return Ordering::Equal;
        }
        let below_to_ord = |below: bool| {
            if below {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        };
        let (p1, p2) = (self[e1].point, self[e2].point);

        if !self.collinear(e1, e2) {
            if p1 == p2 {
                // Same left endpoint: look at where they go.
                return below_to_ord(self.below(e1, self[self[e2].other].point));
            }
            // Compare against the line of whichever segment entered the sweep
            // first. A segment starting on that line is sorted by where it goes.
            let (earlier, later) = if self.sweep_order(e1, e2) == Ordering::Greater {
                (e2, e1)
            } else {
                (e1, e2)
            };
            let (a, b) = self.left_to_right(earlier);
            let (c, d) = self.left_to_right(later);
            let side = match signed_area(a, b, c) {
                s if s == 0.0 => signed_area(a, b, d),
                s => s,
            };
            let later_below = side < 0.0;
            return if later == e1 {
                below_to_ord(later_below)
            } else {
                below_to_ord(!later_below)
            };
        }

        if p1 == p2 {
            e1.cmp(&e2)
        } else {
            self.sweep_order(e1, e2).reverse()
        }
    }
}

impl SweepEvent {
    pub fn new(
        point: Point,
        left: bool,
        polygon: PolygonKind,
        other: EventIdx,
        edge_type: EdgeType,
    ) -> Self {
        SweepEvent {
            point,
            left,
            polygon,
            other,
            edge_type,
            inside: false,
            in_out: false,
            status: None,
        }
    }
}

/// Orders events by [`Events::sweep_order`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SweepEventOrder;

impl Comparator<EventIdx> for SweepEventOrder {
    type Context = Events;

    fn compare(&self, events: &Events, a: &EventIdx, b: &EventIdx) -> Ordering {
        events.sweep_order(*a, *b)
    }
}

/// Orders left events by [`Events::segment_order`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentOrder;

impl Comparator<EventIdx> for SegmentOrder {
    type Context = Events;

    fn compare(&self, events: &Events, a: &EventIdx, b: &EventIdx) -> Ordering {
        events.segment_order(*a, *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::{p, seg};

    fn events(segs: &[((f64, f64), (f64, f64), PolygonKind)]) -> (Events, Vec<EventIdx>) {
        let mut events = Events::new();
        let lefts = segs
            .iter()
            .map(|&(a, b, kind)| events.push_segment(&seg(a, b), kind).unwrap().0)
            .collect();
        (events, lefts)
    }

    use PolygonKind::*;

    #[test]
    fn left_endpoint() {
        let mut events = Events::new();
        let (l, r) = events.push_segment(&seg((1.0, 0.0), (0.0, 0.0)), Subject).unwrap();
        assert_eq!(events[l].point, p(0.0, 0.0));
        assert!(events[l].left);
        assert!(!events[r].left);
        assert_eq!(events.other(l), r);
        assert_eq!(events.other(r), l);

        // Vertical segments go from bottom to top.
        let (l, _) = events.push_segment(&seg((0.0, 1.0), (0.0, 0.0)), Clipping).unwrap();
        assert_eq!(events[l].point, p(0.0, 0.0));

        assert!(events.push_segment(&seg((2.0, 2.0), (2.0, 2.0)), Subject).is_none());
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn event_order() {
        let (events, e) = events(&[
            ((0.0, 0.0), (2.0, 0.0), Subject),
            ((1.0, -1.0), (1.0, 1.0), Subject),
            ((0.0, 0.0), (2.0, 2.0), Clipping),
            ((-1.0, 0.0), (0.0, 0.0), Clipping),
        ]);
        // By x, and then by y.
        assert_eq!(events.sweep_order(e[0], e[1]), Ordering::Less);
        assert_eq!(events.sweep_order(e[1], e[0]), Ordering::Greater);
        assert_eq!(events.sweep_order(e[3], e[0]), Ordering::Less);
        // Right before left.
        let r3 = events.other(e[3]);
        assert_eq!(events.sweep_order(r3, e[0]), Ordering::Less);
        assert_eq!(events.sweep_order(e[0], r3), Ordering::Greater);
        // Lower segments first.
        assert_eq!(events.sweep_order(e[0], e[2]), Ordering::Less);
        assert_eq!(events.sweep_order(e[2], e[0]), Ordering::Greater);
        assert_eq!(events.sweep_order(e[2], e[2]), Ordering::Equal);
    }

    #[test]
    fn collinear_event_order() {
        let (events, e) = events(&[
            ((0.0, 0.0), (2.0, 0.0), Clipping),
            ((0.0, 0.0), (1.0, 0.0), Subject),
            ((0.0, 0.0), (3.0, 0.0), Subject),
        ]);
        assert_eq!(events.sweep_order(e[1], e[0]), Ordering::Less);
        assert_eq!(events.sweep_order(e[0], e[1]), Ordering::Greater);
        assert_eq!(events.sweep_order(e[1], e[2]), Ordering::Less);
        assert_eq!(events.sweep_order(e[2], e[0]), Ordering::Less);
    }

    #[test]
    fn status_order() {
        let (events, e) = events(&[
            ((0.0, 0.0), (4.0, 0.0), Subject),
            ((1.0, 1.0), (3.0, 2.0), Subject),
            ((0.0, 0.0), (4.0, 1.0), Clipping),
            ((2.0, -5.0), (2.0, 5.0), Clipping),
        ]);
        // Same left endpoint.
        assert_eq!(events.segment_order(e[0], e[2]), Ordering::Less);
        assert_eq!(events.segment_order(e[2], e[0]), Ordering::Greater);
        // Different left endpoints, in both argument orders.
        assert_eq!(events.segment_order(e[1], e[0]), Ordering::Greater);
        assert_eq!(events.segment_order(e[0], e[1]), Ordering::Less);
        assert_eq!(events.segment_order(e[2], e[1]), Ordering::Less);
        // The vertical segment starts below the others.
        assert_eq!(events.segment_order(e[3], e[1]), Ordering::Less);
        assert_eq!(events.segment_order(e[1], e[3]), Ordering::Greater);
    }

    #[test]
    fn starts_on_an_earlier_line() {
        let (events, e) = events(&[
            ((0.0, 4.0), (4.0, 0.0), Clipping),
            ((2.0, 2.0), (5.0, 3.0), Subject),
            ((2.0, 2.0), (3.0, 0.0), Subject),
            ((2.0, 0.0), (2.0, 5.0), Clipping),
            ((2.0, 2.0), (6.0, 3.0), Subject),
        ]);
        // (2, 2) is on the diagonal, so the right endpoints decide.
        assert_eq!(events.segment_order(e[1], e[0]), Ordering::Greater);
        assert_eq!(events.segment_order(e[0], e[1]), Ordering::Less);
        assert_eq!(events.segment_order(e[2], e[0]), Ordering::Less);
        assert_eq!(events.segment_order(e[0], e[2]), Ordering::Greater);
        // Starting partway up a vertical segment, and going right.
        assert_eq!(events.segment_order(e[4], e[3]), Ordering::Less);
        assert_eq!(events.segment_order(e[3], e[4]), Ordering::Greater);
    }

    #[test]
    fn collinear_status_order() {
        let (events, e) = events(&[
            ((0.0, 0.0), (2.0, 0.0), Subject),
            ((1.0, 0.0), (3.0, 0.0), Clipping),
            ((0.0, 0.0), (3.0, 0.0), Clipping),
        ]);
        // Later segments go below earlier ones.
        assert_eq!(events.segment_order(e[1], e[0]), Ordering::Less);
        assert_eq!(events.segment_order(e[0], e[1]), Ordering::Greater);
        // Same left endpoint: creation order.
        assert_eq!(events.segment_order(e[0], e[2]), Ordering::Less);
        assert_eq!(events.segment_order(e[2], e[0]), Ordering::Greater);
    }

    #[test]
    fn fan_sorts_by_slope() {
        let slopes = [3.0, -0.5, 0.0, 10.0, -7.0, 0.25];
        let (events, e) = events(
            &slopes
                .iter()
                .map(|&m| ((0.0, 0.0), (1.0, m), Subject))
                .collect::<Vec<_>>(),
        );
        let mut sorted = e.clone();
        sorted.sort_by(|a, b| events.segment_order(*a, *b));
        let sorted_slopes: Vec<_> = sorted
            .iter()
            .map(|&l| events[events.other(l)].point.y.into_inner())
            .collect();
        assert_eq!(sorted_slopes, vec![-7.0, -0.5, 0.0, 0.25, 3.0, 10.0]);

        let mut by_event = e;
        by_event.sort_by(|a, b| events.sweep_order(*a, *b));
        assert_eq!(by_event, sorted);
    }
}
