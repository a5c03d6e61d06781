//! Stitching result edges back together into contours.
//!
//! The sweep emits the edges of the result in sweep order, which has nothing
//! to do with the order they have along their contours. The [`Connector`]
//! keeps a list of open chains of points; each new edge extends a chain that
//! ends where the edge does, possibly joining it to another chain, and a chain
//! whose two ends meet becomes a closed contour.

use crate::{
    geom::{Point, Segment},
    linked_list::{Arena, LinkedList, NodeIdx},
    options::LeftoverChains,
    polygon::{Contour, Polygon},
    Error,
};

/// A chain of points joined by edges.
///
/// The points live in an [`Arena`] shared by all the chains of a
/// [`Connector`], so that joining two chains doesn't copy either of them.
#[derive(Clone, Debug)]
pub struct PointChain {
    points: LinkedList<Point>,
    closed: bool,
}

impl PointChain {
    pub fn new(arena: &mut Arena<Point>, seg: Segment) -> Self {
        let mut points = LinkedList::new();
        points.extend(arena, [seg.source, seg.target]);
        PointChain {
            points,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points<'a>(&self, arena: &'a Arena<Point>) -> impl Iterator<Item = Point> + 'a {
        self.points.iter(arena).copied()
    }

    fn ends(&self, arena: &Arena<Point>) -> Option<(Point, Point)> {
        Some((*self.points.front(arena)?, *self.points.back(arena)?))
    }

    /// Tries to attach `seg` to one of the ends of this chain.
    ///
    /// Returns false if neither of the segment's endpoints is an end of the
    /// chain. If both are, the chain gets closed.
    pub fn link_segment(&mut self, arena: &mut Arena<Point>, seg: Segment) -> bool {
        let Some((front, back)) = self.ends(arena) else {
            return false;
        };
        let (a, b) = (seg.source, seg.target);
        if a == front {
            if b == back {
                self.closed = true;
            } else {
                self.points.push_front(arena, b);
            }
        } else if b == back {
            if a == front {
                self.closed = true;
            } else {
                self.points.push_back(arena, a);
            }
        } else if b == front {
            if a == back {
                self.closed = true;
            } else {
                self.points.push_front(arena, a);
            }
        } else if a == back {
            if b == front {
                self.closed = true;
            } else {
                self.points.push_back(arena, b);
            }
        } else {
            return false;
        }
        true
    }

    /// Do the two chains have an end in common?
    pub fn touches(&self, arena: &Arena<Point>, other: &PointChain) -> bool {
        match (self.ends(arena), other.ends(arena)) {
            (Some((f, b)), Some((of, ob))) => of == b || ob == f || of == f || ob == b,
            _ => false,
        }
    }

    /// Tries to join `other` to this chain at a common end.
    ///
    /// On success `other` is left empty. If the join makes this chain's two
    /// ends meet, it gets closed. Apart from reversing `other` when the two
    /// chains run in opposite directions, this takes constant time.
    pub fn link_chain(&mut self, arena: &mut Arena<Point>, other: &mut PointChain) -> bool {
        let (Some((front, back)), Some((other_front, other_back))) =
            (self.ends(arena), other.ends(arena))
        else {
            return false;
        };
        if other_front == back {
            other.points.pop_front(arena);
            self.points.splice_to_back(arena, &mut other.points);
        } else if other_back == front {
            self.points.pop_front(arena);
            self.points.splice_to_front(arena, &mut other.points);
        } else if other_front == front {
            self.points.pop_front(arena);
            other.points.reverse(arena);
            self.points.splice_to_front(arena, &mut other.points);
        } else if other_back == back {
            self.points.pop_back(arena);
            other.points.reverse(arena);
            self.points.splice_to_back(arena, &mut other.points);
        } else {
            return false;
        }

        if self.points.len() > 2 && self.points.front(arena) == self.points.back(arena) {
            self.points.pop_back(arena);
            self.closed = true;
        }
        true
    }

    fn into_contour(self, arena: &mut Arena<Point>) -> Contour {
        self.points.drain(arena).collect()
    }
}

/// Assembles result edges into closed contours.
#[derive(Clone, Debug, Default)]
pub struct Connector {
    points: Arena<Point>,
    chains: Arena<PointChain>,
    open: LinkedList<PointChain>,
    closed: LinkedList<PointChain>,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edge to the first open chain it fits on, or starts a new chain.
    pub fn add(&mut self, seg: Segment) {
        let mut node = self.open.front_node();
        while let Some(j) = node {
            let Some(chain) = self.chains.get_mut(j) else {
                break;
            };
            if !chain.link_segment(&mut self.points, seg) {
                node = self.chains.next(j);
                continue;
            }

            if !chain.is_closed() {
                self.merge_after(j);
            }
            if self.chains.get(j).is_some_and(PointChain::is_closed) {
                if let Some(chain) = self.open.erase(&mut self.chains, j) {
                    self.closed.push_back(&mut self.chains, chain);
                }
            }
            return;
        }
        let chain = PointChain::new(&mut self.points, seg);
        self.open.push_back(&mut self.chains, chain);
    }

    // Joins the chain at `j` with the first later chain that it touches.
    fn merge_after(&mut self, j: NodeIdx) {
        let Some(chain) = self.chains.get(j) else {
            return;
        };
        let mut node = self.chains.next(j);
        while let Some(k) = node {
            if self
                .chains
                .get(k)
                .is_some_and(|other| chain.touches(&self.points, other))
            {
                break;
            }
            node = self.chains.next(k);
        }
        let Some(mut other) = node.and_then(|k| self.open.erase(&mut self.chains, k)) else {
            return;
        };
        if let Some(chain) = self.chains.get_mut(j) {
            chain.link_chain(&mut self.points, &mut other);
        }
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// Turns every closed chain into a contour.
    ///
    /// Chains that are still open are handled according to `leftovers`.
    pub fn into_polygon(self, leftovers: LeftoverChains) -> Result<Polygon, Error> {
        let count = self.open.len();
        if count > 0 {
            match leftovers {
                LeftoverChains::Drop => {}
                LeftoverChains::Warn => {
                    log::warn!("dropping {count} open chain(s) from the result");
                }
                LeftoverChains::Error => return Err(Error::OpenChains { count }),
            }
        }
        let Connector {
            mut points,
            mut chains,
            closed,
            ..
        } = self;
        Ok(closed
            .drain(&mut chains)
            .map(|chain| chain.into_contour(&mut points))
            .collect())
    }
}
