//! A red-black tree ordered by an injected [`Comparator`].
//!
//! This is the textbook (Cormen et al.) red-black tree, with a sentinel nil
//! node and parent pointers. Nodes live in an arena and are addressed by
//! [`NodeIdx`]. Deletion relinks nodes instead of moving keys between them,
//! so a handle keeps pointing at the same key for as long as that key is in
//! the tree. The sweep relies on this: it stores the handle of every active
//! segment and uses it to find the segment's neighbors.

use std::cmp::Ordering;

use crate::compare::Comparator;

/// A handle to a node of an [`RbTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdx(usize);

impl std::fmt::Debug for NodeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t_{}", self.0)
    }
}

// The sentinel. Its key is always `None`, and it's always black.
const NIL: usize = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, Debug)]
struct Links {
    color: Color,
    parent: usize,
    left: usize,
    right: usize,
}

const NIL_LINKS: Links = Links {
    color: Color::Black,
    parent: NIL,
    left: NIL,
    right: NIL,
};

#[derive(Clone, Debug)]
pub struct RbTree<T, C> {
    // `keys[i]` is `None` for the sentinel and for free slots.
    keys: Vec<Option<T>>,
    links: Vec<Links>,
    free: Vec<usize>,
    root: usize,
    len: usize,
    cmp: C,
}

impl<T, C: Comparator<T>> RbTree<T, C> {
    pub fn new(cmp: C) -> Self {
        Self {
            keys: vec![None],
            links: vec![NIL_LINKS],
            free: Vec::new(),
            root: NIL,
            len: 0,
            cmp,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn handle(&self, x: usize) -> Option<NodeIdx> {
        (x != NIL).then_some(NodeIdx(x))
    }

    fn is_live(&self, node: NodeIdx) -> bool {
        matches!(self.keys.get(node.0), Some(Some(_)))
    }

    fn color(&self, x: usize) -> Color {
        self.links[x].color
    }

    fn parent(&self, x: usize) -> usize {
        self.links[x].parent
    }

    fn left(&self, x: usize) -> usize {
        self.links[x].left
    }

    fn right(&self, x: usize) -> usize {
        self.links[x].right
    }

    fn set_color(&mut self, x: usize, color: Color) {
        self.links[x].color = color;
    }

    fn minimum(&self, mut x: usize) -> usize {
        while self.left(x) != NIL {
            x = self.left(x);
        }
        x
    }

    fn maximum(&self, mut x: usize) -> usize {
        while self.right(x) != NIL {
            x = self.right(x);
        }
        x
    }

    pub fn get(&self, node: NodeIdx) -> Option<&T> {
        self.keys.get(node.0)?.as_ref()
    }

    pub fn first(&self) -> Option<NodeIdx> {
        self.handle(self.minimum(self.root))
    }

    pub fn last(&self) -> Option<NodeIdx> {
        self.handle(self.maximum(self.root))
    }

    /// The in-order successor of `node`.
    pub fn next(&self, node: NodeIdx) -> Option<NodeIdx> {
        if !self.is_live(node) {
            return None;
        }
        let mut x = node.0;
        if self.right(x) != NIL {
            return self.handle(self.minimum(self.right(x)));
        }
        let mut y = self.parent(x);
        while y != NIL && x == self.right(y) {
            x = y;
            y = self.parent(y);
        }
        self.handle(y)
    }

    /// The in-order predecessor of `node`.
    pub fn prev(&self, node: NodeIdx) -> Option<NodeIdx> {
        if !self.is_live(node) {
            return None;
        }
        let mut x = node.0;
        if self.left(x) != NIL {
            return self.handle(self.maximum(self.left(x)));
        }
        let mut y = self.parent(x);
        while y != NIL && x == self.left(y) {
            x = y;
            y = self.parent(y);
        }
        self.handle(y)
    }

    pub fn find(&self, ctx: &C::Context, key: &T) -> Option<NodeIdx> {
        let mut x = self.root;
        // The walk ends at the sentinel, which has no key.
        while let Some(k) = &self.keys[x] {
            x = match self.cmp.compare(ctx, key, k) {
                Ordering::Less => self.left(x),
                Ordering::Greater => self.right(x),
                Ordering::Equal => return Some(NodeIdx(x)),
            };
        }
        None
    }

    /// Inserts `key`, unless there's already an equal key in the tree.
    ///
    /// Returns the node holding the new key, or the node holding the equal key
    /// that was already there. The boolean is true if `key` was inserted.
    pub fn insert(&mut self, ctx: &C::Context, key: T) -> (NodeIdx, bool) {
        let mut parent = NIL;
        let mut x = self.root;
        let mut ord = Ordering::Equal;
        while let Some(k) = &self.keys[x] {
            parent = x;
            ord = self.cmp.compare(ctx, &key, k);
            x = match ord {
                Ordering::Less => self.left(x),
                Ordering::Greater => self.right(x),
                Ordering::Equal => return (NodeIdx(x), false),
            };
        }

        let z = self.alloc(key, parent);
        if parent == NIL {
            self.root = z;
        } else if ord == Ordering::Less {
            self.links[parent].left = z;
        } else {
            self.links[parent].right = z;
        }
        self.insert_fixup(z);
        (NodeIdx(z), true)
    }

    /// Removes the key equal to `key`, if there is one.
    pub fn erase(&mut self, ctx: &C::Context, key: &T) -> Option<T> {
        let node = self.find(ctx, key)?;
        self.erase_node(node)
    }

    /// Removes `node` from the tree, returning its key.
    ///
    /// Returns `None` if `node` isn't in the tree. Handles to all other nodes
    /// remain valid.
    pub fn erase_node(&mut self, node: NodeIdx) -> Option<T> {
        if !self.is_live(node) {
            return None;
        }
        let z = node.0;
        let mut y_color = self.color(z);
        let x;
        if self.left(z) == NIL {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z) == NIL {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            let y = self.minimum(self.right(z));
            y_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                // `x` may be the sentinel; the fixup needs its parent anyway.
                self.links[x].parent = y;
            } else {
                self.transplant(y, x);
                let zr = self.right(z);
                self.links[y].right = zr;
                self.links[zr].parent = y;
            }
            self.transplant(z, y);
            let zl = self.left(z);
            self.links[y].left = zl;
            self.links[zl].parent = y;
            self.set_color(y, self.color(z));
        }
        if y_color == Color::Black {
            self.delete_fixup(x);
        }
        self.links[NIL] = NIL_LINKS;

        self.links[z] = NIL_LINKS;
        self.free.push(z);
        self.len -= 1;
        self.keys[z].take()
    }

    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter {
            tree: self,
            next: self.first(),
        }
    }

    fn alloc(&mut self, key: T, parent: usize) -> usize {
        let links = Links {
            color: Color::Red,
            parent,
            left: NIL,
            right: NIL,
        };
        self.len += 1;
        if let Some(z) = self.free.pop() {
            self.keys[z] = Some(key);
            self.links[z] = links;
            z
        } else {
            self.keys.push(Some(key));
            self.links.push(links);
            self.keys.len() - 1
        }
    }

    // Replaces the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, u: usize, v: usize) {
        let p = self.parent(u);
        if p == NIL {
            self.root = v;
        } else if u == self.left(p) {
            self.links[p].left = v;
        } else {
            self.links[p].right = v;
        }
        self.links[v].parent = p;
    }

    fn rotate_left(&mut self, x: usize) {
        let y = self.right(x);
        let yl = self.left(y);
        self.links[x].right = yl;
        if yl != NIL {
            self.links[yl].parent = x;
        }
        self.transplant(x, y);
        self.links[y].left = x;
        self.links[x].parent = y;
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.left(x);
        let yr = self.right(y);
        self.links[x].left = yr;
        if yr != NIL {
            self.links[yr].parent = x;
        }
        self.transplant(x, y);
        self.links[y].right = x;
        self.links[x].parent = y;
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while self.color(self.parent(z)) == Color::Red {
            let p = self.parent(z);
            let g = self.parent(p);
            if p == self.left(g) {
                let uncle = self.right(g);
                if self.color(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.right(p) {
                        z = p;
                        self.rotate_left(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.left(g);
                if self.color(uncle) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_left(g);
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }

    fn delete_fixup(&mut self, mut x: usize) {
        while x != self.root && self.color(x) == Color::Black {
            let p = self.parent(x);
            if x == self.left(p) {
                let mut w = self.right(p);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    w = self.right(self.parent(x));
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = self.parent(x);
                } else {
                    if self.color(self.right(w)) == Color::Black {
                        self.set_color(self.left(w), Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(self.parent(x));
                    }
                    let p = self.parent(x);
                    self.set_color(w, self.color(p));
                    self.set_color(p, Color::Black);
                    self.set_color(self.right(w), Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.left(p);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    w = self.left(self.parent(x));
                }
                if self.color(self.right(w)) == Color::Black
                    && self.color(self.left(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = self.parent(x);
                } else {
                    if self.color(self.left(w)) == Color::Black {
                        self.set_color(self.right(w), Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(self.parent(x));
                    }
                    let p = self.parent(x);
                    self.set_color(w, self.color(p));
                    self.set_color(p, Color::Black);
                    self.set_color(self.left(w), Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        self.set_color(x, Color::Black);
    }

    /// Checks the red-black and search-tree invariants, panicking if they fail.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self, ctx: &C::Context)
    where
        T: std::fmt::Debug,
    {
        assert_eq!(self.color(self.root), Color::Black);
        assert_eq!(self.color(NIL), Color::Black);
        if self.root != NIL {
            assert_eq!(self.parent(self.root), NIL);
        }

        // Returns the black height.
        fn check<T, C: Comparator<T>>(tree: &RbTree<T, C>, x: usize, count: &mut usize) -> usize {
            if x == NIL {
                return 1;
            }
            *count += 1;
            assert!(tree.keys[x].is_some());
            let (l, r) = (tree.left(x), tree.right(x));
            for child in [l, r] {
                if child != NIL {
                    assert_eq!(tree.parent(child), x);
                }
            }
            if tree.color(x) == Color::Red {
                assert_eq!(tree.color(l), Color::Black);
                assert_eq!(tree.color(r), Color::Black);
            }
            let hl = check(tree, l, count);
            let hr = check(tree, r, count);
            assert_eq!(hl, hr);
            hl + usize::from(tree.color(x) == Color::Black)
        }
        let mut count = 0;
        check(self, self.root, &mut count);
        assert_eq!(count, self.len);

        let keys: Vec<_> = self.iter().collect();
        assert_eq!(keys.len(), self.len);
        for pair in keys.windows(2) {
            assert_eq!(
                self.cmp.compare(ctx, pair[0], pair[1]),
                Ordering::Less,
                "out of order: {:?}",
                pair
            );
        }
    }
}

pub struct Iter<'a, T, C> {
    tree: &'a RbTree<T, C>,
    next: Option<NodeIdx>,
}

impl<'a, T, C: Comparator<T>> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.next?;
        self.next = self.tree.next(node);
        self.tree.get(node)
    }
}
