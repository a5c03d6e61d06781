//! Doubly linked lists whose nodes live in a shared arena.
//!
//! An [`Arena`] holds the nodes of any number of [`LinkedList`]s. A list is
//! just its two ends and its length, and every operation is handed the arena
//! its nodes live in. Because lists in the same arena share storage, moving
//! one list onto the end of another only relinks the ends.
//!
//! Nodes are addressed by [`NodeIdx`] handles, which stay valid until the node
//! they point to is removed, even when it moves to another list. Removed slots
//! are recycled, so a handle to a removed node may later point to an unrelated
//! node: don't hold on to handles after erasing.

use std::marker::PhantomData;

/// A handle to a node in an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdx(usize);

impl std::fmt::Debug for NodeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n_{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct Node<T> {
    // `None` for slots on the free list.
    item: Option<T>,
    prev: Option<NodeIdx>,
    next: Option<NodeIdx>,
}

/// Storage for the nodes of linked lists.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    nodes: Vec<Node<T>>,
    free: Vec<NodeIdx>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of nodes in use, over all lists.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, idx: NodeIdx) -> Option<&Node<T>> {
        self.nodes.get(idx.0).filter(|n| n.item.is_some())
    }

    pub fn get(&self, node: NodeIdx) -> Option<&T> {
        self.node(node)?.item.as_ref()
    }

    pub fn get_mut(&mut self, node: NodeIdx) -> Option<&mut T> {
        self.nodes.get_mut(node.0)?.item.as_mut()
    }

    pub fn next(&self, node: NodeIdx) -> Option<NodeIdx> {
        self.node(node)?.next
    }

    pub fn prev(&self, node: NodeIdx) -> Option<NodeIdx> {
        self.node(node)?.prev
    }

    fn alloc(&mut self, item: T, prev: Option<NodeIdx>, next: Option<NodeIdx>) -> NodeIdx {
        let node = Node {
            item: Some(item),
            prev,
            next,
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx.0] = node;
            idx
        } else {
            self.nodes.push(node);
            NodeIdx(self.nodes.len() - 1)
        }
    }

    fn release(&mut self, idx: NodeIdx) -> Option<T> {
        let slot = &mut self.nodes[idx.0];
        slot.prev = None;
        slot.next = None;
        let item = slot.item.take();
        self.free.push(idx);
        item
    }
}

/// A doubly linked list, stored in an [`Arena`].
///
/// Every method that touches nodes takes the arena as an argument, and it must
/// be the arena that the list's nodes were allocated in. Handles passed to
/// [`LinkedList::insert_after`] and [`LinkedList::erase`] must belong to this
/// list.
pub struct LinkedList<T> {
    head: Option<NodeIdx>,
    tail: Option<NodeIdx>,
    len: usize,
    _items: PhantomData<fn() -> T>,
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            _items: PhantomData,
        }
    }
}

impl<T> Clone for LinkedList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            len: self.len,
            _items: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for LinkedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedList")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("len", &self.len)
            .finish()
    }
}

impl<T> LinkedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every item, returning the nodes to the arena.
    pub fn clear(&mut self, arena: &mut Arena<T>) {
        while self.pop_front(arena).is_some() {}
    }

    fn set_next(&mut self, arena: &mut Arena<T>, idx: Option<NodeIdx>, next: Option<NodeIdx>) {
        match idx {
            Some(idx) => arena.nodes[idx.0].next = next,
            None => self.head = next,
        }
    }

    fn set_prev(&mut self, arena: &mut Arena<T>, idx: Option<NodeIdx>, prev: Option<NodeIdx>) {
        match idx {
            Some(idx) => arena.nodes[idx.0].prev = prev,
            None => self.tail = prev,
        }
    }

    pub fn push_back(&mut self, arena: &mut Arena<T>, item: T) -> NodeIdx {
        let tail = self.tail;
        let idx = arena.alloc(item, tail, None);
        self.set_next(arena, tail, Some(idx));
        self.tail = Some(idx);
        self.len += 1;
        idx
    }

    pub fn push_front(&mut self, arena: &mut Arena<T>, item: T) -> NodeIdx {
        let head = self.head;
        let idx = arena.alloc(item, None, head);
        self.set_prev(arena, head, Some(idx));
        self.head = Some(idx);
        self.len += 1;
        idx
    }

    /// Inserts `item` right after `node`, returning the new node.
    ///
    /// If `node` isn't live, the item is handed back as an error.
    pub fn insert_after(
        &mut self,
        arena: &mut Arena<T>,
        node: NodeIdx,
        item: T,
    ) -> Result<NodeIdx, T> {
        let Some(next) = arena.node(node).map(|n| n.next) else {
            return Err(item);
        };
        let idx = arena.alloc(item, Some(node), next);
        arena.nodes[node.0].next = Some(idx);
        self.set_prev(arena, next, Some(idx));
        self.len += 1;
        Ok(idx)
    }

    /// Unlinks `node`, returning its item.
    pub fn erase(&mut self, arena: &mut Arena<T>, node: NodeIdx) -> Option<T> {
        let (prev, next) = arena.node(node).map(|n| (n.prev, n.next))?;
        self.set_next(arena, prev, next);
        self.set_prev(arena, next, prev);
        self.len -= 1;
        arena.release(node)
    }

    pub fn pop_front(&mut self, arena: &mut Arena<T>) -> Option<T> {
        self.erase(arena, self.head?)
    }

    pub fn pop_back(&mut self, arena: &mut Arena<T>) -> Option<T> {
        self.erase(arena, self.tail?)
    }

    pub fn front_node(&self) -> Option<NodeIdx> {
        self.head
    }

    pub fn back_node(&self) -> Option<NodeIdx> {
        self.tail
    }

    pub fn front<'a>(&self, arena: &'a Arena<T>) -> Option<&'a T> {
        arena.get(self.head?)
    }

    pub fn back<'a>(&self, arena: &'a Arena<T>) -> Option<&'a T> {
        arena.get(self.tail?)
    }

    /// Moves all of `other`'s items to the front of this list, keeping their
    /// order, in constant time.
    ///
    /// `other` is left empty. Handles to its nodes stay valid, and now belong
    /// to this list.
    pub fn splice_to_front(&mut self, arena: &mut Arena<T>, other: &mut LinkedList<T>) {
        let other = std::mem::take(other);
        let (Some(other_head), Some(other_tail)) = (other.head, other.tail) else {
            return;
        };
        let head = self.head;
        arena.nodes[other_tail.0].next = head;
        self.set_prev(arena, head, Some(other_tail));
        self.head = Some(other_head);
        self.len += other.len;
    }

    /// Moves all of `other`'s items to the back of this list, keeping their
    /// order, in constant time.
    ///
    /// See [`LinkedList::splice_to_front`] about handles.
    pub fn splice_to_back(&mut self, arena: &mut Arena<T>, other: &mut LinkedList<T>) {
        let other = std::mem::take(other);
        let (Some(other_head), Some(other_tail)) = (other.head, other.tail) else {
            return;
        };
        let tail = self.tail;
        arena.nodes[other_head.0].prev = tail;
        self.set_next(arena, tail, Some(other_head));
        self.tail = Some(other_tail);
        self.len += other.len;
    }

    /// Reverses the list in place. Handles stay valid.
    pub fn reverse(&mut self, arena: &mut Arena<T>) {
        let mut cur = self.head;
        while let Some(idx) = cur {
            let node = &mut arena.nodes[idx.0];
            std::mem::swap(&mut node.prev, &mut node.next);
            // What used to be `next` is now `prev`.
            cur = node.prev;
        }
        std::mem::swap(&mut self.head, &mut self.tail);
    }

    pub fn extend(&mut self, arena: &mut Arena<T>, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.push_back(arena, item);
        }
    }

    pub fn iter<'a>(&self, arena: &'a Arena<T>) -> Iter<'a, T> {
        Iter {
            arena,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Removes the items from the arena, front to back.
    pub fn drain(mut self, arena: &mut Arena<T>) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.pop_front(arena))
    }
}

pub struct Iter<'a, T> {
    arena: &'a Arena<T>,
    front: Option<NodeIdx>,
    back: Option<NodeIdx>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front?;
        let node = &self.arena.nodes[idx.0];
        self.front = node.next;
        self.remaining -= 1;
        node.item.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back?;
        let node = &self.arena.nodes[idx.0];
        self.back = node.prev;
        self.remaining -= 1;
        node.item.as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn items<T: Clone>(list: &LinkedList<T>, arena: &Arena<T>) -> Vec<T> {
        list.iter(arena).cloned().collect()
    }

    fn list_of<T>(arena: &mut Arena<T>, items: impl IntoIterator<Item = T>) -> LinkedList<T> {
        let mut list = LinkedList::new();
        list.extend(arena, items);
        list
    }

    #[test]
    fn push_and_pop() {
        let mut arena = Arena::new();
        let mut list = LinkedList::new();
        assert_eq!(list.pop_front(&mut arena), None::<i32>);
        assert_eq!(list.pop_back(&mut arena), None);

        list.push_back(&mut arena, 2);
        list.push_back(&mut arena, 3);
        list.push_front(&mut arena, 1);
        assert_eq!(items(&list, &arena), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.front(&arena), Some(&1));
        assert_eq!(list.back(&arena), Some(&3));

        assert_eq!(list.pop_back(&mut arena), Some(3));
        assert_eq!(list.pop_front(&mut arena), Some(1));
        assert_eq!(list.pop_front(&mut arena), Some(2));
        assert!(list.is_empty());
        assert!(arena.is_empty());
        assert_eq!(list.front(&arena), None);
    }

    #[test]
    fn navigation_and_erase() {
        let mut arena = Arena::new();
        let mut list = LinkedList::new();
        let a = list.push_back(&mut arena, 'a');
        let c = list.push_back(&mut arena, 'c');
        let b = list.insert_after(&mut arena, a, 'b').unwrap();
        let d = list.insert_after(&mut arena, c, 'd').unwrap();
        assert_eq!(items(&list, &arena), vec!['a', 'b', 'c', 'd']);
        assert_eq!(list.back_node(), Some(d));
        assert_eq!(arena.next(a), Some(b));
        assert_eq!(arena.prev(c), Some(b));
        assert_eq!(arena.prev(a), None);

        assert_eq!(list.erase(&mut arena, b), Some('b'));
        assert_eq!(arena.next(a), Some(c));
        assert_eq!(list.erase(&mut arena, b), None);
        assert_eq!(list.insert_after(&mut arena, b, 'x'), Err('x'));

        *arena.get_mut(d).unwrap() = 'D';
        assert_eq!(items(&list, &arena), vec!['a', 'c', 'D']);
        assert_eq!(list.iter(&arena).rev().copied().collect::<String>(), "Dca");
        assert_eq!(list.drain(&mut arena).collect::<String>(), "acD");
        assert!(arena.is_empty());
    }

    #[test]
    fn reverse_keeps_handles() {
        let mut arena = Arena::new();
        let mut list = list_of(&mut arena, 0..5);
        let first = list.front_node().unwrap();
        list.reverse(&mut arena);
        assert_eq!(items(&list, &arena), vec![4, 3, 2, 1, 0]);
        assert_eq!(list.back_node(), Some(first));
        assert_eq!(arena.get(first), Some(&0));
        assert_eq!(arena.next(first), None);

        list.push_back(&mut arena, -1);
        assert_eq!(items(&list, &arena), vec![4, 3, 2, 1, 0, -1]);
    }

    #[test]
    fn splice() {
        let mut arena = Arena::new();
        let mut list = list_of(&mut arena, 3..5);
        let mut front = list_of(&mut arena, 0..3);
        let mut back = list_of(&mut arena, 5..7);
        let five = back.front_node().unwrap();
        list.splice_to_front(&mut arena, &mut front);
        list.splice_to_back(&mut arena, &mut back);
        assert_eq!(items(&list, &arena), (0..7).collect::<Vec<_>>());
        assert!(front.is_empty());
        assert!(back.is_empty());

        // Nothing was copied: the nodes just changed hands.
        assert_eq!(arena.len(), 7);
        assert_eq!(arena.get(five), Some(&5));
        assert_eq!(arena.prev(five).and_then(|n| arena.get(n)), Some(&4));

        // Splicing an empty list does nothing, and so does splicing into one.
        list.splice_to_back(&mut arena, &mut back);
        assert_eq!(list.len(), 7);
        back.splice_to_front(&mut arena, &mut list);
        assert_eq!(items(&back, &arena), (0..7).collect::<Vec<_>>());
        assert!(list.is_empty());
    }

    proptest! {
        // Compare against `VecDeque` under a random sequence of operations.
        #[test]
        fn matches_vec_deque(ops in proptest::collection::vec(0u8..8, 0..64)) {
            let mut arena = Arena::new();
            let mut list = LinkedList::new();
            let mut model = std::collections::VecDeque::new();
            for (i, op) in ops.into_iter().enumerate() {
                match op {
                    0 => { list.push_back(&mut arena, i); model.push_back(i); }
                    1 => { list.push_front(&mut arena, i); model.push_front(i); }
                    2 => { prop_assert_eq!(list.pop_back(&mut arena), model.pop_back()); }
                    3 => { prop_assert_eq!(list.pop_front(&mut arena), model.pop_front()); }
                    4 => { list.reverse(&mut arena); model = model.into_iter().rev().collect(); }
                    5 => {
                        let mut other = list_of(&mut arena, [i, i + 1000]);
                        list.splice_to_back(&mut arena, &mut other);
                        model.extend([i, i + 1000]);
                    }
                    6 => {
                        let mut other = list_of(&mut arena, [i, i + 1000]);
                        list.splice_to_front(&mut arena, &mut other);
                        model.push_front(i + 1000);
                        model.push_front(i);
                    }
                    _ => {
                        if let Some(node) = list.front_node() {
                            list.insert_after(&mut arena, node, i).unwrap();
                            model.insert(1, i);
                        }
                    }
                }
                prop_assert_eq!(list.len(), model.len());
                prop_assert_eq!(arena.len(), model.len());
                prop_assert_eq!(items(&list, &arena), model.iter().copied().collect::<Vec<_>>());
            }
        }
    }
}
