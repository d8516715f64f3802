use core::fmt;
use std::mem;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("R"),
            Color::Black => f.write_str("B"),
        }
    }
}

/// Index of a node in the tree's arena.
///
/// A handle stays valid until the next `delete` or `clear` on the tree it came
/// from. After that it may point to a freed slot (queries return `None`) or to
/// a slot reused by a later insert.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

impl NodeHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which child slot of its parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(super) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NodePos {
    Root,
    Child(NodeHandle, Side),
}

#[derive(Debug)]
pub(super) struct Node<K> {
    pub(super) key: K,
    pub(super) color: Color,
    pub(super) parent: Option<NodeHandle>,
    pub(super) left: Option<NodeHandle>,
    pub(super) right: Option<NodeHandle>,
}

impl<K> Node<K> {
    pub(super) fn new(key: K, color: Color, parent: Option<NodeHandle>) -> Self {
        Self {
            key,
            color,
            parent,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(super) fn child(&self, side: Side) -> Option<NodeHandle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(super) fn set_child(&mut self, side: Side, child: Option<NodeHandle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// Slab of nodes. Freed slots are chained into a free list and reused.
#[derive(Debug)]
pub(super) struct Arena<K> {
    slots: Vec<Option<Node<K>>>,
    free: Vec<usize>,
}

impl<K> Arena<K> {
    pub(super) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(super) fn alloc(&mut self, node: Node<K>) -> NodeHandle {
        match self.free.pop() {
            Some(index) => {
                debug_assert!(self.slots[index].is_none());
                self.slots[index] = Some(node);
                NodeHandle(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeHandle(self.slots.len() - 1)
            }
        }
    }

    /// Takes the node out of its slot and puts the slot on the free list.
    pub(super) fn remove(&mut self, handle: NodeHandle) -> Node<K> {
        match self.slots.get_mut(handle.0).and_then(Option::take) {
            Some(node) => {
                self.free.push(handle.0);
                node
            }
            None => panic!("dangling node handle {handle:?}"),
        }
    }

    /// Exchanges the keys stored in two live nodes, links and colors stay.
    pub(super) fn swap_keys(&mut self, a: NodeHandle, b: NodeHandle) {
        if a == b {
            return;
        }

        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.slots.split_at_mut(hi);
        match (head[lo].as_mut(), tail[0].as_mut()) {
            (Some(x), Some(y)) => mem::swap(&mut x.key, &mut y.key),
            _ => panic!("dangling node handle {a:?} or {b:?}"),
        }
    }

    #[inline]
    pub(super) fn get(&self, handle: NodeHandle) -> Option<&Node<K>> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    pub(super) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Number of live nodes.
    pub(super) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<K> Index<NodeHandle> for Arena<K> {
    type Output = Node<K>;

    #[inline]
    fn index(&self, handle: NodeHandle) -> &Node<K> {
        match self.get(handle) {
            Some(node) => node,
            None => panic!("dangling node handle {handle:?}"),
        }
    }
}

impl<K> IndexMut<NodeHandle> for Arena<K> {
    #[inline]
    fn index_mut(&mut self, handle: NodeHandle) -> &mut Node<K> {
        match self.slots.get_mut(handle.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("dangling node handle {handle:?}"),
        }
    }
}
