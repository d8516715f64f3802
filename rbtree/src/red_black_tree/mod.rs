use core::cmp::Ordering;
use core::fmt;
use std::borrow::Borrow;

mod delete;
mod insert;
mod node;
mod render;
mod rotate;
mod validate;

pub use node::{Color, NodeHandle};
pub use validate::Stats;

use node::{Arena, NodePos, Side};

/// How often each rebalancing case has run since the tree was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixupCounters {
    pub rotations: u64,
    /// Insert fixups resolved by recoloring parent, uncle and grandparent.
    pub promotions: u64,
    /// Delete fixups that met a red sibling and rotated it above the parent.
    pub sibling_red: u64,
    /// Delete fixups resolved by rotating a red nephew into place.
    pub nephew_red: u64,
    /// Delete fixups resolved by turning a red parent black.
    pub parent_absorbs: u64,
    /// Delete fixups that moved the double black one level up.
    pub double_black_pushes: u64,
}

/// An ordered set of keys stored in a red-black tree.
///
/// Duplicate keys are rejected. All nodes are kept in an arena owned by the
/// tree, links between them (including the parent back-reference) are
/// [`NodeHandle`]s into that arena.
pub struct RedBlackTree<K> {
    // INVARIANTS (whenever no method is running):
    //  * every live node except `root` is the child of exactly one live node
    //  * `node.parent` points to the node whose child slot holds `node`
    //  * `len` equals the number of live nodes
    root: Option<NodeHandle>,
    nodes: Arena<K>,
    len: usize,
    counters: FixupCounters,
}

impl<K> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for RedBlackTree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct NodeDebug<'a, K> {
            tree: &'a RedBlackTree<K>,
            handle: NodeHandle,
        }

        impl<K> fmt::Debug for NodeDebug<'_, K>
        where
            K: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let node = &self.tree.nodes[self.handle];
                let key_of = |h: Option<NodeHandle>| h.map(|h| &self.tree.nodes[h].key);
                f.debug_struct("Node")
                    .field("handle", &self.handle)
                    .field("key", &node.key)
                    .field("color", &node.color)
                    .field("parent", &key_of(node.parent))
                    .field("left", &key_of(node.left))
                    .field("right", &key_of(node.right))
                    .finish()
            }
        }

        struct TreeDebug<'a, K>(&'a RedBlackTree<K>);

        impl<K> fmt::Debug for TreeDebug<'_, K>
        where
            K: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_list();
                if let Some(root) = self.0.root {
                    self.0.inorder_for_each_core(root, &mut |handle| {
                        f.entry(&NodeDebug {
                            tree: self.0,
                            handle,
                        });
                    });
                }
                f.finish()
            }
        }

        f.debug_struct("RedBlackTree")
            .field("len", &self.len)
            .field("root", &self.root.map(|h| &self.nodes[h].key))
            .field("nodes", &TreeDebug(self))
            .finish()
    }
}

impl<K> RedBlackTree<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            nodes: Arena::new(),
            len: 0,
            counters: FixupCounters::default(),
        }
    }

    /// Creates an empty tree with room for `capacity` nodes before the arena
    /// has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            ..Self::new()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every key. All previously returned handles become stale.
    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
        self.len = 0;
    }

    pub fn counters(&self) -> &FixupCounters {
        &self.counters
    }

    #[inline]
    pub fn root(&self) -> Option<NodeHandle> {
        self.root
    }

    #[inline]
    pub fn left_of(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(node)?.left
    }

    #[inline]
    pub fn right_of(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(node)?.right
    }

    #[inline]
    pub fn parent_of(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(node)?.parent
    }

    /// Returns `None` only for a stale handle.
    #[inline]
    pub fn key_of(&self, node: NodeHandle) -> Option<&K> {
        self.nodes.get(node).map(|n| &n.key)
    }

    /// Returns `None` only for a stale handle.
    #[inline]
    pub fn color_of(&self, node: NodeHandle) -> Option<Color> {
        self.nodes.get(node).map(|n| n.color)
    }

    /// Number of nodes on the longest path from the root down to a leaf.
    pub fn height(&self) -> usize {
        fn inner<K>(tree: &RedBlackTree<K>, node: Option<NodeHandle>) -> usize {
            match node {
                Some(node) => {
                    let node = &tree.nodes[node];
                    1 + inner(tree, node.left).max(inner(tree, node.right))
                }
                None => 0,
            }
        }

        inner(self, self.root)
    }

    /// Calls `f` on every key in ascending order.
    pub fn inorder_for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K),
    {
        if let Some(root) = self.root {
            self.inorder_for_each_core(root, &mut |node| f(&self.nodes[node].key));
        }
    }

    fn inorder_for_each_core<F>(&self, node: NodeHandle, f: &mut F)
    where
        F: FnMut(NodeHandle),
    {
        if let Some(l) = self.nodes[node].left {
            self.inorder_for_each_core(l, f);
        }
        f(node);
        if let Some(r) = self.nodes[node].right {
            self.inorder_for_each_core(r, f);
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| &self.nodes[node].key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeHandle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut x = self.root?;
        loop {
            let node = &self.nodes[x];
            let next = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(x),
                Ordering::Greater => node.right,
            };
            x = next?;
        }
    }

    pub fn min(&self) -> Option<&K> {
        self.root.map(|root| &self.nodes[self.min_node(root)].key)
    }

    pub fn max(&self) -> Option<&K> {
        self.root.map(|root| &self.nodes[self.max_node(root)].key)
    }

    fn min_node(&self, root: NodeHandle) -> NodeHandle {
        let mut x = root;
        while let Some(left) = self.nodes[x].left {
            x = left;
        }

        x
    }

    fn max_node(&self, root: NodeHandle) -> NodeHandle {
        let mut x = root;
        while let Some(right) = self.nodes[x].right {
            x = right;
        }

        x
    }

    fn pos(&self, node: NodeHandle) -> NodePos {
        match self.nodes[node].parent {
            None => NodePos::Root,
            Some(parent) => {
                if self.nodes[parent].left == Some(node) {
                    NodePos::Child(parent, Side::Left)
                } else {
                    debug_assert_eq!(self.nodes[parent].right, Some(node));
                    NodePos::Child(parent, Side::Right)
                }
            }
        }
    }

    /// Absent children count as black.
    #[inline]
    fn color(&self, node: Option<NodeHandle>) -> Color {
        node.map_or(Color::Black, |n| self.nodes[n].color)
    }

    /// Returns the child of `node` on `side` if it exists and is red.
    #[inline]
    fn red_child(&self, node: NodeHandle, side: Side) -> Option<NodeHandle> {
        self.nodes[node]
            .child(side)
            .filter(|&child| self.nodes[child].color.is_red())
    }

    /// Replaces subtree `old` with subtree `new`
    fn replace_subtree(&mut self, old: NodeHandle, new: Option<NodeHandle>) {
        // a) make the parent of `old` (or the root) point to `new`
        // b) make `new` point to the parent of `old`
        let parent = self.nodes[old].parent;
        match self.pos(old) {
            NodePos::Root => self.root = new,
            NodePos::Child(parent, side) => self.nodes[parent].set_child(side, new),
        }

        if let Some(new) = new {
            self.nodes[new].parent = parent;
        }
    }

    #[inline]
    fn check_invariants(&self)
    where
        K: Ord,
    {
        if cfg!(any(test, feature = "validate")) {
            if let Err(err) = self.validate() {
                panic!("red-black tree is corrupted: {err}");
            }
        }
    }
}

impl<K: Ord> Extend<K> for RedBlackTree<K> {
    /// Duplicate keys are skipped.
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            let _ = self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for RedBlackTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::validate::assert_red_blackness;
    use super::*;

    const KEYS: [i32; 9] = [12, 5, 9, 2, 18, 15, 13, 17, 19];

    fn keys<K: Clone>(tree: &RedBlackTree<K>) -> Vec<K> {
        let mut items = Vec::with_capacity(tree.len());
        tree.inorder_for_each(|k| items.push(k.clone()));
        items
    }

    #[test]
    fn empty() {
        let tree = RedBlackTree::<i32>::new();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.get(&4), None);
        assert_eq!(keys(&tree), Vec::<i32>::new());
        assert_eq!(tree.validate(), Ok(Stats::default()));
    }

    #[test]
    fn inorder_for_each() {
        let tree: RedBlackTree<i32> = KEYS.into_iter().collect();
        assert_eq!(tree.len(), 9);
        assert_eq!(keys(&tree), [2, 5, 9, 12, 13, 15, 17, 18, 19]);
        assert_red_blackness(&tree);
    }

    #[test]
    fn get() {
        let tree: RedBlackTree<i32> = KEYS.into_iter().collect();
        for it in KEYS {
            assert_eq!(tree.get(&it), Some(&it));
            assert!(tree.contains(&it));
        }
        assert_eq!(tree.get(&4), None);
        assert!(!tree.contains(&20));
    }

    #[test]
    fn get_borrowed() {
        let tree: RedBlackTree<String> = ["pear", "apple", "fig"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tree.get("fig").map(String::as_str), Some("fig"));
        assert!(!tree.contains("plum"));
    }

    #[test]
    fn min_max() {
        let tree: RedBlackTree<i32> = KEYS.into_iter().collect();
        assert_eq!(tree.min(), Some(&2));
        assert_eq!(tree.max(), Some(&19));
    }

    #[test]
    fn navigation() {
        let tree: RedBlackTree<i32> = [20, 10, 30].into_iter().collect();
        let root = tree.root().unwrap();
        assert_eq!(tree.parent_of(root), None);

        let left = tree.left_of(root).unwrap();
        let right = tree.right_of(root).unwrap();
        assert_eq!(tree.key_of(left), Some(&10));
        assert_eq!(tree.key_of(right), Some(&30));
        assert_eq!(tree.parent_of(left), Some(root));
        assert_eq!(tree.parent_of(right), Some(root));

        // leaves have no children, that's not an error
        assert_eq!(tree.left_of(left), None);
        assert_eq!(tree.right_of(left), None);
        assert_eq!(tree.color_of(root), Some(Color::Black));
    }

    #[test]
    fn stale_handle() {
        let mut tree = RedBlackTree::new();
        let a = tree.insert(1).unwrap();
        tree.insert(2).unwrap();
        assert_eq!(tree.delete(&1), Ok(1));

        assert_eq!(tree.key_of(a), None);
        assert_eq!(tree.color_of(a), None);
        assert_eq!(tree.left_of(a), None);
        assert_eq!(tree.parent_of(a), None);
    }

    #[test]
    fn clear() {
        let mut tree: RedBlackTree<i32> = KEYS.into_iter().collect();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.insert(7).map(|h| tree.key_of(h).copied()), Ok(Some(7)));
    }

    #[test]
    fn extend_skips_duplicates() {
        let mut tree = RedBlackTree::with_capacity(8);
        tree.extend([3, 1, 3, 2, 1]);
        assert_eq!(tree.len(), 3);
        assert_eq!(keys(&tree), [1, 2, 3]);
    }

    #[test]
    fn debug() {
        let tree: RedBlackTree<i32> = [2, 1].into_iter().collect();
        let s = format!("{tree:?}");
        assert!(s.starts_with("RedBlackTree { len: 2, root: Some(2), nodes: ["));
        assert!(s.contains("key: 1, color: Red, parent: Some(2), left: None, right: None"));
    }

    #[test]
    fn delete_all_in_order() {
        let mut tree: RedBlackTree<i32> = KEYS.into_iter().collect();
        for it in KEYS {
            assert_eq!(tree.delete(&it), Ok(it));
            assert_red_blackness(&tree);
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn delete_small() {
        let mut tree: RedBlackTree<i32> = [26, 81, 303, 0].into_iter().collect();
        for it in [26, 81, 303, 0] {
            assert_eq!(tree.delete(&it), Ok(it));
            assert_red_blackness(&tree);
        }
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn delete_random_order() {
        let inserts = [3836, 3865, 4173, 1635, 4585, 8422, 4412, 2624, 2138, 128];
        let mut tree: RedBlackTree<i32> = inserts.into_iter().collect();
        assert_red_blackness(&tree);

        for it in [4412, 128, 3865, 8422, 1635, 2624, 4173, 3836, 2138, 4585] {
            assert_eq!(tree.delete(&it), Ok(it));
            assert_red_blackness(&tree);
        }
        assert!(tree.is_empty());
    }

    mod proptests {
        use std::collections::BTreeSet;

        use proptest::prelude::*;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        use super::*;
        use crate::error::Error;

        #[cfg(not(miri))]
        const MAP_SIZE: usize = 500;
        #[cfg(miri)]
        const MAP_SIZE: usize = 50;

        #[cfg(not(miri))]
        const PROPTEST_CASES: u32 = 256;
        #[cfg(miri)]
        const PROPTEST_CASES: u32 = 10;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(i32),
            Delete(i32),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => (0..2000i32).prop_map(Op::Insert),
                2 => (0..2000i32).prop_map(Op::Delete),
            ]
        }

        proptest!(
            #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

            #[test]
            fn order(
                inserts in proptest::collection::hash_set(0..10000i32, 0..MAP_SIZE),
            ) {
                let tree: RedBlackTree<i32> = inserts.iter().copied().collect();

                let mut inserts: Vec<_> = inserts.into_iter().collect();
                inserts.sort();
                prop_assert_eq!(keys(&tree), inserts);
            }

            #[test]
            fn insert_get(
                inserts in proptest::collection::vec(0..10000i32, 0..MAP_SIZE),
                access in proptest::collection::vec(0..10000i32, 0..10)
            ) {
                let mut reference = BTreeSet::new();
                let mut tree = RedBlackTree::new();
                for v in &inserts {
                    let expected = if reference.insert(*v) { Ok(()) } else { Err(Error::DuplicateKey) };
                    prop_assert_eq!(tree.insert(*v).map(|_| ()), expected);
                }
                assert_red_blackness(&tree);

                for key in inserts.iter().chain(access.iter()) {
                    prop_assert_eq!(reference.get(key), tree.get(key));
                }
            }

            #[test]
            fn random_ops(ops in proptest::collection::vec(op(), 0..MAP_SIZE)) {
                let mut reference = BTreeSet::new();
                let mut tree = RedBlackTree::new();
                for op in ops {
                    match op {
                        Op::Insert(k) => {
                            let expected = if reference.insert(k) { Ok(()) } else { Err(Error::DuplicateKey) };
                            prop_assert_eq!(tree.insert(k).map(|_| ()), expected);
                        }
                        Op::Delete(k) => {
                            let expected = if reference.remove(&k) { Ok(k) } else { Err(Error::KeyNotFound) };
                            prop_assert_eq!(tree.delete(&k), expected);
                        }
                    }
                    let stats = assert_red_blackness(&tree);
                    prop_assert_eq!(stats.len, reference.len());
                }

                let expected: Vec<_> = reference.into_iter().collect();
                prop_assert_eq!(keys(&tree), expected);
            }

            #[test]
            fn delete_missing_is_noop(
                inserts in proptest::collection::hash_set(0..1000i32, 0..MAP_SIZE),
                missing in 1000..2000i32,
            ) {
                let mut tree: RedBlackTree<i32> = inserts.into_iter().collect();
                let before = tree.render();
                let counters = *tree.counters();

                prop_assert_eq!(tree.delete(&missing), Err(Error::KeyNotFound));
                prop_assert_eq!(tree.render(), before);
                prop_assert_eq!(tree.counters(), &counters);
            }

            #[test]
            fn insert_then_delete_all(
                inserts in proptest::collection::hash_set(0..10000i32, 0..MAP_SIZE),
                seed in any::<u64>(),
            ) {
                let mut tree: RedBlackTree<i32> = inserts.iter().copied().collect();

                let mut inserts: Vec<_> = inserts.into_iter().collect();
                inserts.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
                for key in &inserts {
                    prop_assert_eq!(tree.delete(key), Ok(*key));
                }
                prop_assert_eq!(tree.root(), None);
                prop_assert!(tree.is_empty());
            }
        );

        proptest!(
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn height_bound(
                inserts in proptest::collection::hash_set(0..100_000i32, 1000..3000),
                seed in any::<u64>(),
            ) {
                let mut tree = RedBlackTree::with_capacity(inserts.len());
                for key in &inserts {
                    tree.insert(*key).unwrap();
                }
                assert_red_blackness(&tree);

                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut inserts: Vec<_> = inserts.into_iter().collect();
                inserts.shuffle(&mut rng);
                for key in &inserts[..inserts.len() / 2] {
                    tree.delete(key).unwrap();
                }
                assert_red_blackness(&tree);
            }
        );
    }
}
