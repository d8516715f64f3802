use std::borrow::Borrow;

use log::{debug, trace};

use super::node::{Color, NodeHandle, NodePos, Side};
use super::RedBlackTree;
use crate::error::Error;

/// The child slot on `side` of `parent` (possibly empty) whose paths are one
/// black node short of every other path. Only lives while the delete fixup
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DoubleBlack {
    parent: NodeHandle,
    side: Side,
}

impl<K: Ord> RedBlackTree<K> {
    /// Removes `key` from the tree and returns the key that was stored.
    ///
    /// Returns [`Error::KeyNotFound`] and leaves the tree untouched if the
    /// key is not present.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<K, Error>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(node) = self.find(key) else {
            debug!("delete: key not found");
            return Err(Error::KeyNotFound);
        };

        let removed = self.delete_node(node);
        debug!("delete: removed {node:?}, len {}", self.len);
        self.check_invariants();
        Ok(removed)
    }
}

impl<K> RedBlackTree<K> {
    fn delete_node(&mut self, node: NodeHandle) -> K {
        //       +---------- 34 ---------+
        //       |                       |
        // +---- 2 ----+                 58 ----+
        // |           |                        |
        // 1      +--- 9 ----+              +-- 77 --+
        //        |          |              |        |
        //     +- 6       +- 20 -+      +- 71 -+     82
        //     |          |      |      |      |
        //     5         12 -+   24    67      75
        //                   |
        //                   13
        //
        // 1, 6, 12, 58 have at most one child and are unlinked directly.
        // 9 has two: its successor 12 (the minimum of its right subtree, which
        // never has a left child) moves its key into 9's node and the node
        // that held 12 is unlinked instead.
        let to_remove = match (self.nodes[node].left, self.nodes[node].right) {
            (Some(_), Some(right)) => {
                let successor = self.min_node(right);
                self.nodes.swap_keys(node, successor);
                successor
            }
            _ => node,
        };

        self.unlink(to_remove)
    }

    /// Removes `node`, which must have at most one child, and rebalances.
    fn unlink(&mut self, node: NodeHandle) -> K {
        let (child, color) = {
            let n = &self.nodes[node];
            debug_assert!(n.left.is_none() || n.right.is_none());
            (n.left.or(n.right), n.color)
        };
        let pos = self.pos(node);

        self.replace_subtree(node, child);
        let removed = self.nodes.remove(node);
        self.len -= 1;

        match (color, child) {
            // a red node with at most one child has no children at all
            (Color::Red, _) => {}
            // the red child takes over the black the removed node carried
            (Color::Black, Some(child)) if self.nodes[child].color.is_red() => {
                self.nodes[child].color = Color::Black;
            }
            (Color::Black, _) => match pos {
                // every path lost the same black node
                NodePos::Root => {}
                NodePos::Child(parent, side) => self.delete_fixup(DoubleBlack { parent, side }),
            },
        }

        removed.key
    }

    fn delete_fixup(&mut self, mut at: DoubleBlack) {
        while let Some(next) = self.delete_fixup_step(at) {
            at = next;
        }
    }

    /// One corrective step. Returns where the double black moved to, or
    /// `None` once it is resolved.
    fn delete_fixup_step(&mut self, at: DoubleBlack) -> Option<DoubleBlack> {
        let DoubleBlack { parent, side } = at;

        // The paths through the sibling hold at least one more black node than
        // the paths through the double black slot, so the sibling exists.
        let Some(sibling) = self.nodes[parent].child(side.opposite()) else {
            panic!("red-black tree is corrupted: double black under {parent:?} has no sibling");
        };

        if self.nodes[sibling].color.is_red() {
            //     +--- p:b ---+                    +--- s:b ---+
            //     |           |                    |           |
            // +- x:bb -+  +- s:r -+   -->      +- p:r -+      d:b
            // |        |  |       |            |       |
            // a        b c:b     d:b       +- x:bb -+  c:b
            //                              |        |
            //                              a        b
            //
            // Nothing is fixed yet, but x now has a black sibling (c) and a red
            // parent, which one of the cases below resolves.
            trace!("delete fixup: red sibling {sibling:?}");
            self.counters.sibling_red += 1;
            self.rotate(parent, side);
            return Some(at);
        }

        // right nephew first when both are red
        let nephew = match (
            self.red_child(sibling, Side::Left),
            self.red_child(sibling, Side::Right),
        ) {
            (_, Some(right)) => Some((Side::Right, right)),
            (Some(left), None) => Some((Side::Left, left)),
            (None, None) => None,
        };

        match nephew {
            Some((nephew_side, nephew)) => {
                let far_nephew = if nephew_side == side {
                    //    +---- p:c ----+                 +---- p:c ----+
                    //    |             |                 |             |
                    // +- x:bb -+   +- s:b -+   -->   +- x:bb -+    +- n:b -+
                    //              |       |                       |       |
                    //          +- n:r -+   d                       e   +- s:r -+
                    //          |       |                               |       |
                    //          e       f                               f       d
                    //
                    // The near nephew is rotated up so that the old sibling
                    // becomes the red far nephew.
                    trace!("delete fixup: near red nephew {nephew:?}");
                    self.rotate(sibling, side.opposite());
                    sibling
                } else {
                    nephew
                };

                //     +--- p:c ---+                     +--- s:c ---+
                //     |           |                     |           |
                // +- x:bb -+  +- s:b -+   -->       +- p:b -+      d:b
                //             |       |             |       |
                //             c      d:r         x:b        c
                //
                // s takes the color of p, p turns black and gives the missing
                // black to x, d turns black to replace the black s had.
                trace!("delete fixup: far red nephew {far_nephew:?}");
                self.counters.nephew_red += 1;
                self.rotate(parent, side);
                self.nodes[far_nephew].color = Color::Black;
                None
            }
            None => {
                // Take one black away from both x and s and push it up to p.
                self.nodes[sibling].color = Color::Red;
                if self.nodes[parent].color.is_red() {
                    trace!("delete fixup: red parent {parent:?} absorbs");
                    self.counters.parent_absorbs += 1;
                    self.nodes[parent].color = Color::Black;
                    return None;
                }

                trace!("delete fixup: double black moves up to {parent:?}");
                self.counters.double_black_pushes += 1;
                match self.pos(parent) {
                    NodePos::Root => None,
                    NodePos::Child(grand_parent, parent_side) => Some(DoubleBlack {
                        parent: grand_parent,
                        side: parent_side,
                    }),
                }
            }
        }
    }
}
