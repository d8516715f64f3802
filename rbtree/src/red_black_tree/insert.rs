use core::cmp::Ordering;

use log::{debug, trace};

use super::node::{Color, Node, NodeHandle, NodePos, Side};
use super::RedBlackTree;
use crate::error::Error;

impl<K: Ord> RedBlackTree<K> {
    /// Adds `key` to the tree and returns the handle of its node.
    ///
    /// Returns [`Error::DuplicateKey`] and leaves the tree untouched if an
    /// equal key is already present. No rebalancing runs in that case, the
    /// tree is already valid.
    pub fn insert(&mut self, key: K) -> Result<NodeHandle, Error> {
        // Move left/right down the tree until we find empty slot
        let mut slot = None;
        let mut maybe_node = self.root;
        while let Some(node) = maybe_node {
            let side = match key.cmp(&self.nodes[node].key) {
                Ordering::Less => Side::Left,
                Ordering::Equal => {
                    debug!("insert: key already present at {node:?}");
                    return Err(Error::DuplicateKey);
                }
                Ordering::Greater => Side::Right,
            };
            slot = Some((node, side));
            maybe_node = self.nodes[node].child(side);
        }

        let new_node = match slot {
            Some((parent, side)) => {
                let new_node = self.nodes.alloc(Node::new(key, Color::Red, Some(parent)));
                self.nodes[parent].set_child(side, Some(new_node));
                self.len += 1;
                self.insert_fixup(parent);
                new_node
            }
            None => {
                let root = self.nodes.alloc(Node::new(key, Color::Black, None));
                self.root = Some(root);
                self.len += 1;
                root
            }
        };

        debug!("insert: added {new_node:?}, len {}", self.len);
        self.check_invariants();
        Ok(new_node)
    }

    /// Restores the red-black properties after a red leaf was attached to
    /// `parent`.
    ///
    /// At any time there is at most one violation: some red node `n` with a
    /// red child. The loop looks at `n`, fixes it locally and moves on to the
    /// node where a new violation may have appeared.
    fn insert_fixup(&mut self, parent: NodeHandle) {
        let mut at = Some(parent);
        while let Some(n) = at {
            at = match self.pos(n) {
                NodePos::Root => {
                    if self.nodes[n].color.is_red() {
                        trace!("insert fixup: red root {n:?}");
                        self.nodes[n].color = Color::Black;
                    }
                    None
                }
                NodePos::Child(grand_parent, side) => self.insert_fixup_step(n, grand_parent, side),
            };
        }

        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }
    }

    /// One corrective step for `n`, which sits on `side` of `grand_parent`.
    /// Returns the node to look at next.
    fn insert_fixup_step(
        &mut self,
        n: NodeHandle,
        grand_parent: NodeHandle,
        side: Side,
    ) -> Option<NodeHandle> {
        if self.nodes[n].color.is_black() {
            return None;
        }
        let (child_side, child) = [Side::Left, Side::Right]
            .into_iter()
            .find_map(|s| self.red_child(n, s).map(|c| (s, c)))?;

        let uncle = self.nodes[grand_parent].child(side.opposite());
        if self.color(uncle).is_red() {
            //     +--- gp:b ---+               +--- gp:r ---+
            //     |            |               |            |
            //  + n:r +      + u:r +   -->   + n:b +      + u:b +
            //  |     |      |     |         |     |      |     |
            // c:r   a:b    b:b   d:b       c:r   a:b    b:b   d:b
            //
            // Black height stays the same on every path, but gp may now have
            // a red parent.
            trace!("insert fixup: promotion at {grand_parent:?}");
            self.counters.promotions += 1;
            self.nodes[grand_parent].color = Color::Red;
            self.nodes[n].color = Color::Black;
            if let Some(uncle) = uncle {
                self.nodes[uncle].color = Color::Black;
            }
            return self.nodes[grand_parent].parent;
        }

        let top = if child_side == side {
            //           +-- gp:b --+              +--- n:b ---+
            //           |          |              |           |
            //      +-- n:r --+    u:b  -->   +- c:r -+   +- gp:r -+
            //      |         |               |       |   |        |
            //  +- c:r -+    d:b             a:b     b:b d:b      u:b
            //  |       |
            // a:b     b:b
            //
            // The rotation swaps the colors of n and gp.
            trace!("insert fixup: straight line at {n:?}");
            self.rotate(grand_parent, side.opposite());
            n
        } else {
            //       +-- gp:b --+                 +-- gp:b --+
            //       |          |                 |          |
            //  +-- n:r --+    u:b  -->       +- c:r --+    u:b
            //  |         |                   |        |
            // a:b    +- c:r -+           +- n:r -+   e:b
            //        |       |           |       |
            //       d:b     e:b         a:b     d:b
            //
            // and then the same rotation as the straight line case, with c on top.
            trace!("insert fixup: zig-zag at {n:?}");
            self.rotate(n, side);
            self.rotate(grand_parent, side.opposite());
            child
        };

        // `top` is black now and took the place of the black grand parent,
        // nothing above it changed.
        self.nodes[top].parent
    }
}
