use log::trace;

use super::node::{NodeHandle, Side};
use super::RedBlackTree;

impl<K> RedBlackTree<K> {
    /// Moves `node` one level down towards `dir`, its child on the opposite
    /// side takes its place. `rotate(node, Side::Left)` is the classic left
    /// rotation:
    ///
    /// ```text
    ///    p                       p
    ///    |                       |
    /// +-node-+               +-pivot-+
    /// |      |      -->      |       |
    /// a  +-pivot-+       +-node-+    c
    ///    |       |       |      |
    ///    b       c       a      b
    /// ```
    ///
    /// `node` and `pivot` exchange their colors.
    pub(super) fn rotate(&mut self, node: NodeHandle, dir: Side) {
        let Some(pivot) = self.nodes[node].child(dir.opposite()) else {
            panic!("red-black tree is corrupted: nothing to rotate {dir:?} at {node:?}");
        };

        // attach b to node
        let inner = self.nodes[pivot].child(dir);
        self.nodes[node].set_child(dir.opposite(), inner);
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(node);
        }

        // attach pivot to parent
        self.replace_subtree(node, Some(pivot));

        // attach node to pivot
        self.nodes[pivot].set_child(dir, Some(node));
        self.nodes[node].parent = Some(pivot);

        let color = self.nodes[node].color;
        self.nodes[node].color = self.nodes[pivot].color;
        self.nodes[pivot].color = color;

        self.counters.rotations += 1;
        trace!("rotate {dir:?} at {node:?}, {pivot:?} moves up");
    }
}
