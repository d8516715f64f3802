use core::fmt;

use super::node::NodeHandle;
use super::RedBlackTree;

impl<K> RedBlackTree<K>
where
    K: fmt::Display,
{
    /// Renders the tree in order as text, e.g. `(10R 20B (. 30B 40R))`.
    ///
    /// A leaf is printed as its key followed by `R` or `B`. A node with
    /// children is printed as `(left key right)` where a missing child is
    /// `.`. An empty tree renders as `.`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn fmt_subtree(&self, f: &mut fmt::Formatter<'_>, node: Option<NodeHandle>) -> fmt::Result {
        let Some(node) = node else {
            return f.write_str(".");
        };

        let node = &self.nodes[node];
        if node.left.is_none() && node.right.is_none() {
            return write!(f, "{}{}", node.key, node.color);
        }

        f.write_str("(")?;
        self.fmt_subtree(f, node.left)?;
        write!(f, " {}{} ", node.key, node.color)?;
        self.fmt_subtree(f, node.right)?;
        f.write_str(")")
    }
}

impl<K> fmt::Display for RedBlackTree<K>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_subtree(f, self.root)
    }
}
