use log::trace;

use super::node::NodeHandle;
use super::RedBlackTree;
use crate::error::{Error, Violation};

/// Shape of a tree that passed [`RedBlackTree::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of keys.
    pub len: usize,
    /// Number of black nodes on every path from the root down to an empty
    /// child slot.
    pub black_height: usize,
    /// Number of nodes on the longest path from the root down to a leaf.
    pub height: usize,
}

#[derive(Clone, Copy)]
struct Subtree {
    count: usize,
    black_height: usize,
    height: usize,
}

impl Subtree {
    const EMPTY: Subtree = Subtree {
        count: 0,
        black_height: 0,
        height: 0,
    };
}

impl<K: Ord> RedBlackTree<K> {
    /// Walks the whole tree and checks every red-black and binary search
    /// tree invariant, together with the parent links and the node count.
    ///
    /// Never fails on a tree that was only changed through its public API.
    pub fn validate(&self) -> Result<Stats, Error> {
        let Some(root) = self.root else {
            return match self.len {
                0 => Ok(Stats::default()),
                n => Err(Violation::LengthMismatch {
                    expected: n,
                    found: 0,
                }
                .into()),
            };
        };

        if self.nodes[root].parent.is_some() {
            return Err(Violation::RootHasParent(root).into());
        }
        if self.nodes[root].color.is_red() {
            return Err(Violation::RedRoot(root).into());
        }

        let subtree = self.validate_subtree(root)?;
        self.validate_order(root)?;

        for found in [subtree.count, self.nodes.live()] {
            if found != self.len {
                return Err(Violation::LengthMismatch {
                    expected: self.len,
                    found,
                }
                .into());
            }
        }

        let stats = Stats {
            len: self.len,
            black_height: subtree.black_height,
            height: subtree.height,
        };
        trace!("validate: {stats:?}");
        Ok(stats)
    }

    fn validate_subtree(&self, node: NodeHandle) -> Result<Subtree, Violation> {
        let n = &self.nodes[node];
        let red = n.color.is_red();

        let mut sides = [Subtree::EMPTY; 2];
        for (stats, child) in sides.iter_mut().zip([n.left, n.right]) {
            let Some(child) = child else {
                continue;
            };

            let actual = self.nodes[child].parent;
            if actual != Some(node) {
                return Err(Violation::BrokenParentLink {
                    parent: node,
                    child,
                    actual,
                });
            }
            if red && self.nodes[child].color.is_red() {
                return Err(Violation::ConsecutiveReds {
                    parent: node,
                    child,
                });
            }
            *stats = self.validate_subtree(child)?;
        }

        let [left, right] = sides;
        if left.black_height != right.black_height {
            return Err(Violation::UnbalancedBlacks {
                node,
                left: left.black_height,
                right: right.black_height,
            });
        }

        Ok(Subtree {
            count: 1 + left.count + right.count,
            black_height: left.black_height + usize::from(!red),
            height: 1 + left.height.max(right.height),
        })
    }

    /// Keys must be strictly increasing in order.
    fn validate_order(&self, root: NodeHandle) -> Result<(), Violation> {
        let mut prev: Option<NodeHandle> = None;
        let mut result = Ok(());
        self.inorder_for_each_core(root, &mut |node| {
            if result.is_err() {
                return;
            }
            if let Some(prev) = prev {
                if self.nodes[prev].key >= self.nodes[node].key {
                    result = Err(Violation::SortError { prev, node });
                }
            }
            prev = Some(node);
        });

        result
    }
}

/// Validates `tree` and additionally checks that its height stays within
/// `2 * log2(len + 1)`.
#[cfg(test)]
pub(super) fn assert_red_blackness<K: Ord>(tree: &RedBlackTree<K>) -> Stats {
    let stats = match tree.validate() {
        Ok(stats) => stats,
        Err(err) => panic!("{err}"),
    };

    let bound = 2.0 * ((stats.len + 1) as f64).log2();
    assert!(
        stats.height as f64 <= bound,
        "height {} exceeds {bound} for {} keys",
        stats.height,
        stats.len
    );
    assert_eq!(stats.height, tree.height());
    stats
}
