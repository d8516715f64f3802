use crate::red_black_tree::NodeHandle;

/// Errors returned by [`RedBlackTree`](crate::RedBlackTree).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// `insert` was called with a key that is already in the tree.
    /// The tree is left untouched.
    #[error("key is already present")]
    DuplicateKey,
    /// `delete` was called with a key that is not in the tree.
    /// The tree is left untouched.
    #[error("key not found")]
    KeyNotFound,
    /// One of the red-black invariants doesn't hold. This is a bug in the
    /// tree itself, never something a caller can trigger.
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] Violation),
}

/// Describes which invariant [`RedBlackTree::validate`] found broken.
///
/// [`RedBlackTree::validate`]: crate::RedBlackTree::validate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("root {0:?} is red")]
    RedRoot(NodeHandle),
    #[error("root {0:?} has a parent")]
    RootHasParent(NodeHandle),
    #[error("{child:?} is a child of {parent:?} but points to {actual:?} as its parent")]
    BrokenParentLink {
        parent: NodeHandle,
        child: NodeHandle,
        actual: Option<NodeHandle>,
    },
    #[error("red {parent:?} has a red child {child:?}")]
    ConsecutiveReds {
        parent: NodeHandle,
        child: NodeHandle,
    },
    /// Black heights of the left and the right subtree of `node` differ.
    #[error("unbalanced blacks under {node:?}: left {left}, right {right}")]
    UnbalancedBlacks {
        node: NodeHandle,
        left: usize,
        right: usize,
    },
    /// In-order walk found `node` not strictly greater than `prev`.
    #[error("keys out of order: {node:?} follows {prev:?}")]
    SortError { prev: NodeHandle, node: NodeHandle },
    #[error("tree counts {expected} nodes but {found} are reachable")]
    LengthMismatch { expected: usize, found: usize },
}
