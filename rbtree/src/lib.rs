#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! An ordered set backed by a red-black tree.
//!
//! Nodes live in an arena owned by the tree and refer to each other by
//! [`NodeHandle`]. The handles are also what callers use to walk the tree
//! (see [`RedBlackTree::root`], [`RedBlackTree::left_of`] and friends).
//!
//! ```
//! use rbtree::{Color, RedBlackTree};
//!
//! let mut tree = RedBlackTree::new();
//! for key in [10, 20, 30] {
//!     tree.insert(key).unwrap();
//! }
//!
//! let root = tree.root().unwrap();
//! assert_eq!(tree.key_of(root), Some(&20));
//! assert_eq!(tree.color_of(root), Some(Color::Black));
//! assert_eq!(tree.render(), "(10R 20B 30R)");
//! ```

pub mod error;
pub mod red_black_tree;

pub use error::{Error, Violation};
pub use red_black_tree::{Color, FixupCounters, NodeHandle, RedBlackTree, Stats};
