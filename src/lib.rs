//! An AVL tree built for learning how it balances itself.
//!
//! [`AvlTree`] is an ordinary self-balancing binary search tree. Next to the balancing
//! `insert` and `delete` it offers non-balancing variants, so a tree can be left out of
//! balance on purpose and repaired by hand with [`AvlTree::rotate_node`]. The functions in
//! [`inspect`] find unbalanced nodes, name the rotation they need and judge whether a
//! proposed rotation is the right next step.
//!
//! [`session::Session`] ties this together into the automatic and practice modes of the
//! `avl-trainer` binary.
//!
//! ```
//! use avl_trainer::{is_rotation_correct, AvlTree, Direction};
//!
//! let mut tree = AvlTree::new();
//! for value in [30, 20, 10] {
//!     tree.insert_unbalanced(value).unwrap();
//! }
//! assert!(!tree.is_balanced());
//! assert!(is_rotation_correct(tree.root(), &30, Direction::Right));
//!
//! tree.rotate_node(&30, Direction::Right).unwrap();
//! assert!(tree.is_balanced());
//! assert_eq!(tree.preorder(), vec![20, 10, 30]);
//! ```

mod error;
pub mod inspect;
mod surgeon;
mod tree;

pub mod command;
pub mod config;
pub mod layout;
pub mod session;

pub use error::{Error, ModeViolation, Result};
pub use inspect::{
    classify_rotation, find_first_unbalanced, hint, is_rotation_correct, unbalanced_nodes, Hint,
    Rotation,
};
pub use surgeon::Correction;
pub use tree::{balance_factor, height, AvlTree, Direction, Node, Policy};
