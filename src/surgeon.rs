//! Rotations on arbitrary nodes of a tree.
//!
//! Nodes do not know their parent, so every rotation first searches down
//! from the root for the link that owns the node, and relinks that slot.

use std::cmp::Ordering;

use tracing::trace;

use crate::error::{Error, Result};
use crate::inspect::{classify_rotation, Rotation};
use crate::tree::{AvlTree, Direction, Link, Node, Side};

/// A repair applied by [`AvlTree::correct_first_unbalanced`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction<T> {
    /// Value of the node that was unbalanced.
    pub value: T,
    /// Its balance factor before the repair.
    pub balance: isize,
    pub rotation: Rotation,
}

impl<T: Ord> AvlTree<T> {
    /// Rotates the subtree rooted at the node holding `value`.
    ///
    /// Heights of the whole tree are recomputed afterwards. No balance checks
    /// are made, see [`crate::is_rotation_correct`] for those.
    pub fn rotate_node(&mut self, value: &T, direction: Direction) -> Result<()> {
        let slot = self.parent_slot(value).ok_or(Error::NotFound)?;
        if slot.as_deref().and_then(|node| node.pivot(direction)).is_none() {
            return Err(Error::RotationUnavailable { direction });
        }
        if let Some(node) = slot.take() {
            *slot = Some(direction.rotate(node));
        }
        self.update_all_heights();
        Ok(())
    }

    // Returns the link owning the node that holds `value`: the root link or
    // the matching child slot of its parent.
    fn parent_slot(&mut self, value: &T) -> Option<&mut Link<T>> {
        let mut link = self.root_slot();
        loop {
            let ordering = value.cmp(&link.as_deref()?.value);
            link = match ordering {
                Ordering::Equal => return Some(link),
                Ordering::Less => &mut link.as_deref_mut()?.left,
                Ordering::Greater => &mut link.as_deref_mut()?.right,
            };
        }
    }
}

impl<T> AvlTree<T> {
    /// Recomputes cached heights of every node, children before parents.
    pub(crate) fn update_all_heights(&mut self) {
        if let Some(root) = self.root_slot().as_deref_mut() {
            root.update_heights();
        }
    }

    /// Repairs the first unbalanced node with the rotation it needs, one rotation
    /// at a time, calling `on_rotation` with the tree, the direction and the pivot
    /// value after each one.
    ///
    /// Returns `None` if the tree is balanced.
    pub fn correct_first_unbalanced<F>(&mut self, mut on_rotation: F) -> Option<Correction<T>>
    where
        T: Clone,
        F: FnMut(&Self, Direction, &T),
    {
        let path = first_unbalanced_path(self.root())?;
        let correction = {
            let node = self.node_at(&path)?;
            Correction {
                value: node.value.clone(),
                balance: node.balance_factor(),
                rotation: classify_rotation(node)?,
            }
        };

        for &(direction, side) in correction.rotation.plan() {
            let mut target = path.clone();
            target.extend(side);
            let slot = self.slot_at(&target)?;
            let node = slot.take()?;
            let pivot = node.value.clone();
            *slot = Some(direction.rotate(node));
            self.update_all_heights();
            trace!(?direction, "rotated unbalanced subtree");
            on_rotation(&*self, direction, &pivot);
        }
        Some(correction)
    }

    fn node_at(&self, path: &[Side]) -> Option<&Node<T>> {
        let mut node = self.root()?;
        for side in path {
            node = match side {
                Side::Left => node.left()?,
                Side::Right => node.right()?,
            };
        }
        Some(node)
    }

    fn slot_at(&mut self, path: &[Side]) -> Option<&mut Link<T>> {
        let mut link = self.root_slot();
        for &side in path {
            link = link.as_deref_mut()?.child_mut(side);
        }
        Some(link)
    }
}

impl<T> Node<T> {
    fn update_heights(&mut self) {
        if let Some(left) = self.left.as_deref_mut() {
            left.update_heights();
        }
        if let Some(right) = self.right.as_deref_mut() {
            right.update_heights();
        }
        self.adjust_height();
    }
}

// Path from the root to the first unbalanced node in post-order.
fn first_unbalanced_path<T>(root: Option<&Node<T>>) -> Option<Vec<Side>> {
    fn visit<T>(node: &Node<T>, path: &mut Vec<Side>) -> bool {
        for (side, child) in [(Side::Left, node.left()), (Side::Right, node.right())] {
            if let Some(child) = child {
                path.push(side);
                if visit(child, path) {
                    return true;
                }
                path.pop();
            }
        }
        node.is_unbalanced()
    }

    let mut path = Vec::new();
    visit(root?, &mut path).then_some(path)
}
