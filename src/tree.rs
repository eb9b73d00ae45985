use std::cmp::{self, Ordering};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub(crate) type Link<T> = Option<Box<Node<T>>>;

/// How the tree treats values that are already present, or absent on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Duplicate inserts fail with [`Error::DuplicateValue`],
    /// removing an absent value fails with [`Error::NotFound`].
    #[default]
    Strict,
    /// Duplicates are routed into the right subtree,
    /// removing an absent value does nothing.
    Lenient,
}

/// Direction of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Rotates the subtree rooted at `node` and returns its new root.
    pub fn rotate<T>(self, node: Box<Node<T>>) -> Box<Node<T>> {
        match self {
            Direction::Left => Node::rotate_left(node),
            Direction::Right => Node::rotate_right(node),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => f.write_str("left"),
            Direction::Right => f.write_str("right"),
        }
    }
}

/// Child slot of a node, used to describe paths from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A vertex of an [`AvlTree`].
///
/// A node owns both of its subtrees and caches its height, which is 1 for a leaf.
/// Nodes keep no reference to their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    pub(crate) height: usize,
}

impl<T> Node<T> {
    /// Creates a leaf node.
    pub fn new(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
            height: 1,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn left(&self) -> Option<&Node<T>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<T>> {
        self.right.as_deref()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Height of the left subtree minus height of the right subtree.
    pub fn balance_factor(&self) -> isize {
        height(self.left()) as isize - height(self.right()) as isize
    }

    pub fn is_unbalanced(&self) -> bool {
        self.balance_factor().abs() > 1
    }

    /// Returns the leftmost node of this subtree.
    pub fn min_value_node(&self) -> &Node<T> {
        let mut current = self;
        while let Some(left) = current.left() {
            current = left;
        }
        current
    }

    /// Rotates the subtree left and returns the new subtree root.
    /// Returns the node unchanged if it has no right child.
    pub fn rotate_left(mut node: Box<Self>) -> Box<Self> {
        match node.right.take() {
            None => node,
            Some(mut right) => {
                node.right = right.left.take();
                node.adjust_height();
                right.left = Some(node);
                right.adjust_height();
                right
            }
        }
    }

    /// Rotates the subtree right and returns the new subtree root.
    /// Returns the node unchanged if it has no left child.
    pub fn rotate_right(mut node: Box<Self>) -> Box<Self> {
        match node.left.take() {
            None => node,
            Some(mut left) => {
                node.left = left.right.take();
                node.adjust_height();
                left.right = Some(node);
                left.adjust_height();
                left
            }
        }
    }

    /// The child a rotation in `direction` lifts into this node's place.
    pub(crate) fn pivot(&self, direction: Direction) -> Option<&Node<T>> {
        match direction {
            Direction::Left => self.right(),
            Direction::Right => self.left(),
        }
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Link<T> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub(crate) fn adjust_height(&mut self) {
        self.height = 1 + cmp::max(height(self.left()), height(self.right()));
    }
}

/// Height of an optional subtree, 0 for `None`.
pub fn height<T>(node: Option<&Node<T>>) -> usize {
    node.map_or(0, Node::height)
}

/// Balance factor of an optional subtree, 0 for `None`.
pub fn balance_factor<T>(node: Option<&Node<T>>) -> isize {
    node.map_or(0, Node::balance_factor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Balancing {
    Automatic,
    Off,
}

/// A binary search tree that keeps itself height balanced on insert and delete.
///
/// ```
/// use avl_trainer::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(10).unwrap();
/// tree.insert(20).unwrap();
/// tree.insert(30).unwrap();
/// assert_eq!(tree.root().map(|root| *root.value()), Some(20));
/// assert_eq!(tree.inorder(), vec![10, 20, 30]);
/// ```
#[derive(Debug, Clone)]
pub struct AvlTree<T> {
    root: Link<T>,
    num_nodes: usize,
    policy: Policy,
}

impl<T> AvlTree<T> {
    pub fn root(&self) -> Option<&Node<T>> {
        self.root.as_deref()
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Height of the root node, 0 for an empty tree.
    pub fn height(&self) -> usize {
        height(self.root())
    }

    /// Removes all nodes.
    pub fn clear(&mut self) {
        let mut pending: Vec<Box<Node<T>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
        self.num_nodes = 0;
    }

    pub(crate) fn root_slot(&mut self) -> &mut Link<T> {
        &mut self.root
    }

    pub(crate) fn traverse<'a, Pre, In, Post>(&'a self, preorder: Pre, inorder: In, postorder: Post)
    where
        Pre: FnMut(&'a Node<T>),
        In: FnMut(&'a Node<T>),
        Post: FnMut(&'a Node<T>),
    {
        traverse(self.root(), preorder, inorder, postorder);
    }
}

impl<T: Ord> AvlTree<T> {
    /// Creates an empty tree with the strict policy.
    pub fn new() -> Self {
        Self::with_policy(Policy::Strict)
    }

    pub fn with_policy(policy: Policy) -> Self {
        Self {
            root: None,
            num_nodes: 0,
            policy,
        }
    }

    /// Returns the node holding `value`, if any.
    pub fn search(&self, value: &T) -> Option<&Node<T>> {
        search(self.root(), value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.search(value).is_some()
    }

    /// Returns true if no node has a balance factor outside of -1..=1.
    pub fn is_balanced(&self) -> bool {
        crate::inspect::find_first_unbalanced(self.root()).is_none()
    }

    /// Inserts a value and restores balance on the way back up.
    pub fn insert(&mut self, value: T) -> Result<()> {
        self.insert_with(value, Balancing::Automatic)
    }

    /// Inserts a value without any rotation. Heights stay correct,
    /// balance may be violated afterwards.
    pub fn insert_unbalanced(&mut self, value: T) -> Result<()> {
        self.insert_with(value, Balancing::Off)
    }

    /// Removes a value and restores balance on the way back up.
    pub fn delete(&mut self, value: &T) -> Result<()> {
        self.delete_with(value, Balancing::Automatic)
    }

    /// Removes a value without any rotation.
    pub fn delete_unbalanced(&mut self, value: &T) -> Result<()> {
        self.delete_with(value, Balancing::Off)
    }

    fn insert_with(&mut self, value: T, balancing: Balancing) -> Result<()> {
        if self.policy == Policy::Strict && self.contains(&value) {
            return Err(Error::DuplicateValue);
        }
        let (root, _) = Self::insert_node(self.root.take(), value, balancing);
        self.root = Some(root);
        self.num_nodes += 1;
        Ok(())
    }

    // Returns the new subtree root and the side the value was sent to at this node,
    // which the parent uses to tell the single and double rotation cases apart.
    fn insert_node(
        link: Link<T>,
        value: T,
        balancing: Balancing,
    ) -> (Box<Node<T>>, Option<Side>) {
        let mut node = match link {
            None => return (Box::new(Node::new(value)), None),
            Some(node) => node,
        };

        let side = if value < node.value {
            Side::Left
        } else {
            Side::Right
        };
        let (child, child_side) = Self::insert_node(node.child_mut(side).take(), value, balancing);
        *node.child_mut(side) = Some(child);
        node.adjust_height();

        if balancing == Balancing::Off {
            return (node, Some(side));
        }

        let balance = node.balance_factor();
        let node = if balance > 1 {
            if child_side == Some(Side::Right) {
                // Left-Right
                node.left = node.left.take().map(Node::rotate_left);
            }
            Node::rotate_right(node)
        } else if balance < -1 {
            if child_side == Some(Side::Left) {
                // Right-Left
                node.right = node.right.take().map(Node::rotate_right);
            }
            Node::rotate_left(node)
        } else {
            node
        };
        (node, Some(side))
    }

    fn delete_with(&mut self, value: &T, balancing: Balancing) -> Result<()> {
        if !self.contains(value) {
            return match self.policy {
                Policy::Strict => Err(Error::NotFound),
                Policy::Lenient => Ok(()),
            };
        }
        debug_assert!(self.num_nodes >= 1);
        self.root = Self::delete_node(self.root.take(), value, balancing);
        self.num_nodes -= 1;
        Ok(())
    }

    fn delete_node(link: Link<T>, value: &T, balancing: Balancing) -> Link<T> {
        let mut node = link?;
        match value.cmp(&node.value) {
            Ordering::Less => node.left = Self::delete_node(node.left.take(), value, balancing),
            Ordering::Greater => {
                node.right = Self::delete_node(node.right.take(), value, balancing)
            }
            Ordering::Equal => match (node.left.take(), node.right.take()) {
                (None, right) => return right,
                (left, None) => return left,
                (left, Some(right)) => {
                    // Replace by in-order successor, unlinked from the right subtree
                    let (right, successor) = Self::take_min(right, balancing);
                    node.value = successor;
                    node.left = left;
                    node.right = right;
                }
            },
        }
        Some(Self::rebalance(node, balancing))
    }

    fn take_min(mut node: Box<Node<T>>, balancing: Balancing) -> (Link<T>, T) {
        match node.left.take() {
            None => {
                let Node { value, right, .. } = *node;
                (right, value)
            }
            Some(left) => {
                let (left, min) = Self::take_min(left, balancing);
                node.left = left;
                (Some(Self::rebalance(node, balancing)), min)
            }
        }
    }

    fn rebalance(mut node: Box<Node<T>>, balancing: Balancing) -> Box<Node<T>> {
        node.adjust_height();
        if balancing == Balancing::Off {
            return node;
        }

        let balance = node.balance_factor();
        if balance > 1 {
            if balance_factor(node.left()) < 0 {
                node.left = node.left.take().map(Node::rotate_left);
            }
            Node::rotate_right(node)
        } else if balance < -1 {
            if balance_factor(node.right()) > 0 {
                node.right = node.right.take().map(Node::rotate_right);
            }
            Node::rotate_left(node)
        } else {
            node
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let strict = self.policy == Policy::Strict;

        // Check tree nodes
        let mut num_nodes = 0;
        self.traverse(
            |node| {
                let mut expected_height = 1;

                // Check left child node
                if let Some(left) = node.left() {
                    if strict {
                        assert!(left.value < node.value);
                    } else {
                        assert!(left.value <= node.value);
                    }
                    expected_height = cmp::max(expected_height, left.height + 1);
                }

                // Check right child node
                if let Some(right) = node.right() {
                    if strict {
                        assert!(right.value > node.value);
                    } else {
                        assert!(right.value >= node.value);
                    }
                    expected_height = cmp::max(expected_height, right.height + 1);
                }

                // Check height
                assert_eq!(node.height, expected_height);

                num_nodes += 1;
            },
            |_| {},
            |_| {},
        );

        // Check order across subtrees
        let mut previous: Option<&T> = None;
        self.traverse(
            |_| {},
            |node| {
                if let Some(previous) = previous {
                    if strict {
                        assert!(*previous < node.value);
                    } else {
                        assert!(*previous <= node.value);
                    }
                }
                previous = Some(&node.value);
            },
            |_| {},
        );

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_balanced(&self) {
        self.traverse(
            |node| {
                let left_height = height(node.left());
                let right_height = height(node.right());
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);
            },
            |_| {},
            |_| {},
        );
    }
}

impl<T: Ord + Clone> AvlTree<T> {
    /// Values in visit, left, right order.
    pub fn preorder(&self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.num_nodes);
        self.traverse(|node| values.push(node.value.clone()), |_| {}, |_| {});
        values
    }

    /// Values in left, visit, right order, which is ascending.
    pub fn inorder(&self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.num_nodes);
        self.traverse(|_| {}, |node| values.push(node.value.clone()), |_| {});
        values
    }

    /// Values in left, right, visit order.
    pub fn postorder(&self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.num_nodes);
        self.traverse(|_| {}, |_| {}, |node| values.push(node.value.clone()));
        values
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for AvlTree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

pub(crate) fn search<'a, T: Ord>(root: Option<&'a Node<T>>, value: &T) -> Option<&'a Node<T>> {
    let mut current = root;
    while let Some(node) = current {
        current = match value.cmp(&node.value) {
            Ordering::Equal => break,
            Ordering::Less => node.left(),
            Ordering::Greater => node.right(),
        };
    }
    current
}

enum Visit {
    FromParent,
    FromLeft,
    FromRight,
}

/// Walks a subtree with an explicit stack, calling the callbacks
/// when a node is entered, between its subtrees, and when it is left.
pub(crate) fn traverse<'a, T, Pre, In, Post>(
    root: Option<&'a Node<T>>,
    mut preorder: Pre,
    mut inorder: In,
    mut postorder: Post,
) where
    Pre: FnMut(&'a Node<T>),
    In: FnMut(&'a Node<T>),
    Post: FnMut(&'a Node<T>),
{
    let mut stack: Vec<(&'a Node<T>, Visit)> = Vec::new();
    if let Some(root) = root {
        stack.push((root, Visit::FromParent));
    }
    while let Some((node, visit)) = stack.pop() {
        match visit {
            Visit::FromParent => {
                preorder(node);
                stack.push((node, Visit::FromLeft));
                if let Some(left) = node.left() {
                    stack.push((left, Visit::FromParent));
                }
            }
            Visit::FromLeft => {
                inorder(node);
                stack.push((node, Visit::FromRight));
                if let Some(right) = node.right() {
                    stack.push((right, Visit::FromParent));
                }
            }
            Visit::FromRight => postorder(node),
        }
    }
}
