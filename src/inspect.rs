//! Read-only queries that locate imbalance and decide how to repair it.

use std::cmp::Ordering;
use std::fmt;
use std::ptr;

use crate::tree::{balance_factor, search, traverse, Direction, Node, Side};

/// The rotation that repairs an unbalanced node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Single left rotation on the node (Right-Right case).
    Left,
    /// Single right rotation on the node (Left-Left case).
    Right,
    /// Left rotation on the left child, then right rotation on the node.
    LeftRight,
    /// Right rotation on the right child, then left rotation on the node.
    RightLeft,
}

impl Rotation {
    pub fn is_double(self) -> bool {
        matches!(self, Rotation::LeftRight | Rotation::RightLeft)
    }

    /// Name of the imbalance shape this rotation repairs.
    pub fn case(self) -> &'static str {
        match self {
            Rotation::Left => "Right-Right",
            Rotation::Right => "Left-Left",
            Rotation::LeftRight => "Left-Right",
            Rotation::RightLeft => "Right-Left",
        }
    }

    /// Rotations in application order. A side names the child of the
    /// unbalanced node to rotate on, `None` the node itself.
    pub(crate) fn plan(self) -> &'static [(Direction, Option<Side>)] {
        match self {
            Rotation::Left => &[(Direction::Left, None)],
            Rotation::Right => &[(Direction::Right, None)],
            Rotation::LeftRight => &[
                (Direction::Left, Some(Side::Left)),
                (Direction::Right, None),
            ],
            Rotation::RightLeft => &[
                (Direction::Right, Some(Side::Right)),
                (Direction::Left, None),
            ],
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Left => f.write_str("left"),
            Rotation::Right => f.write_str("right"),
            Rotation::LeftRight => f.write_str("left-right"),
            Rotation::RightLeft => f.write_str("right-left"),
        }
    }
}

/// Guidance for the next repair of an unbalanced tree.
#[derive(Debug, Clone, Copy)]
pub struct Hint<'a, T> {
    pub node: &'a Node<T>,
    pub balance: isize,
    pub rotation: Rotation,
}

impl<'a, T> Hint<'a, T> {
    /// Rotations to perform, in order, with the value of the node each pivots on.
    pub fn steps(&self) -> Vec<(Direction, &'a T)> {
        let node = self.node;
        self.rotation
            .plan()
            .iter()
            .filter_map(|&(direction, side)| {
                let target = match side {
                    None => Some(node),
                    Some(Side::Left) => node.left(),
                    Some(Side::Right) => node.right(),
                };
                target.map(|target| (direction, target.value()))
            })
            .collect()
    }
}

/// Returns the first node, in post-order, whose balance factor is outside of -1..=1.
///
/// Children are examined before their parent, so this is always the deepest
/// unbalanced node on its path, which is the one to repair first.
pub fn find_first_unbalanced<T>(root: Option<&Node<T>>) -> Option<&Node<T>> {
    let mut found = None;
    traverse(
        root,
        |_| {},
        |_| {},
        |node| {
            if found.is_none() && node.is_unbalanced() {
                found = Some(node);
            }
        },
    );
    found
}

/// Returns every unbalanced node, in pre-order.
pub fn unbalanced_nodes<T>(root: Option<&Node<T>>) -> Vec<&Node<T>> {
    let mut nodes = Vec::new();
    traverse(
        root,
        |node| {
            if node.is_unbalanced() {
                nodes.push(node);
            }
        },
        |_| {},
        |_| {},
    );
    nodes
}

/// Decides which rotation repairs `node`, or `None` if it is balanced.
pub fn classify_rotation<T>(node: &Node<T>) -> Option<Rotation> {
    let balance = node.balance_factor();
    if balance > 1 {
        if balance_factor(node.left()) >= 0 {
            Some(Rotation::Right)
        } else {
            Some(Rotation::LeftRight)
        }
    } else if balance < -1 {
        if balance_factor(node.right()) <= 0 {
            Some(Rotation::Left)
        } else {
            Some(Rotation::RightLeft)
        }
    } else {
        None
    }
}

/// Describes how to repair the first unbalanced node, or `None` if the tree is balanced.
pub fn hint<T>(root: Option<&Node<T>>) -> Option<Hint<'_, T>> {
    let node = find_first_unbalanced(root)?;
    let rotation = classify_rotation(node)?;
    Some(Hint {
        node,
        balance: node.balance_factor(),
        rotation,
    })
}

/// Checks whether rotating the node holding `value` in `direction` is a correct
/// next step towards balance.
///
/// Accepted are the single rotation an unbalanced node needs, and the first half
/// of a double rotation some unbalanced ancestor needs.
pub fn is_rotation_correct<T: Ord>(
    root: Option<&Node<T>>,
    value: &T,
    direction: Direction,
) -> bool {
    let Some(node) = search(root, value) else {
        return false;
    };

    match (classify_rotation(node), direction) {
        (Some(Rotation::Right), Direction::Right) | (Some(Rotation::Left), Direction::Left) => {
            return true
        }
        (Some(Rotation::LeftRight), Direction::Right)
        | (Some(Rotation::RightLeft), Direction::Left) => return false,
        _ => {}
    }

    opens_double_rotation(root, node, direction)
}

// Walks from the root towards `node` looking for an unbalanced ancestor whose
// double rotation starts by rotating `node` in `direction`.
fn opens_double_rotation<T: Ord>(
    root: Option<&Node<T>>,
    node: &Node<T>,
    direction: Direction,
) -> bool {
    let mut current = root;
    while let Some(ancestor) = current {
        match (classify_rotation(ancestor), direction) {
            (Some(Rotation::LeftRight), Direction::Left) if is_same(ancestor.left(), node) => {
                return true
            }
            (Some(Rotation::RightLeft), Direction::Right) if is_same(ancestor.right(), node) => {
                return true
            }
            _ => {}
        }
        current = match node.value().cmp(ancestor.value()) {
            Ordering::Less => ancestor.left(),
            Ordering::Greater => ancestor.right(),
            Ordering::Equal => None,
        };
    }
    false
}

fn is_same<T>(child: Option<&Node<T>>, node: &Node<T>) -> bool {
    child.map_or(false, |child| ptr::eq(child, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AvlTree;

    fn unbalanced_tree(values: &[i32]) -> AvlTree<i32> {
        let mut tree = AvlTree::new();
        for value in values {
            tree.insert_unbalanced(*value).unwrap();
        }
        tree.check_consistency();
        tree
    }

    #[test]
    fn test_find_first_unbalanced_empty() {
        let tree = AvlTree::<i32>::new();
        assert!(find_first_unbalanced(tree.root()).is_none());
        assert!(hint(tree.root()).is_none());
    }

    #[test]
    fn test_find_first_unbalanced_is_deepest() {
        //       50
        //      /
        //     40
        //    /
        //   30
        //  /
        // 20
        let tree = unbalanced_tree(&[50, 40, 30, 20]);
        let node = find_first_unbalanced(tree.root()).unwrap();
        assert_eq!(*node.value(), 40);
        assert_eq!(node.balance_factor(), 2);

        let values: Vec<i32> = unbalanced_nodes(tree.root())
            .iter()
            .map(|node| *node.value())
            .collect();
        assert_eq!(values, vec![50, 40]);
    }

    #[test]
    fn test_classify_rotation() {
        let cases = [
            (&[30, 20, 10], Rotation::Right),
            (&[10, 20, 30], Rotation::Left),
            (&[30, 10, 20], Rotation::LeftRight),
            (&[10, 30, 20], Rotation::RightLeft),
        ];
        for (values, expected) in cases {
            let tree = unbalanced_tree(values);
            let root = tree.root().unwrap();
            assert_eq!(classify_rotation(root), Some(expected));
            assert_eq!(classify_rotation(root.left().or(root.right()).unwrap()), None);
        }
    }

    #[test]
    fn test_hint_steps() {
        let tree = unbalanced_tree(&[30, 10, 20]);
        let hint = hint(tree.root()).unwrap();
        assert_eq!(*hint.node.value(), 30);
        assert_eq!(hint.balance, 2);
        assert_eq!(hint.rotation.case(), "Left-Right");
        assert_eq!(
            hint.steps(),
            vec![(Direction::Left, &10), (Direction::Right, &30)]
        );

        let tree = unbalanced_tree(&[10, 20, 30]);
        let hint = super::hint(tree.root()).unwrap();
        assert_eq!(hint.balance, -2);
        assert_eq!(hint.steps(), vec![(Direction::Left, &10)]);
    }

    #[test]
    fn test_single_rotation_is_correct() {
        let tree = unbalanced_tree(&[30, 20, 10]);
        assert!(is_rotation_correct(tree.root(), &30, Direction::Right));
        assert!(!is_rotation_correct(tree.root(), &30, Direction::Left));
        assert!(!is_rotation_correct(tree.root(), &20, Direction::Right));
        assert!(!is_rotation_correct(tree.root(), &10, Direction::Left));
        assert!(!is_rotation_correct(tree.root(), &99, Direction::Right));
    }

    #[test]
    fn test_double_rotation_halves() {
        // Left-Right: rotate 10 left first, then 30 right
        let mut tree = unbalanced_tree(&[30, 10, 20]);
        assert!(!is_rotation_correct(tree.root(), &30, Direction::Right));
        assert!(!is_rotation_correct(tree.root(), &10, Direction::Right));
        assert!(is_rotation_correct(tree.root(), &10, Direction::Left));
        tree.rotate_node(&10, Direction::Left).unwrap();
        assert!(is_rotation_correct(tree.root(), &30, Direction::Right));

        // Right-Left: rotate 30 right first, then 10 left
        let mut tree = unbalanced_tree(&[10, 30, 20]);
        assert!(!is_rotation_correct(tree.root(), &10, Direction::Left));
        assert!(is_rotation_correct(tree.root(), &30, Direction::Right));
        tree.rotate_node(&30, Direction::Right).unwrap();
        assert!(is_rotation_correct(tree.root(), &10, Direction::Left));
    }

    #[test]
    fn test_rotation_below_unbalanced_node() {
        //   40
        //  /  \
        // 20   50
        //  \
        //   30
        //    \
        //     35
        let tree = unbalanced_tree(&[40, 20, 50, 30, 35]);
        let node = find_first_unbalanced(tree.root()).unwrap();
        assert_eq!(*node.value(), 20);
        assert_eq!(classify_rotation(node), Some(Rotation::Left));
        assert!(is_rotation_correct(tree.root(), &20, Direction::Left));
        assert!(!is_rotation_correct(tree.root(), &40, Direction::Right));
        assert!(!is_rotation_correct(tree.root(), &30, Direction::Left));
    }
}
