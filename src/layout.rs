//! Leveled grid snapshots of a tree, for display.
//!
//! A tree of height `h` is laid out on `h` rows of `2^h - 1` columns. The node in slot `i`
//! of level `l` (slots counted as if the tree were perfect) sits in column
//! `2^(h-l-1) - 1 + i * 2^(h-l)`, so every parent sits centered above its two subtrees.
//! The row below a parent carries the connectors to its children: a trunk in the parent's
//! column and arms reaching out towards the children.
//!
//! The width is exponential in the height, which stays small for trees kept in balance.
//! Deeper trees are cut off after [`MAX_LEVELS`] levels.

use std::fmt;

use crate::tree::Node;

const MIN_CELL_WIDTH: usize = 3;

/// Levels shown at most. Nodes below are left out of the layout.
pub const MAX_LEVELS: usize = 12;

/// How a node should be emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Plain,
    /// The most recently added value.
    Added,
    /// A node with a balance factor outside of -1..=1.
    Unbalanced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<T> {
    Empty,
    Node { value: T, mark: Mark },
    /// Below a node that has children.
    Trunk,
    /// Between the trunk and the left child.
    LeftArm,
    /// Between the trunk and the right child.
    RightArm,
}

impl<T> Cell<T> {
    pub fn glyph(&self) -> Option<&'static str> {
        match self {
            Cell::Trunk => Some("╩"),
            Cell::LeftArm => Some("<"),
            Cell::RightArm => Some(">"),
            Cell::Empty | Cell::Node { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout<T> {
    rows: Vec<Vec<Cell<T>>>,
}

impl<T: Clone + PartialEq> Layout<T> {
    /// Lays out the subtree at `root`. Nodes holding `highlight` are marked as added,
    /// which takes precedence over marking them unbalanced.
    pub fn new(root: Option<&Node<T>>, highlight: Option<&T>) -> Self {
        let Some(root) = root else {
            return Self { rows: Vec::new() };
        };

        let height = depth(root).min(MAX_LEVELS);
        let width = (1usize << height) - 1;
        let mut rows: Vec<Vec<Cell<T>>> = (0..height)
            .map(|_| (0..width).map(|_| Cell::Empty).collect())
            .collect();

        let column = |level: usize, slot: usize| {
            let span = 1usize << (height - level);
            span / 2 - 1 + slot * span
        };

        let mut pending = vec![(root, 0, 0)];
        while let Some((node, level, slot)) = pending.pop() {
            let col = column(level, slot);
            let mark = if highlight == Some(&node.value) {
                Mark::Added
            } else if node.is_unbalanced() {
                Mark::Unbalanced
            } else {
                Mark::Plain
            };
            rows[level][col] = Cell::Node {
                value: node.value.clone(),
                mark,
            };

            if level + 1 == height || (node.left().is_none() && node.right().is_none()) {
                continue;
            }
            let below = &mut rows[level + 1];
            below[col] = Cell::Trunk;
            if let Some(left) = node.left() {
                let left_col = column(level + 1, 2 * slot);
                below[left_col + 1..col].fill(Cell::LeftArm);
                pending.push((left, level + 1, 2 * slot));
            }
            if let Some(right) = node.right() {
                let right_col = column(level + 1, 2 * slot + 1);
                below[col + 1..right_col].fill(Cell::RightArm);
                pending.push((right, level + 1, 2 * slot + 1));
            }
        }

        Self { rows }
    }
}

impl<T> Layout<T> {
    pub fn rows(&self) -> &[Vec<Cell<T>>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

impl<T: fmt::Display> Layout<T> {
    /// Width every cell is padded to: the widest value, at least 3.
    pub fn cell_width(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter_map(|cell| match cell {
                Cell::Node { value, .. } => Some(value.to_string().chars().count()),
                _ => None,
            })
            .fold(MIN_CELL_WIDTH, usize::max)
    }

    /// The `+---+---+` line drawn between rows.
    pub fn separator(&self) -> String {
        let dashes = "-".repeat(self.cell_width());
        let mut line = String::from("+");
        for _ in 0..self.width() {
            line.push_str(&dashes);
            line.push('+');
        }
        line
    }
}

/// Plain text grid without emphasis, one line per row and border.
impl<T: fmt::Display> fmt::Display for Layout<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let cell_width = self.cell_width();
        let separator = self.separator();
        writeln!(f, "{separator}")?;
        for row in &self.rows {
            f.write_str("|")?;
            for cell in row {
                match cell {
                    Cell::Node { value, .. } => {
                        write!(f, "{:^cell_width$}", value.to_string())?
                    }
                    Cell::Empty => write!(f, "{:cell_width$}", "")?,
                    connector => write!(f, "{:^cell_width$}", connector.glyph().unwrap_or(""))?,
                }
                f.write_str("|")?;
            }
            writeln!(f)?;
            writeln!(f, "{separator}")?;
        }
        Ok(())
    }
}

// Number of levels, counted from the links instead of cached heights.
fn depth<T>(root: &Node<T>) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(root, 1)];
    while let Some((node, level)) = pending.pop() {
        deepest = deepest.max(level);
        pending.extend(node.left().map(|left| (left, level + 1)));
        pending.extend(node.right().map(|right| (right, level + 1)));
    }
    deepest
}
