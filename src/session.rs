//! The automatic and practice modes on top of a tree.
//!
//! A [`Session`] owns one tree plus the [`Settings`] it is driven with, and reports what
//! happened for each command as a list of [`Event`]s for a front end to present. Failed
//! commands return an error and leave everything as it was.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::error::{Error, ModeViolation, Result};
use crate::inspect::{find_first_unbalanced, hint, is_rotation_correct, Hint, Rotation};
use crate::layout::Layout;
use crate::tree::{AvlTree, Direction, Policy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every insert and delete rebalances, manual rotations are refused.
    #[default]
    Automatic,
    /// Inserts and deletes never rotate. Balance is restored with validated manual
    /// rotations, and the tree must be balanced before it is changed again.
    Practice,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Automatic => f.write_str("automatic"),
            Mode::Practice => f.write_str("practice"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert,
    Delete,
}

/// Label of a rotation within automatic rebalancing: `1`, or `1a` and `1b` for the halves
/// of a double rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub number: usize,
    pub half: Option<char>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)?;
        if let Some(half) = self.half {
            write!(f, "{half}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    Inserted(T),
    Removed(T),
    /// A lenient delete of a value that is not in the tree.
    Missing(T),
    /// The tree right after an automatic insert or delete, before any rotation.
    BeforeBalancing {
        edit: Edit,
        value: T,
        balance: isize,
        layout: Layout<T>,
    },
    /// Automatic rebalancing is about to repair `value`.
    Correcting {
        step: usize,
        value: T,
        balance: isize,
        rotation: Rotation,
        /// Rotations in order, with the value each one pivots on.
        plan: Vec<(Direction, T)>,
    },
    /// One rotation of automatic rebalancing, with the tree after it.
    Rotated {
        step: Step,
        direction: Direction,
        value: T,
        layout: Layout<T>,
    },
    /// Automatic rebalancing needed at least one step and is done.
    Rebalanced,
    ManualRotation {
        direction: Direction,
        value: T,
    },
    /// Practice guidance: the first unbalanced node.
    Unbalanced {
        value: T,
        balance: isize,
    },
    /// Practice guidance: nothing left to repair.
    Balanced,
    Reset,
    /// The tree as it should be shown now.
    Tree(Layout<T>),
}

/// Configuration and tree summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status<T> {
    pub settings: Settings,
    pub len: usize,
    pub height: usize,
    /// First unbalanced node and its balance factor.
    pub unbalanced: Option<(T, isize)>,
}

#[derive(Debug)]
pub struct Session<T> {
    tree: AvlTree<T>,
    settings: Settings,
    highlight: Option<T>,
}

impl<T: Ord + Clone + fmt::Debug> Session<T> {
    pub fn new(settings: Settings) -> Self {
        Self {
            tree: AvlTree::with_policy(settings.policy),
            settings,
            highlight: None,
        }
    }

    pub fn tree(&self) -> &AvlTree<T> {
        &self.tree
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.settings.mode
    }

    pub fn policy(&self) -> Policy {
        self.tree.policy()
    }

    /// The most recently added value, while it is still shown as new.
    pub fn highlight(&self) -> Option<&T> {
        self.highlight.as_ref()
    }

    /// Switching modes leaves the tree as it is.
    pub fn set_mode(&mut self, mode: Mode) {
        debug!(%mode, "mode changed");
        self.settings.mode = mode;
    }

    pub fn set_auto_show(&mut self, auto_show: bool) {
        debug!(auto_show, "auto-show changed");
        self.settings.auto_show = auto_show;
    }

    pub fn set_show_steps(&mut self, show_steps: bool) {
        debug!(show_steps, "show steps changed");
        self.settings.show_steps = show_steps;
    }

    pub fn layout(&self) -> Layout<T> {
        Layout::new(self.tree.root(), self.highlight.as_ref())
    }

    pub fn hint(&self) -> Option<Hint<'_, T>> {
        hint(self.tree.root())
    }

    pub fn status(&self) -> Status<T> {
        let unbalanced = find_first_unbalanced(self.tree.root())
            .map(|node| (node.value().clone(), node.balance_factor()));
        Status {
            settings: self.settings,
            len: self.tree.len(),
            height: self.tree.height(),
            unbalanced,
        }
    }

    pub fn insert(&mut self, value: T) -> Result<Vec<Event<T>>> {
        if self.tree.policy() == Policy::Strict && self.tree.contains(&value) {
            return Err(Error::DuplicateValue);
        }
        self.check_practice_balanced()?;

        self.highlight = Some(value.clone());
        let mut events = Vec::new();
        match self.settings.mode {
            Mode::Automatic => {
                self.tree.insert_unbalanced(value.clone())?;
                self.rebalance(Edit::Insert, &mut events);
            }
            Mode::Practice => {
                self.tree.insert_unbalanced(value.clone())?;
                events.push(self.guidance());
            }
        }
        debug!(?value, mode = %self.settings.mode, len = self.tree.len(), "inserted");
        events.push(Event::Inserted(value));
        self.finish(&mut events);
        Ok(events)
    }

    pub fn delete(&mut self, value: &T) -> Result<Vec<Event<T>>> {
        if !self.tree.contains(value) {
            return match self.tree.policy() {
                Policy::Strict => Err(Error::NotFound),
                Policy::Lenient => Ok(vec![Event::Missing(value.clone())]),
            };
        }
        self.check_practice_balanced()?;

        self.highlight = None;
        let mut events = Vec::new();
        match self.settings.mode {
            Mode::Automatic => {
                self.tree.delete_unbalanced(value)?;
                self.rebalance(Edit::Delete, &mut events);
            }
            Mode::Practice => {
                self.tree.delete_unbalanced(value)?;
                events.push(self.guidance());
            }
        }
        debug!(?value, mode = %self.settings.mode, len = self.tree.len(), "deleted");
        events.push(Event::Removed(value.clone()));
        self.finish(&mut events);
        Ok(events)
    }

    /// Rotates the node holding `value`, in practice mode and only if the rotation is a
    /// correct next step towards balance.
    pub fn rotate(&mut self, value: &T, direction: Direction) -> Result<Vec<Event<T>>> {
        if self.settings.mode == Mode::Automatic {
            return Err(ModeViolation::RotationInAutomaticMode.into());
        }
        if !self.tree.contains(value) {
            return Err(Error::NotFound);
        }
        if !is_rotation_correct(self.tree.root(), value, direction) {
            return Err(Error::InvalidRotationRequest { direction });
        }
        self.tree.rotate_node(value, direction)?;
        debug!(?value, %direction, "manual rotation");

        self.highlight = None;
        let mut events = vec![Event::ManualRotation {
            direction,
            value: value.clone(),
        }];
        if self.settings.auto_show {
            events.push(Event::Tree(self.layout()));
        }
        events.push(self.guidance());
        Ok(events)
    }

    /// Replaces the tree with an empty one. Settings are kept.
    pub fn reset(&mut self) -> Vec<Event<T>> {
        self.tree = AvlTree::with_policy(self.settings.policy);
        self.highlight = None;
        debug!("tree reset");
        let mut events = vec![Event::Reset];
        if self.settings.auto_show {
            events.push(Event::Tree(self.layout()));
        }
        events
    }

    fn check_practice_balanced(&self) -> Result<()> {
        if self.settings.mode == Mode::Practice && !self.tree.is_balanced() {
            return Err(ModeViolation::Unbalanced.into());
        }
        Ok(())
    }

    fn guidance(&self) -> Event<T> {
        match find_first_unbalanced(self.tree.root()) {
            Some(node) => Event::Unbalanced {
                value: node.value().clone(),
                balance: node.balance_factor(),
            },
            None => Event::Balanced,
        }
    }

    // Shows the final tree. In automatic mode the tree is balanced by now and the new
    // value no longer needs to stand out.
    fn finish(&mut self, events: &mut Vec<Event<T>>) {
        if self.settings.auto_show {
            events.push(Event::Tree(self.layout()));
        }
        if self.settings.mode == Mode::Automatic && self.tree.is_balanced() {
            self.highlight = None;
        }
    }

    // Repairs the tree one rotation at a time until no node is unbalanced, which also
    // covers imbalance left behind by practice mode. Every rotation is reported with a
    // snapshot when steps are shown.
    fn rebalance(&mut self, edit: Edit, events: &mut Vec<Event<T>>) {
        let show = self.settings.shows_steps();
        if show {
            if let Some(node) = find_first_unbalanced(self.tree.root()) {
                events.push(Event::BeforeBalancing {
                    edit,
                    value: node.value().clone(),
                    balance: node.balance_factor(),
                    layout: self.layout(),
                });
            }
        }

        let highlight = self.highlight.clone();
        let mut number = 0;
        loop {
            let mut rotations = Vec::new();
            let correction = self.tree.correct_first_unbalanced(|tree, direction, pivot| {
                if show {
                    let layout = Layout::new(tree.root(), highlight.as_ref());
                    rotations.push((direction, pivot.clone(), layout));
                }
            });
            let Some(correction) = correction else {
                break;
            };
            number += 1;
            debug!(
                step = number,
                value = ?correction.value,
                rotation = %correction.rotation,
                "rebalanced node"
            );
            if !show {
                continue;
            }

            events.push(Event::Correcting {
                step: number,
                value: correction.value,
                balance: correction.balance,
                rotation: correction.rotation,
                plan: rotations
                    .iter()
                    .map(|(direction, pivot, _)| (*direction, pivot.clone()))
                    .collect(),
            });
            let halves = rotations.len() > 1;
            for ((direction, value, layout), half) in rotations.into_iter().zip(['a', 'b']) {
                events.push(Event::Rotated {
                    step: Step {
                        number,
                        half: halves.then_some(half),
                    },
                    direction,
                    value,
                    layout,
                });
            }
        }
        if show && number > 0 {
            events.push(Event::Rebalanced);
        }
    }
}

impl<T: Ord + Clone + fmt::Debug> Default for Session<T> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn practice() -> Session<i32> {
        Session::new(Settings {
            mode: Mode::Practice,
            ..Settings::default()
        })
    }

    fn quiet(mode: Mode) -> Session<i32> {
        Session::new(Settings {
            mode,
            auto_show: false,
            ..Settings::default()
        })
    }

    fn strip_layouts(events: Vec<Event<i32>>) -> Vec<Event<i32>> {
        events
            .into_iter()
            .filter(|event| !matches!(event, Event::Tree(_)))
            .map(|event| match event {
                Event::BeforeBalancing {
                    edit,
                    value,
                    balance,
                    ..
                } => Event::BeforeBalancing {
                    edit,
                    value,
                    balance,
                    layout: Layout::new(None, None),
                },
                Event::Rotated {
                    step,
                    direction,
                    value,
                    ..
                } => Event::Rotated {
                    step,
                    direction,
                    value,
                    layout: Layout::new(None, None),
                },
                event => event,
            })
            .collect()
    }

    #[test]
    fn test_automatic_single_rotation_steps() {
        let mut session = Session::default();
        session.insert(10).unwrap();
        session.insert(20).unwrap();
        let events = session.insert(30).unwrap();
        assert!(matches!(events.last(), Some(Event::Tree(_))));
        assert_eq!(
            strip_layouts(events),
            vec![
                Event::BeforeBalancing {
                    edit: Edit::Insert,
                    value: 10,
                    balance: -2,
                    layout: Layout::new(None, None),
                },
                Event::Correcting {
                    step: 1,
                    value: 10,
                    balance: -2,
                    rotation: Rotation::Left,
                    plan: vec![(Direction::Left, 10)],
                },
                Event::Rotated {
                    step: Step {
                        number: 1,
                        half: None
                    },
                    direction: Direction::Left,
                    value: 10,
                    layout: Layout::new(None, None),
                },
                Event::Rebalanced,
                Event::Inserted(30),
            ]
        );
        assert_eq!(session.tree().preorder(), vec![20, 10, 30]);
        assert_eq!(session.highlight(), None);
    }

    #[test]
    fn test_automatic_double_rotation_steps() {
        let mut session = Session::default();
        session.insert(30).unwrap();
        session.insert(10).unwrap();
        let events = session.insert(20).unwrap();

        let steps: Vec<(String, Direction, i32)> = events
            .iter()
            .filter_map(|event| match event {
                Event::Rotated {
                    step,
                    direction,
                    value,
                    ..
                } => Some((step.to_string(), *direction, *value)),
                _ => None,
            })
            .collect();
        assert_eq!(
            steps,
            vec![
                ("1a".to_string(), Direction::Left, 10),
                ("1b".to_string(), Direction::Right, 30),
            ]
        );

        // The snapshot after the first half still shows the new value
        let Some(Event::Rotated { layout, .. }) = events
            .iter()
            .find(|event| matches!(event, Event::Rotated { .. }))
        else {
            panic!("no rotation event");
        };
        assert_eq!(*layout, Layout::new(layout_tree(&[30, 20, 10]).root(), Some(&20)));
        assert_eq!(session.tree().preorder(), vec![20, 10, 30]);
    }

    fn layout_tree(values: &[i32]) -> AvlTree<i32> {
        let mut tree = AvlTree::new();
        for value in values {
            tree.insert_unbalanced(*value).unwrap();
        }
        tree
    }

    #[test]
    fn test_automatic_without_steps() {
        let mut session = Session::new(Settings {
            show_steps: false,
            ..Settings::default()
        });
        for value in [10, 20] {
            session.insert(value).unwrap();
        }
        let events = session.insert(30).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Inserted(30));
        assert!(matches!(events[1], Event::Tree(_)));

        let mut session = quiet(Mode::Automatic);
        for value in [10, 20] {
            session.insert(value).unwrap();
        }
        assert_eq!(session.insert(30).unwrap(), vec![Event::Inserted(30)]);
        assert_eq!(session.tree().preorder(), vec![20, 10, 30]);
    }

    #[test]
    fn test_automatic_delete_steps() {
        let mut session = Session::default();
        for value in [20, 10, 30, 40] {
            session.insert(value).unwrap();
        }
        let events = strip_layouts(session.delete(&10).unwrap());
        assert!(matches!(
            events.first(),
            Some(Event::BeforeBalancing {
                edit: Edit::Delete,
                value: 20,
                balance: -2,
                ..
            })
        ));
        assert_eq!(events.last(), Some(&Event::Removed(10)));
        assert_eq!(session.tree().preorder(), vec![30, 20, 40]);
    }

    #[test]
    fn test_rotate_rejected_in_automatic_mode() {
        let mut session = Session::default();
        session.insert(10).unwrap();
        assert_eq!(
            session.rotate(&10, Direction::Left),
            Err(Error::ModeViolation(ModeViolation::RotationInAutomaticMode))
        );
    }

    #[test]
    fn test_practice_gating() {
        let mut session = practice();
        session.insert(10).unwrap();
        session.insert(20).unwrap();
        let events = session.insert(30).unwrap();
        assert_eq!(
            events[0],
            Event::Unbalanced {
                value: 10,
                balance: -2
            }
        );
        assert_eq!(events[1], Event::Inserted(30));
        assert_eq!(session.highlight(), Some(&30));

        // Changes are refused until the tree is balanced again
        let unbalanced = Err(Error::ModeViolation(ModeViolation::Unbalanced));
        assert_eq!(session.insert(40), unbalanced);
        assert_eq!(session.delete(&30), unbalanced);
        assert_eq!(session.insert(10), Err(Error::DuplicateValue));
        assert_eq!(session.delete(&99), Err(Error::NotFound));

        assert_eq!(
            session.rotate(&10, Direction::Right),
            Err(Error::InvalidRotationRequest {
                direction: Direction::Right
            })
        );
        assert_eq!(
            session.rotate(&20, Direction::Left),
            Err(Error::InvalidRotationRequest {
                direction: Direction::Left
            })
        );
        assert_eq!(session.rotate(&99, Direction::Left), Err(Error::NotFound));
        assert_eq!(session.tree().preorder(), vec![10, 20, 30]);

        let events = session.rotate(&10, Direction::Left).unwrap();
        assert_eq!(
            events.first(),
            Some(&Event::ManualRotation {
                direction: Direction::Left,
                value: 10
            })
        );
        assert_eq!(events.last(), Some(&Event::Balanced));
        assert_eq!(session.highlight(), None);
        assert_eq!(session.tree().preorder(), vec![20, 10, 30]);

        let events = session.insert(40).unwrap();
        assert_eq!(events[0], Event::Balanced);
    }

    #[test]
    fn test_practice_double_rotation() {
        let mut session = quiet(Mode::Practice);
        for value in [30, 10, 20] {
            session.insert(value).unwrap();
        }
        let hint = session.hint().unwrap();
        assert_eq!(hint.rotation, Rotation::LeftRight);

        assert_eq!(
            session.rotate(&10, Direction::Left).unwrap(),
            vec![
                Event::ManualRotation {
                    direction: Direction::Left,
                    value: 10
                },
                Event::Unbalanced {
                    value: 30,
                    balance: 2
                },
            ]
        );
        assert_eq!(
            session.rotate(&30, Direction::Right).unwrap().last(),
            Some(&Event::Balanced)
        );
        assert!(session.hint().is_none());
    }

    #[test]
    fn test_mode_switch_keeps_tree() {
        let mut session = quiet(Mode::Practice);
        for value in [1, 2, 3] {
            session.insert(value).unwrap();
        }
        session.set_mode(Mode::Automatic);
        assert_eq!(session.tree().preorder(), vec![1, 2, 3]);
        assert_eq!(session.status().unbalanced, Some((1, -2)));
        assert_eq!(
            session.rotate(&1, Direction::Left),
            Err(Error::ModeViolation(ModeViolation::RotationInAutomaticMode))
        );
    }

    #[test]
    fn test_automatic_repairs_practice_imbalance() {
        for (auto_show, show_steps) in [(true, true), (true, false), (false, true), (false, false)] {
            let practice_tree = || {
                let mut session = Session::new(Settings {
                    mode: Mode::Practice,
                    auto_show,
                    show_steps,
                    ..Settings::default()
                });
                for value in [50, 25, 75, 10, 5] {
                    session.insert(value).unwrap();
                }
                assert_eq!(session.status().unbalanced, Some((25, 2)));
                session.set_mode(Mode::Automatic);
                session
            };

            // 25 is not on the path to 100
            let mut session = practice_tree();
            session.insert(100).unwrap();
            assert!(session.tree().is_balanced(), "{auto_show} {show_steps}");
            assert_eq!(session.tree().preorder(), vec![50, 10, 5, 25, 75, 100]);
            session.tree().check_consistency();

            let mut session = practice_tree();
            session.delete(&75).unwrap();
            assert!(session.tree().is_balanced(), "{auto_show} {show_steps}");
            assert_eq!(session.tree().preorder(), vec![10, 5, 50, 25]);
            session.tree().check_consistency();
        }
    }

    #[test]
    fn test_lenient_policy() {
        let mut session = Session::new(Settings {
            policy: Policy::Lenient,
            auto_show: false,
            ..Settings::default()
        });
        session.insert(5).unwrap();
        session.insert(5).unwrap();
        assert_eq!(session.tree().inorder(), vec![5, 5]);
        assert_eq!(session.delete(&7).unwrap(), vec![Event::Missing(7)]);
        assert_eq!(session.delete(&5).unwrap(), vec![Event::Removed(5)]);
        assert_eq!(session.tree().len(), 1);
    }

    #[test]
    fn test_status_and_reset() {
        let mut session = Session::default();
        for value in 1..=7 {
            session.insert(value).unwrap();
        }
        let status = session.status();
        assert_eq!(status.len, 7);
        assert_eq!(status.height, 3);
        assert_eq!(status.unbalanced, None);
        assert_eq!(status.settings, Settings::default());

        session.set_auto_show(false);
        assert_eq!(session.reset(), vec![Event::Reset]);
        assert!(session.tree().is_empty());
        assert!(!session.settings().auto_show);
        assert_eq!(session.status().height, 0);
    }
}
