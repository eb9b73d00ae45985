//! Terminal output: colored tree grids and messages.

use std::fmt::Display;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::{style, Stylize};
use crossterm::terminal::{Clear, ClearType};

use avl_trainer::config::Settings;
use avl_trainer::layout::{Cell, Layout, Mark};
use avl_trainer::session::{Edit, Event, Mode, Status};
use avl_trainer::{Direction, Hint};

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))
}

pub fn banner<W: Write>(out: &mut W, settings: &Settings) -> io::Result<()> {
    writeln!(out, "{}", style("AVL Tree Practice Tool").green().bold())?;
    writeln!(out, "{} {}", style("Mode:").bold(), title(settings.mode))?;
    writeln!(out, "{} {}", style("Auto-show tree:").bold(), on_off(settings.auto_show))?;
    writeln!(out, "{} {}", style("Show steps:").bold(), on_off(settings.show_steps))?;
    writeln!(out)
}

pub fn success<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", style(message).green())
}

pub fn warning<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", style(message).yellow())
}

pub fn error<W: Write>(out: &mut W, err: &dyn Display) -> io::Result<()> {
    writeln!(out, "{}", style(err.to_string()).red())
}

pub fn mode_note<W: Write>(out: &mut W, mode: Mode) -> io::Result<()> {
    match mode {
        Mode::Automatic => warning(out, "Note: Rotate commands are disabled in automatic mode"),
        Mode::Practice => warning(out, "Note: Only correct rotations are allowed in practice mode"),
    }
}

/// Draws the grid with cyan borders. New nodes are green, unbalanced ones red.
pub fn tree<T: Display, W: Write>(out: &mut W, layout: &Layout<T>) -> io::Result<()> {
    if layout.is_empty() {
        return warning(out, "Tree is empty");
    }
    let width = layout.cell_width();
    let separator = layout.separator();
    writeln!(out, "{}", style(&separator).cyan())?;
    for row in layout.rows() {
        let border = style("|").cyan();
        write!(out, "{border}")?;
        for cell in row {
            match cell {
                Cell::Empty => write!(out, "{:width$}", "")?,
                Cell::Node { value, mark } => {
                    let text = format!("{:^width$}", value.to_string());
                    match mark {
                        Mark::Added => write!(out, "{}", style(text).green().bold())?,
                        Mark::Unbalanced => write!(out, "{}", style(text).red())?,
                        Mark::Plain => write!(out, "{text}")?,
                    }
                }
                connector => {
                    let text = format!("{:^width$}", connector.glyph().unwrap_or(""));
                    write!(out, "{}", style(text).dim())?
                }
            }
            write!(out, "{border}")?;
        }
        writeln!(out)?;
        writeln!(out, "{}", style(&separator).cyan())?;
    }
    Ok(())
}

pub fn events<T: Display, W: Write>(out: &mut W, events: &[Event<T>]) -> io::Result<()> {
    for event in events {
        match event {
            Event::Inserted(value) => success(out, &format!("Added {value} to the tree"))?,
            Event::Removed(value) => success(out, &format!("Removed {value} from the tree"))?,
            Event::Missing(value) => {
                warning(out, &format!("Value {value} is not in the tree, nothing removed"))?
            }
            Event::BeforeBalancing {
                edit,
                value,
                balance,
                layout,
            } => {
                let after = match edit {
                    Edit::Insert => "insertion",
                    Edit::Delete => "deletion",
                };
                warning(out, &format!("After {after} (before balancing):"))?;
                tree(out, layout)?;
                warning(
                    out,
                    &format!("Tree is unbalanced! Node {value} has balance factor {balance}"),
                )?;
            }
            Event::Correcting {
                step,
                value,
                balance,
                rotation,
                plan,
            } => {
                warning(
                    out,
                    &format!("Step {step}: Balancing node {value} (balance: {balance})"),
                )?;
                let message = match plan.as_slice() {
                    [(first, inner), (second, _)] => format!(
                        "Performing {rotation} rotation: first {first} on {inner}, then {second} on {value}"
                    ),
                    _ => format!("Performing {rotation} rotation on node {value}"),
                };
                warning(out, &message)?;
            }
            Event::Rotated {
                step,
                direction,
                value,
                layout,
            } => {
                if step.half.is_some() {
                    warning(
                        out,
                        &format!("Step {step}: {} rotation on node {value}", capitalized(*direction)),
                    )?;
                }
                warning(out, &format!("After step {step}:"))?;
                tree(out, layout)?;
            }
            Event::Rebalanced => success(out, "Tree is now balanced!")?,
            Event::ManualRotation { direction, value } => {
                success(out, &format!("Performed {direction} rotation on node {value}"))?
            }
            Event::Unbalanced { value, balance } => {
                warning(
                    out,
                    &format!("Tree is unbalanced! Node {value} has balance factor {balance}"),
                )?;
                warning(out, "Use 'hint' command if you need guidance on how to balance it.")?;
            }
            Event::Balanced => success(out, "Tree is balanced!")?,
            Event::Reset => success(out, "Tree reset")?,
            Event::Tree(layout) => tree(out, layout)?,
        }
    }
    Ok(())
}

pub fn status<T: Display, W: Write>(out: &mut W, status: &Status<T>) -> io::Result<()> {
    let settings = &status.settings;
    writeln!(out, "{}", style("Current Configuration:").bold())?;
    writeln!(out, "  Mode: {}", title(settings.mode))?;
    writeln!(out, "  Auto-show tree: {}", on_off(settings.auto_show))?;
    writeln!(out, "  Show steps: {}", on_off(settings.show_steps))?;
    writeln!(out, "  Policy: {:?}", settings.policy)?;
    writeln!(out)?;

    if status.len == 0 {
        return writeln!(out, "{} Empty", style("Tree Status:").bold());
    }
    writeln!(out, "{}", style("Tree Status:").bold())?;
    writeln!(out, "  Nodes: {}", status.len)?;
    writeln!(out, "  Height: {}", status.height)?;
    match &status.unbalanced {
        None => writeln!(out, "  Balanced: Yes"),
        Some((value, balance)) => {
            writeln!(out, "  Balanced: No")?;
            writeln!(out, "  Unbalanced node: {value} (balance: {balance})")
        }
    }
}

pub fn hint<T: Display, W: Write>(out: &mut W, hint: Option<Hint<'_, T>>) -> io::Result<()> {
    let Some(hint) = hint else {
        return success(out, "Tree is already balanced! No hints needed.");
    };
    warning(
        out,
        &format!(
            "Hint for balancing node {} (balance: {}):",
            hint.node.value(),
            hint.balance
        ),
    )?;
    let case = hint.rotation.case();
    let message = match hint.steps().as_slice() {
        [(direction, value)] => format!("→ Try 'rotate {direction} {value}' ({case} case)"),
        [(first, inner), (second, outer)] => format!(
            "→ First 'rotate {first} {inner}', then 'rotate {second} {outer}' ({case} case)"
        ),
        _ => return Ok(()),
    };
    warning(out, &message)
}

pub fn traversal<T: Display, W: Write>(out: &mut W, name: &str, values: &[T]) -> io::Result<()> {
    if values.is_empty() {
        return warning(out, "Tree is empty");
    }
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ");
    writeln!(out, "{} {joined}", style(format!("{name} traversal:")).bold())
}

pub fn help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", style("Commands:").bold())?;
    for (usage, description) in [
        ("a <value>", "Add a node"),
        ("d <value>", "Delete a node"),
        ("rl <value>", "Left rotation"),
        ("rr <value>", "Right rotation"),
        ("rotate <dir> <value>", "Rotation, <dir> is left or right"),
        ("tree", "Display current tree"),
        ("clear", "Clear screen"),
        ("reset", "Reset tree"),
        ("status", "Show configuration and tree status"),
        ("hint", "Show balancing hints (practice mode)"),
        ("preorder", "Show preorder traversal"),
        ("inorder", "Show inorder traversal"),
        ("postorder", "Show postorder traversal"),
        ("help", "Show this"),
        ("exit", "Quit"),
    ] {
        writeln!(out, "  {usage:<22}- {description}")?;
    }

    writeln!(out, "\n{}", style("Multiple Commands:").bold())?;
    writeln!(out, "  You can chain commands: 'a 10 a 20 d 10'")?;
    writeln!(out, "  Example: 'a 10 a 20 a 30 a 40 a 50' adds multiple nodes")?;

    writeln!(out, "\n{}", style("Configuration:").bold())?;
    writeln!(out, "  config autoshow on/off    - Toggle auto-show tree")?;
    writeln!(out, "  config steps on/off       - Toggle show rotation steps")?;
    writeln!(out, "  config mode <mode>        - Set mode:")?;
    writeln!(out, "    • automatic  - Auto-balance")?;
    writeln!(out, "    • practice   - Guide learning (only allow correct rotations)")?;

    writeln!(out, "\n{}", style("Visual Indicators:").bold())?;
    writeln!(out, "  {}  - Recently added", style("Green nodes").green().bold())?;
    writeln!(out, "  {}    - Unbalanced (need rotation)", style("Red nodes").red())
}

fn title(mode: Mode) -> &'static str {
    match mode {
        Mode::Automatic => "Automatic",
        Mode::Practice => "Practice",
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "On"
    } else {
        "Off"
    }
}

fn capitalized(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "Left",
        Direction::Right => "Right",
    }
}

#[cfg(test)]
mod tests {
    use avl_trainer::session::Session;

    use super::*;

    fn output(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_hint_text() {
        let mut session = Session::<i64>::new(Settings {
            mode: Mode::Practice,
            auto_show: false,
            ..Settings::default()
        });
        for value in [10, 30, 20] {
            session.insert(value).unwrap();
        }
        let text = output(|out| hint(out, session.hint()));
        assert!(text.contains("Hint for balancing node 10 (balance: -2):"));
        assert!(text.contains("First 'rotate right 30', then 'rotate left 10' (Right-Left case)"));

        session.rotate(&30, Direction::Right).unwrap();
        session.rotate(&10, Direction::Left).unwrap();
        let text = output(|out| hint(out, session.hint()));
        assert!(text.contains("No hints needed"));
    }

    #[test]
    fn test_traversal_text() {
        let text = output(|out| traversal(out, "Inorder", &[1, 2, 3]));
        assert!(text.contains("1 -> 2 -> 3"));
        let text = output(|out| traversal::<i32, _>(out, "Inorder", &[]));
        assert!(text.contains("Tree is empty"));
    }

    #[test]
    fn test_double_rotation_steps_text() {
        let mut session = Session::<i64>::default();
        session.insert(30).unwrap();
        session.insert(10).unwrap();
        let events = session.insert(20).unwrap();
        let text = output(|out| super::events(out, &events));
        assert!(text.contains("After insertion (before balancing):"));
        assert!(text.contains("Step 1: Balancing node 30 (balance: 2)"));
        assert!(text.contains("Performing left-right rotation: first left on 10, then right on 30"));
        assert!(text.contains("Step 1a: Left rotation on node 10"));
        assert!(text.contains("After step 1b:"));
        assert!(text.contains("Tree is now balanced!"));
    }
}
