use std::io::{self, BufRead, Write};

use avl_trainer::command::{parse_line, Command, Setting};
use avl_trainer::session::{Event, Session};
use avl_trainer::{Error, ModeViolation, Result};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Reads lines from stdin until `exit` or end of input.
pub fn run(session: &mut Session<i64>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    render::clear_screen(&mut stdout)?;
    render::banner(&mut stdout, session.settings())?;
    writeln!(stdout, "Type 'help' for commands.")?;

    let mut line = String::new();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if execute_line(session, &line, &mut stdout)? == Flow::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs every command on the line in order. Failing commands are reported and skipped,
/// `exit` drops the rest of the line.
pub fn execute_line<W: Write>(
    session: &mut Session<i64>,
    line: &str,
    out: &mut W,
) -> io::Result<Flow> {
    for command in parse_line::<i64>(line) {
        let flow = match command {
            Ok(command) => execute(session, command, out)?,
            Err(err) => {
                render::error(out, &err)?;
                Flow::Continue
            }
        };
        if flow == Flow::Exit {
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

fn execute<W: Write>(
    session: &mut Session<i64>,
    command: Command<i64>,
    out: &mut W,
) -> io::Result<Flow> {
    tracing::trace!(?command, "executing");
    match command {
        Command::Add(value) => report(out, session.insert(value))?,
        Command::Delete(value) => report(out, session.delete(&value))?,
        Command::Rotate { direction, value } => report(out, session.rotate(&value, direction))?,
        Command::Reset => render::events(out, &session.reset())?,
        Command::Tree => render::tree(out, &session.layout())?,
        Command::Clear => {
            render::clear_screen(out)?;
            render::banner(out, session.settings())?;
            render::success(out, "Screen cleared")?;
            if session.settings().auto_show && !session.tree().is_empty() {
                render::tree(out, &session.layout())?;
            }
        }
        Command::Status => render::status(out, &session.status())?,
        Command::Hint => render::hint(out, session.hint())?,
        Command::Preorder => render::traversal(out, "Preorder", &session.tree().preorder())?,
        Command::Inorder => render::traversal(out, "Inorder", &session.tree().inorder())?,
        Command::Postorder => render::traversal(out, "Postorder", &session.tree().postorder())?,
        Command::Help => render::help(out)?,
        Command::Exit => return Ok(Flow::Exit),
        Command::Config(setting) => configure(session, setting, out)?,
    }
    Ok(Flow::Continue)
}

fn configure<W: Write>(
    session: &mut Session<i64>,
    setting: Setting,
    out: &mut W,
) -> io::Result<()> {
    let on_off = |on: bool| if on { "enabled" } else { "disabled" };
    match setting {
        Setting::AutoShow(on) => {
            session.set_auto_show(on);
            render::success(out, &format!("Auto-show tree {}", on_off(on)))
        }
        Setting::Steps(on) => {
            session.set_show_steps(on);
            render::success(out, &format!("Show steps {}", on_off(on)))
        }
        Setting::Mode(mode) => {
            session.set_mode(mode);
            render::success(out, &format!("Mode set to {mode}"))?;
            render::mode_note(out, mode)
        }
    }
}

fn report<W: Write>(out: &mut W, result: Result<Vec<Event<i64>>>) -> io::Result<()> {
    match result {
        Ok(events) => render::events(out, &events),
        Err(err) => {
            render::error(out, &err)?;
            if err == Error::ModeViolation(ModeViolation::Unbalanced) {
                render::warning(out, "Use 'hint' command for guidance on how to balance it.")?;
            }
            Ok(())
        }
    }
}
