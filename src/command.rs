//! The trainer's command language.
//!
//! A line holds any number of commands, for example `a 10 a 20 a 30 tree`. Words are
//! case-insensitive. A verb that is missing its arguments is read as an unknown command
//! on its own, and parsing carries on with the next word.

use std::str::FromStr;

use crate::session::Mode;
use crate::tree::{Direction, Policy};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid value '{0}'")]
    InvalidValue(String),
    #[error("invalid direction '{0}', use 'left' or 'right'")]
    InvalidDirection(String),
    #[error("invalid switch '{0}', use 'on' or 'off'")]
    InvalidSwitch(String),
    #[error("invalid mode '{0}', valid modes: automatic, practice")]
    InvalidMode(String),
    #[error("invalid policy '{0}', valid policies: strict, lenient")]
    InvalidPolicy(String),
    #[error("unknown setting '{0}', use: autoshow, mode, or steps")]
    UnknownSetting(String),
    #[error("invalid command '{0}', try 'help'")]
    UnknownCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<T> {
    Add(T),
    Delete(T),
    Rotate { direction: Direction, value: T },
    Tree,
    /// Clears the screen, not the tree.
    Clear,
    Reset,
    Status,
    Hint,
    Preorder,
    Inorder,
    Postorder,
    Help,
    Exit,
    Config(Setting),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    AutoShow(bool),
    Steps(bool),
    Mode(Mode),
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(ParseError::InvalidDirection(s.to_string())),
        }
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "automatic" => Ok(Mode::Automatic),
            "practice" => Ok(Mode::Practice),
            _ => Err(ParseError::InvalidMode(s.to_string())),
        }
    }
}

impl FromStr for Policy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Policy::Strict),
            "lenient" => Ok(Policy::Lenient),
            _ => Err(ParseError::InvalidPolicy(s.to_string())),
        }
    }
}

/// Splits a line into commands and parses each of them.
pub fn parse_line<T: FromStr>(line: &str) -> Vec<Result<Command<T>, ParseError>> {
    let line = line.to_lowercase();
    let words: Vec<&str> = line.split_whitespace().collect();

    let mut commands = Vec::new();
    let mut rest = words.as_slice();
    while let Some((&verb, args)) = rest.split_first() {
        let arity = match verb {
            "a" | "d" | "rl" | "rr" => 1,
            "rotate" | "config" => 2,
            _ => 0,
        };
        let taken = if args.len() >= arity { arity } else { 0 };
        commands.push(parse_command(verb, &args[..taken]));
        rest = &args[taken..];
    }
    commands
}

fn parse_command<T: FromStr>(verb: &str, args: &[&str]) -> Result<Command<T>, ParseError> {
    let command = match (verb, args) {
        ("a", [value]) => Command::Add(parse_value(value)?),
        ("d", [value]) => Command::Delete(parse_value(value)?),
        ("rl", [value]) => Command::Rotate {
            direction: Direction::Left,
            value: parse_value(value)?,
        },
        ("rr", [value]) => Command::Rotate {
            direction: Direction::Right,
            value: parse_value(value)?,
        },
        ("rotate", [direction, value]) => Command::Rotate {
            direction: direction.parse()?,
            value: parse_value(value)?,
        },
        ("config", [setting, value]) => Command::Config(parse_setting(setting, value)?),
        ("tree", []) => Command::Tree,
        ("clear", []) => Command::Clear,
        ("reset", []) => Command::Reset,
        ("status", []) => Command::Status,
        ("hint", []) => Command::Hint,
        ("preorder", []) => Command::Preorder,
        ("inorder", []) => Command::Inorder,
        ("postorder", []) => Command::Postorder,
        ("help", []) => Command::Help,
        ("exit", []) => Command::Exit,
        _ => return Err(ParseError::UnknownCommand(verb.to_string())),
    };
    Ok(command)
}

fn parse_value<T: FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse().map_err(|_| ParseError::InvalidValue(word.to_string()))
}

fn parse_setting(setting: &str, value: &str) -> Result<Setting, ParseError> {
    match setting {
        "autoshow" => Ok(Setting::AutoShow(parse_switch(value)?)),
        "steps" => Ok(Setting::Steps(parse_switch(value)?)),
        "mode" => Ok(Setting::Mode(value.parse()?)),
        _ => Err(ParseError::UnknownSetting(setting.to_string())),
    }
}

fn parse_switch(word: &str) -> Result<bool, ParseError> {
    match word {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(ParseError::InvalidSwitch(word.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use expect_test::{expect, Expect};

    use super::*;

    fn check(line: &str, expect: Expect) {
        let parsed: Vec<String> = parse_line::<i32>(line)
            .iter()
            .map(|command| format!("{command:?}"))
            .collect();
        expect.assert_eq(&parsed.join("\n"));
    }

    #[test]
    fn test_chained_commands() {
        check(
            "A 10 a 20 d 10 tree",
            expect![[r#"
                Ok(Add(10))
                Ok(Add(20))
                Ok(Delete(10))
                Ok(Tree)"#]],
        );
        check(
            "rl 5 rr -3 rotate RIGHT 7 hint status",
            expect![[r#"
                Ok(Rotate { direction: Left, value: 5 })
                Ok(Rotate { direction: Right, value: -3 })
                Ok(Rotate { direction: Right, value: 7 })
                Ok(Hint)
                Ok(Status)"#]],
        );
    }

    #[test]
    fn test_config() {
        check(
            "config mode practice config autoshow 0 config steps on",
            expect![[r#"
                Ok(Config(Mode(Practice)))
                Ok(Config(AutoShow(false)))
                Ok(Config(Steps(true)))"#]],
        );
    }

    #[test]
    fn test_invalid_words() {
        check(
            "a x rotate up 3 config colour on config steps maybe frobnicate inorder",
            expect![[r#"
                Err(InvalidValue("x"))
                Err(InvalidDirection("up"))
                Err(UnknownSetting("colour"))
                Err(InvalidSwitch("maybe"))
                Err(UnknownCommand("frobnicate"))
                Ok(Inorder)"#]],
        );
    }

    #[test]
    fn test_missing_arguments() {
        // `rotate left` lacks a value, so both words stand alone
        check(
            "a 1 rotate left",
            expect![[r#"
                Ok(Add(1))
                Err(UnknownCommand("rotate"))
                Err(UnknownCommand("left"))"#]],
        );
        check("d", expect![[r#"Err(UnknownCommand("d"))"#]]);
        assert!(parse_line::<i32>("   ").is_empty());
    }

    #[test]
    fn test_tokens() {
        assert_eq!("Left".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("practice".parse::<Mode>(), Ok(Mode::Practice));
        assert_eq!("lenient".parse::<Policy>(), Ok(Policy::Lenient));
        assert_eq!(
            "loose".parse::<Policy>(),
            Err(ParseError::InvalidPolicy("loose".to_string()))
        );
        assert_eq!(
            ParseError::UnknownCommand("x".to_string()).to_string(),
            "invalid command 'x', try 'help'"
        );
    }
}
