//! A line-oriented command language over any [`ViewService`].
//!
//! | Command | Effect |
//! |---------|--------|
//! | `getView <id>` | Count of one id |
//! | `getAll` | Every id with its count |
//! | `incre <id>` | Record one view |
//! | `top <n>` | The `n` most viewed ids |
//! | `recent <n>` | The `n` most recently viewed ids |
//!
//! ```rust
//! use classifica::shell::{execute, Command, Outcome};
//! use classifica::RankedCounterStore;
//!
//! let store = RankedCounterStore::new();
//! execute(&store, &"incre video1".parse::<Command>().unwrap())?;
//! let outcome = execute(&store, &"getView video1".parse::<Command>().unwrap())?;
//! assert_eq!(outcome, Outcome::Views(1));
//! # Ok::<(), classifica::ViewError>(())
//! ```

use std::str::FromStr;

use thiserror::Error;

use crate::error::Result;
use crate::service::ViewService;
use crate::store::ViewCount;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `getView <id>`
    GetView(String),
    /// `getAll`
    GetAll,
    /// `incre <id>`
    Increment(String),
    /// `top <n>`
    Top(i64),
    /// `recent <n>`
    Recent(i64),
}

/// Why a line could not be parsed into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The line held no command.
    #[error("no command provided")]
    Empty,

    /// The first word is not a known command.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// The command got the wrong number of arguments.
    #[error("{command} takes {expected} argument(s), got {found}")]
    Arity {
        /// Command name as typed.
        command: &'static str,
        /// Arguments the command takes.
        expected: usize,
        /// Arguments given.
        found: usize,
    },

    /// The limit argument is not an integer.
    #[error("{command} expects an integer, got {value:?}")]
    InvalidNumber {
        /// Command name as typed.
        command: &'static str,
        /// The offending argument.
        value: String,
    },
}

fn expect_args(
    command: &'static str,
    args: &[&str],
    expected: usize,
) -> std::result::Result<(), CommandError> {
    if args.len() != expected {
        return Err(CommandError::Arity {
            command,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn parse_limit(command: &'static str, value: &str) -> std::result::Result<i64, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        command,
        value: value.to_string(),
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = parts.collect();

        match name {
            "getView" => {
                expect_args("getView", &args, 1)?;
                Ok(Command::GetView(args[0].to_string()))
            }
            "getAll" => {
                expect_args("getAll", &args, 0)?;
                Ok(Command::GetAll)
            }
            "incre" => {
                expect_args("incre", &args, 1)?;
                Ok(Command::Increment(args[0].to_string()))
            }
            "top" => {
                expect_args("top", &args, 1)?;
                Ok(Command::Top(parse_limit("top", args[0])?))
            }
            "recent" => {
                expect_args("recent", &args, 1)?;
                Ok(Command::Recent(parse_limit("recent", args[0])?))
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// What a successfully executed command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The count of one id.
    Views(u64),
    /// A list of ids with counts.
    List(Vec<ViewCount>),
    /// The command had no output.
    Done,
}

/// Runs `command` against `service`.
pub fn execute<S: ViewService + ?Sized>(service: &S, command: &Command) -> Result<Outcome> {
    match command {
        Command::GetView(id) => service.get_view(id).map(Outcome::Views),
        Command::GetAll => service.get_all().map(Outcome::List),
        Command::Increment(id) => service.increment(id).map(|()| Outcome::Done),
        Command::Top(n) => service.get_top(*n).map(Outcome::List),
        Command::Recent(n) => service.get_recent(*n).map(Outcome::List),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use crate::store::RankedCounterStore;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "getView video1".parse::<Command>(),
            Ok(Command::GetView("video1".into()))
        );
        assert_eq!("getAll".parse::<Command>(), Ok(Command::GetAll));
        assert_eq!(
            "  incre   video2 ".parse::<Command>(),
            Ok(Command::Increment("video2".into()))
        );
        assert_eq!("top 3".parse::<Command>(), Ok(Command::Top(3)));
        assert_eq!("recent -1".parse::<Command>(), Ok(Command::Recent(-1)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "delete x".parse::<Command>(),
            Err(CommandError::Unknown("delete".into()))
        );
        assert_eq!(
            "top".parse::<Command>(),
            Err(CommandError::Arity {
                command: "top",
                expected: 1,
                found: 0
            })
        );
        assert_eq!(
            "getAll extra".parse::<Command>(),
            Err(CommandError::Arity {
                command: "getAll",
                expected: 0,
                found: 1
            })
        );
        assert_eq!(
            "recent many".parse::<Command>(),
            Err(CommandError::InvalidNumber {
                command: "recent",
                value: "many".into()
            })
        );
    }

    #[test]
    fn test_error_display() {
        let err = CommandError::Arity {
            command: "incre",
            expected: 1,
            found: 2,
        };
        assert_eq!(err.to_string(), "incre takes 1 argument(s), got 2");
    }

    #[test]
    fn test_execute() {
        let store = RankedCounterStore::new();
        for line in ["incre a", "incre b", "incre b"] {
            let cmd: Command = line.parse().unwrap();
            assert_eq!(execute(&store, &cmd), Ok(Outcome::Done));
        }
        assert_eq!(
            execute(&store, &Command::GetView("b".into())),
            Ok(Outcome::Views(2))
        );
        assert_eq!(
            execute(&store, &Command::Top(1)),
            Ok(Outcome::List(vec![ViewCount::new("b", 2)]))
        );
        assert_eq!(
            execute(&store, &Command::Recent(1)),
            Ok(Outcome::List(vec![ViewCount::new("b", 2)]))
        );
        assert!(matches!(
            execute(&store, &Command::Top(-1)),
            Err(ViewError::InvalidArgument(_))
        ));
    }
}
