use std::str::FromStr;

use clap::ValueEnum;
use mineboard_core::{CellCount, Coord, Coord2};
use thiserror::Error;

use crate::session::Difficulty;

pub const HELP: &str = "\
commands:
  r <row> <col>        reveal a cell
  f <row> <col>        toggle a flag
  n                    new game, same difficulty
  d <preset>           switch to junior, middle or senior
  d <rows> <cols> <m>  switch to a custom board
  l                    show the best times for this board
  win                  reveal everything (recorded as a test win)
  h                    this help
  q                    quit";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DifficultyChoice {
    Preset(Difficulty),
    Custom {
        rows: Coord,
        cols: Coord,
        mines: CellCount,
    },
}

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    NewGame,
    Difficulty(DifficultyChoice),
    Leaderboard,
    ForceWin,
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, try `h`")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("`{0}` is not a valid number")]
    InvalidNumber(String),
}

fn number<T: FromStr>(arg: &str) -> Result<T, ParseCommandError> {
    arg.parse()
        .map_err(|_| ParseCommandError::InvalidNumber(arg.to_string()))
}

fn coords(command: &'static str, args: &[&str]) -> Result<Coord2, ParseCommandError> {
    match args {
        [row, col] => Ok((number(row)?, number(col)?)),
        _ => Err(ParseCommandError::MissingArgument {
            command,
            expected: "<row> <col>",
        }),
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Err(ParseCommandError::Empty);
        };

        Ok(match name.to_ascii_lowercase().as_str() {
            "r" | "reveal" => Command::Reveal(coords("r", args)?),
            "f" | "flag" => Command::Flag(coords("f", args)?),
            "n" | "new" => Command::NewGame,
            "d" | "difficulty" => Command::Difficulty(match args {
                [preset] => DifficultyChoice::Preset(
                    Difficulty::from_str(preset, true)
                        .map_err(|_| ParseCommandError::Unknown(preset.to_string()))?,
                ),
                [rows, cols, mines] => DifficultyChoice::Custom {
                    rows: number(rows)?,
                    cols: number(cols)?,
                    mines: number(mines)?,
                },
                _ => {
                    return Err(ParseCommandError::MissingArgument {
                        command: "d",
                        expected: "a preset or <rows> <cols> <mines>",
                    });
                }
            }),
            "l" | "leaders" => Command::Leaderboard,
            "win" => Command::ForceWin,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => return Err(ParseCommandError::Unknown(name.to_string())),
        })
    }
}
