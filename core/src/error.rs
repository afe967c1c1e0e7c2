use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates {0:?}")]
    InvalidCoords(Coord2),
    #[error("Invalid board configuration: {0}")]
    InvalidConfig(ConfigIssue),
}

/// Why a `(rows, cols, mines)` triple was rejected.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    #[error("board needs at least one row and one column")]
    EmptyBoard,
    #[error("board needs at least one mine")]
    NoMines,
    #[error("{mines} mines leave no safe cell among {cells}")]
    TooManyMines { mines: u32, cells: u32 },
}

impl From<ConfigIssue> for GameError {
    fn from(issue: ConfigIssue) -> Self {
        Self::InvalidConfig(issue)
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
