use serde::{Deserialize, Serialize};

/// Canonical player-visible state stored by the game, one per cell.
///
/// Revealed and flagged are variants of one enum, so a cell can never be both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCell {
    #[default]
    Hidden,
    Revealed(u8),
    Flagged,
}

impl EngineCell {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }
}

/// What a presentation layer should draw for a cell.
///
/// Mine positions only appear once the game has ended: `Mine`, `Exploded` and
/// `IncorrectFlag` are never produced while the game is in progress.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    /// Revealed safe cell, hint is `None` when no neighbor holds a mine.
    Open(Option<u8>),
    /// Unflagged mine shown after a loss.
    Mine,
    /// The mine that ended the game.
    Exploded,
    /// Flag placed on a cell without a mine, shown after a loss.
    IncorrectFlag,
}

impl CellView {
    /// Hint text for an open cell, blank for zero.
    pub const fn hint(self) -> Option<u8> {
        match self {
            Self::Open(hint) => hint,
            _ => None,
        }
    }

    pub(crate) const fn open(adjacent: u8) -> Self {
        if adjacent == 0 {
            Self::Open(None)
        } else {
            Self::Open(Some(adjacent))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hint_is_blank() {
        assert_eq!(CellView::open(0), CellView::Open(None));
        assert_eq!(CellView::open(0).hint(), None);
        assert_eq!(CellView::open(3).hint(), Some(3));
        assert_eq!(CellView::Flagged.hint(), None);
    }

    #[test]
    fn cell_defaults_to_hidden() {
        assert_eq!(EngineCell::default(), EngineCell::Hidden);
        assert!(EngineCell::Flagged.is_unrevealed());
        assert!(!EngineCell::Revealed(0).is_unrevealed());
        assert!(EngineCell::Revealed(2).is_revealed());
        assert!(EngineCell::Flagged.is_flagged());
        assert!(!EngineCell::Hidden.is_flagged());
    }
}
