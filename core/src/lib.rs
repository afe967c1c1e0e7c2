#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use clock::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use tile::*;
pub use types::*;

mod clock;
mod engine;
mod error;
mod generator;
mod tile;
mod types;

/// Board dimensions and mine count, validated on construction.
///
/// Deserialization goes through [`GameConfig::new`] as well.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig")]
pub struct GameConfig {
    size: Coord2,
    mines: CellCount,
}

#[derive(Deserialize)]
struct RawGameConfig {
    size: Coord2,
    mines: CellCount,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = GameError;

    fn try_from(raw: RawGameConfig) -> Result<Self> {
        Self::new(raw.size.0, raw.size.1, raw.mines)
    }
}

impl GameConfig {
    /// Fails with `InvalidConfig` unless `rows >= 1`, `cols >= 1` and `1 <= mines < rows * cols`.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        if rows < 1 || cols < 1 {
            return Err(ConfigIssue::EmptyBoard.into());
        }
        if mines < 1 {
            return Err(ConfigIssue::NoMines.into());
        }
        let cells = mult(rows, cols);
        if mines >= cells {
            return Err(ConfigIssue::TooManyMines { mines, cells }.into());
        }
        Ok(Self {
            size: (rows, cols),
            mines,
        })
    }

    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

/// Immutable mine layout plus the hint of every safe cell.
///
/// Hints are derived once from the mine mask when the board is built and never
/// touched afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Board {
    mine_mask: Array2<bool>,
    adjacent: Array2<u8>,
    mine_count: CellCount,
}

impl Board {
    /// Places `mines` uniformly at random on a `rows x cols` board.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount, seed: u64) -> Result<Self> {
        let config = GameConfig::new(rows, cols, mines)?;
        Ok(RandomLayoutGenerator::new(seed).generate(config))
    }

    /// Builds a board with mines exactly at `mine_coords`, duplicates count once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 < 1 || size.1 < 1 {
            return Err(ConfigIssue::EmptyBoard.into());
        }

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords(coords));
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        // revalidates the mine count against the size
        GameConfig::new(size.0, size.1, mine_count)?;
        Ok(Self::from_mine_mask(mine_mask, mine_count))
    }

    /// Callers guarantee the mask matches a valid `GameConfig` with `mine_count` mines.
    pub(crate) fn from_mine_mask(mine_mask: Array2<bool>, mine_count: CellCount) -> Self {
        let (rows, cols) = mine_mask.dim();
        let size = (rows as Coord, cols as Coord);
        let mut adjacent: Array2<u8> = Array2::zeros(mine_mask.dim());

        for coords in CoordIter::new(size) {
            if mine_mask[coords.to_nd_index()] {
                continue;
            }
            adjacent[coords.to_nd_index()] = NeighborIter::new(coords, size)
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count() as u8;
        }

        Self {
            mine_mask,
            adjacent,
            mine_count,
        }
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            size: self.size(),
            mines: self.mine_count,
        }
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords(coords))
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.mine_mask.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Precomputed hint, 0 for mine cells.
    pub fn adjacent_count(&self, coords: Coord2) -> u8 {
        self.adjacent[coords.to_nd_index()]
    }

    /// Mine positions in row-major order.
    pub fn mine_coords(&self) -> Vec<Coord2> {
        self.iter_coords().filter(|&pos| self[pos]).collect()
    }

    pub fn iter_coords(&self) -> CoordIter {
        CoordIter::new(self.size())
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }
}

impl Index<Coord2> for Board {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    #[default]
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_degenerate_boards() {
        assert_eq!(
            GameConfig::new(0, 5, 1),
            Err(GameError::InvalidConfig(ConfigIssue::EmptyBoard))
        );
        assert_eq!(
            GameConfig::new(5, 0, 1),
            Err(GameError::InvalidConfig(ConfigIssue::EmptyBoard))
        );
        assert_eq!(
            GameConfig::new(5, 5, 0),
            Err(GameError::InvalidConfig(ConfigIssue::NoMines))
        );
        assert_eq!(
            GameConfig::new(5, 5, 25),
            Err(GameError::InvalidConfig(ConfigIssue::TooManyMines {
                mines: 25,
                cells: 25
            }))
        );
    }

    #[test]
    fn config_accepts_one_safe_cell() {
        let config = GameConfig::new(5, 5, 24).unwrap();
        assert_eq!(config.total_cells(), 25);
        assert_eq!(config.safe_cells(), 1);
        assert_eq!(config.size(), (5, 5));
    }

    #[test]
    fn deserialized_config_is_validated() {
        let config: GameConfig = serde_json::from_str(r#"{"size":[9,9],"mines":25}"#).unwrap();
        assert_eq!(config, GameConfig::new(9, 9, 25).unwrap());
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"size":[9,9],"mines":25}"#);

        for invalid in [
            r#"{"size":[3,3],"mines":20}"#,
            r#"{"size":[2,2],"mines":0}"#,
            r#"{"size":[0,4],"mines":1}"#,
        ] {
            assert!(serde_json::from_str::<GameConfig>(invalid).is_err(), "{invalid}");
        }
    }

    #[test]
    fn adjacency_counts_clipped_neighborhood() {
        // . * .
        // . . .
        // * . *
        let board = Board::from_mine_coords((3, 3), &[(0, 1), (2, 0), (2, 2)]).unwrap();

        assert_eq!(board.adjacent_count((0, 0)), 1);
        assert_eq!(board.adjacent_count((0, 2)), 1);
        assert_eq!(board.adjacent_count((1, 0)), 2);
        assert_eq!(board.adjacent_count((1, 1)), 3);
        assert_eq!(board.adjacent_count((1, 2)), 2);
        assert_eq!(board.adjacent_count((2, 1)), 2);
        assert_eq!(board.adjacent_count((0, 1)), 0);
        assert_eq!(board.mine_count(), 3);
        assert_eq!(board.safe_cell_count(), 6);
    }

    #[test]
    fn from_mine_coords_validates_input() {
        assert_eq!(
            Board::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords((2, 0)))
        );
        assert_eq!(
            Board::from_mine_coords((2, 2), &[]),
            Err(GameError::InvalidConfig(ConfigIssue::NoMines))
        );
        assert!(Board::from_mine_coords((1, 2), &[(0, 0), (0, 1)]).is_err());
    }

    #[test]
    fn duplicate_mine_coords_count_once() {
        let board = Board::from_mine_coords((2, 2), &[(0, 0), (0, 0)]).unwrap();
        assert_eq!(board.mine_count(), 1);
        assert_eq!(board.mine_coords(), [(0, 0)]);
    }

    #[test]
    fn new_board_has_exact_mine_count() {
        let board = Board::new(9, 9, 25, 7).unwrap();
        assert_eq!(board.mine_coords().len(), 25);
        assert_eq!(board.size(), (9, 9));
        assert!(Board::new(3, 3, 9, 7).is_err());
    }

    #[test]
    fn validate_coords_rejects_out_of_bounds() {
        let board = Board::from_mine_coords((2, 3), &[(0, 0)]).unwrap();
        assert_eq!(board.validate_coords((1, 2)), Ok((1, 2)));
        assert_eq!(
            board.validate_coords((2, 0)),
            Err(GameError::InvalidCoords((2, 0)))
        );
        assert_eq!(
            board.validate_coords((0, 3)),
            Err(GameError::InvalidCoords((0, 3)))
        );
    }

    #[test]
    fn only_no_change_has_no_update() {
        assert!(!RevealOutcome::NoChange.has_update());
        assert!(RevealOutcome::HitMine.has_update());
        assert!(!MarkOutcome::NoChange.has_update());
        assert!(MarkOutcome::Changed.has_update());
    }
}
