use alloc::collections::VecDeque;
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// `InProgress -> Won` and `InProgress -> Lost`, both terminal until a reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// End-of-game classification needed to draw a lost board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossReport {
    pub detonated: Coord2,
    /// Mines the player never flagged, excluding `detonated`.
    pub unflagged_mines: Vec<Coord2>,
    /// Flags sitting on safe cells.
    pub misflagged: Vec<Coord2>,
}

/// Handed out once, by the call that ends the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub config: GameConfig,
    pub outcome: Outcome,
    pub elapsed_secs: u32,
    /// Set when the win came from [`Game::force_win`].
    pub forced: bool,
}

/// Cells changed by a reveal, in the order they changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealEffect {
    pub outcome: RevealOutcome,
    pub changed: Vec<Coord2>,
    pub loss: Option<LossReport>,
    pub summary: Option<GameSummary>,
}

impl RevealEffect {
    pub fn is_empty(&self) -> bool {
        !self.outcome.has_update()
    }
}

/// Player-facing state of one game on top of an immutable [`Board`].
///
/// Every mutating call takes `&mut self`; when ticks and input arrive from
/// different threads the owner has to serialize them, e.g. behind a mutex.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Game {
    board: Board,
    cells: Array2<EngineCell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    outcome: Outcome,
    clock: Clock,
    triggered_mine: Option<Coord2>,
    forced: bool,
}

impl Game {
    pub fn new(board: Board) -> Self {
        let size = board.size();
        Self {
            board,
            cells: Array2::default(size.to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            outcome: Outcome::InProgress,
            clock: Clock::new(),
            triggered_mine: None,
            forced: false,
        }
    }

    pub fn random(config: GameConfig, seed: u64) -> Self {
        Self::new(RandomLayoutGenerator::new(seed).generate(config))
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> GameConfig {
        self.board.game_config()
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.board.mine_count()
    }

    /// Mines minus flags, negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        (self.board.mine_count() as isize) - (self.flagged_count as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.clock.elapsed_secs()
    }

    /// # Panics
    ///
    /// When `coords` is outside the board.
    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.cells[coords.to_nd_index()]
    }

    /// Render classification of a cell, mines stay hidden until the game ends.
    ///
    /// # Panics
    ///
    /// When `coords` is outside the board.
    pub fn cell_view(&self, coords: Coord2) -> CellView {
        use EngineCell::*;

        let finished = self.outcome.is_finished();
        let has_mine = self.board[coords];
        match self.cell_at(coords) {
            Revealed(adjacent) => CellView::open(adjacent),
            Hidden if finished && self.triggered_mine == Some(coords) => CellView::Exploded,
            Hidden if finished && has_mine => CellView::Mine,
            Hidden => CellView::Hidden,
            Flagged if finished && !has_mine => CellView::IncorrectFlag,
            Flagged => CellView::Flagged,
        }
    }

    /// Advances the clock by one second if it is running.
    pub fn tick(&mut self) {
        self.clock.tick();
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use EngineCell::*;
        use MarkOutcome::*;

        let coords = self.board.validate_coords(coords)?;
        if self.outcome.is_finished() {
            return Ok(NoChange);
        }

        Ok(match self.cells[coords.to_nd_index()] {
            Hidden => {
                self.cells[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                Changed
            }
            Flagged => {
                self.cells[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                Changed
            }
            Revealed(_) => NoChange,
        })
    }

    /// Reveals a hidden cell, cascading through zero-hint regions.
    ///
    /// Flagged or already revealed cells, and any call after the game ended,
    /// give an empty effect.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealEffect> {
        let coords = self.board.validate_coords(coords)?;

        if self.outcome.is_finished() || self.cell_at(coords) != EngineCell::Hidden {
            return Ok(RevealEffect::default());
        }

        self.clock.start();

        if self.board[coords] {
            return Ok(self.detonate(coords));
        }

        let mut changed = self.flood_reveal(coords);
        log::debug!(
            "Reveal at {:?} opened {} cells, {}/{} safe cells revealed",
            coords,
            changed.len(),
            self.revealed_count,
            self.board.safe_cell_count()
        );

        if self.revealed_count == self.board.safe_cell_count() {
            let summary = self.win(&mut changed);
            Ok(RevealEffect {
                outcome: RevealOutcome::Won,
                changed,
                loss: None,
                summary: Some(summary),
            })
        } else {
            Ok(RevealEffect {
                outcome: RevealOutcome::Revealed,
                changed,
                loss: None,
                summary: None,
            })
        }
    }

    /// Instant win shortcut: opens every safe cell and flags every mine.
    ///
    /// Flags on safe cells are cleared so the cell can open. The summary is
    /// marked as forced.
    pub fn force_win(&mut self) -> RevealEffect {
        if self.outcome.is_finished() {
            return RevealEffect::default();
        }

        self.forced = true;
        let mut changed = Vec::new();
        for coords in self.board.iter_coords() {
            if self.board[coords] {
                continue;
            }
            match self.cell_at(coords) {
                EngineCell::Revealed(_) => continue,
                EngineCell::Flagged => self.flagged_count -= 1,
                EngineCell::Hidden => {}
            }
            self.cells[coords.to_nd_index()] =
                EngineCell::Revealed(self.board.adjacent_count(coords));
            self.revealed_count += 1;
            changed.push(coords);
        }
        log::debug!("Forced win, opened {} cells", changed.len());

        let summary = self.win(&mut changed);
        RevealEffect {
            outcome: RevealOutcome::Won,
            changed,
            loss: None,
            summary: Some(summary),
        }
    }

    /// Starts over on `board`, which may have a different size or mine count.
    pub fn reset(&mut self, board: Board) {
        log::debug!(
            "Reset to {}x{} with {} mines",
            board.size().0,
            board.size().1,
            board.mine_count()
        );
        *self = Self::new(board);
    }

    /// Starts over with a fresh random layout, unspecified parameters keep
    /// their current value. On error the current game is left untouched.
    pub fn reset_with(
        &mut self,
        mines: Option<CellCount>,
        rows: Option<Coord>,
        cols: Option<Coord>,
        seed: u64,
    ) -> Result<()> {
        let current = self.config();
        let config = GameConfig::new(
            rows.unwrap_or(current.rows()),
            cols.unwrap_or(current.cols()),
            mines.unwrap_or(current.mines()),
        )?;
        self.reset(RandomLayoutGenerator::new(seed).generate(config));
        Ok(())
    }

    fn flood_reveal(&mut self, start: Coord2) -> Vec<Coord2> {
        let mut changed = Vec::new();
        let mut to_visit = VecDeque::from([start]);

        while let Some(visit_coords) = to_visit.pop_front() {
            // duplicates in the queue were opened by an earlier visit
            if self.cell_at(visit_coords) != EngineCell::Hidden || self.board[visit_coords] {
                continue;
            }

            let adjacent = self.board.adjacent_count(visit_coords);
            self.cells[visit_coords.to_nd_index()] = EngineCell::Revealed(adjacent);
            self.revealed_count += 1;
            changed.push(visit_coords);
            log::trace!("Flood opened {:?}, hint {}", visit_coords, adjacent);

            if adjacent == 0 {
                to_visit.extend(
                    self.board
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| self.cells[pos.to_nd_index()] == EngineCell::Hidden),
                );
            }
        }

        changed
    }

    fn detonate(&mut self, coords: Coord2) -> RevealEffect {
        self.triggered_mine = Some(coords);
        let summary = self.end_game(Outcome::Lost);

        let mut unflagged_mines = Vec::new();
        let mut misflagged = Vec::new();
        for pos in self.board.iter_coords() {
            match (self.cell_at(pos), self.board[pos]) {
                (EngineCell::Hidden, true) if pos != coords => unflagged_mines.push(pos),
                (EngineCell::Flagged, false) => misflagged.push(pos),
                _ => {}
            }
        }

        let mut changed = Vec::with_capacity(1 + unflagged_mines.len() + misflagged.len());
        changed.push(coords);
        changed.extend_from_slice(&unflagged_mines);
        changed.extend_from_slice(&misflagged);

        RevealEffect {
            outcome: RevealOutcome::HitMine,
            changed,
            loss: Some(LossReport {
                detonated: coords,
                unflagged_mines,
                misflagged,
            }),
            summary: Some(summary),
        }
    }

    /// Flags every remaining mine, leaving no flags to place.
    fn win(&mut self, changed: &mut Vec<Coord2>) -> GameSummary {
        for coords in self.board.iter_coords() {
            if self.board[coords] && self.cell_at(coords) == EngineCell::Hidden {
                self.cells[coords.to_nd_index()] = EngineCell::Flagged;
                self.flagged_count += 1;
                changed.push(coords);
            }
        }
        self.end_game(Outcome::Won)
    }

    fn end_game(&mut self, outcome: Outcome) -> GameSummary {
        self.outcome = outcome;
        self.clock.stop();
        log::debug!(
            "Game ended {:?} after {}s",
            outcome,
            self.clock.elapsed_secs()
        );
        GameSummary {
            config: self.config(),
            outcome,
            elapsed_secs: self.clock.elapsed_secs(),
            forced: self.forced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn game(size: Coord2, mines: &[Coord2]) -> Game {
        Game::new(Board::from_mine_coords(size, mines).unwrap())
    }

    /// ```text
    /// . . . . .
    /// . . . . .
    /// . . . * *
    /// . . * . *
    /// * . . . *
    /// ```
    fn five_by_five() -> Game {
        game((5, 5), &[(2, 3), (2, 4), (3, 2), (3, 4), (4, 0), (4, 4)])
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_cell() {
        let mut game = game((2, 2), &[(0, 0)]);

        let effect = game.reveal((0, 0)).unwrap();

        assert_eq!(effect.outcome, RevealOutcome::HitMine);
        assert_eq!(game.outcome(), Outcome::Lost);
        assert_eq!(game.triggered_mine(), Some((0, 0)));
        assert!(!game.clock().is_running());
        assert_eq!(game.cell_view((0, 0)), CellView::Exploded);
    }

    #[test]
    fn loss_reports_unflagged_mines_and_misflags() {
        let mut game = game((3, 3), &[(0, 0), (2, 0), (2, 2)]);
        game.toggle_flag((2, 2)).unwrap();
        game.toggle_flag((0, 1)).unwrap();

        let effect = game.reveal((0, 0)).unwrap();

        let loss = effect.loss.unwrap();
        assert_eq!(loss.detonated, (0, 0));
        assert_eq!(loss.unflagged_mines, vec![(2, 0)]);
        assert_eq!(loss.misflagged, vec![(0, 1)]);
        assert_eq!(effect.changed, vec![(0, 0), (2, 0), (0, 1)]);

        assert_eq!(game.cell_view((2, 0)), CellView::Mine);
        assert_eq!(game.cell_view((0, 1)), CellView::IncorrectFlag);
        assert_eq!(game.cell_view((2, 2)), CellView::Flagged);
        assert_eq!(game.cell_view((1, 1)), CellView::Hidden);
        assert_eq!(game.mines_left(), 1);
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut game = game((3, 3), &[(2, 2)]);

        let effect = game.reveal((0, 0)).unwrap();

        assert_eq!(effect.outcome, RevealOutcome::Won);
        assert_eq!(game.cell_at((0, 0)), EngineCell::Revealed(0));
        assert_eq!(game.cell_at((1, 1)), EngineCell::Revealed(1));
        assert_eq!(game.cell_at((2, 2)), EngineCell::Flagged);
        assert_eq!(game.cell_view((0, 0)), CellView::Open(None));
        assert_eq!(game.cell_view((1, 1)), CellView::Open(Some(1)));
        // eight safe cells plus the auto-flagged mine
        assert_eq!(effect.changed.len(), 9);
        assert_eq!(game.mines_left(), 0);
    }

    #[test]
    fn corner_cascade_stops_at_hints() {
        let mut game = five_by_five();

        let effect = game.reveal((0, 0)).unwrap();

        assert_eq!(effect.outcome, RevealOutcome::Revealed);
        assert_eq!(game.outcome(), Outcome::InProgress);
        assert_eq!(game.revealed_count(), 15);
        assert_eq!(effect.changed.len(), 15);
        assert_eq!(game.cell_at((1, 3)), EngineCell::Revealed(2));
        assert_eq!(game.cell_at((3, 1)), EngineCell::Revealed(2));
        for hidden in [(3, 3), (4, 1), (4, 2), (4, 3)] {
            assert_eq!(game.cell_at(hidden), EngineCell::Hidden);
        }
        for mine in game.board().mine_coords() {
            assert_eq!(game.cell_at(mine), EngineCell::Hidden);
        }
    }

    #[test]
    fn revealing_last_safe_cell_wins() {
        let mut game = five_by_five();
        game.reveal((0, 0)).unwrap();

        for coords in [(4, 3), (3, 3), (4, 1)] {
            let effect = game.reveal(coords).unwrap();
            assert_eq!(effect.outcome, RevealOutcome::Revealed);
            assert_eq!(effect.changed, vec![coords]);
            assert!(effect.summary.is_none());
        }

        let effect = game.reveal((4, 2)).unwrap();
        assert_eq!(effect.outcome, RevealOutcome::Won);
        assert_eq!(game.outcome(), Outcome::Won);
        assert_eq!(game.mines_left(), 0);
        for mine in game.board().mine_coords() {
            assert_eq!(game.cell_view(mine), CellView::Flagged);
        }
        let summary = effect.summary.unwrap();
        assert_eq!(summary.outcome, Outcome::Won);
        assert!(!summary.forced);
        assert_eq!(summary.config, game.config());
    }

    #[test]
    fn flood_skips_flagged_cells() {
        let mut game = game((3, 3), &[(2, 2)]);
        game.toggle_flag((0, 2)).unwrap();

        let effect = game.reveal((0, 0)).unwrap();

        assert_eq!(effect.outcome, RevealOutcome::Revealed);
        assert_eq!(game.revealed_count(), 7);
        assert_eq!(game.cell_at((0, 2)), EngineCell::Flagged);

        // a flag has to be cleared before the cell can open
        assert!(game.reveal((0, 2)).unwrap().is_empty());
        game.toggle_flag((0, 2)).unwrap();
        assert_eq!(game.reveal((0, 2)).unwrap().outcome, RevealOutcome::Won);
    }

    #[test]
    fn toggle_flag_is_its_own_inverse() {
        let mut game = five_by_five();
        let before = game.clone();

        assert_eq!(game.toggle_flag((1, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(game.mines_left(), 5);
        assert_eq!(game.toggle_flag((1, 1)).unwrap(), MarkOutcome::Changed);

        assert_eq!(game, before);
    }

    #[test]
    fn over_flagging_goes_negative() {
        let mut game = game((2, 2), &[(0, 0)]);
        for coords in [(0, 0), (0, 1), (1, 0)] {
            game.toggle_flag(coords).unwrap();
        }
        assert_eq!(game.mines_left(), -2);

        game.toggle_flag((1, 0)).unwrap();
        assert_eq!(game.mines_left(), -1);
    }

    #[test]
    fn flagging_revealed_cell_is_no_change() {
        let mut game = five_by_five();
        game.reveal((4, 2)).unwrap();

        assert_eq!(game.toggle_flag((4, 2)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(game.mines_left(), 6);
    }

    #[test]
    fn repeated_reveal_is_no_op() {
        let mut game = five_by_five();
        game.reveal((4, 2)).unwrap();

        let effect = game.reveal((4, 2)).unwrap();
        assert_eq!(effect, RevealEffect::default());
        assert_eq!(game.revealed_count(), 1);
    }

    #[test]
    fn lost_game_ignores_moves() {
        let mut game = five_by_five();
        game.reveal((2, 3)).unwrap();
        let after_loss = game.clone();

        assert!(game.reveal((0, 0)).unwrap().is_empty());
        assert_eq!(game.toggle_flag((0, 0)).unwrap(), MarkOutcome::NoChange);
        assert!(game.force_win().is_empty());
        assert_eq!(game, after_loss);
    }

    #[test]
    fn won_game_ignores_moves() {
        let mut game = five_by_five();
        for coords in [(0, 0), (4, 3), (3, 3), (4, 1), (4, 2)] {
            game.reveal(coords).unwrap();
        }
        assert_eq!(game.outcome(), Outcome::Won);
        let after_win = game.clone();

        // every mine is auto-flagged, unflagging one would bump the counter
        assert_eq!(game.toggle_flag((2, 3)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(game.cell_at((2, 3)), EngineCell::Flagged);
        assert!(game.reveal((2, 3)).unwrap().is_empty());
        assert_eq!(game.toggle_flag((0, 0)).unwrap(), MarkOutcome::NoChange);
        assert!(game.force_win().is_empty());

        assert_eq!(game.mines_left(), 0);
        assert_eq!(game, after_win);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut game = five_by_five();
        assert_eq!(game.reveal((5, 0)), Err(GameError::InvalidCoords((5, 0))));
        assert_eq!(
            game.toggle_flag((0, 5)),
            Err(GameError::InvalidCoords((0, 5)))
        );
    }

    #[test]
    fn clock_starts_on_first_reveal_only() {
        let mut game = five_by_five();

        game.tick();
        game.toggle_flag((0, 0)).unwrap();
        game.tick();
        assert!(!game.clock().is_running());
        assert_eq!(game.elapsed_secs(), 0);

        // a no-op reveal on a flag does not start the clock either
        game.reveal((0, 0)).unwrap();
        assert!(!game.clock().is_running());

        game.reveal((4, 2)).unwrap();
        game.tick();
        game.tick();
        assert_eq!(game.elapsed_secs(), 2);

        let effect = game.reveal((4, 4)).unwrap();
        assert_eq!(effect.summary.unwrap().elapsed_secs, 2);
        game.tick();
        assert_eq!(game.elapsed_secs(), 2);
    }

    #[test]
    fn force_win_clears_misflags_and_flags_mines() {
        let mut game = game((3, 3), &[(1, 1)]);
        game.toggle_flag((0, 0)).unwrap();

        let effect = game.force_win();

        assert_eq!(effect.outcome, RevealOutcome::Won);
        assert!(effect.summary.unwrap().forced);
        assert_eq!(game.cell_at((0, 0)), EngineCell::Revealed(1));
        assert_eq!(game.cell_at((1, 1)), EngineCell::Flagged);
        assert_eq!(game.revealed_count(), 8);
        assert_eq!(game.mines_left(), 0);
        assert_eq!(effect.changed.len(), 9);
    }

    #[test]
    fn reset_starts_a_fresh_game() {
        let mut game = five_by_five();
        game.toggle_flag((0, 0)).unwrap();
        game.reveal((4, 2)).unwrap();
        game.tick();
        game.reveal((2, 3)).unwrap();

        game.reset(Board::from_mine_coords((2, 3), &[(1, 2)]).unwrap());

        assert_eq!(game.outcome(), Outcome::InProgress);
        assert_eq!(game.size(), (2, 3));
        assert_eq!(game.mines_left(), 1);
        assert_eq!(game.revealed_count(), 0);
        assert_eq!(game.elapsed_secs(), 0);
        assert!(!game.clock().is_running());
        assert_eq!(game.triggered_mine(), None);
        assert_eq!(game.cell_at((0, 0)), EngineCell::Hidden);
    }

    #[test]
    fn reset_with_keeps_unspecified_parameters() {
        let mut game = five_by_five();

        game.reset_with(Some(10), None, Some(8), 3).unwrap();
        assert_eq!(game.size(), (5, 8));
        assert_eq!(game.total_mines(), 10);
        assert_eq!(game.mines_left(), 10);

        game.reset_with(None, None, None, 4).unwrap();
        assert_eq!(game.config(), GameConfig::new(5, 8, 10).unwrap());
    }

    #[test]
    fn reset_with_invalid_config_keeps_game() {
        let mut game = five_by_five();
        game.reveal((4, 2)).unwrap();
        let before = game.clone();

        let err = game.reset_with(Some(25), None, None, 0).unwrap_err();

        assert!(matches!(err, GameError::InvalidConfig(_)));
        assert_eq!(game, before);
    }

    #[test]
    fn single_safe_cell_wins_immediately() {
        let mut game = game((1, 2), &[(0, 0)]);

        let effect = game.reveal((0, 1)).unwrap();

        assert_eq!(effect.outcome, RevealOutcome::Won);
        assert_eq!(effect.changed, vec![(0, 1), (0, 0)]);
        assert_eq!(game.cell_view((0, 1)), CellView::Open(Some(1)));
    }
}
