use ndarray::Array2;
use rand::prelude::*;

use super::*;

/// Purely random placement, each cell is equally likely to hold a mine.
///
/// No first-reveal safety: the opening move may land on a mine.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> Board {
        let mut mines: Array2<bool> = Array2::default(config.size().to_nd_index());
        let mut free_cells = config.total_cells();
        let mut mines_placed: CellCount = 0;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        for cell in mines.iter_mut() {
            if mines_placed == config.mines() {
                break;
            }
            // selection sampling: keep the cell with probability needed / remaining
            let needed = config.mines() - mines_placed;
            if rng.random_range(0..free_cells) < needed {
                *cell = true;
                mines_placed += 1;
            }
            free_cells -= 1;
        }

        log::debug!(
            "Placed {} mines on {}x{} board (seed {})",
            mines_placed,
            config.rows(),
            config.cols(),
            self.seed
        );
        Board::from_mine_mask(mines, mines_placed)
    }
}
