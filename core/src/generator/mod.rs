use crate::*;
pub use random::*;

mod random;

/// Strategy that turns a validated config into a concrete mine layout.
pub trait LayoutGenerator {
    fn generate(self, config: GameConfig) -> Board;
}
