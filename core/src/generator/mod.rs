use crate::*;
pub use shuffled::*;

mod shuffled;

pub trait BoardGenerator {
    fn generate(self, config: GameConfig) -> Board;
}
