use super::*;

/// Generation strategy that deals every pair in a uniformly random arrangement.
///
/// The same seed always deals the same board.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffledBoardGenerator {
    seed: u64,
}

impl ShuffledBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl BoardGenerator for ShuffledBoardGenerator {
    fn generate(self, config: GameConfig) -> Board {
        use rand::prelude::*;

        let pairs = config.pairs();
        let mut values: Vec<CardValue> = (1..=pairs).flat_map(|value| [value, value]).collect();

        // Fisher-Yates, walking from the last position down
        let mut rng = SmallRng::seed_from_u64(self.seed);
        for i in (1..values.len()).rev() {
            let j = rng.random_range(0..=i);
            values.swap(i, j);
        }
        log::trace!("Shuffled {} cards with seed {}: {:?}", values.len(), self.seed, values);

        // pairs are built from the config itself, so only bad dimensions can fail here
        Board::from_values(config.size(), &values).unwrap_or_else(|err| {
            log::warn!(
                "Cannot deal a {:?} board ({}), dealing the default size instead",
                config.size(),
                err
            );
            ShuffledBoardGenerator::new(self.seed).generate(GameConfig::DEFAULT)
        })
    }
}
