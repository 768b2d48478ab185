#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use hashbrown::HashMap;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod card;
mod engine;
mod error;
mod generator;
mod types;

/// Board dimensions, only constructible with an even, non-zero card count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameConfig {
    size: Coord2,
}

impl GameConfig {
    /// The classic 4x4 board with 8 pairs.
    pub const DEFAULT: Self = Self::new_unchecked((4, 4));

    pub(crate) const fn new_unchecked(size: Coord2) -> Self {
        Self { size }
    }

    pub fn new(rows: Coord, cols: Coord) -> Result<Self> {
        let total = mult(rows, cols);
        if total == 0 || total % 2 != 0 {
            return Err(GameError::InvalidDimensions);
        }
        Ok(Self::new_unchecked((rows, cols)))
    }

    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub const fn total_cards(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn pairs(&self) -> CellCount {
        self.total_cards() / 2
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Grid of cards, indexed `(row, col)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr")]
pub struct Board {
    cards: Array2<Card>,
}

/// Unchecked wire form of [`Board`].
#[derive(Deserialize)]
struct BoardRepr {
    cards: Array2<Card>,
}

impl TryFrom<BoardRepr> for Board {
    type Error = GameError;

    fn try_from(BoardRepr { cards }: BoardRepr) -> Result<Self> {
        let (rows, cols) = cards.dim();
        let size = (
            Coord::try_from(rows).map_err(|_| GameError::InvalidDimensions)?,
            Coord::try_from(cols).map_err(|_| GameError::InvalidDimensions)?,
        );
        let values: Vec<CardValue> = cards.iter().map(|card| card.value()).collect();
        Board::from_values(size, &values)?;

        // a pair is matched together or not at all
        let mut matched: HashMap<CardValue, u8> = HashMap::new();
        for card in cards.iter().filter(|card| card.is_matched()) {
            *matched.entry(card.value()).or_default() += 1;
        }
        if matched.values().any(|&count| count != 2) {
            return Err(GameError::InvalidLayout);
        }

        Ok(Self { cards })
    }
}

impl Board {
    /// Lays `values` out row-major, all cards face down.
    ///
    /// Every value in `1..=pairs` must appear exactly twice.
    pub fn from_values(size: Coord2, values: &[CardValue]) -> Result<Self> {
        let config = GameConfig::new(size.0, size.1)?;
        if values.len() != usize::from(config.total_cards()) {
            return Err(GameError::InvalidDimensions);
        }

        let mut counts: HashMap<CardValue, u8> = HashMap::with_capacity(config.pairs().into());
        for &value in values {
            if value == 0 || value > config.pairs() {
                return Err(GameError::InvalidLayout);
            }
            let count = counts.entry(value).or_default();
            *count += 1;
            if *count > 2 {
                return Err(GameError::InvalidLayout);
            }
        }

        let cols = usize::from(size.1);
        let cards = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            Card::new(values[row * cols + col])
        });
        Ok(Self { cards })
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cards.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size())
    }

    pub fn total_cards(&self) -> CellCount {
        self.cards.len().try_into().unwrap()
    }

    pub fn pairs(&self) -> CellCount {
        self.total_cards() / 2
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn card_at(&self, coords: Coord2) -> Card {
        self[coords]
    }

    pub fn face_at(&self, coords: Coord2) -> CardFace {
        self[coords].face()
    }

    /// Card values in row-major order, regardless of whether they are revealed.
    pub fn values(&self) -> Vec<CardValue> {
        self.cards.iter().map(|card| card.value()).collect()
    }

    pub fn iter_cards(&self) -> impl Iterator<Item = (Coord2, Card)> + '_ {
        iter_coords(self.size()).map(|coords| (coords, self[coords]))
    }

    pub fn matched_pairs(&self) -> CellCount {
        let matched = self.cards.iter().filter(|card| card.is_matched()).count();
        (matched / 2).try_into().unwrap()
    }

    pub fn is_all_matched(&self) -> bool {
        self.cards.iter().all(|card| card.is_matched())
    }

    pub(crate) fn card_mut(&mut self, coords: Coord2) -> &mut Card {
        &mut self.cards[coords.to_nd_index()]
    }

    /// Turns every revealed card that is not matched back face down, returns how many flipped.
    pub(crate) fn hide_unmatched(&mut self) -> CellCount {
        let mut hidden = 0;
        for card in self.cards.iter_mut() {
            if card.hide() {
                hidden += 1;
            }
        }
        hidden
    }
}

impl Index<Coord2> for Board {
    type Output = Card;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cards[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Matched,
    NoMatch,
}

impl MatchOutcome {
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Matched)
    }
}
