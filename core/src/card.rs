use serde::{Deserialize, Serialize};

use crate::CardValue;

/// A single card on the board.
///
/// `matched` is permanent, and a matched card always counts as revealed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    value: CardValue,
    revealed: bool,
    matched: bool,
}

impl Card {
    pub const fn new(value: CardValue) -> Self {
        Self {
            value,
            revealed: false,
            matched: false,
        }
    }

    pub const fn value(self) -> CardValue {
        self.value
    }

    pub const fn is_revealed(self) -> bool {
        self.revealed || self.matched
    }

    pub const fn is_matched(self) -> bool {
        self.matched
    }

    pub const fn face(self) -> CardFace {
        if self.matched {
            CardFace::Matched(self.value)
        } else if self.revealed {
            CardFace::Shown(self.value)
        } else {
            CardFace::Hidden
        }
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
    }

    pub(crate) fn mark_matched(&mut self) {
        self.revealed = true;
        self.matched = true;
    }

    /// Turns the card face down unless it has been matched.
    pub(crate) fn hide(&mut self) -> bool {
        if self.matched || !self.revealed {
            return false;
        }
        self.revealed = false;
        true
    }
}

/// What a player is allowed to see of a card.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardFace {
    Hidden,
    Shown(CardValue),
    Matched(CardValue),
}

impl CardFace {
    pub const fn value(self) -> Option<CardValue> {
        match self {
            Self::Hidden => None,
            Self::Shown(value) | Self::Matched(value) => Some(value),
        }
    }
}

impl Default for CardFace {
    fn default() -> Self {
        Self::Hidden
    }
}
