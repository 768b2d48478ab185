use thiserror::Error;

use crate::TurnPhase;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates are outside the board")]
    OutOfBounds,
    #[error("Card is already matched")]
    AlreadyMatched,
    #[error("Card is already revealed")]
    AlreadyRevealed,
    #[error("Board needs a non-zero, even number of cards")]
    InvalidDimensions,
    #[error("Card values must be 1..=pairs, each appearing exactly twice")]
    InvalidLayout,
    #[error("Operation not allowed while {0:?}")]
    WrongPhase(TurnPhase),
    #[error("Game already won, no new moves are accepted")]
    AlreadyEnded,
}

impl GameError {
    /// Selection errors the player can fix by picking another card.
    pub const fn is_recoverable(self) -> bool {
        matches!(
            self,
            Self::OutOfBounds | Self::AlreadyMatched | Self::AlreadyRevealed
        )
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
