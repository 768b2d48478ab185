use core::num::Saturating;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - AwaitingFirstSelection -> AwaitingSecondSelection
/// - AwaitingSecondSelection -> EvaluatingTurn
/// - EvaluatingTurn -> AwaitingFirstSelection
/// - EvaluatingTurn -> Won
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    AwaitingFirstSelection,
    AwaitingSecondSelection,
    EvaluatingTurn,
    Won,
}

impl TurnPhase {
    pub const fn is_selecting(self) -> bool {
        matches!(
            self,
            Self::AwaitingFirstSelection | Self::AwaitingSecondSelection
        )
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won)
    }
}

impl Default for TurnPhase {
    fn default() -> Self {
        Self::AwaitingFirstSelection
    }
}

/// Cards flipped during the current turn, at most two.
pub type Selection = SmallVec<[Coord2; 2]>;

/// Drives one game: two flips per turn, evaluated, then resolved.
///
/// Only serialized as a snapshot, a game always starts from [`FlipEngine::new`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlipEngine {
    board: Board,
    selection: Selection,
    matched_pairs: Saturating<CellCount>,
    phase: TurnPhase,
    pending_outcome: Option<MatchOutcome>,
}

impl FlipEngine {
    /// Starts a turn cycle on `board`, counting pairs it already has matched.
    pub fn new(board: Board) -> Self {
        let matched_pairs = board.matched_pairs();
        let phase = if matched_pairs == board.pairs() {
            TurnPhase::Won
        } else {
            TurnPhase::AwaitingFirstSelection
        };
        Self {
            board,
            selection: SmallVec::new(),
            matched_pairs: Saturating(matched_pairs),
            phase,
            pending_outcome: None,
        }
    }

    /// Deals a fresh shuffled board for `config` and starts a game on it.
    pub fn deal(config: GameConfig, seed: u64) -> Self {
        let board = ShuffledBoardGenerator::new(seed).generate(config);
        log::info!(
            "Dealt a {}x{} board with {} pairs (seed {})",
            board.rows(),
            board.cols(),
            board.pairs(),
            seed
        );
        Self::new(board)
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn selection(&self) -> &[Coord2] {
        &self.selection
    }

    pub fn matched_pairs(&self) -> CellCount {
        self.matched_pairs.0
    }

    pub fn pairs(&self) -> CellCount {
        self.board.pairs()
    }

    pub fn is_won(&self) -> bool {
        self.matched_pairs.0 == self.board.pairs()
    }

    /// Outcome of the evaluated turn that has not been resolved yet.
    pub fn last_outcome(&self) -> Option<MatchOutcome> {
        self.pending_outcome
    }

    /// Flips the card at `coords` face up and returns its value.
    pub fn select_card(&mut self, coords: Coord2) -> Result<CardValue> {
        let coords = self.board.validate_coords(coords)?;
        self.check_selecting()?;

        let card = self.board[coords];
        if card.is_matched() {
            return Err(GameError::AlreadyMatched);
        }
        if card.is_revealed() {
            return Err(GameError::AlreadyRevealed);
        }

        self.board.card_mut(coords).reveal();
        self.selection.push(coords);
        self.phase = match self.phase {
            TurnPhase::AwaitingFirstSelection => TurnPhase::AwaitingSecondSelection,
            _ => TurnPhase::EvaluatingTurn,
        };
        log::debug!("Flipped {:?}: {}, now {:?}", coords, card.value(), self.phase);

        Ok(card.value())
    }

    /// Compares the two flipped cards, marking them matched when equal.
    ///
    /// Calling it again before [`FlipEngine::resolve_turn`] returns the same outcome.
    pub fn evaluate_turn(&mut self) -> Result<MatchOutcome> {
        if self.phase != TurnPhase::EvaluatingTurn {
            return Err(GameError::WrongPhase(self.phase));
        }
        if let Some(outcome) = self.pending_outcome {
            return Ok(outcome);
        }

        let &[first, second] = self.selection.as_slice() else {
            return Err(GameError::WrongPhase(self.phase));
        };

        let outcome = if self.board[first].value() == self.board[second].value() {
            self.board.card_mut(first).mark_matched();
            self.board.card_mut(second).mark_matched();
            self.matched_pairs += 1;
            MatchOutcome::Matched
        } else {
            MatchOutcome::NoMatch
        };
        log::debug!(
            "Evaluated {:?} and {:?}: {:?}, {}/{} pairs",
            first,
            second,
            outcome,
            self.matched_pairs.0,
            self.board.pairs()
        );

        self.pending_outcome = Some(outcome);
        Ok(outcome)
    }

    /// Ends the evaluated turn: hides a failed pair and clears the selection.
    pub fn resolve_turn(&mut self) -> Result<TurnPhase> {
        let Some(outcome) = self.pending_outcome.take() else {
            return Err(GameError::WrongPhase(self.phase));
        };

        // hides every face-up unmatched card, which is exactly this turn's pair
        if !outcome.is_match() {
            let hidden = self.board.hide_unmatched();
            log::trace!("Hid {} unmatched cards", hidden);
        }
        self.selection.clear();

        self.phase = if self.is_won() {
            log::info!("All {} pairs matched", self.matched_pairs.0);
            TurnPhase::Won
        } else {
            TurnPhase::AwaitingFirstSelection
        };
        Ok(self.phase)
    }

    fn check_selecting(&self) -> Result<()> {
        match self.phase {
            TurnPhase::Won => Err(GameError::AlreadyEnded),
            phase if phase.is_selecting() => Ok(()),
            phase => Err(GameError::WrongPhase(phase)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: [CardValue; 16] = [5, 5, 1, 2, 3, 1, 2, 4, 6, 7, 8, 3, 4, 6, 7, 8];

    fn engine() -> FlipEngine {
        FlipEngine::new(Board::from_values((4, 4), &LAYOUT).unwrap())
    }

    fn positions_of(board: &Board, value: CardValue) -> (Coord2, Coord2) {
        let mut found = board
            .iter_cards()
            .filter(|(_, card)| card.value() == value)
            .map(|(coords, _)| coords);
        (found.next().unwrap(), found.next().unwrap())
    }

    fn play_turn(engine: &mut FlipEngine, first: Coord2, second: Coord2) -> MatchOutcome {
        engine.select_card(first).unwrap();
        engine.select_card(second).unwrap();
        let outcome = engine.evaluate_turn().unwrap();
        engine.resolve_turn().unwrap();
        outcome
    }

    #[test]
    fn matching_pair_stays_revealed() {
        let mut engine = engine();

        assert_eq!(engine.select_card((0, 0)), Ok(5));
        assert_eq!(engine.phase(), TurnPhase::AwaitingSecondSelection);
        assert_eq!(engine.select_card((0, 1)), Ok(5));
        assert_eq!(engine.phase(), TurnPhase::EvaluatingTurn);

        assert_eq!(engine.evaluate_turn(), Ok(MatchOutcome::Matched));
        assert_eq!(engine.matched_pairs(), 1);

        assert_eq!(engine.resolve_turn(), Ok(TurnPhase::AwaitingFirstSelection));
        for coords in [(0, 0), (0, 1)] {
            let card = engine.board().card_at(coords);
            assert!(card.is_revealed());
            assert!(card.is_matched());
        }
        assert!(engine.selection().is_empty());
        assert!(!engine.is_won());
    }

    #[test]
    fn mismatched_pair_is_hidden_on_resolve() {
        let mut engine = engine();

        engine.select_card((0, 0)).unwrap();
        engine.select_card((1, 0)).unwrap();
        assert_eq!(engine.evaluate_turn(), Ok(MatchOutcome::NoMatch));

        // still visible until resolved
        assert_eq!(engine.board().face_at((0, 0)), CardFace::Shown(5));
        assert_eq!(engine.board().face_at((1, 0)), CardFace::Shown(3));

        assert_eq!(engine.resolve_turn(), Ok(TurnPhase::AwaitingFirstSelection));
        assert_eq!(engine.board().face_at((0, 0)), CardFace::Hidden);
        assert_eq!(engine.board().face_at((1, 0)), CardFace::Hidden);
        assert_eq!(engine.matched_pairs(), 0);
        assert!(engine.selection().is_empty());
    }

    #[test]
    fn mismatch_keeps_earlier_matches_face_up() {
        let mut engine = engine();

        assert_eq!(play_turn(&mut engine, (0, 0), (0, 1)), MatchOutcome::Matched);
        assert_eq!(play_turn(&mut engine, (0, 2), (0, 3)), MatchOutcome::NoMatch);

        assert_eq!(engine.board().face_at((0, 0)), CardFace::Matched(5));
        assert_eq!(engine.board().face_at((0, 1)), CardFace::Matched(5));
        assert_eq!(engine.board().face_at((0, 2)), CardFace::Hidden);
        assert_eq!(engine.matched_pairs(), 1);
    }

    #[test]
    fn out_of_bounds_leaves_engine_untouched() {
        let mut engine = engine();
        let before = engine.clone();

        assert_eq!(engine.select_card((4, 0)), Err(GameError::OutOfBounds));
        assert_eq!(engine.select_card((0, 4)), Err(GameError::OutOfBounds));
        assert_eq!(engine, before);
        assert_eq!(engine.phase(), TurnPhase::AwaitingFirstSelection);
    }

    #[test]
    fn revealed_and_matched_cards_are_rejected() {
        let mut engine = engine();
        play_turn(&mut engine, (0, 0), (0, 1));

        let before = engine.clone();
        assert_eq!(engine.select_card((0, 0)), Err(GameError::AlreadyMatched));
        assert_eq!(engine, before);

        engine.select_card((1, 1)).unwrap();
        let before = engine.clone();
        assert_eq!(engine.select_card((1, 1)), Err(GameError::AlreadyRevealed));
        assert_eq!(engine, before);
        assert_eq!(engine.selection(), &[(1, 1)]);
        assert_eq!(engine.phase(), TurnPhase::AwaitingSecondSelection);
    }

    #[test]
    fn third_selection_waits_for_evaluation() {
        let mut engine = engine();
        engine.select_card((0, 0)).unwrap();
        engine.select_card((1, 0)).unwrap();

        let before = engine.clone();
        assert_eq!(
            engine.select_card((2, 2)),
            Err(GameError::WrongPhase(TurnPhase::EvaluatingTurn))
        );
        assert_eq!(engine, before);
        assert_eq!(engine.selection().len(), 2);
    }

    #[test]
    fn evaluate_and_resolve_require_the_right_phase() {
        let mut engine = engine();

        assert_eq!(
            engine.evaluate_turn(),
            Err(GameError::WrongPhase(TurnPhase::AwaitingFirstSelection))
        );
        assert_eq!(
            engine.resolve_turn(),
            Err(GameError::WrongPhase(TurnPhase::AwaitingFirstSelection))
        );

        engine.select_card((0, 0)).unwrap();
        engine.select_card((0, 1)).unwrap();
        assert_eq!(
            engine.resolve_turn(),
            Err(GameError::WrongPhase(TurnPhase::EvaluatingTurn))
        );
    }

    #[test]
    fn repeated_evaluation_does_not_double_count() {
        let mut engine = engine();
        engine.select_card((0, 0)).unwrap();
        engine.select_card((0, 1)).unwrap();

        assert_eq!(engine.evaluate_turn(), Ok(MatchOutcome::Matched));
        assert_eq!(engine.evaluate_turn(), Ok(MatchOutcome::Matched));
        assert_eq!(engine.matched_pairs(), 1);
        assert_eq!(engine.last_outcome(), Some(MatchOutcome::Matched));

        engine.resolve_turn().unwrap();
        assert_eq!(engine.last_outcome(), None);
    }

    #[test]
    fn matching_every_pair_wins() {
        let mut engine = engine();
        let mut previous = engine.matched_pairs();

        for value in 1..=engine.pairs() {
            let (first, second) = positions_of(engine.board(), value);
            assert!(!engine.is_won());
            assert_eq!(play_turn(&mut engine, first, second), MatchOutcome::Matched);

            assert!(engine.matched_pairs() > previous);
            previous = engine.matched_pairs();
        }

        assert_eq!(engine.matched_pairs(), 8);
        assert!(engine.is_won());
        assert!(engine.is_won());
        assert_eq!(engine.phase(), TurnPhase::Won);
        assert!(engine.board().is_all_matched());
        assert_eq!(engine.select_card((0, 0)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn dealt_game_can_be_won() {
        let mut engine = FlipEngine::deal(GameConfig::new(2, 3).unwrap(), 99);

        for value in 1..=engine.pairs() {
            let (first, second) = positions_of(engine.board(), value);
            play_turn(&mut engine, first, second);
        }

        assert_eq!(engine.phase(), TurnPhase::Won);
        assert_eq!(engine.matched_pairs(), 3);
    }

    #[test]
    fn restored_board_keeps_its_matched_pairs() {
        let mut engine = FlipEngine::new(Board::from_values((2, 2), &[1, 2, 2, 1]).unwrap());
        play_turn(&mut engine, (0, 0), (1, 1));
        let json = serde_json::to_string(engine.board()).unwrap();

        let mut resumed = FlipEngine::new(serde_json::from_str(&json).unwrap());
        assert_eq!(resumed.matched_pairs(), 1);
        assert_eq!(resumed.phase(), TurnPhase::AwaitingFirstSelection);

        play_turn(&mut resumed, (0, 1), (1, 0));
        assert!(resumed.is_won());
        assert_eq!(resumed.phase(), TurnPhase::Won);

        let json = serde_json::to_string(resumed.board()).unwrap();
        let mut finished = FlipEngine::new(serde_json::from_str(&json).unwrap());
        assert_eq!(finished.phase(), TurnPhase::Won);
        assert_eq!(finished.select_card((0, 0)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn failed_selection_errors_are_recoverable() {
        assert!(GameError::OutOfBounds.is_recoverable());
        assert!(GameError::AlreadyMatched.is_recoverable());
        assert!(GameError::AlreadyRevealed.is_recoverable());
        assert!(!GameError::AlreadyEnded.is_recoverable());
    }
}
