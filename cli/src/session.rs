use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use flipmatch_core::{CardValue, Coord2, FlipEngine, GameError, MatchOutcome};

use crate::input::{Console, InputError};
use crate::render::render_board;

/// One player's game from instructions to congratulations.
pub struct Session<R, W> {
    console: Console<R, W>,
    engine: FlipEngine,
    player: String,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(console: Console<R, W>, engine: FlipEngine, player: impl Into<String>) -> Self {
        Self {
            console,
            engine,
            player: player.into(),
        }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (Console<R, W>, FlipEngine) {
        (self.console, self.engine)
    }

    pub fn run(&mut self) -> Result<()> {
        self.intro()?;
        while !self.engine.is_won() {
            self.play_turn()?;
        }
        self.outro()
    }

    fn intro(&mut self) -> Result<()> {
        let (rows, cols) = self.engine.size();
        let pairs = self.engine.pairs();
        let console = &mut self.console;

        writeln!(console, "=== MEMORY GAME (Card Flip) ===")?;
        writeln!(console, "Welcome {}! Let's test your memory!\n", self.player)?;
        writeln!(console, "HOW TO PLAY:")?;
        writeln!(console, "1. You'll see a {rows}x{cols} grid of hidden cards (##)")?;
        writeln!(
            console,
            "2. Each card has a number from 1-{pairs} (each number appears twice)"
        )?;
        writeln!(console, "3. Flip 2 cards at a time by entering their row and column")?;
        writeln!(console, "4. If the cards match, they stay revealed")?;
        writeln!(console, "5. If they don't match, they get hidden again")?;
        writeln!(console, "6. Match all {pairs} pairs to win!")?;
        writeln!(
            console,
            "7. Enter row numbers (1-{rows}) and column numbers (1-{cols})\n"
        )?;
        console
            .wait_for_enter("Press Enter to start...")
            .context("waiting to start")?;
        console.clear_screen()?;

        writeln!(console, "Game started! Find all {pairs} pairs.")?;
        Ok(())
    }

    fn play_turn(&mut self) -> Result<()> {
        self.show_board()?;
        writeln!(
            self.console,
            "Matched pairs: {}/{}",
            self.engine.matched_pairs(),
            self.engine.pairs()
        )?;

        writeln!(self.console, "\nFirst card:")?;
        self.flip_card()?;
        self.show_board()?;

        writeln!(self.console, "Second card:")?;
        self.flip_card()?;
        self.show_board()?;

        match self.engine.evaluate_turn()? {
            MatchOutcome::Matched => {
                let value = self.matched_value();
                writeln!(self.console, "🎉 MATCH! You found a pair of {value}'s!")?;
            }
            MatchOutcome::NoMatch => {
                writeln!(self.console, "No match. Cards will be hidden again.")?;
                self.console
                    .wait_for_enter("Press Enter to continue...")
                    .context("waiting after a mismatch")?;
            }
        }
        self.engine.resolve_turn()?;

        writeln!(self.console)?;
        Ok(())
    }

    /// Re-prompts until the player names a card that can be flipped.
    fn flip_card(&mut self) -> Result<CardValue> {
        let size = self.engine.size();
        loop {
            let coords = match self.console.ask_coords(size) {
                Ok(coords) => coords,
                Err(InputError::Malformed(answer)) => {
                    log::debug!("Malformed input {:?}", answer);
                    writeln!(self.console, "Invalid input! Please enter a number.")?;
                    continue;
                }
                Err(err) => return Err(err).context("reading a card selection"),
            };

            let selected = coords
                .to_board_coords()
                .ok_or(GameError::OutOfBounds)
                .and_then(|coords| self.engine.select_card(coords));
            match selected {
                Ok(value) => {
                    writeln!(self.console, "You flipped: {value}")?;
                    return Ok(value);
                }
                Err(err) if err.is_recoverable() => {
                    log::debug!("Rejected {:?}: {}", coords, err);
                    writeln!(self.console, "{}", rejection_message(err, size))?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn matched_value(&self) -> CardValue {
        self.engine
            .selection()
            .first()
            .map(|&coords| self.engine.board().card_at(coords).value())
            .unwrap_or_default()
    }

    fn show_board(&mut self) -> Result<()> {
        let board = render_board(self.engine.board());
        write!(self.console, "{board}")?;
        Ok(())
    }

    fn outro(&mut self) -> Result<()> {
        self.console.clear_screen()?;
        self.show_board()?;
        writeln!(self.console, "🎊 CONGRATULATIONS! 🎊")?;
        writeln!(
            self.console,
            "You've matched {}/{} pairs and won the game!",
            self.engine.matched_pairs(),
            self.engine.pairs()
        )?;
        writeln!(self.console, "Thanks for playing, {}!", self.player)?;
        self.console.flush()?;
        Ok(())
    }
}

fn rejection_message(err: GameError, (rows, cols): Coord2) -> String {
    match err {
        GameError::OutOfBounds if rows == cols => {
            format!("Invalid input! Please enter numbers between 1 and {rows}.")
        }
        GameError::OutOfBounds => format!(
            "Invalid input! Please enter a row between 1 and {rows} and a column between 1 and {cols}."
        ),
        GameError::AlreadyMatched => "This card is already matched! Choose another card.".into(),
        GameError::AlreadyRevealed => "This card is already flipped! Choose another card.".into(),
        other => other.to_string(),
    }
}
