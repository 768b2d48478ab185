use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use flipmatch_core::{Coord, Coord2};
use thiserror::Error;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Expected a number, got {0:?}")]
    Malformed(String),
    #[error("Input closed before the game ended")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Row and column as typed by the player, 1-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HumanCoords {
    pub row: i64,
    pub col: i64,
}

impl HumanCoords {
    /// Zero-based board coordinates, `None` when the numbers cannot address any card.
    pub fn to_board_coords(self) -> Option<Coord2> {
        let row = Coord::try_from(self.row.checked_sub(1)?).ok()?;
        let col = Coord::try_from(self.col.checked_sub(1)?).ok()?;
        Some((row, col))
    }
}

/// Terminal console: prompts and board go to `output`, answers come from `input`.
///
/// Answers are whitespace separated, so several may be typed on one line.
pub struct Console<R, W> {
    input: R,
    output: W,
    pending: VecDeque<String>,
    clear_screen: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            pending: VecDeque::new(),
            clear_screen: true,
        }
    }

    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String, InputError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputError::Closed);
        }
        Ok(line)
    }

    /// Reads the next answer, only waiting for a new line when none is left over.
    pub fn ask_number(&mut self, prompt: &str) -> Result<i64, InputError> {
        write!(self.output, "{prompt}")?;
        if self.pending.is_empty() {
            let line = self.read_line()?;
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }

        let answer = self.pending.pop_front().unwrap_or_default();
        match answer.parse() {
            Ok(number) => Ok(number),
            Err(_) => {
                // rest of a bad line is dropped
                self.pending.clear();
                Err(InputError::Malformed(answer))
            }
        }
    }

    /// Asks for a row, then a column. Range checks are left to the game.
    pub fn ask_coords(&mut self, (rows, cols): Coord2) -> Result<HumanCoords, InputError> {
        let row = self.ask_number(&format!("Enter row (1-{rows}): "))?;
        let col = self.ask_number(&format!("Enter column (1-{cols}): "))?;
        log::trace!("Read row {} column {}", row, col);
        Ok(HumanCoords { row, col })
    }

    pub fn wait_for_enter(&mut self, prompt: &str) -> Result<(), InputError> {
        self.pending.clear();
        write!(self.output, "{prompt}")?;
        self.read_line().map(|_| ())
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        if self.clear_screen {
            write!(self.output, "{CLEAR_SCREEN}")?;
        }
        Ok(())
    }
}

impl<R, W: Write> Write for Console<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
