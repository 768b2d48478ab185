use std::fmt::Write;

use flipmatch_core::Board;

const HIDDEN: &str = "##";

/// Draws the board with 1-based row and column headers, face-down cards masked.
pub fn render_board(board: &Board) -> String {
    let (rows, cols) = board.size();
    let mut out = String::from("\n    ");

    for col in 1..=u16::from(cols) {
        let _ = write!(out, "  {col} ");
    }
    out.push('\n');

    for row in 0..rows {
        let _ = write!(out, " {}  ", u16::from(row) + 1);
        for col in 0..cols {
            match board.face_at((row, col)).value() {
                Some(value) => {
                    let _ = write!(out, " {value:2} ");
                }
                None => {
                    let _ = write!(out, " {HIDDEN} ");
                }
            }
        }
        out.push('\n');
    }
    out.push('\n');
    out
}
