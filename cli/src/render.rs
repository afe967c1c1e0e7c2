use std::io::{self, Write};

use mineboard_core::*;

/// Fixed three-character counter, as on the classic LCD displays.
pub fn format_for_counter(num: i64) -> String {
    match num {
        ..-99 => "-99".to_string(),
        // sign in the first column, two zero-padded digits
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

pub fn cell_glyph(view: CellView) -> char {
    use CellView::*;
    match view {
        Hidden => '#',
        Flagged => 'F',
        Open(None) => '.',
        Open(Some(hint)) => char::from(b'0' + hint),
        Mine => '*',
        Exploded => 'X',
        IncorrectFlag => 'x',
    }
}

fn face(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::InProgress => ":)",
        Outcome::Won => "B)",
        Outcome::Lost => "X(",
    }
}

/// Draws the counters and the grid, row numbers on the left and column
/// numbers on top.
pub fn render_game(game: &Game, out: &mut impl Write) -> io::Result<()> {
    let (rows, cols) = game.size();
    // over-flagging keeps the signed count in the game, the counter stops at zero
    let mines_left = format_for_counter(game.mines_left().max(0) as i64);
    let elapsed = format_for_counter(game.elapsed_secs().into());
    writeln!(out, "[{}]  {}  [{}]", mines_left, face(game.outcome()), elapsed)?;

    write!(out, "   ")?;
    for col in 0..cols {
        write!(out, "{:>3}", col)?;
    }
    writeln!(out)?;

    for row in 0..rows {
        write!(out, "{:>3}", row)?;
        for col in 0..cols {
            write!(out, "{:>3}", cell_glyph(game.cell_view((row, col))))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
