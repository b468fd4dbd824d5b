//! Uniform random move selection, used both as the UR player and as the
//! playout policy inside tree searches.

use crate::connect4::{Board, Column, MoveScope, WIDTH};
use crate::game::Status;
use crate::report::{Event, Reporter, Verbosity};
use crate::search::SearchError;
use rand::Rng;

/// Picks one of the set bits of `mask` uniformly at random.
pub(crate) fn pick<R: Rng + ?Sized>(mask: u8, rng: &mut R) -> Option<Column> {
    let count = mask.count_ones();
    if count == 0 {
        return None;
    }

    let n = rng.gen_range(0..count) as usize;
    (0..WIDTH as Column).filter(|&col| mask & (1 << col) != 0).nth(n)
}

/// Uniformly selects one of the board's legal columns.
pub fn choose<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Result<Column, SearchError> {
    pick(board.legal_mask(), rng).ok_or(SearchError::NoLegalMove)
}

/// Plays uniform random moves until the game ends and returns the final
/// status. The moves stay applied to `scope` and are undone with it.
pub fn playout<R: Rng + ?Sized>(
    scope: &mut MoveScope<'_>,
    rng: &mut R,
    reporter: &mut dyn Reporter,
) -> Result<Status, SearchError> {
    let verbose = reporter.enabled(Verbosity::Verbose);
    loop {
        let col = choose(scope, rng)?;
        if verbose {
            reporter.report(&Event::MoveSelected { column: col });
        }

        let status = scope.play(col)?;
        if status.is_terminal() {
            if verbose {
                reporter.report(&Event::Terminal {
                    value: status.value(),
                });
            }
            return Ok(status);
        }
    }
}
