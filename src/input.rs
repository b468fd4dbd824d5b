//! Board files.
//!
//! ```text
//! UCT          algorithm: UR, PMCGS or UCT
//! Y            player to move: R or Y
//! OOOOOOO      six rows of O (empty), R or Y, top row first
//! OOOOOOO
//! OOOOOOO
//! OOOOOOO
//! OOYOOOO
//! ORRYOOO
//! ```

use crate::connect4::{Board, FloatingDisc, Grid, Player, HEIGHT, WIDTH};
use crate::search::{Algorithm, UnknownAlgorithm};
use std::str::FromStr;
use thiserror::Error;

const EMPTY: char = 'O';

/// Errors from reading a board file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing {0} line")]
    MissingLine(&'static str),

    #[error(transparent)]
    Algorithm(#[from] UnknownAlgorithm),

    #[error("invalid player `{0}`, expected R or Y")]
    InvalidPlayer(String),

    #[error("row {row}: invalid cell `{cell}`, expected O, R or Y")]
    InvalidCell { row: usize, cell: char },

    #[error("row {row} has {len} cells, at most 7 allowed")]
    RowTooLong { row: usize, len: usize },

    #[error(transparent)]
    Floating(#[from] FloatingDisc),
}

/// A parsed board file: which algorithm to run and on what position.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub algorithm: Algorithm,
    pub board: Board,
}

impl FromStr for InputFile {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim);

        let algorithm: Algorithm = lines
            .next()
            .filter(|line| !line.is_empty())
            .ok_or(ParseError::MissingLine("algorithm"))?
            .parse()?;

        let player = lines.next().ok_or(ParseError::MissingLine("player"))?;
        let turn = match player.chars().collect::<Vec<_>>().as_slice() {
            [c] => Player::from_symbol(*c),
            _ => None,
        }
        .ok_or_else(|| ParseError::InvalidPlayer(player.to_owned()))?;

        let mut grid: Grid = [[None; HEIGHT]; WIDTH];
        // File rows run top to bottom; grid rows count up from the bottom.
        for row in (0..HEIGHT).rev() {
            let line = lines.next().ok_or(ParseError::MissingLine("board row"))?;
            let len = line.chars().count();
            if len > WIDTH {
                return Err(ParseError::RowTooLong { row, len });
            }
            for (col, cell) in line.chars().enumerate() {
                grid[col][row] = match cell {
                    EMPTY => None,
                    c => Some(Player::from_symbol(c).ok_or(ParseError::InvalidCell { row, cell: c })?),
                };
            }
        }

        Ok(InputFile {
            algorithm,
            board: Board::from_grid(turn, grid)?,
        })
    }
}
