//! Move decisions: dispatches a position to UR, PMCGS or UCT and reduces the
//! result to a column plus per-column diagnostics.

use crate::connect4::{Board, Column, MoveError, WIDTH};
use crate::game::Status;
use crate::mcts::{Mcts, SelectionPolicy, UCB1_DEFAULT_EXPLORE_CONST};
use crate::report::{Event, NullReporter, Reporter, Verbosity};
use crate::rollout;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while deciding a move.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),

    #[error("no legal move available")]
    NoLegalMove,

    #[error("game is already over ({0})")]
    GameOver(Status),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// The move-selection algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Uniform random legal move.
    UniformRandom,
    /// Pure Monte Carlo game search.
    Pmcgs,
    /// Upper confidence bound for trees.
    Uct,
}

#[derive(Debug, Error)]
#[error("unknown algorithm `{0}`, expected UR, PMCGS or UCT")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UR" => Ok(Self::UniformRandom),
            "PMCGS" => Ok(Self::Pmcgs),
            "UCT" => Ok(Self::Uct),
            other => Err(UnknownAlgorithm(other.to_owned())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UniformRandom => "UR",
            Self::Pmcgs => "PMCGS",
            Self::Uct => "UCT",
        })
    }
}

/// Parses an algorithm parameter, rejecting anything that is not an integer.
pub fn parse_parameter(text: &str) -> Result<i64, SearchError> {
    text.trim()
        .parse()
        .map_err(|_| SearchError::InvalidParameter(format!("`{}` is not an integer", text.trim())))
}

/// Tunables shared by every decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Exploration constant `C` of the UCT selection rule.
    pub exploration: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: UCB1_DEFAULT_EXPLORE_CONST,
        }
    }
}

impl SearchConfig {
    /// Builder pattern: set the UCT exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.exploration.is_finite() && self.exploration > 0.0 {
            Ok(())
        } else {
            Err(SearchError::InvalidParameter(format!(
                "exploration constant must be positive, got {}",
                self.exploration
            )))
        }
    }
}

/// What the search learned about one root column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnValue {
    /// The column is full.
    Full,
    /// Legal, but no simulation went through it.
    Unvisited,
    Visited { wi: i64, ni: u32 },
}

impl ColumnValue {
    /// Mean outcome `wi / ni` from Yellow's perspective, if legal.
    pub fn ratio(&self) -> Option<f64> {
        match *self {
            Self::Full => None,
            Self::Unvisited => Some(0.0),
            Self::Visited { wi, ni } => Some(wi as f64 / f64::from(ni)),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio() {
            Some(ratio) => write!(f, "{:.3}", ratio),
            None => f.write_str("Null"),
        }
    }
}

/// The outcome of a move decision.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub column: Column,
    pub values: [ColumnValue; WIDTH],
    /// Number of simulations run (0 for UR).
    pub simulations: u32,
}

/// Fails unless the position still has a move to make.
pub fn ensure_playable(board: &Board) -> Result<(), SearchError> {
    match board.scan_status() {
        Status::Ongoing => Ok(()),
        Status::Draw => Err(SearchError::NoLegalMove),
        status => Err(SearchError::GameOver(status)),
    }
}

/// Decides moves with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct SearchDriver {
    config: SearchConfig,
}

impl SearchDriver {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Decides a move for the player to move on `board`. `parameter` is the
    /// simulation count for PMCGS and UCT and is ignored by UR. The board is
    /// used as scratch space and handed back unchanged.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        board: &mut Board,
        algorithm: Algorithm,
        parameter: i64,
        rng: &mut R,
        reporter: &mut dyn Reporter,
    ) -> Result<Decision, SearchError> {
        if parameter < 0 {
            return Err(SearchError::InvalidParameter(format!(
                "parameter must not be negative, got {}",
                parameter
            )));
        }
        self.config.validate()?;
        ensure_playable(board)?;

        let decision = match algorithm {
            Algorithm::UniformRandom => {
                if parameter != 0 {
                    warn!(parameter, "UR ignores its parameter");
                }
                let mut values = [ColumnValue::Full; WIDTH];
                for (col, value) in values.iter_mut().enumerate() {
                    if board.is_legal(col as Column) {
                        *value = ColumnValue::Unvisited;
                    }
                }
                Decision {
                    column: rollout::choose(board, rng)?,
                    values,
                    simulations: 0,
                }
            }
            Algorithm::Pmcgs => {
                self.run_tree(board, SelectionPolicy::Uniform, parameter, rng, reporter)?
            }
            Algorithm::Uct => self.run_tree(
                board,
                SelectionPolicy::Ucb1(self.config.exploration),
                parameter,
                rng,
                reporter,
            )?,
        };

        debug!(%algorithm, column = decision.column, "move decided");
        reporter.report(&Event::Final {
            column: decision.column,
        });
        Ok(decision)
    }

    fn run_tree<R: Rng + ?Sized>(
        &self,
        board: &mut Board,
        policy: SelectionPolicy,
        parameter: i64,
        rng: &mut R,
        reporter: &mut dyn Reporter,
    ) -> Result<Decision, SearchError> {
        let simulations = u32::try_from(parameter).map_err(|_| {
            SearchError::InvalidParameter(format!("simulation count {} is too large", parameter))
        })?;

        let mut mcts = Mcts::new(board, policy);
        let column = mcts.run(board, simulations, rng, reporter)?;
        let values = mcts.column_values(board);

        if reporter.enabled(Verbosity::Brief) {
            reporter.report(&Event::ColumnValues { values: &values });
        }
        Ok(Decision {
            column,
            values,
            simulations,
        })
    }
}

/// Decides a move with the default configuration and no trace output.
pub fn decide<R: Rng + ?Sized>(
    board: &mut Board,
    algorithm: Algorithm,
    parameter: i64,
    rng: &mut R,
) -> Result<Decision, SearchError> {
    SearchDriver::default().decide(board, algorithm, parameter, rng, &mut NullReporter)
}
