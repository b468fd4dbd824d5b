//! Connect Four move selection with Monte Carlo search.
//!
//! Three algorithms decide a move for the player to move on a 7x6 board:
//! uniform random (UR), pure Monte Carlo game search (PMCGS) and UCT. All
//! randomness comes from an injected [`rand::Rng`], so a seeded generator
//! reproduces a decision exactly.
//!
//! ```no_run
//! use connect4_mcts::{decide, Algorithm, Board};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut board = Board::new();
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let decision = decide(&mut board, Algorithm::Uct, 500, &mut rng).unwrap();
//! println!("play column {}", decision.column + 1);
//! ```

pub mod connect4;
pub mod game;
pub mod input;
pub mod mcts;
pub mod report;
pub mod rollout;
pub mod search;
pub mod tournament;
pub mod tree;

pub use connect4::{Board, Column, MoveError, MoveScope, Player, HEIGHT, WIDTH};
pub use game::Status;
pub use input::{InputFile, ParseError};
pub use mcts::{Mcts, SelectionPolicy, UCB1_DEFAULT_EXPLORE_CONST};
pub use report::{Event, NullReporter, Reporter, TextReporter, Verbosity};
pub use search::{
    decide, parse_parameter, Algorithm, ColumnValue, Decision, SearchConfig, SearchDriver,
    SearchError,
};
