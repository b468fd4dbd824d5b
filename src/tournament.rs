//! Round-robin play between search configurations.

use crate::connect4::{Board, Player};
use crate::game::Status;
use crate::report::NullReporter;
use crate::search::{Algorithm, SearchConfig, SearchDriver, SearchError};
use rand::Rng;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};

const CELL_WIDTH: usize = 14;

/// An algorithm with its simulation budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Contestant {
    pub name: String,
    pub algorithm: Algorithm,
    pub parameter: i64,
}

impl Contestant {
    /// Names the contestant `UR`, or `<ALGORITHM>_<parameter>` for the tree
    /// searches.
    pub fn new(algorithm: Algorithm, parameter: i64) -> Self {
        let name = match algorithm {
            Algorithm::UniformRandom => algorithm.to_string(),
            _ => format!("{}_{}", algorithm, parameter),
        };
        Contestant {
            name,
            algorithm,
            parameter,
        }
    }
}

/// The five standard contestants.
pub fn canonical_roster() -> Vec<Contestant> {
    vec![
        Contestant::new(Algorithm::UniformRandom, 0),
        Contestant::new(Algorithm::Pmcgs, 500),
        Contestant::new(Algorithm::Pmcgs, 10_000),
        Contestant::new(Algorithm::Uct, 500),
        Contestant::new(Algorithm::Uct, 10_000),
    ]
}

/// A small roster for smoke runs: every tree search gets 50 simulations.
pub fn fast_roster() -> Vec<Contestant> {
    vec![
        Contestant::new(Algorithm::UniformRandom, 0),
        Contestant::new(Algorithm::Pmcgs, 50),
        Contestant::new(Algorithm::Uct, 50),
    ]
}

/// How a single game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    RedWin,
    YellowWin,
    Draw,
}

impl GameResult {
    fn from_status(status: Status) -> Option<Self> {
        match status {
            Status::RedWin => Some(Self::RedWin),
            Status::YellowWin => Some(Self::YellowWin),
            Status::Draw => Some(Self::Draw),
            Status::Ongoing => None,
        }
    }

    pub fn winner(&self) -> Option<Player> {
        match self {
            Self::RedWin => Some(Player::Red),
            Self::YellowWin => Some(Player::Yellow),
            Self::Draw => None,
        }
    }
}

/// Results of one pairing from the row contestant's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Tally {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Wins plus half the draws, as a percentage of games played.
    pub fn score_percent(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => (f64::from(self.wins) + 0.5 * f64::from(self.draws)) / f64::from(games) * 100.0,
        }
    }

    fn record(&mut self, result: GameResult, played_as: Player) {
        match result.winner() {
            Some(winner) if winner == played_as => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
    }
}

/// Outcome matrix of a tournament. `tally(row, col)` is `None` on the
/// diagonal.
#[derive(Debug, Clone)]
pub struct Results {
    names: Vec<String>,
    tallies: Vec<Vec<Option<Tally>>>,
    games: u32,
}

impl Results {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Games played per ordered pairing.
    pub fn games(&self) -> u32 {
        self.games
    }

    pub fn tally(&self, row: usize, col: usize) -> Option<&Tally> {
        self.tallies.get(row)?.get(col)?.as_ref()
    }

    /// Score percentages as a fixed-width table, row contestant against
    /// column contestant.
    pub fn render_table(&self) -> String {
        let mut header = format!("{:w$}", "", w = CELL_WIDTH);
        for name in &self.names {
            let _ = write!(header, "{:<w$}", name, w = CELL_WIDTH);
        }

        let mut table = String::new();
        let _ = writeln!(table, "{}", header);
        let _ = writeln!(table, "{}", "-".repeat(header.len()));
        for (row, name) in self.names.iter().enumerate() {
            let _ = write!(table, "{:<w$}", name, w = CELL_WIDTH);
            for col in 0..self.names.len() {
                let cell = match self.tally(row, col) {
                    Some(tally) => format!("{:6.1}%", tally.score_percent()),
                    None => "-".to_owned(),
                };
                let _ = write!(table, "{:<w$}", cell, w = CELL_WIDTH);
            }
            table.push('\n');
        }
        table
    }

    /// Writes the full results report.
    pub fn write_report<W: Write>(&self, mut out: W, elapsed: Duration) -> io::Result<()> {
        writeln!(out, "Connect Four MCTS Tournament Results")?;
        writeln!(out, "Games per match: {}", self.games)?;
        writeln!(out, "Total time: {:.2} seconds", elapsed.as_secs_f64())?;
        writeln!(out)?;
        writeln!(out, "Win percentages (row algorithm vs column algorithm):")?;
        writeln!(out)?;
        out.write_all(self.render_table().as_bytes())?;
        out.flush()
    }
}

/// Plays every ordered pairing of a roster.
pub struct Tournament {
    roster: Vec<Contestant>,
    driver: SearchDriver,
}

impl Tournament {
    pub fn new(roster: Vec<Contestant>, config: SearchConfig) -> Self {
        Tournament {
            roster,
            driver: SearchDriver::new(config),
        }
    }

    pub fn roster(&self) -> &[Contestant] {
        &self.roster
    }

    /// Number of games `run` plays for the given games per pairing.
    pub fn total_games(&self, games: u32) -> u64 {
        let n = self.roster.len() as u64;
        n * n.saturating_sub(1) * u64::from(games)
    }

    /// Plays one game from the empty board, Red moving first.
    pub fn play_game<R: Rng + ?Sized>(
        &self,
        red: &Contestant,
        yellow: &Contestant,
        rng: &mut R,
    ) -> Result<GameResult, SearchError> {
        let mut board = Board::new();
        loop {
            let contestant = match board.turn() {
                Player::Red => red,
                Player::Yellow => yellow,
            };
            let decision = self.driver.decide(
                &mut board,
                contestant.algorithm,
                contestant.parameter,
                rng,
                &mut NullReporter,
            )?;
            board.drop(decision.column)?;

            if let Some(result) = GameResult::from_status(board.terminal_status(decision.column)) {
                debug!(
                    red = %red.name,
                    yellow = %yellow.name,
                    ?result,
                    moves = board.moves_played(),
                    "game over"
                );
                return Ok(result);
            }
        }
    }

    /// Plays `games` games for each ordered pairing. The row contestant is
    /// Red in even-numbered games and Yellow in odd ones. `on_game` is called
    /// after every game.
    pub fn run<R, F>(&self, games: u32, rng: &mut R, mut on_game: F) -> Result<Results, SearchError>
    where
        R: Rng + ?Sized,
        F: FnMut(&Contestant, &Contestant, GameResult),
    {
        let n = self.roster.len();
        let mut tallies = vec![vec![None; n]; n];

        for (row, row_player) in self.roster.iter().enumerate() {
            for (col, col_player) in self.roster.iter().enumerate() {
                if row == col {
                    continue;
                }
                info!(row = %row_player.name, col = %col_player.name, games, "running pairing");

                let mut tally = Tally::default();
                for game in 0..games {
                    let (red, yellow, played_as) = if game % 2 == 0 {
                        (row_player, col_player, Player::Red)
                    } else {
                        (col_player, row_player, Player::Yellow)
                    };
                    let result = self.play_game(red, yellow, rng)?;
                    tally.record(result, played_as);
                    on_game(red, yellow, result);
                }

                info!(
                    row = %row_player.name,
                    col = %col_player.name,
                    wins = tally.wins,
                    losses = tally.losses,
                    draws = tally.draws,
                    "pairing complete"
                );
                tallies[row][col] = Some(tally);
            }
        }

        Ok(Results {
            names: self.roster.iter().map(|c| c.name.clone()).collect(),
            tallies,
            games,
        })
    }
}
