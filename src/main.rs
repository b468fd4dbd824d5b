//! connect4 - decide one Connect Four move from a board file.
//!
//! ```text
//! connect4 <input_file> <Verbose|Brief|None> <parameter>
//! ```
//!
//! The search trace goes to stdout; diagnostic logging goes to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use connect4_mcts::{
    parse_parameter, InputFile, SearchConfig, SearchDriver, TextReporter, Verbosity,
    UCB1_DEFAULT_EXPLORE_CONST,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "connect4", version, about = "Pick a Connect Four move with UR, PMCGS or UCT")]
struct Args {
    /// Board file: algorithm, player to move, then six rows top first.
    input_file: PathBuf,

    /// Trace detail: Verbose, Brief or None.
    verbosity: Verbosity,

    /// Simulation count for PMCGS and UCT (ignored by UR).
    #[arg(allow_hyphen_values = true)]
    parameter: String,

    /// Seed for the random source. Picked at random when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// UCT exploration constant.
    #[arg(long, default_value_t = UCB1_DEFAULT_EXPLORE_CONST)]
    exploration: f64,

    /// Log level for stderr diagnostics (overridden by RUST_LOG).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let text = std::fs::read_to_string(&args.input_file)
        .with_context(|| format!("failed to read {}", args.input_file.display()))?;
    let InputFile {
        algorithm,
        mut board,
    } = text
        .parse::<InputFile>()
        .with_context(|| format!("failed to parse {}", args.input_file.display()))?;
    let parameter = parse_parameter(&args.parameter)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, %algorithm, parameter, "deciding move");
    debug!("position:\n{}", board);

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let driver = SearchDriver::new(SearchConfig::default().with_exploration(args.exploration));

    let stdout = io::stdout();
    let mut reporter = TextReporter::new(args.verbosity, io::BufWriter::new(stdout.lock()));
    let decision = driver.decide(&mut board, algorithm, parameter, &mut rng, &mut reporter)?;
    reporter.into_inner().flush().context("failed to flush output")?;

    info!(column = decision.column + 1, "move decided");
    Ok(())
}
