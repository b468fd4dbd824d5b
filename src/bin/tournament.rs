//! tournament - round-robin between UR, PMCGS and UCT configurations.

use anyhow::{Context, Result};
use clap::Parser;
use connect4_mcts::tournament::{canonical_roster, fast_roster, Tournament};
use connect4_mcts::{SearchConfig, UCB1_DEFAULT_EXPLORE_CONST};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "tournament", version, about = "Play every algorithm against every other")]
struct Args {
    /// Games per ordered pairing.
    num_games: u32,

    /// Where the results table is written.
    #[arg(long, short, default_value = "tournament_results.txt")]
    output: PathBuf,

    /// Seed for the random source. Picked at random when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// Use 50 simulations for every tree search.
    #[arg(long)]
    fast: bool,

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

    let roster = if args.fast {
        fast_roster()
    } else {
        canonical_roster()
    };
    let config = SearchConfig::default().with_exploration(args.exploration);
    config.validate()?;
    let tournament = Tournament::new(roster, config);

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    info!(seed, games = args.num_games, "starting tournament");

    // Only draw a progress bar when stderr is a TTY
    let progress = if io::stderr().is_terminal() {
        let pb = ProgressBar::new(tournament.total_games(args.num_games));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta}) {msg}")
                .context("invalid progress template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    println!(
        "Running Connect Four tournament with {} games per match...",
        args.num_games
    );
    let start = Instant::now();
    let results = tournament.run(args.num_games, &mut rng, |red, yellow, _| {
        if let Some(pb) = &progress {
            pb.set_message(format!("{} vs {}", red.name, yellow.name));
            pb.inc(1);
        }
    })?;
    let elapsed = start.elapsed();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    println!();
    print!("{}", results.render_table());
    println!(
        "\nTournament completed in {:.2} seconds",
        elapsed.as_secs_f64()
    );

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    results
        .write_report(BufWriter::new(file), elapsed)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Detailed results saved to {}", args.output.display());

    Ok(())
}
