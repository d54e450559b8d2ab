//! Othello-MCTS: an Othello engine driven by Monte Carlo Tree Search.
//!
//! ## Usage
//!
//! - `othello-mcts` - Show a demo
//! - `othello-mcts console` - Start the text protocol on stdin/stdout
//! - `othello-mcts search --sims 2000` - Search the starting position
//! - `othello-mcts compete --games 10` - Pit two planner settings against each other

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use othello_mcts::arena::{compete, run_match};
use othello_mcts::config::PlannerConfig;
use othello_mcts::console::Console;
use othello_mcts::constants::{EXPLORATION, N_SIMS};
use othello_mcts::mcts::{Planner, dump_children};
use othello_mcts::position::{Position, apply_move, parse_coord, str_coord};

/// Othello-MCTS: an Othello engine with a Monte Carlo planner
#[derive(Parser)]
#[command(name = "othello-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol for driving the engine from another program
    Console(PlannerArgs),
    /// Search one position and print the root statistics
    Search {
        #[command(flatten)]
        planner: PlannerArgs,
        /// Moves to play from the starting position first, e.g. "d3 c5"
        #[arg(long, default_value = "")]
        moves: String,
    },
    /// Play games between two planner settings
    Compete {
        /// Simulations per move for Black
        #[arg(long, default_value_t = N_SIMS)]
        black_sims: usize,
        /// Exploration constant for Black
        #[arg(long, default_value_t = EXPLORATION)]
        black_c: f64,
        /// Simulations per move for White
        #[arg(long, default_value_t = N_SIMS)]
        white_sims: usize,
        /// Exploration constant for White
        #[arg(long, default_value_t = EXPLORATION)]
        white_c: f64,
        /// Number of games to play
        #[arg(long, default_value_t = 1)]
        games: u32,
        /// Base RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Log every position of a single game
        #[arg(long)]
        verbose: bool,
    },
    /// Run a simple demo of the engine
    Demo,
}

#[derive(Args)]
struct PlannerArgs {
    /// Simulations per search
    #[arg(long, default_value_t = N_SIMS)]
    sims: usize,
    /// UCT exploration constant
    #[arg(long, default_value_t = EXPLORATION)]
    exploration: f64,
    /// RNG seed for reproducible searches
    #[arg(long)]
    seed: Option<u64>,
}

impl From<PlannerArgs> for PlannerConfig {
    fn from(args: PlannerArgs) -> Self {
        PlannerConfig {
            simulations: args.sims,
            exploration: args.exploration,
            seed: args.seed,
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Some(Commands::Console(args)) => Console::new(args.into()).run(),
        Some(Commands::Search { planner, moves }) => run_search(planner.into(), &moves),
        Some(Commands::Compete {
            black_sims,
            black_c,
            white_sims,
            white_c,
            games,
            seed,
            verbose,
        }) => {
            let black = PlannerConfig {
                seed,
                ..PlannerConfig::new(black_sims, black_c)
            };
            let white = PlannerConfig {
                seed: seed.map(|s| s.wrapping_add(1)),
                ..PlannerConfig::new(white_sims, white_c)
            };
            run_compete(&black, &white, games, verbose)
        }
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_search(config: PlannerConfig, moves: &str) -> Result<()> {
    let mut pos = Position::new();
    for vertex in moves.split_whitespace() {
        let mv = parse_coord(vertex).with_context(|| format!("invalid vertex '{vertex}'"))?;
        pos = apply_move(&pos, mv, true).with_context(|| format!("cannot play '{vertex}'"))?;
    }

    println!("{pos}");
    let result = Planner::new(config).search(&pos)?;
    dump_children(&result.root);
    println!("{}", result.root);
    println!(
        "Best move: {} after {} simulations ({} nodes)",
        str_coord(result.best),
        result.simulations,
        result.nodes
    );
    Ok(())
}

fn run_compete(
    black: &PlannerConfig,
    white: &PlannerConfig,
    games: u32,
    verbose: bool,
) -> Result<()> {
    if games == 1 {
        let record = compete(black, white, verbose)?;
        let line: Vec<String> = record.moves.iter().map(|&mv| str_coord(mv)).collect();
        println!("{}", record.final_position);
        println!("Moves: {}", line.join(" "));
        match record.winner() {
            Some(side) => println!("{side} wins"),
            None => println!("Tie"),
        }
        return Ok(());
    }

    let summary = run_match(black, white, games)?;
    println!(
        "{} games: black {} ({} sims, c={}), white {} ({} sims, c={}), ties {}",
        summary.games(),
        summary.black_wins,
        black.simulations,
        black.exploration,
        summary.white_wins,
        white.simulations,
        white.exploration,
        summary.ties
    );
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Othello-MCTS: Othello with Monte Carlo Tree Search\n");

    let pos = Position::new();
    println!("{pos}");

    println!("Running 200 MCTS simulations...");
    let result = Planner::new(PlannerConfig::new(200, EXPLORATION)).search(&pos)?;
    println!("{}", result.root);
    println!("Best move: {}", str_coord(result.best));

    let next = apply_move(&pos, result.best, true)?;
    println!("\n{next}");
    Ok(())
}
