//! Infexion-Rust: Infexion search agents.
//!
//! ## Usage
//!
//! - `infexion-rust` - Show a demo
//! - `infexion-rust demo` - Run the demo
//! - `infexion-rust selfplay --red minimax --blue mcts` - Play one game
//!   between two in-process agents and print the final board

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use infexion_rust::config::{SearchConfig, Strategy};
use infexion_rust::hex::{HexDir, HexPos};
use infexion_rust::mcts::tree_search;
use infexion_rust::minimax::AlphaBeta;
use infexion_rust::{Action, Agent, Color, GameError, GameState};

/// Infexion-Rust: minimax and MCTS agents for Infexion
#[derive(Parser)]
#[command(name = "infexion-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simple demo of the engine
    Demo,
    /// Play a full game between two agents
    Selfplay(SelfplayArgs),
}

#[derive(Args)]
struct SelfplayArgs {
    /// Strategy for Red
    #[arg(long, value_enum, default_value_t = StrategyArg::Minimax)]
    red: StrategyArg,

    /// Strategy for Blue
    #[arg(long, value_enum, default_value_t = StrategyArg::Mcts)]
    blue: StrategyArg,

    /// Seed for Red's generator (Blue uses seed + 1)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Wall-clock budget for each MCTS decision
    #[arg(long, default_value_t = 1000)]
    mcts_millis: u64,

    /// Thinking time per player for the whole game, in seconds
    #[arg(long, default_value_t = 180)]
    time_budget: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Minimax,
    Mcts,
    Random,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Minimax => Strategy::Minimax,
            StrategyArg::Mcts => Strategy::Mcts,
            StrategyArg::Random => Strategy::Random,
        }
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Some(Commands::Selfplay(args)) => run_selfplay(&args),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_selfplay(args: &SelfplayArgs) -> Result<()> {
    let config_for = |strategy: StrategyArg, seed: u64| SearchConfig {
        strategy: strategy.into(),
        mcts_budget: Duration::from_millis(args.mcts_millis),
        seed,
        ..SearchConfig::default()
    };

    let mut agents = [
        Agent::new(Color::Red, config_for(args.red, args.seed)),
        Agent::new(Color::Blue, config_for(args.blue, args.seed.wrapping_add(1))),
    ];
    let mut remaining = [Duration::from_secs(args.time_budget); 2];
    let mut board = GameState::new();

    let winner = loop {
        if board.is_terminal() {
            break board.result();
        }

        let mover = board.turn_color();
        let idx = match mover {
            Color::Red => 0,
            Color::Blue => 1,
        };

        let started = Instant::now();
        let action = match agents[idx].action(remaining[idx]) {
            Ok(action) => action,
            Err(GameError::NoLegalActions(color)) => {
                info!(%color, "no legal actions, forfeiting");
                break Some(color.opponent());
            }
            Err(e) => return Err(e).context("agent failed to choose an action"),
        };
        remaining[idx] = remaining[idx].saturating_sub(started.elapsed());
        if remaining[idx].is_zero() {
            info!(color = %mover, "out of time");
            break Some(mover.opponent());
        }

        board
            .play(mover, action)
            .with_context(|| format!("{mover} played an illegal action"))?;
        for agent in &mut agents {
            agent
                .turn(mover, action)
                .with_context(|| format!("{} rejected {action}", agent.color()))?;
        }

        info!(
            turn = board.turn_number(),
            color = %mover,
            %action,
            red = board.color_power(Color::Red),
            blue = board.color_power(Color::Blue),
            "turn played"
        );
    };

    println!("{board}");
    match winner {
        Some(color) => println!("Winner: {color}"),
        None => println!("Draw"),
    }
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Infexion-Rust: minimax and MCTS agents\n");

    // Demo 1: Rules
    println!("=== Spawn and spread ===");
    let state = GameState::new()
        .apply(Color::Red, Action::Spawn { at: HexPos::new(3, 3) })?
        .apply(Color::Blue, Action::Spawn { at: HexPos::new(3, 4) })?
        .apply(Color::Red, Action::Spawn { at: HexPos::new(1, 1) })?
        .apply(Color::Blue, Action::Spawn { at: HexPos::new(5, 5) })?;
    println!("{state}");
    let spread = Action::Spread {
        at: HexPos::new(3, 3),
        dir: HexDir::DownRight,
    };
    println!("Red plays {spread}");
    println!("{}", state.apply(Color::Red, spread)?);

    // Demo 2: Search
    println!("=== Search ===");
    let result = AlphaBeta::new(Color::Red).search(&state, 2);
    println!(
        "Alpha-beta (depth 2): {:?} score={:.2} nodes={}",
        result.action.map(|a| a.to_string()),
        result.score,
        result.nodes
    );

    let config = SearchConfig {
        mcts_budget: Duration::from_millis(500),
        ..SearchConfig::default()
    };
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let result = tree_search(&state, &config, &mut rng);
    println!(
        "MCTS (500 ms): {:?} iterations={} win rate={:.1}%",
        result.action.map(|a| a.to_string()),
        result.iterations,
        result.win_rate * 100.0
    );
    Ok(())
}
