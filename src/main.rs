//! Bagh-Chal engine binary.
//!
//! ## Usage
//!
//! - `bagh-chal` - Show a demo
//! - `bagh-chal protocol` - Read commands on stdin, answer on stdout
//! - `bagh-chal selfplay` - Let two AI players finish a game
//! - `bagh-chal demo` - Run the search demo

use std::io;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, info};

use bagh_chal::board::Board;
use bagh_chal::constants::{DEFAULT_DEPTH, DEFAULT_TIME_SECS, MAX_DEPTH};
use bagh_chal::game::{AiSettings, Algorithm, GameMode, GameSession, parse_time_secs};
use bagh_chal::mcts::search_mcts;
use bagh_chal::minimax::search_alpha_beta;
use bagh_chal::protocol::ProtocolEngine;

/// Bagh-Chal: tigers and goats with minimax and MCTS players
#[derive(Parser)]
#[command(name = "bagh-chal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level written to stderr (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the text protocol on stdin and stdout
    Protocol(PlayerArgs),
    /// Play a full AI vs AI game and print every move
    Selfplay {
        #[command(flatten)]
        goat: GoatArgs,
        #[command(flatten)]
        tiger: TigerArgs,
        /// Stop after this many plies
        #[arg(long, default_value_t = 200)]
        max_plies: usize,
    },
    /// Run a simple demo of the engine
    Demo,
}

/// Settings for `genmove`.
#[derive(Args)]
struct PlayerArgs {
    #[arg(long, default_value = "alphabeta")]
    algorithm: Algorithm,
    #[arg(long, default_value_t = DEFAULT_DEPTH, value_parser = clap::value_parser!(u32).range(1..=MAX_DEPTH as i64))]
    depth: u32,
    #[arg(long, default_value_t = DEFAULT_TIME_SECS, value_parser = parse_time_secs)]
    time: f64,
}

#[derive(Args)]
struct GoatArgs {
    /// Goat algorithm (minimax, alphabeta, mcts)
    #[arg(long, default_value = "alphabeta")]
    goat_algorithm: Algorithm,
    #[arg(long, default_value_t = DEFAULT_DEPTH, value_parser = clap::value_parser!(u32).range(1..=MAX_DEPTH as i64))]
    goat_depth: u32,
    /// Goat MCTS time per move in seconds
    #[arg(long, default_value_t = DEFAULT_TIME_SECS, value_parser = parse_time_secs)]
    goat_time: f64,
}

#[derive(Args)]
struct TigerArgs {
    /// Tiger algorithm (minimax, alphabeta, mcts)
    #[arg(long, default_value = "mcts")]
    tiger_algorithm: Algorithm,
    #[arg(long, default_value_t = DEFAULT_DEPTH, value_parser = clap::value_parser!(u32).range(1..=MAX_DEPTH as i64))]
    tiger_depth: u32,
    /// Tiger MCTS time per move in seconds
    #[arg(long, default_value_t = DEFAULT_TIME_SECS, value_parser = parse_time_secs)]
    tiger_time: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.log_level)?;

    match cli.command {
        Some(Commands::Protocol(args)) => {
            let settings = AiSettings::new(args.algorithm, args.depth, args.time);
            let mut engine = ProtocolEngine::with_settings(settings);
            engine.run_stdio()?;
        }
        Some(Commands::Selfplay {
            goat,
            tiger,
            max_plies,
        }) => {
            let goat = AiSettings::new(goat.goat_algorithm, goat.goat_depth, goat.goat_time);
            let tiger = AiSettings::new(tiger.tiger_algorithm, tiger.tiger_depth, tiger.tiger_time);
            run_selfplay(goat, tiger, max_plies);
        }
        Some(Commands::Demo) | None => run_demo(),
    }
    Ok(())
}

fn setup_logger(level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
        .context("failed to install logger")
}

fn run_selfplay(goat: AiSettings, tiger: AiSettings, max_plies: usize) {
    println!("goats: {}, tigers: {}\n", goat.algorithm, tiger.algorithm);
    let mut game = GameSession::with_mode(GameMode::AiVsAi, goat, tiger);

    for ply in 1..=max_plies {
        let side = game.side_to_move();
        let Some(diagnostics) = game.play_ai_turn() else {
            break;
        };
        let action = diagnostics
            .action
            .map(|a| a.to_string())
            .unwrap_or_default();
        println!(
            "{ply:>3}. {side:<5} {action:<6} ({} iterations, {:.0}ms)",
            diagnostics.iterations,
            diagnostics.elapsed.as_secs_f64() * 1000.0
        );
        if game.is_over() {
            break;
        }
    }

    println!("\n{}", game.board());
    if game.is_over() {
        println!("{}", game.state());
    } else {
        info!("stopped after {max_plies} plies");
        println!("No result after {max_plies} plies");
    }
}

fn run_demo() {
    println!("Bagh-Chal: tigers and goats\n");

    println!("=== Start Position ===");
    let board = Board::new();
    println!("{board}");
    let legal: Vec<String> = board
        .legal_actions()
        .into_iter()
        .map(|(action, _)| action.to_string())
        .collect();
    println!("Goat placements: {}\n", legal.join(" "));

    println!("=== Alpha-Beta Demo ===");
    let result = search_alpha_beta(&board, true, 3);
    if let Some(next) = &result.board {
        if let Some(action) = next.last_action() {
            println!("Best goat move: {action} (score {})", result.score);
        }
    }
    println!("Nodes searched: {}\n", result.nodes);

    println!("=== MCTS Demo ===");
    let Some(reply) = result.board else {
        return;
    };
    println!("Running MCTS for the tigers for 0.5s...");
    let result = search_mcts(&reply, 0.5);
    if let Some(action) = result.board.as_ref().and_then(Board::last_action) {
        println!("Best tiger move: {action}");
    }
    println!(
        "Iterations: {}, root wins: {:.1}",
        result.iterations, result.wins
    );
}
