//! Line-based text protocol for driving the engine from another program.
//!
//! The framing follows the Go Text Protocol: each command sits on one line,
//! optionally prefixed by a numeric id, and each response is `=[id] message`
//! on success or `?[id] message` on failure, followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`,
//!   `known_command <cmd>`, `quit`
//! - `reset` - Restore the initial position
//! - `place <sq>` - Place a goat, e.g. `place c3`
//! - `move <from> <to>` - Move a piece of the side to move, e.g. `move a1 b2`
//! - `genmove` - Let the engine play for the side to move
//! - `legal` - List legal actions
//! - `state` - `in_progress`, `tiger_win`, `goat_win` or `draw`
//! - `counters` - Turn and piece counters
//! - `showboard` - Print the board
//! - `algorithm <minimax|alphabeta|mcts>`, `depth <1-5>`, `time <seconds>`
//!
//! ## Example
//!
//! ```ignore
//! use bagh_chal::protocol::ProtocolEngine;
//! let mut engine = ProtocolEngine::new();
//! engine.run_stdio()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::board::Board;
use crate::constants::MAX_DEPTH;
use crate::game::{AiSettings, Algorithm, Controller, GameSession, parse_time_secs};
use crate::position::Position;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "algorithm",
    "counters",
    "depth",
    "genmove",
    "known_command",
    "legal",
    "list_commands",
    "move",
    "name",
    "place",
    "protocol_version",
    "quit",
    "reset",
    "showboard",
    "state",
    "time",
    "version",
];

/// Protocol engine state.
pub struct ProtocolEngine {
    /// Current game; both sides are driven by the protocol peer
    game: GameSession,
    /// Settings used by `genmove`
    settings: AiSettings,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self::with_settings(AiSettings::default())
    }

    pub fn with_settings(settings: AiSettings) -> Self {
        Self {
            game: GameSession::new(Controller::Human, Controller::Human),
            settings,
        }
    }

    pub fn board(&self) -> &Board {
        self.game.board()
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// Run the command loop on stdin and stdout.
    pub fn run_stdio(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!("rejected `{command_line}`: {message}");
            }
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n").context("failed to write response")?;
            output.flush().context("failed to flush response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "reset" => {
                self.game.reset();
                (true, String::new())
            }

            "place" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let pos = match arg.parse::<Position>() {
                    Ok(pos) => pos,
                    Err(e) => return (false, e.to_string()),
                };
                if self.game.place(pos) {
                    (true, String::new())
                } else {
                    (false, "illegal placement".to_string())
                }
            }

            "move" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let from = args[0].parse::<Position>();
                let to = args[1].parse::<Position>();
                let (from, to) = match (from, to) {
                    (Ok(from), Ok(to)) => (from, to),
                    (Err(e), _) | (_, Err(e)) => return (false, e.to_string()),
                };
                if self.game.move_piece(from, to) {
                    let action = self.game.board().last_action();
                    (true, action.map(|a| a.to_string()).unwrap_or_default())
                } else {
                    (false, "illegal move".to_string())
                }
            }

            "genmove" => {
                if self.game.is_over() {
                    return (false, format!("game over: {}", self.game.state().as_str()));
                }
                let settings = self.settings;
                match self.game.play_with(&settings) {
                    Some(diagnostics) => {
                        debug!("genmove: {diagnostics:?}");
                        let action = diagnostics.action.map(|a| a.to_string());
                        (true, action.unwrap_or_default())
                    }
                    None => (false, "no legal move".to_string()),
                }
            }

            "legal" => {
                let actions: Vec<String> = self
                    .game
                    .board()
                    .legal_actions()
                    .into_iter()
                    .map(|(action, _)| action.to_string())
                    .collect();
                (true, actions.join(" "))
            }

            "state" => (true, self.game.state().as_str().to_string()),

            "counters" => {
                let board = self.game.board();
                (
                    true,
                    format!(
                        "turn {} in_hand {} captured {} trapped {}",
                        self.game.side_to_move(),
                        board.goats_in_hand(),
                        board.goats_captured(),
                        board.tigers_trapped()
                    ),
                )
            }

            "showboard" => (true, format!("\n{}", self.game.board())),

            "algorithm" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<Algorithm>() {
                    Ok(algorithm) => {
                        self.settings.algorithm = algorithm;
                        (true, String::new())
                    }
                    Err(e) => (false, e),
                }
            }

            "depth" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<u32>() {
                    Ok(depth) if (1..=MAX_DEPTH).contains(&depth) => {
                        self.settings.depth = depth;
                        (true, String::new())
                    }
                    Ok(depth) => (false, format!("depth must be 1-{MAX_DEPTH} (got {depth})")),
                    Err(_) => (false, "invalid depth".to_string()),
                }
            }

            "time" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match parse_time_secs(arg) {
                    Ok(secs) => {
                        self.settings.time_secs = secs;
                        (true, String::new())
                    }
                    Err(e) => (false, e),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
