//! Line-oriented text protocol for driving the engine.
//!
//! Commands are read one per line from stdin. Each response starts with `=`
//! on success or `?` on failure, optionally followed by the numeric id the
//! command was sent with, and ends with a blank line (the same framing as GTP).
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the program
//! - `clear_board` - Reset to the starting position
//! - `showboard` - Print the board
//! - `turn` - Side to move
//! - `legal_moves` - Legal moves for the side to move
//! - `play <vertex>` - Play a move (`d3`, `pass`) for the side to move
//! - `genmove` - Let the planner choose and play a move
//! - `analyze` - Run a search and print the root statistics without playing
//! - `simulations <n>` - Set the number of simulations per search
//! - `exploration <c>` - Set the UCT exploration constant
//! - `score` - Piece counts, and the winner once the game is over
//!
//! ## Example
//!
//! ```ignore
//! use othello_mcts::console::Console;
//! let mut console = Console::new(Default::default());
//! console.run()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::Context;

use crate::config::PlannerConfig;
use crate::mcts::Planner;
use crate::position::{
    Position, apply_move, is_terminal, legal_moves, parse_coord, str_coord, winner,
};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "analyze",
    "clear_board",
    "exploration",
    "genmove",
    "known_command",
    "legal_moves",
    "list_commands",
    "name",
    "play",
    "quit",
    "score",
    "showboard",
    "simulations",
    "turn",
    "version",
];

/// Console session state.
pub struct Console {
    /// Current game position
    pos: Position,
    /// Planner used by `genmove` and `analyze`
    planner: Planner,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Console {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            pos: Position::new(),
            planner: Planner::new(config),
        }
    }

    /// Current game position.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Run the command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let (success, message) = self.execute(&command, &parts[1..]);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(stdout, "{prefix}{id_str} {message}\n").context("failed to write response")?;
            stdout.flush().context("failed to flush stdout")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "clear_board" => {
                self.pos = Position::new();
                (true, String::new())
            }

            "showboard" => (true, format!("\n{}", self.pos)),

            "turn" => (true, self.pos.turn().to_string()),

            "legal_moves" => {
                let moves: Vec<String> =
                    legal_moves(&self.pos).into_iter().map(str_coord).collect();
                (true, moves.join(" "))
            }

            "play" => {
                let Some(vertex) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Some(mv) = parse_coord(vertex) else {
                    return (false, format!("invalid vertex: {vertex}"));
                };
                match apply_move(&self.pos, mv, true) {
                    Ok(next) => {
                        self.pos = next;
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                if is_terminal(&self.pos) {
                    return (false, "game is over".to_string());
                }
                let result = self
                    .planner
                    .plan(&self.pos)
                    .and_then(|mv| apply_move(&self.pos, mv, true).map(|next| (mv, next)));
                match result {
                    Ok((mv, next)) => {
                        self.pos = next;
                        (true, str_coord(mv))
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "analyze" => match self.planner.search(&self.pos) {
                Ok(result) => (
                    true,
                    format!(
                        "best {} ({} nodes)\n{}",
                        str_coord(result.best),
                        result.nodes,
                        result.root
                    ),
                ),
                Err(e) => (false, e.to_string()),
            },

            "simulations" => match args.first().map(|s| s.parse::<usize>()) {
                Some(Ok(n)) => {
                    let config = PlannerConfig {
                        simulations: n,
                        ..self.planner.config().clone()
                    };
                    self.planner = Planner::new(config);
                    (true, String::new())
                }
                Some(Err(_)) => (false, "invalid simulation count".to_string()),
                None => (false, "missing argument".to_string()),
            },

            "exploration" => match args.first().map(|s| s.parse::<f64>()) {
                Some(Ok(c)) if c.is_finite() && c >= 0.0 => {
                    let config = PlannerConfig {
                        exploration: c,
                        ..self.planner.config().clone()
                    };
                    self.planner = Planner::new(config);
                    (true, String::new())
                }
                Some(_) => (false, "invalid exploration constant".to_string()),
                None => (false, "missing argument".to_string()),
            },

            "score" => {
                let (black, white) = self.pos.piece_counts();
                let mut message = format!("black {black} white {white}");
                if is_terminal(&self.pos) {
                    match winner(&self.pos) {
                        Some(side) => message.push_str(&format!(", {side} wins")),
                        None => message.push_str(", tie"),
                    }
                }
                (true, message)
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
