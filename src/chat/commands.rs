//! Slash-command parser for the lobby and chat rooms.
//!
//! A line is a command only when it starts with `/` and has something after
//! the slash; everything else is chat text. Command words match
//! case-insensitively, room names keep their case.
use log::trace;

#[derive(Debug, PartialEq, Eq)]
pub enum LobbyCommand {
    Rooms,
    Join(String),
    Leave,
    Quit,
    Game,
    /// Known command with bad arguments; carries the warning text.
    Invalid(String),
    Unknown(String),
}

/// Minimal lobby command parser
pub struct LobbyCommandParser;

impl LobbyCommandParser {
    pub fn new() -> Self {
        Self
    }

    /// `None` means the line is chat text.
    pub fn parse(&self, raw: &str) -> Option<LobbyCommand> {
        let body = raw.strip_prefix('/')?;
        if body.is_empty() {
            return None;
        }
        let mut parts = body.split_whitespace();
        let verb = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let cmd = match verb {
            "rooms" => LobbyCommand::Rooms,
            "leave" => LobbyCommand::Leave,
            "quit" => LobbyCommand::Quit,
            "game" => LobbyCommand::Game,
            "join" => match args.as_slice() {
                [room] => LobbyCommand::Join((*room).to_string()),
                _ => LobbyCommand::Invalid("illegal number of parameters for /join".into()),
            },
            _ => LobbyCommand::Unknown(verb.to_string()),
        };
        trace!("Parsed {:?} from '{}'", cmd, raw);
        Some(cmd)
    }
}

impl Default for LobbyCommandParser {
    fn default() -> Self {
        Self::new()
    }
}
