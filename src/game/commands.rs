//! In-game command parsing.
//!
//! Every line a GAME-state session sends lands here verbatim. Keywords and
//! movement tokens are matched case-insensitively; arguments keep their case.

use super::types::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Leave the game and return to the lobby.
    Quit,
    /// Record an enemy in the current cell as the intended target.
    Attack(String),
    /// List enemies in the current cell.
    Look,
    Move(Direction),
    /// Run a trigger attached to the current cell.
    Use(String),
    /// Hit points, state and target.
    Status,
    Help,
    /// Known command with the wrong arguments; carries the usage line.
    Invalid(&'static str),
    Unknown(String),
}

pub fn parse(line: &str) -> GameCommand {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return GameCommand::Unknown(String::new());
    };
    let args: Vec<&str> = parts.collect();

    if let Some(dir) = Direction::parse(verb) {
        return GameCommand::Move(dir);
    }
    match verb.to_ascii_lowercase().as_str() {
        "quit" => GameCommand::Quit,
        "look" => GameCommand::Look,
        "help" | "?" => GameCommand::Help,
        "hp" | "status" => GameCommand::Status,
        "attack" => match args.as_slice() {
            [name] => GameCommand::Attack((*name).to_string()),
            _ => GameCommand::Invalid("Usage: attack <name>"),
        },
        "use" => match args.as_slice() {
            [name] => GameCommand::Use((*name).to_string()),
            _ => GameCommand::Invalid("Usage: use <name>"),
        },
        _ => GameCommand::Unknown(verb.to_string()),
    }
}

pub const HELP_TEXT: &str =
    "Commands: n/e/s/w (or north/east/south/west), look, attack <name>, use <name>, hp, quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_movement_in_any_case() {
        assert_eq!(parse("E"), GameCommand::Move(Direction::East));
        assert_eq!(parse("north"), GameCommand::Move(Direction::North));
        assert_eq!(parse("  WeSt "), GameCommand::Move(Direction::West));
    }

    #[test]
    fn attack_requires_exactly_one_name() {
        assert_eq!(parse("attack zombie"), GameCommand::Attack("zombie".into()));
        assert_eq!(parse("attack"), GameCommand::Invalid("Usage: attack <name>"));
        assert_eq!(
            parse("attack big zombie"),
            GameCommand::Invalid("Usage: attack <name>")
        );
    }

    #[test]
    fn keywords_and_unknowns() {
        assert_eq!(parse("quit"), GameCommand::Quit);
        assert_eq!(parse("look"), GameCommand::Look);
        assert_eq!(parse("use exit"), GameCommand::Use("exit".into()));
        assert_eq!(parse("hp"), GameCommand::Status);
        assert_eq!(parse("dance"), GameCommand::Unknown("dance".into()));
        assert_eq!(parse(""), GameCommand::Unknown(String::new()));
    }
}
