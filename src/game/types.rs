use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric cell identifier as written in the world document.
pub type CellId = u32;

/// Hit points. Damage is never floored on the target, so values may go negative.
pub type HitPoints = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Order used when listing exits.
    pub const DISPLAY_ORDER: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Parse a movement token: full word or single letter, any case.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "n" | "north" => Some(Direction::North),
            "e" | "east" => Some(Direction::East),
            "s" | "south" => Some(Direction::South),
            "w" | "west" => Some(Direction::West),
            _ => None,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(word)
    }
}

/// Up to one neighbor per direction. Adjacency is not required to be symmetric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exits {
    #[serde(default, alias = "n", skip_serializing_if = "Option::is_none")]
    pub north: Option<CellId>,
    #[serde(default, alias = "e", skip_serializing_if = "Option::is_none")]
    pub east: Option<CellId>,
    #[serde(default, alias = "s", skip_serializing_if = "Option::is_none")]
    pub south: Option<CellId>,
    #[serde(default, alias = "w", skip_serializing_if = "Option::is_none")]
    pub west: Option<CellId>,
}

impl Exits {
    pub fn get(&self, dir: Direction) -> Option<CellId> {
        match dir {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, dir: Direction, target: Option<CellId>) {
        match dir {
            Direction::North => self.north = target,
            Direction::East => self.east = target,
            Direction::South => self.south = target,
            Direction::West => self.west = target,
        }
    }

    /// Directions with a neighbor, in display order.
    pub fn available(&self) -> Vec<Direction> {
        Direction::DISPLAY_ORDER
            .into_iter()
            .filter(|dir| self.get(*dir).is_some())
            .collect()
    }
}

/// Identity of an enemy: its owning cell plus its position in that cell's
/// enemy list. Enemies are never removed, so the index stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnemyRef {
    pub cell: CellId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub quantity: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: HitPoints,
}

impl Weapon {
    pub fn new(name: impl Into<String>, damage: HitPoints) -> Self {
        Self {
            name: name.into(),
            damage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_tokens_ignore_case() {
        assert_eq!(Direction::parse("E"), Some(Direction::East));
        assert_eq!(Direction::parse("West"), Some(Direction::West));
        assert_eq!(Direction::parse("sOuTh"), Some(Direction::South));
        assert_eq!(Direction::parse("n"), Some(Direction::North));
        assert_eq!(Direction::parse("up"), None);
        assert_eq!(Direction::parse("ea"), None);
    }

    #[test]
    fn available_exits_follow_display_order() {
        let exits = Exits {
            north: Some(1),
            east: Some(2),
            south: None,
            west: Some(3),
        };
        assert_eq!(
            exits.available(),
            vec![Direction::East, Direction::West, Direction::North]
        );
    }

    #[test]
    fn exits_accept_short_keys() {
        let exits: Exits = serde_json::from_str(r#"{"n": 4, "east": 7}"#).unwrap();
        assert_eq!(exits.get(Direction::North), Some(4));
        assert_eq!(exits.get(Direction::East), Some(7));
        assert_eq!(exits.get(Direction::West), None);
    }
}
