//! World document loading.
//!
//! The world lives in one JSON file under `data/`, so operators can edit the
//! map without recompiling. Enemy placements name an archetype and a repeat
//! count (`"zombie(3)"`); every instance is materialized here, so the rest of
//! the game never sees archetypes.

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellGraph};
use super::enemy::{Archetype, Enemy};
use super::errors::WorldError;
use super::trigger;
use super::types::{CellId, Exits, Item};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<CellId>,
    #[serde(default)]
    pub enemies: HashMap<String, Archetype>,
    #[serde(default)]
    pub items: HashMap<String, ItemSeed>,
    #[serde(default)]
    pub cells: Vec<CellSeed>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemSeed {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellSeed {
    pub id: CellId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub enemies: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub exits: Exits,
}

/// Counts reported by `check-world`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldSummary {
    pub cells: usize,
    pub enemies: usize,
    pub items: usize,
    pub triggers: usize,
    pub start: Option<CellId>,
}

impl WorldSummary {
    pub fn of(graph: &CellGraph) -> Self {
        let mut summary = Self {
            cells: graph.len(),
            enemies: 0,
            items: 0,
            triggers: 0,
            start: graph.start(),
        };
        for cell in graph.cells() {
            summary.enemies += cell.enemies.len();
            summary.items += cell.items.len();
            summary.triggers += cell.triggers.len();
        }
        summary
    }
}

/// Largest count a single placement may ask for.
pub const MAX_PLACEMENT: u32 = 1000;

/// Split `"name(count)"` into its parts; a bare `name` counts once.
/// Counts above [`MAX_PLACEMENT`] are rejected.
pub fn parse_placement(text: &str) -> Option<(&str, u32)> {
    let text = text.trim();
    match text.split_once('(') {
        None if !text.is_empty() => Some((text, 1)),
        None => None,
        Some((name, rest)) => {
            let count: u32 = rest.strip_suffix(')')?.trim().parse().ok()?;
            if count > MAX_PLACEMENT {
                return None;
            }
            let name = name.trim();
            (!name.is_empty()).then_some((name, count))
        }
    }
}

pub fn parse_world(json: &str) -> Result<WorldDocument, WorldError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and assemble a world. `start_override` wins over the document's
/// own `start`, which wins over the first cell.
pub fn load_world_from_json<P: AsRef<Path>>(
    path: P,
    start_override: Option<CellId>,
) -> Result<CellGraph, WorldError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let doc = parse_world(&contents)?;
    let graph = build_graph(doc, start_override)?;
    info!(
        "Loaded world from {}: {} cells, start cell {:?}",
        path.display(),
        graph.len(),
        graph.start()
    );
    Ok(graph)
}

pub fn build_graph(
    doc: WorldDocument,
    start_override: Option<CellId>,
) -> Result<CellGraph, WorldError> {
    if doc.cells.is_empty() {
        return Err(WorldError::Empty);
    }

    let mut cells = Vec::with_capacity(doc.cells.len());
    for seed in doc.cells {
        let mut cell = Cell::new(seed.id, seed.description);
        cell.exits = seed.exits;

        for text in &seed.items {
            let (name, quantity) = parse_placement(text).ok_or_else(|| WorldError::BadPlacement {
                cell: seed.id,
                text: text.clone(),
            })?;
            let description = doc
                .items
                .get(name)
                .map(|item| item.description.clone())
                .unwrap_or_default();
            cell.items.push(Item {
                name: name.to_string(),
                quantity,
                description,
            });
        }

        for text in &seed.enemies {
            let (name, count) = parse_placement(text).ok_or_else(|| WorldError::BadPlacement {
                cell: seed.id,
                text: text.clone(),
            })?;
            let archetype = doc
                .enemies
                .get(name)
                .ok_or_else(|| WorldError::UnknownArchetype {
                    cell: seed.id,
                    name: name.to_string(),
                })?;
            for _ in 0..count {
                cell.enemies.push(Enemy::from_archetype(name, archetype));
            }
        }

        for name in &seed.triggers {
            match trigger::lookup(name) {
                Some(t) => cell.triggers.push(t),
                None => warn!("Cell {} names unknown trigger '{}'; skipping", seed.id, name),
            }
        }

        cells.push(cell);
    }

    CellGraph::new(cells, start_override.or(doc.start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Direction;

    const DOC: &str = r#"{
        "enemies": {
            "zombie": {"hp": 20, "dmg": 3, "def": 1, "aggro": 1, "attack_msg": "bites you"},
            "rat": {"hp": 4, "dmg": 1, "aggro": false}
        },
        "items": {"knife": {"description": "A rusty knife"}},
        "cells": [
            {"id": 10, "description": "Hall", "items": ["knife(2)", "rope"],
             "enemies": ["zombie(3)"], "triggers": ["exit", "portal"],
             "exits": {"e": 11, "n": 40}},
            {"id": 11, "description": "Cellar", "enemies": ["rat"], "exits": {"w": 10}}
        ]
    }"#;

    #[test]
    fn placement_parsing() {
        assert_eq!(parse_placement("zombie(3)"), Some(("zombie", 3)));
        assert_eq!(parse_placement(" rat "), Some(("rat", 1)));
        assert_eq!(parse_placement("rat(x)"), None);
        assert_eq!(parse_placement("rat(2"), None);
        assert_eq!(parse_placement(""), None);
        assert_eq!(parse_placement("zombie(1000)"), Some(("zombie", MAX_PLACEMENT)));
        assert_eq!(parse_placement("zombie(1001)"), None);
    }

    #[test]
    fn oversized_placement_is_an_error() {
        let doc = parse_world(
            r#"{"enemies": {"zombie": {"hp": 20, "dmg": 3}},
                "cells": [{"id": 1, "enemies": ["zombie(4000000000)"]}]}"#,
        )
        .unwrap();
        let err = build_graph(doc, None).unwrap_err();
        assert!(matches!(err, WorldError::BadPlacement { cell: 1, .. }));
    }

    #[test]
    fn builds_cells_with_materialized_enemies() {
        let graph = build_graph(parse_world(DOC).unwrap(), None).unwrap();
        assert_eq!(graph.start(), Some(10));

        let hall = graph.get(10).unwrap();
        assert_eq!(hall.enemies.len(), 3);
        assert!(hall.enemies.iter().all(|e| e.aggro && e.def == 1));
        assert_eq!(hall.items[0].quantity, 2);
        assert_eq!(hall.items[0].description, "A rusty knife");
        assert_eq!(hall.items[1].description, "");
        assert_eq!(hall.triggers.len(), 1);
        assert_eq!(hall.exits.get(Direction::North), None);
        assert_eq!(hall.exits.get(Direction::East), Some(11));

        let summary = WorldSummary::of(&graph);
        assert_eq!(summary.cells, 2);
        assert_eq!(summary.enemies, 4);
    }

    #[test]
    fn start_override_beats_document() {
        let mut doc = parse_world(DOC).unwrap();
        doc.start = Some(10);
        let graph = build_graph(doc, Some(11)).unwrap();
        assert_eq!(graph.start(), Some(11));
    }

    #[test]
    fn unknown_archetype_is_an_error() {
        let doc = parse_world(r#"{"cells": [{"id": 1, "enemies": ["dragon(1)"]}]}"#).unwrap();
        let err = build_graph(doc, None).unwrap_err();
        assert!(matches!(err, WorldError::UnknownArchetype { cell: 1, .. }));
    }

    #[test]
    fn empty_document_is_an_error() {
        let err = build_graph(parse_world("{}").unwrap(), None).unwrap_err();
        assert!(matches!(err, WorldError::Empty));
    }
}
