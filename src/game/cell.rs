//! Cells and the navigable cell graph.
//!
//! Cells live in an arena addressed by [`CellId`]. Entities refer to cells by
//! id and every cross-entity lookup goes through [`CellGraph`].

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::fonts::Fonts;

use super::enemy::Enemy;
use super::errors::WorldError;
use super::player::Player;
use super::trigger::Trigger;
use super::types::{CellId, Direction, EnemyRef, Exits, Item};
use super::world::Tick;

#[derive(Debug)]
pub struct Cell {
    pub id: CellId,
    pub description: String,
    pub items: Vec<Item>,
    pub enemies: Vec<Enemy>,
    pub triggers: Vec<&'static dyn Trigger>,
    pub exits: Exits,
    /// Names of players standing here, in arrival order.
    pub present: Vec<String>,
}

impl Cell {
    pub fn new(id: CellId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            items: Vec::new(),
            enemies: Vec::new(),
            triggers: Vec::new(),
            exits: Exits::default(),
            present: Vec::new(),
        }
    }

    pub fn with_exit(mut self, dir: Direction, target: CellId) -> Self {
        self.exits.set(dir, Some(target));
        self
    }

    pub fn with_enemy(mut self, enemy: Enemy) -> Self {
        self.enemies.push(enemy);
        self
    }

    pub fn with_trigger(mut self, trigger: &'static dyn Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.present.iter().any(|n| n == name)
    }

    pub fn trigger(&self, name: &str) -> Option<&'static dyn Trigger> {
        self.triggers.iter().copied().find(|t| t.name() == name)
    }

    /// Lines shown to a player arriving here.
    pub fn describe(&self, fonts: &Fonts) -> Vec<String> {
        let directions: Vec<String> = self
            .exits
            .available()
            .into_iter()
            .map(|dir| fonts.highlight(dir.letter()))
            .collect();
        let mut lines = vec![
            self.description.clone(),
            format!("Available directions : {}", directions.join(", ")),
            format!("players here : {}", self.present.join(", ")),
        ];
        if !self.triggers.is_empty() {
            let triggers: Vec<String> = self
                .triggers
                .iter()
                .map(|t| format!("{} ({})", fonts.highlight(t.name()), t.description()))
                .collect();
            lines.push(format!("You notice : {}", triggers.join(", ")));
        }
        lines
    }

    /// One tick: drop presence entries without a live player, then advance
    /// every enemy in list order.
    pub(crate) fn update(&mut self, players: &mut BTreeMap<String, Player>, tick: &mut Tick<'_>) {
        let id = self.id;
        self.present.retain(|name| {
            let live = players.contains_key(name);
            if !live {
                debug!("Pruning stale presence '{}' from cell {}", name, id);
            }
            live
        });

        let Cell {
            enemies, present, ..
        } = self;
        for (index, enemy) in enemies.iter_mut().enumerate() {
            enemy.update(EnemyRef { cell: id, index }, present.as_slice(), players, tick);
        }
    }
}

/// Static (post-load) directed graph of cells.
#[derive(Debug, Default)]
pub struct CellGraph {
    cells: Vec<Cell>,
    index: HashMap<CellId, usize>,
    start: Option<CellId>,
}

impl CellGraph {
    /// Build the arena. Exits pointing at unknown cells are dropped with a
    /// warning; the start cell defaults to the first cell.
    pub fn new(cells: Vec<Cell>, start: Option<CellId>) -> Result<Self, WorldError> {
        let mut index = HashMap::with_capacity(cells.len());
        for (pos, cell) in cells.iter().enumerate() {
            if index.insert(cell.id, pos).is_some() {
                return Err(WorldError::DuplicateCell(cell.id));
            }
        }
        let start = match start {
            Some(id) if !index.contains_key(&id) => return Err(WorldError::UnknownStartCell(id)),
            Some(id) => Some(id),
            None => cells.first().map(|c| c.id),
        };

        let mut graph = Self {
            cells,
            index,
            start,
        };
        graph.drop_dangling_exits();
        Ok(graph)
    }

    /// A graph with no cells; nobody can enter the game.
    pub fn empty() -> Self {
        Self::default()
    }

    fn drop_dangling_exits(&mut self) {
        let known = &self.index;
        for cell in &mut self.cells {
            for dir in Direction::DISPLAY_ORDER {
                if let Some(target) = cell.exits.get(dir) {
                    if !known.contains_key(&target) {
                        log::warn!(
                            "Cell {} exit {} points at missing cell {}; dropping it",
                            cell.id,
                            dir,
                            target
                        );
                        cell.exits.set(dir, None);
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn start(&self) -> Option<CellId> {
        self.start
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.index.get(&id).map(|&pos| &self.cells[pos])
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        match self.index.get(&id) {
            Some(&pos) => self.cells.get_mut(pos),
            None => None,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// Neighbor of `from` in `dir`, if that exit is set.
    pub fn neighbor(&self, from: CellId, dir: Direction) -> Option<CellId> {
        self.get(from).and_then(|cell| cell.exits.get(dir))
    }

    pub fn enemy(&self, target: EnemyRef) -> Option<&Enemy> {
        self.get(target.cell)
            .and_then(|cell| cell.enemies.get(target.index))
    }

    pub fn enemy_mut(&mut self, target: EnemyRef) -> Option<&mut Enemy> {
        self.get_mut(target.cell)
            .and_then(|cell| cell.enemies.get_mut(target.index))
    }

    pub fn add_presence(&mut self, id: CellId, name: &str) {
        if let Some(cell) = self.get_mut(id) {
            if !cell.is_present(name) {
                cell.present.push(name.to_string());
            }
        }
    }

    pub fn remove_presence(&mut self, id: CellId, name: &str) {
        if let Some(cell) = self.get_mut(id) {
            cell.present.retain(|n| n != name);
        }
    }

    /// Remove a name from every presence list.
    pub fn purge_presence(&mut self, name: &str) {
        for cell in &mut self.cells {
            cell.present.retain(|n| n != name);
        }
    }

    /// Ids of every cell whose presence list holds `name`.
    pub fn cells_with(&self, name: &str) -> Vec<CellId> {
        self.cells
            .iter()
            .filter(|c| c.is_present(name))
            .map(|c| c.id)
            .collect()
    }
}
