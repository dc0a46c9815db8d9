//! The shared game world and its fixed-interval scheduler.
//!
//! [`World`] owns the cell arena and every in-game [`Player`]. It is driven
//! from one task: [`World::tick`] and [`World::handle_command`] never run
//! concurrently, so no entity needs its own lock. Output for players is queued
//! in an [`Outbox`] and delivered by the caller after each call.

use std::collections::BTreeMap;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::fonts::Fonts;
use crate::metrics;

use super::cell::CellGraph;
use super::commands::{GameCommand, HELP_TEXT};
use super::player::{MoveOutcome, Player, PlayerState};
use super::trigger::TriggerEffect;
use super::types::{CellId, EnemyRef, HitPoints, Weapon};

/// Timing and combat policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub tick_ms: u64,
    pub action_interval_ms: u64,
    pub escape_chance: f64,
    pub clamp_damage: bool,
    pub player_hp: HitPoints,
    pub starting_weapon: Option<Weapon>,
    pub rng_seed: Option<u64>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            tick_ms: 200,
            action_interval_ms: 2500,
            escape_chance: 0.3,
            clamp_damage: false,
            player_hp: 50,
            starting_weapon: None,
            rng_seed: None,
        }
    }
}

impl Rules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_ms: config.world.tick_interval_ms,
            action_interval_ms: config.game.action_interval_ms,
            escape_chance: config.game.escape_chance,
            clamp_damage: config.game.clamp_damage,
            player_hp: config.game.player_hp,
            starting_weapon: config.game.starting_weapon.clone(),
            rng_seed: config.game.rng_seed,
        }
    }
}

/// Lines waiting for delivery, addressed by player name.
#[derive(Debug, Default)]
pub struct Outbox {
    lines: Vec<(String, String)>,
}

impl Outbox {
    pub fn send(&mut self, to: &str, line: impl Into<String>) {
        self.lines.push((to.to_string(), line.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn take(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.lines)
    }
}

/// Borrowed state handed to every entity update during one tick.
pub(crate) struct Tick<'a> {
    pub rules: &'a Rules,
    pub fonts: &'a Fonts,
    pub outbox: &'a mut Outbox,
    pub rng: &'a mut StdRng,
}

/// Whether the issuing session stays in the game after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameFlow {
    Stay,
    /// The player was removed from the world; the session returns to the lobby.
    Left,
}

pub struct World {
    graph: CellGraph,
    players: BTreeMap<String, Player>,
    rules: Rules,
    fonts: Fonts,
    rng: StdRng,
    outbox: Outbox,
}

impl World {
    pub fn new(graph: CellGraph, rules: Rules, fonts: Fonts) -> Self {
        let rng = match rules.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            graph,
            players: BTreeMap::new(),
            rules,
            fonts,
            rng,
            outbox: Outbox::default(),
        }
    }

    /// A world without cells, used when loading failed and startup continued.
    pub fn empty(rules: Rules, fonts: Fonts) -> Self {
        Self::new(CellGraph::empty(), rules, fonts)
    }

    /// True when there is a start cell to put new players in.
    pub fn is_available(&self) -> bool {
        self.graph.start().is_some()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn graph(&self) -> &CellGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut CellGraph {
        &mut self.graph
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Place a new player in the start cell. The arrival display follows on
    /// the next tick. Returns the start cell, or `None` when the world has no
    /// cells or the name is already in the game.
    pub fn enter(&mut self, name: &str) -> Option<CellId> {
        let start = self.graph.start()?;
        if self.players.contains_key(name) {
            return None;
        }
        let mut player = Player::new(
            name,
            start,
            self.rules.player_hp,
            self.rules.starting_weapon.clone(),
        );
        player.state = PlayerState::Moved;
        self.graph.add_presence(start, name);
        self.players.insert(name.to_string(), player);
        let counter = metrics::record_game_entry();
        info!(
            "{} entered the game at cell {} ({} playing)",
            name, start, counter.currently_active
        );
        Some(start)
    }

    /// Remove a player and every presence entry for the name. Pending attack
    /// and escape windows are discarded.
    pub fn leave(&mut self, name: &str) -> Option<Player> {
        self.graph.purge_presence(name);
        let player = self.players.remove(name);
        if player.is_some() {
            let counter = metrics::record_game_exit();
            info!(
                "{} left the game ({} playing)",
                name, counter.currently_active
            );
        }
        player
    }

    /// Advance the world one step: every cell (presence pruning, then its
    /// enemies), then every player.
    pub fn tick(&mut self) {
        let mut tick = Tick {
            rules: &self.rules,
            fonts: &self.fonts,
            outbox: &mut self.outbox,
            rng: &mut self.rng,
        };
        for cell in self.graph.cells_mut() {
            cell.update(&mut self.players, &mut tick);
        }
        for player in self.players.values_mut() {
            player.update(&mut self.graph, &mut tick);
        }
        metrics::inc_ticks();
    }

    /// Lines produced since the last call, addressed by player name.
    pub fn drain_outbox(&mut self) -> Vec<(String, String)> {
        self.outbox.take()
    }

    /// Run one in-game command for `name`.
    pub fn handle_command(&mut self, name: &str, command: GameCommand) -> GameFlow {
        let Some(player) = self.players.get_mut(name) else {
            return GameFlow::Left;
        };
        let fonts = self.fonts;
        debug!("Game command from {}: {:?}", name, command);

        match command {
            GameCommand::Quit => {
                self.outbox.send(name, fonts.system("Quitting game..."));
                self.leave(name);
                return GameFlow::Left;
            }
            GameCommand::Attack(target) => {
                let found = self.graph.get(player.cell).and_then(|cell| {
                    cell.enemies.iter().position(|enemy| enemy.name == target)
                });
                match found {
                    Some(index) => {
                        player.target = Some(EnemyRef {
                            cell: player.cell,
                            index,
                        });
                        self.outbox
                            .send(name, format!("You set your sights on {}", fonts.enemy(&target)));
                    }
                    None => self.outbox.send(name, format!("There is no {target} here")),
                }
            }
            GameCommand::Look => {
                let names: Vec<String> = self
                    .graph
                    .get(player.cell)
                    .map(|cell| cell.enemies.iter().map(|e| fonts.highlight(&e.name)).collect())
                    .unwrap_or_default();
                if names.is_empty() {
                    self.outbox.send(name, "You see nothing hostile here");
                }
                for enemy in names {
                    self.outbox.send(name, enemy);
                }
            }
            GameCommand::Move(dir) => {
                if player.try_move(&mut self.graph, dir) == MoveOutcome::Blocked {
                    self.outbox.send(name, "You cannot move there");
                }
            }
            GameCommand::Use(trigger_name) => {
                let trigger = self
                    .graph
                    .get(player.cell)
                    .and_then(|cell| cell.trigger(&trigger_name));
                let Some(trigger) = trigger else {
                    self.outbox
                        .send(name, format!("There is no {trigger_name} here"));
                    return GameFlow::Stay;
                };
                match trigger.execute(player) {
                    TriggerEffect::ReturnToLobby => {
                        debug!("{} used trigger '{}'", name, trigger.name());
                        self.outbox.send(name, fonts.system("Quitting game..."));
                        self.leave(name);
                        return GameFlow::Left;
                    }
                }
            }
            GameCommand::Status => {
                let target = player
                    .target
                    .and_then(|t| self.graph.enemy(t))
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| "none".to_string());
                let line = format!(
                    "HP:{} State:{} Target:{}",
                    player.hp,
                    player.state.label(),
                    target
                );
                self.outbox.send(name, line);
            }
            GameCommand::Help => self.outbox.send(name, HELP_TEXT),
            GameCommand::Invalid(usage) => self.outbox.send(name, fonts.warning(usage)),
            GameCommand::Unknown(_) => self.outbox.send(name, fonts.warning("Illegal command")),
        }
        GameFlow::Stay
    }
}
