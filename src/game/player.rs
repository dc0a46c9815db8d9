//! Player entities and their IDLE/ATTACK/MOVED/ESCAPING state machine.

use rand::Rng;

use super::cell::CellGraph;
use super::combat;
use super::types::{CellId, Direction, EnemyRef, HitPoints, Weapon};
use super::world::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Resting; scans for enemies that picked this player.
    Idle,
    /// Engaged with `target`, striking once per action window.
    Attack,
    /// Just arrived; shows the cell on the next tick, then goes idle.
    Moved,
    /// Trying to flee toward `escape_to`.
    Escaping,
}

impl PlayerState {
    pub fn label(self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Attack => "fighting",
            PlayerState::Moved => "moving",
            PlayerState::Escaping => "escaping",
        }
    }
}

/// Result of a movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No exit that way; nothing changed.
    Blocked,
    /// Relocated immediately.
    Moved(CellId),
    /// In combat, so an escape attempt toward the cell started instead.
    Escaping(CellId),
}

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub hp: HitPoints,
    pub state: PlayerState,
    pub elapsed_ms: u64,
    pub cell: CellId,
    /// Intended or current victim. Setting it alone does not start a fight.
    pub target: Option<EnemyRef>,
    pub escape_to: Option<CellId>,
    pub weapon: Option<Weapon>,
}

impl Player {
    pub fn new(name: &str, cell: CellId, hp: HitPoints, weapon: Option<Weapon>) -> Self {
        Self {
            name: name.to_string(),
            hp,
            state: PlayerState::Idle,
            elapsed_ms: 0,
            cell,
            target: None,
            escape_to: None,
            weapon,
        }
    }

    fn enter(&mut self, state: PlayerState) {
        self.state = state;
        self.elapsed_ms = 0;
    }

    /// Move to `dest` right away: leave the old presence list, join the new
    /// one, drop the target and show the new cell on the next tick.
    pub fn relocate(&mut self, graph: &mut CellGraph, dest: CellId) {
        graph.remove_presence(self.cell, &self.name);
        self.cell = dest;
        graph.add_presence(dest, &self.name);
        self.target = None;
        self.enter(PlayerState::Moved);
    }

    /// Handle a movement command. Outside combat the player relocates at once;
    /// in combat an escape attempt starts instead.
    pub fn try_move(&mut self, graph: &mut CellGraph, dir: Direction) -> MoveOutcome {
        let Some(dest) = graph.neighbor(self.cell, dir) else {
            return MoveOutcome::Blocked;
        };
        if self.state == PlayerState::Attack {
            self.enter(PlayerState::Escaping);
            self.target = None;
            self.escape_to = Some(dest);
            MoveOutcome::Escaping(dest)
        } else {
            self.relocate(graph, dest);
            MoveOutcome::Moved(dest)
        }
    }

    /// Advance one tick.
    pub(crate) fn update(&mut self, graph: &mut CellGraph, tick: &mut Tick<'_>) {
        match self.state {
            PlayerState::Idle => {
                let hostile = graph.get(self.cell).and_then(|cell| {
                    cell.enemies
                        .iter()
                        .position(|enemy| enemy.is_targeting(&self.name))
                });
                if let Some(index) = hostile {
                    self.target = Some(EnemyRef {
                        cell: self.cell,
                        index,
                    });
                    self.enter(PlayerState::Attack);
                }
            }
            PlayerState::Moved => {
                if let Some(cell) = graph.get(self.cell) {
                    for line in cell.describe(tick.fonts) {
                        tick.outbox.send(&self.name, line);
                    }
                }
                self.enter(PlayerState::Idle);
            }
            PlayerState::Attack => {
                self.elapsed_ms += tick.rules.tick_ms;
                if self.elapsed_ms < tick.rules.action_interval_ms {
                    return;
                }
                if let Some(target) = self.target {
                    if let Some(enemy) = graph.enemy_mut(target) {
                        let strike = combat::resolve_player_attack(
                            self,
                            enemy,
                            tick.rules.clamp_damage,
                            tick.fonts,
                        );
                        tick.outbox.send(&self.name, strike.message);
                    }
                }
                self.elapsed_ms = 0;
            }
            PlayerState::Escaping => {
                self.elapsed_ms += tick.rules.tick_ms;
                if self.elapsed_ms < tick.rules.action_interval_ms {
                    return;
                }
                let roll: f64 = tick.rng.gen();
                match self.escape_to {
                    Some(dest) if roll > 1.0 - tick.rules.escape_chance => {
                        self.escape_to = None;
                        self.relocate(graph, dest);
                        tick.outbox
                            .send(&self.name, tick.fonts.highlight("You successfully fled"));
                    }
                    _ => {
                        self.escape_to = None;
                        tick.outbox
                            .send(&self.name, tick.fonts.enemy("You failed to flee"));
                        self.enter(PlayerState::Idle);
                    }
                }
                self.elapsed_ms = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::Fonts;
    use crate::game::cell::Cell;
    use crate::game::world::{Outbox, Rules};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corridor() -> CellGraph {
        CellGraph::new(
            vec![
                Cell::new(1, "Hall").with_exit(Direction::East, 2),
                Cell::new(2, "Cellar").with_exit(Direction::West, 1),
            ],
            None,
        )
        .unwrap()
    }

    fn run(
        player: &mut Player,
        graph: &mut CellGraph,
        rules: &Rules,
        rng: &mut StdRng,
        ticks: usize,
    ) -> Vec<String> {
        let fonts = Fonts::plain();
        let mut outbox = Outbox::default();
        for _ in 0..ticks {
            let mut tick = Tick {
                rules,
                fonts: &fonts,
                outbox: &mut outbox,
                rng: &mut *rng,
            };
            player.update(graph, &mut tick);
        }
        outbox.take().into_iter().map(|(_, line)| line).collect()
    }

    #[test]
    fn moving_outside_combat_relocates_at_once() {
        let mut graph = corridor();
        let mut player = Player::new("alice", 1, 50, None);
        graph.add_presence(1, "alice");

        assert_eq!(player.try_move(&mut graph, Direction::North), MoveOutcome::Blocked);
        assert_eq!(player.try_move(&mut graph, Direction::East), MoveOutcome::Moved(2));
        assert_eq!(player.cell, 2);
        assert_eq!(player.state, PlayerState::Moved);
        assert_eq!(graph.cells_with("alice"), vec![2]);

        let mut rng = StdRng::seed_from_u64(1);
        let lines = run(&mut player, &mut graph, &Rules::default(), &mut rng, 1);
        assert_eq!(lines[0], "Cellar");
        assert_eq!(player.state, PlayerState::Idle);
    }

    #[test]
    fn moving_in_combat_starts_an_escape() {
        let mut graph = corridor();
        let mut player = Player::new("alice", 1, 50, None);
        graph.add_presence(1, "alice");
        player.state = PlayerState::Attack;

        assert_eq!(player.try_move(&mut graph, Direction::East), MoveOutcome::Escaping(2));
        assert_eq!(player.state, PlayerState::Escaping);
        assert_eq!(player.escape_to, Some(2));
        assert_eq!(player.cell, 1);
    }

    #[test]
    fn escape_resolves_after_the_action_window() {
        let rules = Rules::default();
        let window = rules.action_interval_ms.div_ceil(rules.tick_ms) as usize;
        let mut graph = corridor();
        let mut rng = StdRng::seed_from_u64(3);
        let mut player = Player::new("alice", 1, 50, None);
        player.state = PlayerState::Attack;
        player.try_move(&mut graph, Direction::East);

        assert!(run(&mut player, &mut graph, &rules, &mut rng, window - 1).is_empty());
        let lines = run(&mut player, &mut graph, &rules, &mut rng, 1);
        assert_eq!(lines.len(), 1);
        assert!(lines[0] == "You successfully fled" || lines[0] == "You failed to flee");
        assert_eq!(player.escape_to, None);
        assert_eq!(player.elapsed_ms, 0);
    }

    #[test]
    fn escape_succeeds_about_thirty_percent_of_the_time() {
        let rules = Rules::default();
        let window = rules.action_interval_ms.div_ceil(rules.tick_ms) as usize;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut fled = 0;
        let trials = 2000;
        for _ in 0..trials {
            let mut graph = corridor();
            let mut player = Player::new("alice", 1, 50, None);
            player.state = PlayerState::Attack;
            player.try_move(&mut graph, Direction::East);
            run(&mut player, &mut graph, &rules, &mut rng, window);
            if player.cell == 2 {
                fled += 1;
            } else {
                assert_eq!(player.state, PlayerState::Idle);
            }
        }
        let rate = fled as f64 / trials as f64;
        assert!((0.25..0.35).contains(&rate), "escape rate {rate}");
    }

    #[test]
    fn attack_fires_every_window_and_resets() {
        let rules = Rules::default();
        let window = rules.action_interval_ms.div_ceil(rules.tick_ms) as usize;
        let rat = crate::game::enemy::Enemy::from_archetype(
            "rat",
            &crate::game::enemy::Archetype {
                hp: 10,
                dmg: 1,
                def: 0,
                aggro: false,
                attack_msg: "bites".into(),
                drops: vec![],
            },
        );
        let mut graph = CellGraph::new(vec![Cell::new(1, "Hall").with_enemy(rat)], None).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let mut player = Player::new("alice", 1, 50, None);
        player.state = PlayerState::Attack;
        player.target = Some(EnemyRef { cell: 1, index: 0 });

        assert!(run(&mut player, &mut graph, &rules, &mut rng, window - 1).is_empty());
        assert_eq!(run(&mut player, &mut graph, &rules, &mut rng, 1).len(), 1);
        assert_eq!(player.elapsed_ms, 0);
        run(&mut player, &mut graph, &rules, &mut rng, window);
        assert_eq!(graph.get(1).unwrap().enemies[0].hp, 8);
        assert_eq!(player.state, PlayerState::Attack);
    }
}
