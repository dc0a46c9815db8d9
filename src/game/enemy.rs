//! Enemy entities and their IDLE/ATTACK state machine.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::combat;
use super::player::Player;
use super::types::{EnemyRef, HitPoints};
use super::world::Tick;

/// Enemy template from the world document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    pub hp: HitPoints,
    pub dmg: HitPoints,
    #[serde(default)]
    pub def: HitPoints,
    /// Attacks any present player unprompted. Accepts `true`/`false` or `1`/`0`.
    #[serde(default, deserialize_with = "flag")]
    pub aggro: bool,
    #[serde(default = "default_attack_msg")]
    pub attack_msg: String,
    #[serde(default)]
    pub drops: Vec<String>,
}

fn default_attack_msg() -> String {
    "attacks you".to_string()
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i == 1,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Idle,
    Attack,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub name: String,
    pub hp: HitPoints,
    pub dmg: HitPoints,
    pub def: HitPoints,
    pub aggro: bool,
    pub attack_msg: String,
    /// Carried from the archetype; nothing drops them yet.
    pub drops: Vec<String>,
    pub state: EnemyState,
    pub elapsed_ms: u64,
    /// Name of the player being attacked, resolved again on every firing.
    pub target: Option<String>,
}

impl Enemy {
    pub fn from_archetype(name: &str, archetype: &Archetype) -> Self {
        Self {
            name: name.to_string(),
            hp: archetype.hp,
            dmg: archetype.dmg,
            def: archetype.def,
            aggro: archetype.aggro,
            attack_msg: archetype.attack_msg.clone(),
            drops: archetype.drops.clone(),
            state: EnemyState::Idle,
            elapsed_ms: 0,
            target: None,
        }
    }

    pub fn is_targeting(&self, player: &str) -> bool {
        self.target.as_deref() == Some(player)
    }

    fn engage(&mut self, player: &str) {
        self.target = Some(player.to_string());
        self.state = EnemyState::Attack;
        self.elapsed_ms = 0;
    }

    fn disengage(&mut self) {
        self.target = None;
        self.state = EnemyState::Idle;
    }

    /// Advance one tick. `me` identifies this enemy, `present` is the owning
    /// cell's presence list and `players` the live in-game players.
    pub(crate) fn update(
        &mut self,
        me: EnemyRef,
        present: &[String],
        players: &mut BTreeMap<String, Player>,
        tick: &mut Tick<'_>,
    ) {
        match self.state {
            EnemyState::Idle => {
                // Fight back against anyone who picked this enemy first.
                let hostile = present.iter().find(|name| {
                    players
                        .get(name.as_str())
                        .is_some_and(|p| p.target == Some(me))
                });
                if let Some(name) = hostile {
                    self.engage(name);
                    return;
                }
                if !self.aggro {
                    return;
                }
                if let Some(name) = present.iter().find(|n| players.contains_key(n.as_str())) {
                    self.engage(name);
                    tick.outbox.send(
                        name,
                        format!("{} starts attacking YOU!", tick.fonts.enemy(&self.name)),
                    );
                }
            }
            EnemyState::Attack => {
                self.elapsed_ms += tick.rules.tick_ms;
                if self.elapsed_ms < tick.rules.action_interval_ms {
                    return;
                }
                let victim = self
                    .target
                    .as_deref()
                    .filter(|name| present.iter().any(|p| p == name))
                    .and_then(|name| players.get_mut(name));
                match victim {
                    Some(player) => {
                        let strike = combat::resolve_enemy_attack(
                            self,
                            player,
                            tick.rules.clamp_damage,
                            tick.fonts,
                        );
                        tick.outbox.send(&player.name, strike.message);
                    }
                    None => self.disengage(),
                }
                self.elapsed_ms = 0;
            }
        }
    }
}
