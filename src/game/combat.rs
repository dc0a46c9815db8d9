//! Damage resolution for both sides of a fight.
//!
//! Both functions are pure apart from the hit-point mutation on the target.
//! Nothing here handles death: hit points keep falling past zero.

use crate::fonts::Fonts;

use super::enemy::Enemy;
use super::player::Player;
use super::types::{HitPoints, Weapon};

/// Damage dealt by a bare-handed player.
pub const UNARMED_DAMAGE: HitPoints = 1;

/// Outcome of one attack, with the line shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strike {
    pub damage: HitPoints,
    pub message: String,
}

/// Raw player damage before any policy: fixed for fists, weapon damage minus
/// enemy defense otherwise. The armed result may be zero or negative.
pub fn player_damage(weapon: Option<&Weapon>, enemy_defense: HitPoints) -> HitPoints {
    match weapon {
        None => UNARMED_DAMAGE,
        Some(weapon) => weapon.damage - enemy_defense,
    }
}

/// With clamping on, negative damage becomes zero instead of healing the target.
pub fn apply_damage_policy(damage: HitPoints, clamp: bool) -> HitPoints {
    if clamp {
        damage.max(0)
    } else {
        damage
    }
}

fn weapon_flavor(weapon: &Weapon, enemy: &str) -> String {
    match weapon.name.as_str() {
        "baseball_bat" => format!("You swang the baseball bat at {enemy}"),
        "knife" => format!("You stabbed {enemy} with your knife"),
        "pistol" => format!("You fire the pistol at {enemy}, and the bullet landed in the target"),
        other => format!("You hit {enemy} with your {}", other.replace('_', " ")),
    }
}

/// Player hits enemy. Enemy hit points drop by the computed damage unconditionally.
pub fn resolve_player_attack(
    player: &Player,
    enemy: &mut Enemy,
    clamp: bool,
    fonts: &Fonts,
) -> Strike {
    let damage = apply_damage_policy(player_damage(player.weapon.as_ref(), enemy.def), clamp);
    enemy.hp -= damage;

    let opening = match &player.weapon {
        None => format!(
            "You tried punching the {} with your fist, but it hardly registered",
            enemy.name
        ),
        Some(weapon) => weapon_flavor(weapon, &fonts.enemy(&enemy.name)),
    };
    Strike {
        damage,
        message: format!(
            "{opening}, inflicting {} dmg.",
            fonts.damage(&damage.to_string())
        ),
    }
}

/// Enemy hits player for its flat damage; players have no defense.
pub fn resolve_enemy_attack(
    enemy: &Enemy,
    player: &mut Player,
    clamp: bool,
    fonts: &Fonts,
) -> Strike {
    let damage = apply_damage_policy(enemy.dmg, clamp);
    player.hp -= damage;
    Strike {
        damage,
        message: format!(
            "{} {}, causing {} dmg (Your HP:{})",
            fonts.enemy(&enemy.name),
            enemy.attack_msg,
            fonts.damage(&damage.to_string()),
            player.hp
        ),
    }
}
