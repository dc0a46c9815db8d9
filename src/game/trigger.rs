//! Cell-attached triggers.
//!
//! A trigger is a named capability placed on a cell by the world document.
//! Players run one with the in-game `use <name>` command while standing in
//! that cell. Names resolve against a fixed registry; the world loader skips
//! names the registry does not know.

use std::fmt;

use super::player::Player;

/// What the server must do after a trigger runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEffect {
    /// Take the actor out of the game and back to the lobby.
    ReturnToLobby,
}

pub trait Trigger: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn execute(&self, actor: &Player) -> TriggerEffect;
}

impl fmt::Debug for dyn Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger").field("name", &self.name()).finish()
    }
}

/// The way out: ejects the holder to the lobby.
#[derive(Debug)]
pub struct ExitTrigger;

impl Trigger for ExitTrigger {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn description(&self) -> &'static str {
        "The way out"
    }

    fn execute(&self, actor: &Player) -> TriggerEffect {
        log::debug!("{} takes the exit in cell {}", actor.name, actor.cell);
        TriggerEffect::ReturnToLobby
    }
}

static EXIT: ExitTrigger = ExitTrigger;

static REGISTRY: &[&dyn Trigger] = &[&EXIT];

/// Look up a trigger by its document name.
pub fn lookup(name: &str) -> Option<&'static dyn Trigger> {
    REGISTRY.iter().copied().find(|t| t.name() == name)
}

/// Names known to the registry.
pub fn known_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|t| t.name())
}
