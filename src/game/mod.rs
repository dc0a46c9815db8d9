//! Tick-driven adventure world.
//! Cells form a static graph loaded from JSON; players and enemies run small
//! timer-driven state machines advanced by [`World::tick`].

pub mod cell;
pub mod combat;
pub mod commands;
pub mod enemy;
pub mod errors;
pub mod loader;
pub mod player;
pub mod trigger;
pub mod types;
pub mod world;

pub use cell::{Cell, CellGraph};
pub use commands::{parse as parse_command, GameCommand};
pub use enemy::{Archetype, Enemy, EnemyState};
pub use errors::WorldError;
pub use loader::{build_graph, load_world_from_json, parse_world, WorldDocument, WorldSummary};
pub use player::{MoveOutcome, Player, PlayerState};
pub use trigger::{Trigger, TriggerEffect};
pub use types::*;
pub use world::{GameFlow, Outbox, Rules, World};
