//! # rpgchat - Chat Lobby and Real-Time Adventure Server
//!
//! rpgchat is a line-based TCP server. Clients pick a display name, chat in a
//! shared lobby or named rooms, and can step into a small shared world where
//! they walk a graph of cells and fight enemies on a fixed-interval clock.
//!
//! ## Features
//!
//! - **Lobby and rooms**: `/rooms`, `/join <room>`, `/leave`, `/quit`, `/game`.
//! - **Shared world**: cells loaded from a JSON document, enemies built from
//!   archetypes, aggressive enemies, timed attacks and escape attempts.
//! - **Single owner**: one task owns every session, room and entity, so ticks
//!   and commands never interleave.
//! - **Terminal styling**: optional 16-color SGR output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpgchat::chat::ChatServer;
//! use rpgchat::config::Config;
//! use rpgchat::fonts::Fonts;
//! use rpgchat::game::{load_world_from_json, Rules, World};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let graph = load_world_from_json(&config.world.path, config.world.start_cell)?;
//!     let fonts = Fonts::new(config.server.colors);
//!     let world = World::new(graph, Rules::from_config(&config), fonts);
//!
//!     let mut server = ChatServer::new(config, world);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`chat`] - server loop, sessions, rooms, lobby commands, line transport
//! - [`game`] - cell graph, players, enemies, combat, triggers, world loading
//! - [`config`] - configuration loading and validation
//! - [`fonts`] - SGR text styling
//! - [`validation`] - display-name checks
//! - [`logutil`] - log-safe escaping of user text
//! - [`metrics`] - process-wide counters

pub mod chat;
pub mod config;
pub mod fonts;
pub mod game;
pub mod logutil;
pub mod metrics;
pub mod validation;
