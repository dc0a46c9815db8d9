//! Test utilities & fixtures.
//! Builds servers around a small fixed world and fakes connections with
//! plain channels, so tests can read exactly what each client was sent.
#![allow(dead_code)]

use rpgchat::chat::{ChatServer, Outbound, SessionId};
use rpgchat::config::Config;
use rpgchat::fonts::Fonts;
use rpgchat::game::{build_graph, parse_world, Rules, World};
use tokio::sync::mpsc;

/// Five cells:
///
/// ```text
///   1 (gate) -e-> 2 (street) -e-> 3 (square, aggro zombie)
///                 2 -s-> 4 (store, passive rat)      3 -n-> 5 (church, exit)
/// ```
pub const WORLD_JSON: &str = r#"{
    "start": 1,
    "enemies": {
        "zombie": {"hp": 30, "dmg": 5, "def": 1, "aggro": true, "attack_msg": "bites you"},
        "rat": {"hp": 6, "dmg": 1, "aggro": false, "attack_msg": "nibbles your ankle"}
    },
    "items": {"knife": {"description": "A short knife"}},
    "cells": [
        {"id": 1, "description": "The town gate", "exits": {"e": 2}},
        {"id": 2, "description": "Main street", "items": ["knife"], "exits": {"w": 1, "e": 3, "s": 4}},
        {"id": 3, "description": "The town square", "enemies": ["zombie"], "exits": {"w": 2, "n": 5}},
        {"id": 4, "description": "A hardware store", "enemies": ["rat"], "exits": {"n": 2}},
        {"id": 5, "description": "The old church", "triggers": ["exit"], "exits": {"s": 3}}
    ]
}"#;

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.colors = false;
    config.game.rng_seed = Some(42);
    config
}

pub fn fixture_world(config: &Config) -> World {
    let doc = parse_world(WORLD_JSON).expect("fixture parses");
    let graph = build_graph(doc, config.world.start_cell).expect("fixture builds");
    World::new(graph, Rules::from_config(config), Fonts::plain())
}

pub fn server() -> ChatServer {
    let config = test_config();
    let world = fixture_world(&config);
    ChatServer::new(config, world)
}

pub fn server_without_world() -> ChatServer {
    let config = test_config();
    let world = World::empty(Rules::from_config(&config), Fonts::plain());
    ChatServer::new(config, world)
}

/// A fake connection: the receiving end of a session's outbound queue.
pub struct Client {
    pub id: SessionId,
    rx: mpsc::UnboundedReceiver<Outbound>,
    pub closed: bool,
}

impl Client {
    /// Everything sent since the last call.
    pub fn lines(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                Outbound::Line(line) => out.push(line),
                Outbound::Close => self.closed = true,
            }
        }
        out
    }
}

pub fn connect(server: &mut ChatServer) -> Client {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = server.connect("127.0.0.1:40000".to_string(), tx);
    Client {
        id,
        rx,
        closed: false,
    }
}

/// Connect and log in, discarding the greeting.
pub fn login(server: &mut ChatServer, name: &str) -> Client {
    let mut client = connect(server);
    server.handle_line(client.id, name);
    client.lines();
    client
}

pub fn ticks(server: &mut ChatServer, n: usize) {
    for _ in 0..n {
        server.tick();
    }
}

/// Ticks needed for one 2500 ms action window at 200 ms per tick.
pub const WINDOW: usize = 13;
