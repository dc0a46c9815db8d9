//! # Chat Server
//!
//! The owning task for every piece of shared state: sessions, the name index,
//! chat rooms and the game world. Connections never touch that state
//! directly. Their reader tasks send [`ServerEvent`]s over one channel, and
//! [`ChatServer::run`] handles those events and world ticks one at a time in
//! a single `tokio::select!` loop. A tick never interleaves with a command.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rpgchat::chat::ChatServer;
//! use rpgchat::config::Config;
//! use rpgchat::fonts::Fonts;
//! use rpgchat::game::{Rules, World};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let world = World::empty(Rules::from_config(&config), Fonts::plain());
//!     let mut server = ChatServer::new(config, world);
//!     server.bind().await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use super::commands::{LobbyCommand, LobbyCommandParser};
use super::connection::{read_lines, write_lines, ServerEvent};
use super::rooms::ChatRooms;
use super::session::{Outbound, Session, SessionId, SessionState};
use crate::config::Config;
use crate::fonts::Fonts;
use crate::game::{self, GameFlow, World};
use crate::logutil::escape_log;
use crate::metrics;
use crate::validation::validate_display_name;

const STATS_INTERVAL: Duration = Duration::from_secs(60);

pub struct ChatServer {
    config: Config,
    world: World,
    fonts: Fonts,
    sessions: HashMap<SessionId, Session>,
    /// Bound display name -> session. Case-sensitive.
    names: HashMap<String, SessionId>,
    rooms: ChatRooms,
    parser: LobbyCommandParser,
    listener: Option<TcpListener>,
    events_tx: mpsc::UnboundedSender<ServerEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<ServerEvent>>,
}

impl ChatServer {
    pub fn new(config: Config, world: World) -> Self {
        let fonts = Fonts::new(config.server.colors);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            world,
            fonts,
            sessions: HashMap::new(),
            names: HashMap::new(),
            rooms: ChatRooms::new(),
            parser: LobbyCommandParser::new(),
            listener: None,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Bind the configured listen address. Returns the bound address.
    pub async fn bind(&mut self) -> Result<SocketAddr> {
        let addr = self.config.server.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
        let local = listener.local_addr()?;
        info!("Listening on {}", local);
        self.listener = Some(listener);
        Ok(local)
    }

    /// Main loop: accept connections, handle connection events and run world
    /// ticks until ctrl-c. Ticks that fall behind are delayed, never skipped
    /// or run concurrently.
    pub async fn run(&mut self) -> Result<()> {
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => {
                self.bind().await?;
                self.listener
                    .take()
                    .ok_or_else(|| anyhow!("listener missing after bind"))?
            }
        };
        let mut events = self
            .events_rx
            .take()
            .ok_or_else(|| anyhow!("server is already running"))?;

        let period = Duration::from_millis(self.config.world.tick_interval_ms);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut stats = tokio::time::interval(STATS_INTERVAL);
        stats.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            "'{}' chat server started ({} ms ticks, game {})",
            self.config.server.name,
            self.config.world.tick_interval_ms,
            if self.world.is_available() { "available" } else { "unavailable" }
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let (read_half, write_half) = stream.into_split();
                            let (out_tx, out_rx) = mpsc::unbounded_channel();
                            let (close_tx, close_rx) = oneshot::channel();
                            let id = self.connect(peer.to_string(), out_tx);
                            let max = self.config.server.max_line_len;
                            tokio::spawn(read_lines(read_half, id, max, self.events_tx.clone(), close_rx));
                            tokio::spawn(write_lines(write_half, out_rx, close_tx));
                        }
                        Err(e) => warn!("Accept failed: {}", e),
                    }
                }

                Some(event) = events.recv() => {
                    self.handle_event(event);
                }

                _ = ticker.tick() => {
                    let started = Instant::now();
                    self.tick();
                    let took = started.elapsed();
                    if took > period {
                        metrics::inc_tick_overruns();
                        warn!("World tick took {:?}, longer than the {:?} period", took, period);
                    }
                }

                _ = stats.tick() => {
                    let snap = metrics::snapshot();
                    debug!(
                        "stats: sessions={} rooms={} playing={} ticks={} overruns={} peak={}",
                        self.sessions.len(),
                        self.rooms.len(),
                        self.world.player_count(),
                        snap.ticks,
                        snap.tick_overruns,
                        snap.game.concurrent_peak
                    );
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        for session in self.sessions.values() {
            session.send("Server shutting down");
            session.close();
        }
        Ok(())
    }

    /// Register a new connection and greet it. `outbound` feeds the
    /// connection's writer.
    pub fn connect(&mut self, peer: String, outbound: mpsc::UnboundedSender<Outbound>) -> SessionId {
        let session = Session::new(peer, outbound);
        let id = session.id;
        session.send(&format!(
            "{}{}{}",
            self.fonts.system("Welcome to the "),
            self.fonts.banner(&self.config.server.name),
            self.fonts.system(" chat server")
        ));
        session.send(&self.fonts.system("Login Name?"));
        info!("Session {} connected from {}", id, session.peer);
        metrics::inc_sessions_opened();
        self.sessions.insert(id, session);
        id
    }

    pub fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Line { id, line } => self.handle_line(id, &line),
            ServerEvent::Disconnected { id, abrupt } => self.disconnect(id, abrupt),
        }
    }

    /// Dispatch one inbound line by the session's current state.
    pub fn handle_line(&mut self, id: SessionId, line: &str) {
        let Some(session) = self.sessions.get(&id) else {
            debug!("Line for unknown session {}", id);
            return;
        };
        let state = session.state;
        debug!("{} [{:?}] {}", session.display_name(), state, escape_log(line));

        match state {
            SessionState::Login => self.handle_login(id, line),
            SessionState::Lobby | SessionState::ChatRoom => match self.parser.parse(line) {
                Some(cmd) => self.handle_lobby_command(id, cmd),
                None => self.handle_chat(id, line),
            },
            SessionState::Game => self.handle_game_line(id, line),
        }
    }

    fn handle_login(&mut self, id: SessionId, line: &str) {
        let fonts = self.fonts;
        let name = match validate_display_name(line) {
            Ok(name) => name.to_string(),
            Err(e) => {
                self.send_to(id, &fonts.warning(&e.to_string()));
                self.send_to(id, &fonts.system("Login Name?"));
                return;
            }
        };
        if self.names.contains_key(&name) {
            debug!("Login name '{}' already taken", escape_log(&name));
            self.send_to(id, &fonts.warning("Sorry, name taken."));
            self.send_to(id, &fonts.system("Login Name?"));
            return;
        }
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        session.name = Some(name.clone());
        session.state = SessionState::Lobby;
        session.send(&fonts.system(&format!("Welcome {}!", name)));
        info!("Session {} logged in as {}", id, escape_log(&name));
        self.names.insert(name, id);
    }

    fn handle_chat(&mut self, id: SessionId, text: &str) {
        let Some(session) = self.sessions.get(&id) else {
            return;
        };
        let line = format!("{}: {}", self.fonts.highlight(session.display_name()), text);
        match (session.state, session.room.clone()) {
            (SessionState::ChatRoom, Some(room)) => {
                let members = self.rooms.members(&room).map(<[String]>::to_vec).unwrap_or_default();
                for member in members {
                    self.send_to_name(&member, &line);
                }
            }
            _ => {
                for other in self.sessions.values() {
                    if other.state == SessionState::Lobby {
                        other.send(&line);
                    }
                }
            }
        }
    }

    fn handle_lobby_command(&mut self, id: SessionId, cmd: LobbyCommand) {
        let fonts = self.fonts;
        match cmd {
            LobbyCommand::Rooms => {
                let mut lines = vec![fonts.system("Active rooms are:")];
                for (room, count) in self.rooms.list() {
                    lines.push(format!("* {} ({})", room, count));
                }
                lines.push(fonts.system("end of list."));
                for line in lines {
                    self.send_to(id, &line);
                }
            }
            LobbyCommand::Join(room) => self.join_room(id, &room),
            LobbyCommand::Leave => {
                self.leave_room(id, false);
                if let Some(session) = self.sessions.get_mut(&id) {
                    session.state = SessionState::Lobby;
                }
            }
            LobbyCommand::Quit => {
                if let Some(session) = self.teardown(id, false) {
                    info!("{} quit", session.display_name());
                    session.send(&fonts.system("BYE"));
                    session.close();
                }
            }
            LobbyCommand::Game => self.enter_game(id),
            LobbyCommand::Invalid(msg) => self.send_to(id, &fonts.warning(&msg)),
            LobbyCommand::Unknown(verb) => {
                debug!("Unknown command '/{}'", escape_log(&verb));
                self.send_to(id, &fonts.warning("Illegal command"));
            }
        }
    }

    fn join_room(&mut self, id: SessionId, room: &str) {
        self.leave_room(id, false);
        let Some(name) = self.name_of(id) else {
            return;
        };
        let existing = self.rooms.join(room, &name);
        if let Some(session) = self.sessions.get_mut(&id) {
            session.room = Some(room.to_string());
            session.state = SessionState::ChatRoom;
        }
        debug!("{} joined room '{}'", name, escape_log(room));

        let fonts = self.fonts;
        self.send_to(id, &fonts.system(&format!("entering room: {}", room)));
        let members = self.rooms.members(room).map(<[String]>::to_vec).unwrap_or_default();
        for member in &members {
            if *member == name {
                self.send_to(id, &format!("* {} (** this is you)", fonts.highlight(member)));
            } else {
                self.send_to(id, &format!("* {}", member));
            }
        }
        self.send_to(id, &fonts.system("end of list."));
        for member in existing {
            self.send_to_name(&member, &format!("* new user joined chat: {}", name));
        }
    }

    /// Take the session out of its room, if any. Remaining members hear
    /// about it unless `abrupt`.
    fn leave_room(&mut self, id: SessionId, abrupt: bool) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        let Some(room) = session.room.take() else {
            return;
        };
        let Some(name) = session.name.clone() else {
            return;
        };
        let Some(remaining) = self.rooms.leave(&room, &name) else {
            return;
        };
        debug!("{} left room '{}'", name, escape_log(&room));
        if abrupt {
            return;
        }
        let notice = format!("* user has left chat: {}", name);
        for member in remaining {
            self.send_to_name(&member, &notice);
        }
        self.send_to(id, &format!("{} (** this is you)", notice));
    }

    fn enter_game(&mut self, id: SessionId) {
        let fonts = self.fonts;
        if !self.world.is_available() {
            self.send_to(id, &fonts.warning("The game world is unavailable."));
            return;
        }
        self.leave_room(id, false);
        let Some(name) = self.name_of(id) else {
            return;
        };
        if self.world.enter(&name).is_none() {
            self.send_to(id, &fonts.warning("The game world is unavailable."));
            return;
        }
        if let Some(session) = self.sessions.get_mut(&id) {
            session.state = SessionState::Game;
        }
        self.send_to(id, &fonts.system("Entering game..."));
    }

    fn handle_game_line(&mut self, id: SessionId, line: &str) {
        let Some(name) = self.name_of(id) else {
            return;
        };
        let flow = self.world.handle_command(&name, game::parse_command(line));
        self.flush_world_output();
        if flow == GameFlow::Left {
            if let Some(session) = self.sessions.get_mut(&id) {
                session.state = SessionState::Lobby;
            }
        }
    }

    /// Tear a session down after its connection went away.
    pub fn disconnect(&mut self, id: SessionId, abrupt: bool) {
        if let Some(session) = self.teardown(id, abrupt) {
            info!(
                "Session {} ({}) disconnected{} after {}s",
                id,
                session.display_name(),
                if abrupt { " abruptly" } else { "" },
                session.session_duration().num_seconds()
            );
        }
    }

    /// Release the name, room membership and player entity, and forget the
    /// session. Returns the removed session.
    fn teardown(&mut self, id: SessionId, abrupt: bool) -> Option<Session> {
        self.leave_room(id, abrupt);
        let session = self.sessions.remove(&id)?;
        if let Some(name) = &session.name {
            if session.state == SessionState::Game {
                self.world.leave(name);
            }
            self.names.remove(name);
        }
        metrics::inc_sessions_closed();
        Some(session)
    }

    /// Advance the world once and deliver what it produced.
    pub fn tick(&mut self) {
        self.world.tick();
        self.flush_world_output();
    }

    fn flush_world_output(&mut self) {
        for (name, line) in self.world.drain_outbox() {
            if let Some(session) = self.names.get(&name).and_then(|id| self.sessions.get(id)) {
                session.send_raw(line);
            }
        }
    }

    fn name_of(&self, id: SessionId) -> Option<String> {
        self.sessions.get(&id).and_then(|s| s.name.clone())
    }

    fn send_to(&self, id: SessionId, text: &str) {
        if let Some(session) = self.sessions.get(&id) {
            session.send(text);
        }
    }

    fn send_to_name(&self, name: &str, text: &str) {
        if let Some(id) = self.names.get(name) {
            self.send_to(*id, text);
        }
    }

    pub fn session_state(&self, id: SessionId) -> Option<SessionState> {
        self.sessions.get(&id).map(|s| s.state)
    }

    pub fn session_room(&self, id: SessionId) -> Option<String> {
        self.sessions.get(&id).and_then(|s| s.room.clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn rooms(&self) -> &ChatRooms {
        &self.rooms
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}
