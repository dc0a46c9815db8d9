use chrono::{DateTime, Utc};
use log::trace;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::logutil::escape_log;

pub type SessionId = Uuid;

/// Prefix on every line that does not come from the game world.
pub const SYSTEM_PREFIX: &str = "<= ";

/// Work for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// One line of text; the writer appends `\r\n`.
    Line(String),
    /// Flush and shut the socket down.
    Close,
}

/// # Connection Session
///
/// Protocol state for one connected client. The server owns every session
/// and is the only code that mutates them.
///
/// ## Lifecycle
///
/// 1. **Login** - waiting for a display name
/// 2. **Lobby** - name bound; chat goes to everyone else in the lobby
/// 3. **ChatRoom** - chat goes to the current room only
/// 4. **Game** - every line is a game command; the player entity lives in
///    the world under the session's name
///
/// Disconnect tears the session down from any state.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub peer: String,
    pub name: Option<String>,
    pub state: SessionState,
    pub room: Option<String>,
    pub connected_at: DateTime<Utc>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Login,
    Lobby,
    ChatRoom,
    Game,
}

impl Session {
    pub fn new(peer: impl Into<String>, outbound: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer: peer.into(),
            name: None,
            state: SessionState::Login,
            room: None,
            connected_at: Utc::now(),
            outbound,
        }
    }

    /// The bound name, or a placeholder while still logging in.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(login)")
    }

    /// Queue a system line (`<= ` prefixed).
    pub fn send(&self, text: &str) {
        self.send_raw(format!("{SYSTEM_PREFIX}{text}"));
    }

    /// Queue a line exactly as given; game output goes out unprefixed.
    pub fn send_raw(&self, line: impl Into<String>) {
        let line = line.into();
        trace!("-> {} {}", self.display_name(), escape_log(&line));
        // A closed channel means the writer is gone and a disconnect event
        // for this session is already on its way.
        let _ = self.outbound.send(Outbound::Line(line));
    }

    pub fn close(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }

    pub fn session_duration(&self) -> chrono::Duration {
        Utc::now() - self.connected_at
    }
}
