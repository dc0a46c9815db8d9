//! Network side: sessions, the lobby, chat rooms and line transport.
//! [`ChatServer`] owns all of it and hands GAME-state input to the
//! [`crate::game::World`].

pub mod commands;
pub mod connection;
pub mod rooms;
pub mod server;
pub mod session;

pub use commands::{LobbyCommand, LobbyCommandParser};
pub use connection::{LineFramer, ServerEvent};
pub use rooms::ChatRooms;
pub use server::ChatServer;
pub use session::{Outbound, Session, SessionId, SessionState};
