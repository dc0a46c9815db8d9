use thiserror::Error;

use super::types::CellId;

/// Errors raised while loading or assembling the game world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Wrapper around IO errors (missing world file, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The world document is not valid JSON for the expected shape.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A cell places an enemy whose archetype is not defined.
    #[error("cell {cell} references unknown enemy archetype '{name}'")]
    UnknownArchetype { cell: CellId, name: String },

    /// A `name(count)` placement has an unreadable or oversized count.
    #[error("cell {cell} has malformed placement '{text}'")]
    BadPlacement { cell: CellId, text: String },

    /// Two cells share one id.
    #[error("duplicate cell id {0}")]
    DuplicateCell(CellId),

    /// The configured or declared start cell does not exist.
    #[error("start cell {0} does not exist")]
    UnknownStartCell(CellId),

    /// The document defines no cells at all.
    #[error("world has no cells")]
    Empty,
}
