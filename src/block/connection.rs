use super::BlockId;
use crate::geometry::Coordinate;
use crate::serialization::BlockState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four kinds of socket a block can carry.
///
/// Statement inputs hold a `Next` connection, so a statement socket pairs with a
/// previous connection just like the bottom of a block does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Previous,
    Next,
    InputValue,
    Output,
}

impl ConnectionKind {
    /// The only kind this kind may pair with.
    pub fn opposite(self) -> ConnectionKind {
        match self {
            ConnectionKind::Previous => ConnectionKind::Next,
            ConnectionKind::Next => ConnectionKind::Previous,
            ConnectionKind::InputValue => ConnectionKind::Output,
            ConnectionKind::Output => ConnectionKind::InputValue,
        }
    }

    /// Superior connections own the block attached to them.
    pub fn is_superior(self) -> bool {
        matches!(self, ConnectionKind::Next | ConnectionKind::InputValue)
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionKind::Previous => "previous",
            ConnectionKind::Next => "next",
            ConnectionKind::InputValue => "input value",
            ConnectionKind::Output => "output",
        };
        f.write_str(name)
    }
}

/// Where a connection lives on its block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionSlot {
    Previous,
    Next,
    Output,
    Input(String),
}

impl fmt::Display for ConnectionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionSlot::Previous => f.write_str("previous"),
            ConnectionSlot::Next => f.write_str("next"),
            ConnectionSlot::Output => f.write_str("output"),
            ConnectionSlot::Input(name) => write!(f, "input '{}'", name),
        }
    }
}

/// A non-owning pointer to a connection on some block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionRef {
    pub block: BlockId,
    pub slot: ConnectionSlot,
}

impl ConnectionRef {
    pub fn new(block: impl Into<BlockId>, slot: ConnectionSlot) -> Self {
        Self {
            block: block.into(),
            slot,
        }
    }

    pub fn previous(block: impl Into<BlockId>) -> Self {
        Self::new(block, ConnectionSlot::Previous)
    }

    pub fn next(block: impl Into<BlockId>) -> Self {
        Self::new(block, ConnectionSlot::Next)
    }

    pub fn output(block: impl Into<BlockId>) -> Self {
        Self::new(block, ConnectionSlot::Output)
    }

    pub fn input(block: impl Into<BlockId>, name: impl Into<String>) -> Self {
        Self::new(block, ConnectionSlot::Input(name.into()))
    }
}

impl fmt::Display for ConnectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of '{}'", self.slot, self.block)
    }
}

/// A typed socket belonging to one block.
#[derive(Debug, Clone)]
pub struct Connection {
    pub(crate) kind: ConnectionKind,
    pub(crate) check: Vec<String>,
    pub(crate) target: Option<ConnectionRef>,
    pub(crate) shadow_state: Option<BlockState>,
    pub(crate) offset: Coordinate,
}

impl Connection {
    pub fn new(kind: ConnectionKind, check: Vec<String>) -> Self {
        Self {
            kind,
            check,
            target: None,
            shadow_state: None,
            offset: Coordinate::ORIGIN,
        }
    }

    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }

    /// Type tags accepted by this connection. Empty accepts anything.
    pub fn check(&self) -> &[String] {
        &self.check
    }

    pub fn target(&self) -> Option<&ConnectionRef> {
        self.target.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }

    /// Saved state of the shadow block respawned when this socket empties.
    pub fn shadow_state(&self) -> Option<&BlockState> {
        self.shadow_state.as_ref()
    }

    /// Position of the connection relative to its block's origin, as of the last render.
    pub fn offset(&self) -> Coordinate {
        self.offset
    }

    /// Whether the type checks of two connections allow them to pair.
    pub fn checks_compatible(&self, other: &Connection) -> bool {
        checks_intersect(&self.check, &other.check)
    }
}

/// Empty check lists are wildcards; otherwise the lists must share a tag.
pub fn checks_intersect(a: &[String], b: &[String]) -> bool {
    a.is_empty() || b.is_empty() || a.iter().any(|tag| b.contains(tag))
}

