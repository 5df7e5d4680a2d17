//! Change events, the workspace-owned event bus and the deferred task queue.

pub mod bus;
pub mod filter;
pub mod formatter;
pub mod scheduler;

pub use bus::{EventBus, ListenerHandle};
pub use formatter::EventFormatter;
pub use scheduler::{Task, TaskQueue};

use crate::block::BlockId;
use crate::geometry::Coordinate;
use crate::serialization::BlockState;
use serde::Serialize;
use std::fmt;

/// Discriminant of an [`Event`], used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BlockCreate,
    BlockDelete,
    BlockMove,
    BlockChange,
    ViewportChange,
    FinishedLoading,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::BlockCreate => "create",
            EventKind::BlockDelete => "delete",
            EventKind::BlockMove => "move",
            EventKind::BlockChange => "change",
            EventKind::ViewportChange => "viewport_change",
            EventKind::FinishedLoading => "finished_loading",
        };
        f.write_str(name)
    }
}

/// Which property a [`EventPayload::BlockChange`] touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeElement {
    Field,
    Collapsed,
    Disabled,
    Inline,
    Comment,
}

/// Where a block sits: attached under a parent, or free at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub parent: Option<BlockId>,
    pub input: Option<String>,
    pub coordinate: Option<Coordinate>,
}

impl Placement {
    pub fn top_level(coordinate: Coordinate) -> Self {
        Self {
            parent: None,
            input: None,
            coordinate: Some(coordinate),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    BlockCreate {
        block: BlockId,
        /// The created block and all of its descendants.
        ids: Vec<BlockId>,
        state: Box<BlockState>,
    },
    BlockDelete {
        block: BlockId,
        ids: Vec<BlockId>,
        old_state: Box<BlockState>,
        was_shadow: bool,
    },
    /// Raised for drags, programmatic moves, connects and disconnects.
    BlockMove {
        block: BlockId,
        old: Placement,
        new: Placement,
        reason: Vec<String>,
    },
    BlockChange {
        block: BlockId,
        element: ChangeElement,
        name: Option<String>,
        old_value: serde_json::Value,
        new_value: serde_json::Value,
    },
    ViewportChange {
        view_top: f64,
        view_left: f64,
        scale: f64,
        old_scale: f64,
    },
    FinishedLoading,
}

/// An immutable record of one change to a workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub workspace_id: String,
    /// Events raised by one user action share a group.
    pub group: Option<String>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(workspace_id: impl Into<String>, group: Option<String>, payload: EventPayload) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            group,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::BlockCreate { .. } => EventKind::BlockCreate,
            EventPayload::BlockDelete { .. } => EventKind::BlockDelete,
            EventPayload::BlockMove { .. } => EventKind::BlockMove,
            EventPayload::BlockChange { .. } => EventKind::BlockChange,
            EventPayload::ViewportChange { .. } => EventKind::ViewportChange,
            EventPayload::FinishedLoading => EventKind::FinishedLoading,
        }
    }

    /// The block this event is about, if any.
    pub fn block_id(&self) -> Option<&BlockId> {
        match &self.payload {
            EventPayload::BlockCreate { block, .. }
            | EventPayload::BlockDelete { block, .. }
            | EventPayload::BlockMove { block, .. }
            | EventPayload::BlockChange { block, .. } => Some(block),
            EventPayload::ViewportChange { .. } | EventPayload::FinishedLoading => None,
        }
    }

    /// A null event records no actual change and is dropped before delivery.
    pub fn is_null(&self) -> bool {
        match &self.payload {
            EventPayload::BlockMove { old, new, .. } => old == new,
            EventPayload::BlockChange {
                old_value,
                new_value,
                ..
            } => old_value == new_value,
            _ => false,
        }
    }

    /// True for a move that attached the block to a parent.
    pub fn is_connect(&self) -> bool {
        matches!(&self.payload, EventPayload::BlockMove { new, .. } if new.parent.is_some())
    }

    /// True for a move that detached the block from a parent.
    pub fn is_disconnect(&self) -> bool {
        matches!(&self.payload, EventPayload::BlockMove { old, .. } if old.parent.is_some())
    }
}
