//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kumiki crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kumiki::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let registry = BlockRegistry::with_standard_library()?;
//! let mut workspace = Workspace::new(registry);
//!
//! let json = std::fs::read_to_string("path/to/workspace.json")?;
//! workspace.load_json(&json)?;
//! workspace.cleanup();
//!
//! for event in workspace.flush() {
//!     println!("{}", EventFormatter::format(&event));
//! }
//! # Ok(())
//! # }
//! ```

// Blocks and connections
pub use crate::block::{
    Block, BlockDefinition, BlockId, BlockRegistry, ConnectionKind, ConnectionRef, ConnectionSlot,
    FieldDefinition, FieldValue, InputDefinition,
};

// Workspace
pub use crate::options::{RendererKind, WorkspaceOptions};
pub use crate::workspace::{DisplayWorkspace, DragOutcome, ToolboxDefinition, Workspace};

// Geometry
pub use crate::geometry::{Coordinate, Rect, Size};

// Events
pub use crate::events::{Event, EventFormatter, EventKind, EventPayload};

// Serialization
pub use crate::serialization::{BlockState, IntoWorkspaceState, WorkspaceArchive, WorkspaceState};

// Code generation
pub use crate::generator::{BlockNode, Code, Generator};

// Error types
pub use crate::error::{ConnectionError, SerializationError, WorkspaceError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
