use crate::block::{BlockId, ConnectionKind};
use thiserror::Error;

/// Why two connections refused to pair.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IncompatibleReason {
    #[error("a block cannot connect to itself")]
    SelfConnection,

    #[error("{0} and {1} are not complementary connection kinds")]
    WrongKind(ConnectionKind, ConnectionKind),

    #[error("type checks {0:?} and {1:?} share no tag")]
    ChecksFailed(Vec<String>, Vec<String>),

    #[error("block '{0}' is already connected there")]
    AlreadyConnected(BlockId),

    #[error("a shadow block cannot hold the non-shadow block '{0}'")]
    ShadowParent(BlockId),

    #[error("block '{block}' has no {slot} connection")]
    MissingConnection { block: BlockId, slot: String },
}

/// Errors raised by `Workspace::connect` and friends.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    #[error(
        "Cannot connect {source_kind} of block '{source_block}' to {target_kind} of block '{target_block}': {reason}"
    )]
    Incompatible {
        source_block: BlockId,
        source_kind: ConnectionKind,
        target_block: BlockId,
        target_kind: ConnectionKind,
        reason: IncompatibleReason,
    },

    #[error("Connecting block '{child}' under block '{parent}' would create a cycle")]
    Cyclic { parent: BlockId, child: BlockId },

    #[error("Block '{0}' has been disposed or never existed")]
    DisposedReference(BlockId),
}

/// Errors raised while registering block definitions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Block type '{block_type}' uses the unregistered check tag '{tag}'")]
    UnknownCheckTag { block_type: String, tag: String },

    #[error("Block type '{block_type}' declares input '{input}' more than once")]
    DuplicateInput { block_type: String, input: String },

    #[error("Block type '{block_type}' declares a dummy input '{input}' with a type check")]
    CheckOnDummyInput { block_type: String, input: String },

    #[error("Block type '{block_type}' has both an output and a previous connection")]
    OutputAndPrevious { block_type: String },

    #[error("Block type '{block_type}' has colour '{colour}', expected #rgb or #rrggbb")]
    InvalidColour { block_type: String, colour: String },

    #[error("Failed to parse block definitions: {0}")]
    JsonParseError(String),
}

/// Errors raised while measuring or drawing blocks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Block '{0}' is referenced by a connection but is not in the workspace")]
    MissingBlock(BlockId),

    #[error("Block '{0}' was reached twice while rendering its stack")]
    Cycle(BlockId),
}

/// Errors raised by workspace operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkspaceError {
    #[error("Block '{0}' has been disposed or never existed")]
    DisposedReference(BlockId),

    #[error("The workspace has been disposed")]
    WorkspaceDisposed,

    #[error("Block type '{0}' is not registered")]
    UnknownBlockType(String),

    #[error("Block '{block}' has no field named '{field}'")]
    UnknownField { block: BlockId, field: String },

    #[error("Block '{0}' is not a top-level block and cannot be moved on its own")]
    NotTopLevel(BlockId),

    #[error("Block '{0}' is not movable")]
    Immovable(BlockId),

    #[error("A drag is already in progress for block '{0}'")]
    DragInProgress(BlockId),

    #[error("No drag is in progress")]
    NoDragInProgress,

    #[error("Invalid toolbox state: {0}")]
    InvalidToolboxState(String),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors raised while loading or saving workspace state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    #[error("Failed to parse workspace JSON: {0}")]
    JsonParseError(String),

    #[error("Block type '{0}' is not registered")]
    UnknownBlockType(String),

    #[error("Block type '{block_type}' has no input named '{input}'")]
    UnknownInput { block_type: String, input: String },

    #[error("Block type '{block_type}' has no field named '{field}'")]
    UnknownField { block_type: String, field: String },

    #[error("Block type '{block_type}' has no {connection} connection to attach '{child_type}' to")]
    MissingConnection {
        block_type: String,
        connection: String,
        child_type: String,
    },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error(transparent)]
    Conversion(#[from] StateConversionError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// Errors raised when converting a custom format into workspace state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors raised by code generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("No emitter registered for block type '{0}'")]
    MissingEmitter(String),

    #[error("Emitter for '{block_type}' returned a {found} where a {expected} was expected")]
    WrongCodeKind {
        block_type: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Block '{0}' has no input named '{1}'")]
    UnknownInput(BlockId, String),
}
