//! Saving and restoring blocks as JSON records, plus a binary archive format.

pub mod archive;
pub mod blocks;
pub mod conversion;
pub mod state;

pub use archive::WorkspaceArchive;
pub use blocks::APPEND_GAP;
pub use conversion::IntoWorkspaceState;
pub use state::{BlockState, BlocksState, ConnectionState, WorkspaceState};
