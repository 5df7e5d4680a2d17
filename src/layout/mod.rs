//! Workspace-wide layout: the clean-up arrangement and the viewport.

pub mod cleanup;
pub mod viewport;

pub use viewport::{ViewportMetrics, ViewportState, ZOOM_TO_FIT_MARGIN};
