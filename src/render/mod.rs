//! Measuring blocks and drawing them as SVG paths.
//!
//! A [`Renderer`] measures a whole stack into [`RenderInfo`]s, children first,
//! draws each block's outline with the [`Drawer`], and hands the path data to a
//! [`PathObject`]. The result is written back to the workspace in one step.

pub mod colour;
pub mod constants;
#[cfg(feature = "debug-tools")]
pub mod debug;
pub mod drawer;
pub mod highlighter;
pub mod info;
pub mod measurables;
pub mod path_object;
pub mod renderer;
pub mod row;
pub mod svg;
pub mod svg_paths;

pub use colour::BlockStyle;
pub use constants::{ConstantProvider, ShapeKind};
pub use drawer::Drawer;
pub use info::{ConnectedBlock, ElementPlacement, PlacedElement, RenderInfo};
pub use path_object::{BasicPathObject, GerasPathObject, PathLayer, PathObject, PathRole};
pub use renderer::{RenderPass, RenderedBlock, Renderer};
