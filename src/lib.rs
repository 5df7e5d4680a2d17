//! # Kumiki - Block-Based Visual Programming Core
//!
//! **Kumiki** is the engine behind a block-based programming editor: the graph of
//! blocks joined through typed connections, the geometry engine that measures each
//! block into rows and draws its outline, workspace layout (clean-up, zoom and
//! scroll), an ordered event bus, and JSON serialization. Toolbox widgets, pointer
//! handling and the target language are left to the embedding application.
//!
//! ## Core Workflow
//!
//! 1.  **Register Block Types**: Build a `BlockRegistry`, either from the standard library or from your own JSON definitions. Type-check tags are validated at this point.
//! 2.  **Build a Workspace**: Use `Workspace::builder` with your `WorkspaceOptions` (RTL, grid, zoom, renderer).
//! 3.  **Edit**: Create blocks, `connect` and `disconnect` them, drag them, or `load` a saved workspace. Every mutation re-renders the affected stack and queues change events.
//! 4.  **Flush**: Call `flush()` to deliver queued events to listeners and settle the viewport.
//! 5.  **Export**: Save to JSON, archive to a binary file, export SVG, or generate code with a `Generator`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kumiki::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let registry = BlockRegistry::with_standard_library()?;
//!     let mut workspace = Workspace::builder(registry)
//!         .with_options(WorkspaceOptions::default().with_grid(20.0, true))
//!         .build();
//!
//!     workspace.add_change_listener(|event| println!("{}", EventFormatter::format(event)));
//!
//!     // 1 + 2, printed.
//!     let print = workspace.create_block("text_print")?;
//!     let sum = workspace.create_block("math_arithmetic")?;
//!     let one = workspace.create_block("math_number")?;
//!     let two = workspace.create_block("math_number")?;
//!     workspace.set_field_value(&one, "NUM", FieldValue::Number(1.0))?;
//!     workspace.set_field_value(&two, "NUM", FieldValue::Number(2.0))?;
//!     workspace.connect(&ConnectionRef::input(sum.clone(), "A"), &ConnectionRef::output(one))?;
//!     workspace.connect(&ConnectionRef::input(sum.clone(), "B"), &ConnectionRef::output(two))?;
//!     workspace.connect(&ConnectionRef::input(print, "TEXT"), &ConnectionRef::output(sum))?;
//!
//!     workspace.cleanup();
//!     workspace.flush();
//!
//!     let generator = kumiki::generator::javascript::builder().build();
//!     println!("{}", generator.workspace_to_code(&workspace)?);
//!     println!("{}", workspace.save_json());
//!     Ok(())
//! }
//! ```

pub mod block;
pub mod error;
pub mod events;
pub mod generator;
pub mod geometry;
pub mod layout;
pub mod options;
pub mod prelude;
pub mod render;
pub mod serialization;
pub mod workspace;

#[cfg(feature = "python-bindings")]
mod python;
