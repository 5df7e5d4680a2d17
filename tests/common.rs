//! Common test utilities for building workspaces and recording events.
use kumiki::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// A workspace with the standard block library and default options.
#[allow(dead_code)]
pub fn standard_workspace() -> Workspace {
    workspace_with_options(WorkspaceOptions::default())
}

#[allow(dead_code)]
pub fn workspace_with_options(options: WorkspaceOptions) -> Workspace {
    let registry = BlockRegistry::with_standard_library().expect("standard library should register");
    Workspace::builder(registry).with_options(options).build()
}

/// A registry with small custom block types on top of the standard library:
///
/// - `stack`: previous + next, no inputs
/// - `value_any`: untyped output
/// - `socket_number`: statement block with a `Number`-checked value input `IN`
#[allow(dead_code)]
pub fn test_registry() -> BlockRegistry {
    let mut registry = BlockRegistry::with_standard_library().expect("standard library should register");
    registry
        .define(
            BlockDefinition::new("stack")
                .with_input(InputDefinition::dummy("LABEL").with_label("step"))
                .with_previous(&[])
                .with_next(&[]),
        )
        .expect("stack should register");
    registry
        .define(
            BlockDefinition::new("value_any")
                .with_input(InputDefinition::dummy("LABEL").with_label("any"))
                .with_output(&[]),
        )
        .expect("value_any should register");
    registry
        .define(
            BlockDefinition::new("socket_number")
                .with_input(InputDefinition::value("IN").with_check(&["Number"]).with_label("num"))
                .with_previous(&[])
                .with_next(&[]),
        )
        .expect("socket_number should register");
    registry
}

#[allow(dead_code)]
pub fn test_workspace() -> Workspace {
    Workspace::new(test_registry())
}

/// Subscribes a listener that appends every delivered event to a shared vector.
#[allow(dead_code)]
pub fn record_events(workspace: &mut Workspace) -> Rc<RefCell<Vec<Event>>> {
    let recorded = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&recorded);
    workspace.add_change_listener(move |event| sink.borrow_mut().push(event.clone()));
    recorded
}

/// Delivered events of one kind.
#[allow(dead_code)]
pub fn events_of_kind(events: &[Event], kind: EventKind) -> Vec<Event> {
    events.iter().filter(|e| e.kind() == kind).cloned().collect()
}

/// `math_number` record with a value.
#[allow(dead_code)]
pub fn number(value: f64) -> BlockState {
    BlockState::new("math_number").with_field("NUM", FieldValue::Number(value))
}

/// `text_print` whose TEXT input holds a number shadow.
#[allow(dead_code)]
pub fn print_with_shadow(shadow_id: &str, value: f64) -> BlockState {
    BlockState::new("text_print").with_shadow("TEXT", number(value).with_id(shadow_id))
}

/// Creates a top-level block at a position.
#[allow(dead_code)]
pub fn create_at(workspace: &mut Workspace, block_type: &str, x: f64, y: f64) -> BlockId {
    workspace
        .create_block_at(block_type, Coordinate::new(x, y))
        .expect("block type should be registered")
}

/// The peer of a connection, if any.
#[allow(dead_code)]
pub fn peer(workspace: &Workspace, connection: &ConnectionRef) -> Option<ConnectionRef> {
    workspace
        .get_block(&connection.block)
        .and_then(|block| block.connection(&connection.slot))
        .and_then(|conn| conn.target().cloned())
}

/// True when no two top-level stacks overlap.
#[allow(dead_code)]
pub fn top_bounds_disjoint(workspace: &Workspace) -> bool {
    let bounds: Vec<Rect> = workspace
        .top_block_ids()
        .iter()
        .filter_map(|id| workspace.block_bounds(id))
        .collect();
    bounds.iter().enumerate().all(|(i, a)| {
        bounds[i + 1..].iter().all(|b| !a.intersects(b))
    })
}
