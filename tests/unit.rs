//! Unit tests for core value types.
mod common;
use common::*;
use kumiki::error::{DefinitionError, GeneratorError};
use kumiki::options::GridOptions;
use kumiki::prelude::*;

#[test]
fn test_field_value_display() {
    assert_eq!(format!("{}", FieldValue::Number(42.0)), "42");
    assert_eq!(format!("{}", FieldValue::Number(-2.5)), "-2.5");
    assert_eq!(format!("{}", FieldValue::Bool(true)), "TRUE");
    assert_eq!(format!("{}", FieldValue::Text("hi".to_string())), "hi");
}

#[test]
fn test_field_value_conversions() {
    assert_eq!(FieldValue::Text(" 3.5 ".to_string()).as_f64(), Some(3.5));
    assert_eq!(FieldValue::Bool(true).as_f64(), None);
    assert_eq!(FieldValue::Text("FALSE".to_string()).as_bool(), Some(false));
    assert_eq!(FieldValue::Number(1.0).as_bool(), None);
}

#[test]
fn test_grid_snaps_to_cell_centres() {
    let grid = GridOptions {
        spacing: 20.0,
        snap: true,
    };
    assert_eq!(grid.snap_value(0.0), 10.0);
    assert_eq!(grid.snap_value(19.0), 10.0);
    assert_eq!(grid.snap_value(21.0), 30.0);
    assert_eq!(grid.snap_value(-11.0), -10.0);

    let off = GridOptions {
        spacing: 20.0,
        snap: false,
    };
    assert_eq!(off.snap_value(13.0), 13.0);
}

#[test]
fn test_options_from_partial_json() {
    let options: WorkspaceOptions =
        serde_json::from_str(r#"{"rtl": true, "grid": {"spacing": 25}, "renderer": "basic"}"#).unwrap();

    assert!(options.rtl);
    assert_eq!(options.grid.spacing, 25.0);
    assert!(!options.grid.snap);
    assert_eq!(options.renderer, RendererKind::Basic);
    assert_eq!(options.view, Size::new(400.0, 400.0));
    assert_eq!(options.zoom.max_scale, 3.0);
    assert_eq!(options.constants.min_block_height, 24.0);
}

#[test]
fn test_rect_geometry() {
    let a = Rect::new(0.0, 10.0, 0.0, 20.0);
    let b = Rect::new(10.0, 30.0, 5.0, 8.0);
    let c = Rect::new(11.0, 30.0, 5.0, 8.0);

    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
    assert_eq!(a.union(&c), Rect::new(0.0, 30.0, 0.0, 20.0));
    assert_eq!(a.translate(1.0, 2.0), Rect::new(2.0, 12.0, 1.0, 21.0));
    assert_eq!(a.width(), 20.0);
    assert!(a.contains(Coordinate::new(20.0, 10.0)));
    assert_eq!(
        Rect::from_origin(Coordinate::new(3.0, 4.0), Size::new(5.0, 6.0)),
        Rect::new(4.0, 10.0, 3.0, 8.0)
    );
}

#[test]
fn test_coordinate_arithmetic() {
    let a = Coordinate::new(1.0, 2.0);
    let b = Coordinate::new(0.5, -1.0);

    assert_eq!(a + b, Coordinate::new(1.5, 1.0));
    assert_eq!(a - b, Coordinate::new(0.5, 3.0));
    assert_eq!(a.translate(-1.0, -2.0), Coordinate::ORIGIN);
    assert_eq!(a.to_string(), "(1, 2)");
}

#[test]
fn test_connection_kinds_pair_up() {
    for kind in [
        ConnectionKind::Previous,
        ConnectionKind::Next,
        ConnectionKind::InputValue,
        ConnectionKind::Output,
    ] {
        assert_eq!(kind.opposite().opposite(), kind);
        assert_ne!(kind.is_superior(), kind.opposite().is_superior());
    }
    assert_eq!(ConnectionSlot::Input("DO".to_string()).to_string(), "input 'DO'");
    assert_eq!(ConnectionSlot::Next.to_string(), "next");
}

#[test]
fn test_collapsed_text_uses_field_labels() {
    let mut ws = standard_workspace();
    let compare = ws
        .append(&BlockState::new("logic_compare").with_field("OP", FieldValue::Text("LT".to_string())))
        .unwrap();
    let random = ws.create_block("math_random_float").unwrap();
    let num = ws.append(&number(12.0)).unwrap();

    assert_eq!(ws.block(&compare).unwrap().collapsed_text(), "<");
    assert_eq!(ws.block(&random).unwrap().collapsed_text(), "random fraction");
    assert_eq!(ws.block(&num).unwrap().collapsed_text(), "12");
}

#[test]
fn test_new_block_takes_definition_defaults() {
    let mut ws = standard_workspace();
    let id = ws.create_block("logic_boolean").unwrap();
    let block = ws.block(&id).unwrap();

    assert_eq!(block.field_value("BOOL"), Some(&FieldValue::Text("TRUE".to_string())));
    assert!(block.output_connection().is_some());
    assert!(block.previous_connection().is_none());
    assert!(block.is_movable() && block.is_deletable() && block.is_editable());
    assert!(!block.is_shadow());
}

#[test]
fn test_error_display() {
    let err = ConnectionError::Cyclic {
        parent: BlockId::from("a"),
        child: BlockId::from("b"),
    };
    assert!(err.to_string().contains("'a'"));
    assert!(err.to_string().contains("'b'"));

    let def_err = DefinitionError::UnknownCheckTag {
        block_type: "vec".to_string(),
        tag: "Vector".to_string(),
    };
    assert!(def_err.to_string().contains("Vector"));

    let ser_err = SerializationError::UnknownBlockType("nope".to_string());
    assert_eq!(ser_err.to_string(), "Block type 'nope' is not registered");

    let gen_err = GeneratorError::MissingEmitter("text".to_string());
    assert!(gen_err.to_string().contains("'text'"));
}
