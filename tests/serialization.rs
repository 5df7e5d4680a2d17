//! Tests for saving, loading, appending and archiving workspaces.
mod common;
use common::*;
use kumiki::error::StateConversionError;
use kumiki::prelude::*;
use kumiki::serialization::APPEND_GAP;

fn sample_program() -> WorkspaceState {
    let condition = BlockState::new("logic_compare")
        .with_field("OP", FieldValue::Text("LT".to_string()))
        .with_input("A", BlockState::new("variables_get").with_id("get_x"))
        .with_input("B", number(10.0));
    let body = BlockState::new("text_print")
        .with_id("print_body")
        .with_shadow("TEXT", number(1.0).with_id("body_shadow"))
        .with_next(
            BlockState::new("variables_set")
                .with_field("VAR", FieldValue::Text("x".to_string()))
                .with_input("VALUE", number(0.0)),
        );
    let loop_block = BlockState::new("controls_whileUntil")
        .with_id("loop")
        .at(20.0, 30.0)
        .with_input("BOOL", condition)
        .with_input("DO", body);
    let loose = BlockState::new("text")
        .with_field("TEXT", FieldValue::Text("hello".to_string()))
        .at(300.0, 40.0);
    WorkspaceState::new(vec![loop_block, loose])
}

#[test]
fn test_save_load_round_trip() {
    let mut ws = standard_workspace();
    ws.load(&sample_program()).unwrap();
    let saved = ws.save();

    let mut other = standard_workspace();
    other.load(&saved).unwrap();

    assert_eq!(other.save(), saved);
    assert_eq!(other.block_count(), ws.block_count());
}

#[test]
fn test_json_round_trip() {
    let mut ws = standard_workspace();
    ws.load(&sample_program()).unwrap();
    let json = ws.save_json();

    let mut other = standard_workspace();
    other.load_json(&json).unwrap();

    assert_eq!(other.save_json(), json);
}

#[test]
fn test_saved_json_shape() {
    let mut ws = standard_workspace();
    ws.load(&sample_program()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&ws.save_json()).unwrap();

    let top = &value["blocks"]["blocks"][0];
    assert_eq!(top["type"], "controls_whileUntil");
    assert_eq!(top["id"], "loop");
    assert_eq!(top["x"], 20.0);
    assert_eq!(top["y"], 30.0);
    assert!(top.get("enabled").is_none());
    let body = &top["inputs"]["DO"]["block"];
    assert_eq!(body["id"], "print_body");
    assert!(body.get("x").is_none());
    assert_eq!(body["inputs"]["TEXT"]["shadow"]["id"], "body_shadow");
    assert_eq!(body["next"]["block"]["type"], "variables_set");
    assert_eq!(value["blocks"]["languageVersion"], 0);
}

#[test]
fn test_loaded_flags_and_fields() {
    let mut ws = standard_workspace();
    let mut state = number(42.0).with_id("n").immovable();
    state.collapsed = true;
    state.enabled = false;
    state.comment = Some("answer".to_string());

    ws.append(&state).unwrap();

    let block = ws.block(&BlockId::from("n")).unwrap();
    assert!(!block.is_movable());
    assert!(block.is_collapsed());
    assert!(!block.is_enabled());
    assert_eq!(block.comment(), Some("answer"));
    assert_eq!(block.field_value("NUM"), Some(&FieldValue::Number(42.0)));
    assert_eq!(ws.save_block(&BlockId::from("n")).unwrap().without_ids(), state.without_ids().at(0.0, 0.0));
}

#[test]
fn test_append_twice_gives_independent_copies() {
    let mut ws = standard_workspace();
    let state = sample_program().top_blocks()[0].clone();

    let first = ws.append(&state).unwrap();
    let second = ws.append(&state).unwrap();

    assert_ne!(first, second);
    assert_eq!(ws.block_count(), 2 * state.block_count());
    let a = ws.save_block(&first).unwrap();
    let b = ws.save_block(&second).unwrap();
    assert_eq!(a.without_ids(), b.without_ids());
    let ids_a = ws.descendants(&first);
    let ids_b = ws.descendants(&second);
    assert!(ids_a.iter().all(|id| !ids_b.contains(id)));
}

#[test]
fn test_append_workspace_places_batch_below_content() {
    let mut ws = standard_workspace();
    ws.load(&sample_program()).unwrap();
    let existing = ws.content_bounds().unwrap();
    let batch = WorkspaceState::new(vec![
        number(1.0).at(500.0, -200.0),
        number(2.0).at(560.0, -150.0),
    ]);

    let ids = ws.append_workspace(&batch).unwrap();

    let added = ids
        .iter()
        .filter_map(|id| ws.block_bounds(id))
        .reduce(|a, b| a.union(&b))
        .unwrap();
    assert!((added.left - existing.left).abs() < 1e-9);
    assert!((added.top - (existing.bottom + APPEND_GAP)).abs() < 1e-9);
    let first = ws.block(&ids[0]).unwrap().position();
    let second = ws.block(&ids[1]).unwrap().position();
    assert!((second.x - first.x - 60.0).abs() < 1e-9);
    assert!((second.y - first.y - 50.0).abs() < 1e-9);
}

#[test]
fn test_append_workspace_into_empty_keeps_positions() {
    let mut ws = standard_workspace();
    let batch = WorkspaceState::new(vec![number(1.0).at(500.0, -200.0)]);

    let ids = ws.append_workspace(&batch).unwrap();

    assert_eq!(ws.block(&ids[0]).unwrap().position(), Coordinate::new(500.0, -200.0));
}

#[test]
fn test_validation_errors() {
    let ws = standard_workspace();

    assert_eq!(
        ws.validate_state(&BlockState::new("nope")),
        Err(SerializationError::UnknownBlockType("nope".to_string()))
    );
    assert!(matches!(
        ws.validate_state(&number(1.0).with_field("BAD", FieldValue::Bool(true))),
        Err(SerializationError::UnknownField { .. })
    ));
    assert!(matches!(
        ws.validate_state(&BlockState::new("text_print").with_input("MISSING", number(1.0))),
        Err(SerializationError::UnknownInput { .. })
    ));
    assert!(matches!(
        ws.validate_state(&BlockState::new("logic_negate").with_input("BOOL", number(1.0))),
        Err(SerializationError::MissingConnection { .. })
    ));
    assert!(matches!(
        ws.validate_state(&number(1.0).with_next(BlockState::new("text_print"))),
        Err(SerializationError::MissingConnection { .. })
    ));
    assert!(matches!(
        ws.validate_state(
            &BlockState::new("controls_repeat_ext").with_input("DO", BlockState::new("math_number"))
        ),
        Err(SerializationError::MissingConnection { .. })
    ));
}

#[test]
fn test_bad_load_leaves_workspace_untouched() {
    let mut ws = standard_workspace();
    ws.load(&sample_program()).unwrap();
    ws.flush();
    let before = ws.save();
    let bad = WorkspaceState::new(vec![
        number(1.0),
        BlockState::new("text_print").with_input("TEXT", BlockState::new("unknown_type")),
    ]);

    let result = ws.load(&bad);

    assert_eq!(result, Err(SerializationError::UnknownBlockType("unknown_type".to_string())));
    assert_eq!(ws.save(), before);
    assert!(ws.flush().is_empty());
}

#[test]
fn test_malformed_json_is_reported() {
    let mut ws = standard_workspace();

    let result = ws.load_json("{ not json");

    assert!(matches!(result, Err(SerializationError::JsonParseError(_))));
}

#[test]
fn test_minimal_record_uses_defaults() {
    let state = WorkspaceState::from_json(r#"{"blocks": {"blocks": [{"type": "math_number"}]}}"#).unwrap();
    let block = &state.top_blocks()[0];

    assert!(block.enabled && block.movable && block.deletable && block.editable);
    assert!(!block.collapsed);
    assert_eq!(block.id, None);
}

#[test]
fn test_inline_is_saved_only_when_overridden() {
    let mut ws = standard_workspace();
    let id = ws.create_block("text_print").unwrap();
    assert_eq!(ws.save_block(&id).unwrap().inline, None);

    ws.set_inputs_inline(&id, true).unwrap();

    assert_eq!(ws.save_block(&id).unwrap().inline, Some(true));
}

#[test]
fn test_archive_round_trip_in_memory() {
    let mut ws = standard_workspace();
    ws.load(&sample_program()).unwrap();

    let archive = WorkspaceArchive::from_workspace(&ws).unwrap();
    let bytes = archive.to_bytes().unwrap();
    let restored = WorkspaceArchive::from_bytes(&bytes).unwrap();

    assert_eq!(restored, archive);
    assert_eq!(restored.block_count, ws.block_count());
    assert_eq!(restored.state().unwrap(), ws.save());
}

#[test]
fn test_archive_round_trip_on_disk() {
    let mut ws = standard_workspace();
    ws.load(&sample_program()).unwrap();
    let path = std::env::temp_dir().join(format!("kumiki_archive_{}.bin", std::process::id()));
    let path = path.to_str().unwrap();

    WorkspaceArchive::from_workspace(&ws).unwrap().save(path).unwrap();
    let state = WorkspaceArchive::from_file(path).unwrap().state().unwrap();
    std::fs::remove_file(path).ok();

    let mut other = standard_workspace();
    other.load(&state).unwrap();
    assert_eq!(other.save(), ws.save());
}

#[test]
fn test_archive_rejects_garbage_and_other_versions() {
    assert!(matches!(
        WorkspaceArchive::from_bytes(&[0xff, 0xff, 0xff]),
        Err(SerializationError::Archive(_))
    ));
    assert!(matches!(
        WorkspaceArchive::from_file("/definitely/not/here.bin"),
        Err(SerializationError::Archive(_))
    ));

    let mut archive = WorkspaceArchive::from_state(&WorkspaceState::default()).unwrap();
    archive.version += 1;
    assert!(matches!(archive.state(), Err(SerializationError::Archive(_))));
}

struct Steps(Vec<f64>);

impl IntoWorkspaceState for Steps {
    fn into_workspace_state(self) -> std::result::Result<WorkspaceState, StateConversionError> {
        if self.0.is_empty() {
            return Err(StateConversionError::ValidationError("no steps".to_string()));
        }
        let blocks = self
            .0
            .into_iter()
            .enumerate()
            .map(|(i, value)| number(value).at(0.0, i as f64 * 50.0))
            .collect();
        Ok(WorkspaceState::new(blocks))
    }
}

#[test]
fn test_custom_format_conversion() {
    let mut ws = standard_workspace();

    let ids = ws.load_from(Steps(vec![1.0, 2.0, 3.0])).unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(
        ws.block(&ids[2]).unwrap().field_value("NUM"),
        Some(&FieldValue::Number(3.0))
    );

    let result = ws.append_from(Steps(Vec::new()));
    assert_eq!(
        result,
        Err(SerializationError::Conversion(StateConversionError::ValidationError(
            "no steps".to_string()
        )))
    );
    assert_eq!(ws.block_count(), 3);
}

#[test]
fn test_clear_removes_everything() {
    let mut ws = standard_workspace();
    ws.load(&sample_program()).unwrap();

    ws.clear().unwrap();

    assert_eq!(ws.block_count(), 0);
    assert!(ws.top_block_ids().is_empty());
    assert!(ws.content_bounds().is_none());
}
