//! Tests for the event bus, filtering and formatting.
mod common;
use common::*;
use kumiki::events::filter::filter;
use kumiki::events::{ChangeElement, EventBus, Placement, Task, TaskQueue};
use kumiki::prelude::*;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn move_event(block: &str, from: (f64, f64), to: (f64, f64), reason: &str) -> Event {
    Event::new(
        "ws",
        None,
        EventPayload::BlockMove {
            block: BlockId::from(block),
            old: Placement::top_level(Coordinate::new(from.0, from.1)),
            new: Placement::top_level(Coordinate::new(to.0, to.1)),
            reason: vec![reason.to_string()],
        },
    )
}

fn field_event(block: &str, name: &str, old: serde_json::Value, new: serde_json::Value) -> Event {
    Event::new(
        "ws",
        None,
        EventPayload::BlockChange {
            block: BlockId::from(block),
            element: ChangeElement::Field,
            name: Some(name.to_string()),
            old_value: old,
            new_value: new,
        },
    )
}

#[test]
fn test_filter_merges_adjacent_moves() {
    let merged = filter(vec![
        move_event("a", (0.0, 0.0), (5.0, 5.0), "drag"),
        move_event("a", (5.0, 5.0), (9.0, 9.0), "snap"),
    ]);

    assert_eq!(merged.len(), 1);
    match &merged[0].payload {
        EventPayload::BlockMove { old, new, reason, .. } => {
            assert_eq!(old.coordinate, Some(Coordinate::new(0.0, 0.0)));
            assert_eq!(new.coordinate, Some(Coordinate::new(9.0, 9.0)));
            assert_eq!(reason, &vec!["drag".to_string(), "snap".to_string()]);
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_filter_keeps_separated_moves_apart() {
    let merged = filter(vec![
        move_event("a", (0.0, 0.0), (5.0, 5.0), "drag"),
        move_event("b", (0.0, 0.0), (1.0, 1.0), "drag"),
        move_event("a", (5.0, 5.0), (9.0, 9.0), "drag"),
    ]);

    assert_eq!(merged.len(), 3);
}

#[test]
fn test_filter_drops_moves_that_cancel_out() {
    let merged = filter(vec![
        move_event("a", (0.0, 0.0), (5.0, 5.0), "drag"),
        move_event("a", (5.0, 5.0), (0.0, 0.0), "drag"),
        move_event("b", (3.0, 3.0), (3.0, 3.0), "drag"),
    ]);

    assert!(merged.is_empty());
}

#[test]
fn test_filter_merges_field_changes() {
    let merged = filter(vec![
        field_event("a", "NUM", json!(1), json!(2)),
        field_event("b", "OP", json!("ADD"), json!("MINUS")),
        field_event("a", "NUM", json!(2), json!(3)),
    ]);

    assert_eq!(merged.len(), 2);
    match &merged[0].payload {
        EventPayload::BlockChange { old_value, new_value, .. } => {
            assert_eq!(old_value, &json!(1));
            assert_eq!(new_value, &json!(3));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_filter_keeps_distinct_kinds_in_order() {
    let merged = filter(vec![
        field_event("a", "NUM", json!(1), json!(2)),
        Event::new("ws", None, EventPayload::FinishedLoading),
        move_event("a", (0.0, 0.0), (1.0, 0.0), "drag"),
    ]);

    let kinds: Vec<EventKind> = merged.iter().map(Event::kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::BlockChange, EventKind::FinishedLoading, EventKind::BlockMove]
    );
}

#[test]
fn test_bus_delivers_in_subscription_order() {
    let mut bus = EventBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let first = Rc::clone(&log);
    let second = Rc::clone(&log);
    bus.subscribe(move |_| first.borrow_mut().push("first"));
    bus.subscribe(move |_| second.borrow_mut().push("second"));

    bus.push(Event::new("ws", None, EventPayload::FinishedLoading));
    let delivered = bus.deliver();

    assert_eq!(delivered.len(), 1);
    assert_eq!(*log.borrow(), vec!["first", "second"]);
    assert!(bus.pending().is_empty());
}

#[test]
fn test_bus_disable_nests() {
    let mut bus = EventBus::new();
    bus.disable();
    bus.disable();
    bus.enable();

    assert!(!bus.push(Event::new("ws", None, EventPayload::FinishedLoading)));
    bus.enable();
    assert!(bus.push(Event::new("ws", None, EventPayload::FinishedLoading)));
    assert_eq!(bus.pending().len(), 1);
}

#[test]
fn test_task_queue_coalesces() {
    let mut queue = TaskQueue::new();

    assert!(queue.schedule(Task::FireEvents));
    assert!(!queue.schedule(Task::FireEvents));
    assert!(queue.schedule(Task::ResizeContents));

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pop(), Some(Task::FireEvents));
    assert!(queue.is_pending(Task::ResizeContents));
}

#[test]
fn test_events_wait_for_flush() {
    let mut ws = standard_workspace();
    let recorded = record_events(&mut ws);

    let id = ws.create_block("math_number").unwrap();
    assert!(recorded.borrow().is_empty());
    assert_eq!(ws.pending_events().len(), 1);
    assert!(ws.has_pending_tasks());

    ws.flush();

    let events = recorded.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::BlockCreate);
    assert_eq!(events[0].block_id(), Some(&id));
    assert_eq!(events[0].workspace_id, ws.id());
    assert!(!ws.has_pending_tasks());
}

#[test]
fn test_create_event_lists_descendants() {
    let mut ws = standard_workspace();
    let state = BlockState::new("text_print")
        .with_id("print")
        .with_input("TEXT", number(4.0).with_id("four"))
        .with_next(BlockState::new("text_print").with_id("after"));

    ws.append(&state).unwrap();
    let events = ws.flush();

    let creates = events_of_kind(&events, EventKind::BlockCreate);
    assert_eq!(creates.len(), 1);
    match &creates[0].payload {
        EventPayload::BlockCreate { ids, state, .. } => {
            let ids: Vec<&str> = ids.iter().map(BlockId::as_str).collect();
            assert_eq!(ids, vec!["print", "four", "after"]);
            assert_eq!(state.block_count(), 3);
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_delete_event_carries_old_state() {
    let mut ws = standard_workspace();
    let id = ws.append(&number(8.0).at(5.0, 6.0)).unwrap();
    ws.flush();

    ws.delete_block(&id).unwrap();
    let events = ws.flush();

    let deletes = events_of_kind(&events, EventKind::BlockDelete);
    assert_eq!(deletes.len(), 1);
    match &deletes[0].payload {
        EventPayload::BlockDelete { old_state, was_shadow, .. } => {
            assert!(!was_shadow);
            assert_eq!(old_state.fields.get("NUM"), Some(&FieldValue::Number(8.0)));
            assert_eq!((old_state.x, old_state.y), (Some(5.0), Some(6.0)));
        }
        other => panic!("unexpected payload {:?}", other),
    }
    assert!(!ws.contains(&id));
}

#[test]
fn test_field_changes_merge_and_null_changes_drop() {
    let mut ws = standard_workspace();
    let id = ws.create_block("math_number").unwrap();
    ws.flush();

    ws.set_field_value(&id, "NUM", FieldValue::Number(1.0)).unwrap();
    ws.set_field_value(&id, "NUM", FieldValue::Number(7.0)).unwrap();
    let events = ws.flush();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0].payload,
        EventPayload::BlockChange { new_value, .. } if new_value == &json!(7.0)
    ));

    ws.set_field_value(&id, "NUM", FieldValue::Number(3.0)).unwrap();
    ws.set_field_value(&id, "NUM", FieldValue::Number(7.0)).unwrap();
    assert!(ws.flush().is_empty());
}

#[test]
fn test_property_changes_fire_block_change() {
    let mut ws = standard_workspace();
    let id = ws.create_block("text_print").unwrap();
    ws.flush();

    ws.set_collapsed(&id, true).unwrap();
    ws.set_enabled(&id, false).unwrap();
    ws.set_inputs_inline(&id, true).unwrap();
    ws.set_comment(&id, Some("note".to_string())).unwrap();
    let events = ws.flush();

    let elements: Vec<ChangeElement> = events
        .iter()
        .filter_map(|e| match &e.payload {
            EventPayload::BlockChange { element, .. } => Some(*element),
            _ => None,
        })
        .collect();
    assert_eq!(
        elements,
        vec![
            ChangeElement::Collapsed,
            ChangeElement::Disabled,
            ChangeElement::Inline,
            ChangeElement::Comment,
        ]
    );
    let block = ws.block(&id).unwrap();
    assert!(block.is_collapsed());
    assert!(!block.is_enabled());
    assert_eq!(block.comment(), Some("note"));
}

#[test]
fn test_unknown_field_is_rejected() {
    let mut ws = standard_workspace();
    let id = ws.create_block("math_number").unwrap();

    let result = ws.set_field_value(&id, "NOPE", FieldValue::Number(1.0));

    assert_eq!(
        result,
        Err(WorkspaceError::UnknownField {
            block: id,
            field: "NOPE".to_string(),
        })
    );
}

#[test]
fn test_remove_change_listener() {
    let mut ws = standard_workspace();
    let recorded = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&recorded);
    let handle = ws.add_change_listener(move |_| *counter.borrow_mut() += 1);

    ws.create_block("math_number").unwrap();
    ws.flush();
    assert!(ws.remove_change_listener(handle));
    assert!(!ws.remove_change_listener(handle));
    ws.create_block("math_number").unwrap();
    ws.flush();

    assert_eq!(*recorded.borrow(), 1);
}

#[test]
fn test_dispose_drops_listeners_and_rejects_edits() {
    let mut ws = standard_workspace();
    let recorded = record_events(&mut ws);
    ws.create_block("math_number").unwrap();

    ws.dispose();

    assert!(ws.is_disposed());
    assert!(ws.flush().is_empty());
    assert!(recorded.borrow().is_empty());
    assert_eq!(ws.block_count(), 0);
    assert_eq!(
        ws.create_block("math_number"),
        Err(WorkspaceError::WorkspaceDisposed)
    );
}

#[test]
fn test_explicit_group_is_stamped_on_events() {
    let mut ws = standard_workspace();
    assert!(ws.start_group());
    assert!(!ws.start_group());
    let group = ws.group().map(str::to_string);

    ws.create_block("math_number").unwrap();
    ws.create_block("text").unwrap();
    ws.end_group();
    ws.create_block("text").unwrap();
    let events = ws.flush();

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].group, group);
    assert_eq!(events[1].group, group);
    assert_eq!(events[2].group, None);
}

#[test]
fn test_load_groups_events_and_finishes() {
    let mut ws = standard_workspace();
    ws.create_block("math_number").unwrap();
    ws.flush();
    let state = WorkspaceState::new(vec![number(1.0).at(0.0, 0.0), number(2.0).at(0.0, 80.0)]);

    ws.load(&state).unwrap();
    let events = ws.flush();

    let kinds: Vec<EventKind> = events
        .iter()
        .map(Event::kind)
        .filter(|k| *k != EventKind::ViewportChange)
        .collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::BlockDelete,
            EventKind::BlockCreate,
            EventKind::BlockCreate,
            EventKind::FinishedLoading,
        ]
    );
    let group = events[0].group.clone();
    assert!(group.is_some());
    assert!(events
        .iter()
        .filter(|e| e.kind() != EventKind::ViewportChange)
        .all(|e| e.group == group));
}

#[test]
fn test_formatter_output() {
    let moved = move_event("a", (0.0, 0.0), (5.0, 10.0), "drag");
    let formatted = EventFormatter::format(&moved);
    assert!(formatted.starts_with("moved 'a' from "));
    assert!(formatted.ends_with("[drag]"));

    let change = field_event("a", "NUM", json!(1), json!(2));
    assert_eq!(
        EventFormatter::format(&change),
        "changed field 'num' of 'a' from 1 to 2"
    );

    let viewport = Event::new(
        "ws",
        Some("group_1".to_string()),
        EventPayload::ViewportChange {
            view_top: 0.0,
            view_left: -12.5,
            scale: 2.0,
            old_scale: 1.0,
        },
    );
    assert_eq!(
        EventFormatter::format(&viewport),
        "[group_1] viewport scale 1 -> 2, top 0.0, left -12.5"
    );

    let finished = Event::new("ws", None, EventPayload::FinishedLoading);
    assert_eq!(EventFormatter::format(&finished), "finished loading");
}
