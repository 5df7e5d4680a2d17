//! Property tests for connection checks, clean-up and serialization.
mod common;
use common::*;
use kumiki::block::connection::checks_intersect;
use kumiki::block::InputKind;
use kumiki::prelude::*;
use proptest::prelude::*;

const TOP_LEVEL_TYPES: &[&str] = &[
    "text_print",
    "controls_repeat_ext",
    "controls_if",
    "math_number",
    "logic_compare",
    "variables_set",
];

/// Every value and statement input of the standard library as `(block type, input)`.
fn sockets(registry: &BlockRegistry) -> Vec<(String, String)> {
    let mut sockets: Vec<(String, String)> = registry
        .block_types()
        .filter_map(|block_type| registry.get(block_type))
        .flat_map(|definition| {
            definition
                .inputs
                .iter()
                .filter(|input| input.kind != InputKind::Dummy)
                .map(|input| (definition.block_type.clone(), input.name.clone()))
                .collect::<Vec<_>>()
        })
        .collect();
    sockets.sort();
    sockets
}

fn block_types(registry: &BlockRegistry) -> Vec<String> {
    let mut types: Vec<String> = registry.block_types().map(str::to_string).collect();
    types.sort();
    types
}

/// Whether a fresh `child` block should plug into `parent`'s `input`.
fn expect_compatible(registry: &BlockRegistry, parent: &str, input: &str, child: &str) -> bool {
    let (Some(parent), Some(child)) = (registry.get(parent), registry.get(child)) else {
        return false;
    };
    let Some(input) = parent.inputs.iter().find(|i| i.name == input) else {
        return false;
    };
    let plug = match input.kind {
        InputKind::Value => child.output.as_ref(),
        InputKind::Statement => child.previous.as_ref(),
        InputKind::Dummy => None,
    };
    plug.is_some_and(|check| checks_intersect(&input.check, check))
}

fn arb_layout() -> impl Strategy<Value = Vec<(usize, i32, i32, bool)>> {
    prop::collection::vec(
        (0..TOP_LEVEL_TYPES.len(), -400..400i32, -400..400i32, prop::bool::weighted(0.2)),
        1..8,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_connect_succeeds_exactly_when_checks_match(
        socket_index in 0usize..64,
        child_index in 0usize..64,
    ) {
        let mut ws = standard_workspace();
        let registry = ws.registry().clone();
        let sockets = sockets(&registry);
        let types = block_types(&registry);
        let (parent_type, input) = &sockets[socket_index % sockets.len()];
        let child_type = &types[child_index % types.len()];

        let parent = ws.create_block(parent_type).unwrap();
        let child = ws.create_block(child_type).unwrap();
        let socket = ConnectionRef::input(parent.clone(), input.clone());
        let is_value = registry
            .get(parent_type)
            .and_then(|d| d.inputs.iter().find(|i| &i.name == input))
            .is_some_and(|i| i.kind == InputKind::Value);
        let plug = if is_value {
            ConnectionRef::output(child.clone())
        } else {
            ConnectionRef::previous(child.clone())
        };

        let result = ws.connect(&socket, &plug);

        if expect_compatible(&registry, parent_type, input, child_type) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(peer(&ws, &socket), Some(plug.clone()));
            prop_assert_eq!(peer(&ws, &plug), Some(socket.clone()));
            prop_assert_eq!(ws.top_block_ids(), vec![parent]);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(peer(&ws, &socket), None);
            prop_assert_eq!(ws.block(&child).unwrap().parent(), None);
            prop_assert_eq!(ws.top_block_ids().len(), 2);
        }
    }

    #[test]
    fn test_cleanup_separates_stacks_and_is_idempotent(layout in arb_layout()) {
        let mut ws = standard_workspace();
        let mut fixed = Vec::new();
        for (type_index, x, y, immovable) in layout {
            let id = create_at(&mut ws, TOP_LEVEL_TYPES[type_index], f64::from(x), f64::from(y));
            if immovable {
                ws.set_movable(&id, false).unwrap();
                fixed.push((id.clone(), ws.block(&id).unwrap().position()));
            }
        }

        ws.cleanup();
        let first: Vec<Coordinate> = ws
            .top_block_ids()
            .iter()
            .map(|id| ws.block(id).unwrap().position())
            .collect();

        for (id, position) in &fixed {
            prop_assert_eq!(ws.block(id).unwrap().position(), *position);
        }
        let ids = ws.top_block_ids();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                let both_fixed = fixed.iter().any(|(id, _)| id == a) && fixed.iter().any(|(id, _)| id == b);
                if !both_fixed {
                    let (ra, rb) = (ws.block_bounds(a).unwrap(), ws.block_bounds(b).unwrap());
                    prop_assert!(!ra.intersects(&rb), "{} overlaps {}", a, b);
                }
            }
        }

        ws.flush();
        ws.cleanup();
        let second: Vec<Coordinate> = ws
            .top_block_ids()
            .iter()
            .map(|id| ws.block(id).unwrap().position())
            .collect();
        prop_assert_eq!(first, second);
        prop_assert!(events_of_kind(&ws.flush(), EventKind::BlockMove).is_empty());
    }

    #[test]
    fn test_saved_chains_reload_identically(
        cents in prop::collection::vec(-100_000..100_000i32, 1..10),
        x in -300..300i32,
        y in -300..300i32,
    ) {
        let values: Vec<f64> = cents.iter().map(|c| f64::from(*c) / 100.0).collect();
        let chain = values
            .iter()
            .rev()
            .fold(None, |next: Option<BlockState>, value| {
                let block = BlockState::new("text_print").with_input("TEXT", number(*value));
                Some(match next {
                    Some(next) => block.with_next(next),
                    None => block,
                })
            })
            .unwrap()
            .at(f64::from(x), f64::from(y));
        let mut ws = standard_workspace();
        ws.load(&WorkspaceState::new(vec![chain])).unwrap();
        let saved = ws.save();

        let mut other = standard_workspace();
        other.load_json(&saved.to_json()).unwrap();

        prop_assert_eq!(other.save(), saved);
        prop_assert_eq!(other.block_count(), values.len() * 2);
    }
}
