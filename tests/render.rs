//! Tests for measuring, drawing and exporting blocks.
mod common;
use common::*;
use kumiki::block::InputKind;
use kumiki::error::DefinitionError;
use kumiki::prelude::*;
use kumiki::render::colour::{blend, hue_to_hex, parse_hex, DEFAULT_COLOUR};
use kumiki::render::row::RowKind;
use kumiki::render::{BlockStyle, GerasPathObject, PathObject, PathRole, ShapeKind};

fn offset(ws: &Workspace, id: &BlockId, slot: ConnectionSlot) -> Coordinate {
    ws.block(id).unwrap().connection(&slot).unwrap().offset()
}

fn print_of_number(ws: &mut Workspace) -> (BlockId, BlockId) {
    let state = BlockState::new("text_print")
        .with_id("print")
        .with_input("TEXT", number(5.0).with_id("num"));
    let print = ws.append(&state).unwrap();
    (print, BlockId::from("num"))
}

#[test]
fn test_geras_draws_three_layers() {
    let mut ws = standard_workspace();
    let id = ws.create_block("text_print").unwrap();

    let layers = ws.rendered(&id).unwrap().path.layers();

    let roles: Vec<PathRole> = layers.iter().map(|layer| layer.role).collect();
    assert_eq!(roles, vec![PathRole::Dark, PathRole::Main, PathRole::Light]);
    assert_eq!(layers[0].transform.as_deref(), Some("translate(1,1)"));
    assert_eq!(layers[0].d, layers[1].d);
    assert!(!layers[1].d.is_empty());
    assert!(!layers[2].d.is_empty());
}

#[test]
fn test_basic_draws_one_outlined_layer() {
    let mut ws = workspace_with_options(WorkspaceOptions::default().with_renderer(RendererKind::Basic));
    let id = ws.create_block("text_print").unwrap();

    let rendered = ws.rendered(&id).unwrap();
    let layers = rendered.path.layers();

    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].role, PathRole::Main);
    assert_eq!(layers[0].stroke.as_ref(), Some(&rendered.path.style().colour_tertiary));
    assert_eq!(layers[0].fill, rendered.path.style().colour_primary);
}

#[test]
fn test_block_style_from_colour() {
    let style = BlockStyle::from_colour("#FF0000");

    assert_eq!(style.colour_primary, "#ff0000");
    assert_eq!(style.colour_secondary, "#ff9999");
    assert_eq!(style.colour_tertiary, "#b30000");
    assert_eq!(BlockStyle::from_colour("not a colour").colour_primary, DEFAULT_COLOUR);
}

#[test]
fn test_colour_helpers() {
    assert_eq!(hue_to_hex(0.0), "#a65b5b");
    assert_eq!(hue_to_hex(360.0), hue_to_hex(0.0));
    assert_eq!(blend("#000000", "#ffffff", 0.5), Some("#808080".to_string()));
    assert_eq!(blend("#fff", "#000", 1.0), Some("#ffffff".to_string()));
    assert_eq!(blend("black", "#000000", 0.5), None);
}

#[test]
fn test_geras_dark_colour_is_darkened_primary() {
    let object = GerasPathObject::new(BlockStyle::from_colour("#ffffff"));

    assert_eq!(object.colour_dark(), "#cccccc");
}

#[test]
fn test_shadow_uses_secondary_colour() {
    let mut ws = standard_workspace();
    ws.append(&print_with_shadow("shadow", 1.0)).unwrap();

    let rendered = ws.rendered(&BlockId::from("shadow")).unwrap();
    let layers = rendered.path.layers();

    let secondary = &rendered.path.style().colour_secondary;
    assert_eq!(&layers[1].fill, secondary);
    assert_eq!(&layers[0].fill, secondary);
    assert!(!layers[2].visible);
}

#[test]
fn test_disabled_block_uses_pattern() {
    let mut ws = standard_workspace();
    let id = ws.create_block("text_print").unwrap();

    ws.set_enabled(&id, false).unwrap();
    let main = ws.rendered(&id).unwrap().path.layers()[1].clone();
    assert_eq!(main.fill, "url(#disabledPattern)");

    ws.set_enabled(&id, true).unwrap();
    let main = ws.rendered(&id).unwrap().path.layers()[1].clone();
    assert_eq!(main.fill, ws.rendered(&id).unwrap().path.style().colour_primary);
}

#[test]
fn test_highlight_changes_style_not_layout() {
    let mut ws = standard_workspace();
    let id = ws.create_block("text_print").unwrap();
    let before = ws.rendered(&id).unwrap().size;

    ws.set_highlighted(&id, true).unwrap();

    let rendered = ws.rendered(&id).unwrap();
    let layers = rendered.path.layers();
    assert_eq!(rendered.size, before);
    assert_eq!(layers[1].filter.as_deref(), Some("url(#embossFilter)"));
    assert!(!layers[2].visible);

    ws.set_highlighted(&id, false).unwrap();
    let layers = ws.rendered(&id).unwrap().path.layers();
    assert_eq!(layers[1].filter, None);
    assert!(layers[2].visible);
}

#[test]
fn test_connected_child_sits_on_parent_socket() {
    let mut ws = standard_workspace();
    let (print, num) = print_of_number(&mut ws);

    let parent = ws.block(&print).unwrap().position();
    let child = ws.block(&num).unwrap().position();
    let socket = offset(&ws, &print, ConnectionSlot::Input("TEXT".to_string()));
    let plug = offset(&ws, &num, ConnectionSlot::Output);

    assert_eq!(child, parent + socket - plug);
    assert!(child.x > parent.x);
}

#[test]
fn test_rtl_mirrors_connection_offsets() {
    let mut ltr = standard_workspace();
    let mut rtl = workspace_with_options(WorkspaceOptions::default().with_rtl(true));
    let (print, num) = print_of_number(&mut ltr);
    print_of_number(&mut rtl);

    for (id, slot) in [
        (&print, ConnectionSlot::Input("TEXT".to_string())),
        (&print, ConnectionSlot::Next),
        (&num, ConnectionSlot::Output),
    ] {
        let a = offset(&ltr, id, slot.clone());
        let b = offset(&rtl, id, slot);
        assert_eq!(b.x, -a.x);
        assert_eq!(b.y, a.y);
    }
    assert!(rtl.block(&num).unwrap().position().x < rtl.block(&print).unwrap().position().x);
    let main = rtl.rendered(&print).unwrap().path.layers()[1].clone();
    assert_eq!(main.transform.as_deref(), Some("scale(-1 1)"));
}

#[test]
fn test_connected_value_widens_parent() {
    let mut ws = standard_workspace();
    let empty = ws.create_block("text_print").unwrap();
    let (filled, _) = print_of_number(&mut ws);

    let empty_width = ws.rendered(&empty).unwrap().size.width;
    let filled_width = ws.rendered(&filled).unwrap().size.width;

    assert!(filled_width > empty_width);
}

#[test]
fn test_statement_input_grows_with_body() {
    let body = |count: usize| {
        (1..count).fold(BlockState::new("text_print"), |stack, _| {
            BlockState::new("text_print").with_next(stack)
        })
    };
    let mut ws = standard_workspace();
    let one = ws
        .append(&BlockState::new("controls_repeat_ext").with_input("DO", body(1)))
        .unwrap();
    let three = ws
        .append(&BlockState::new("controls_repeat_ext").with_input("DO", body(3)))
        .unwrap();

    assert!(ws.rendered(&three).unwrap().size.height > ws.rendered(&one).unwrap().size.height);
}

#[test]
fn test_stack_size_includes_next_blocks() {
    let mut ws = standard_workspace();
    let top = ws
        .append(&BlockState::new("text_print").with_next(BlockState::new("text_print")))
        .unwrap();
    let notch = ws.renderer().constants().notch_height;

    let rendered = ws.rendered(&top).unwrap();

    assert!((rendered.stack_size.height - (2.0 * rendered.size.height - notch)).abs() < 1e-9);
    let bounds = ws.block_bounds(&top).unwrap();
    assert!((bounds.height() - rendered.stack_size.height).abs() < 1e-9);
}

#[test]
fn test_collapsed_block_hides_its_body() {
    let state = BlockState::new("controls_repeat_ext")
        .with_input("TIMES", number(3.0))
        .with_input("DO", BlockState::new("text_print"));
    let mut ws = standard_workspace();
    let id = ws.append(&state).unwrap();
    let expanded = ws.rendered(&id).unwrap().size.height;

    ws.set_collapsed(&id, true).unwrap();

    let rendered = ws.rendered(&id).unwrap();
    assert!(rendered.info.is_collapsed);
    assert!(!rendered.info.is_inline);
    assert!(rendered.size.height < expanded);
    assert!(rendered.info.connection_offsets().iter().all(|(slot, _)| !matches!(slot, ConnectionSlot::Input(_))));
}

#[test]
fn test_dynamic_shapes_follow_output_shape() {
    let mut options = WorkspaceOptions::default();
    options.constants.dynamic_shapes = true;
    let mut dynamic = workspace_with_options(options);
    let mut fixed = standard_workspace();

    let boolean = dynamic.create_block("logic_boolean").unwrap();
    let num = dynamic.create_block("math_number").unwrap();
    let plain = fixed.create_block("logic_boolean").unwrap();

    let kind = |ws: &Workspace, id: &BlockId| ws.rendered(id).unwrap().info.output.as_ref().unwrap().kind;
    assert_eq!(kind(&dynamic, &boolean), ShapeKind::Hexagonal);
    assert_eq!(kind(&dynamic, &num), ShapeKind::Round);
    assert_eq!(kind(&fixed, &plain), ShapeKind::PuzzleTab);
}

#[test]
fn test_svg_export_lists_rendered_blocks() {
    let mut ws = standard_workspace();
    print_of_number(&mut ws);

    let svg = kumiki::render::svg::export(&ws);

    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"400\">"));
    assert!(svg.contains("data-id=\"print\""));
    assert!(svg.contains("data-id=\"num\""));
    assert!(svg.contains("<path d=\""));
    assert!(svg.contains(">5</text>"));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn test_display_workspace_tree() {
    let mut ws = Workspace::builder(BlockRegistry::with_standard_library().unwrap())
        .with_id("main")
        .build();
    let state = print_with_shadow("s", 2.0)
        .with_id("p")
        .at(10.0, 20.0)
        .with_next(BlockState::new("text_print").with_id("q"));
    ws.append(&state).unwrap();

    let text = DisplayWorkspace::new(&ws).to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Workspace main");
    assert!(lines[1].starts_with("└── text_print 'p' @ "));
    assert!(text.contains("[input 'TEXT'] math_number 's' {NUM=2} (shadow)"));
    assert!(text.contains("[next] text_print 'q'"));
}

#[test]
fn test_toolbox_updates_keep_their_mode() {
    let registry = BlockRegistry::with_standard_library().unwrap();
    let mut ws = Workspace::builder(registry)
        .with_toolbox(ToolboxDefinition::flyout(&["math_number"]))
        .build();
    let categories = ToolboxDefinition::from_json(
        r#"{"kind": "categoryToolbox", "contents": [
            {"name": "Math", "contents": [{"kind": "block", "type": "math_number"}]}
        ]}"#,
    )
    .unwrap();
    let message = |result: std::result::Result<(), WorkspaceError>| match result {
        Err(WorkspaceError::InvalidToolboxState(message)) => message,
        other => panic!("expected a toolbox error, got {:?}", other),
    };

    assert_eq!(
        message(ws.update_toolbox(Some(categories))),
        "Existing toolbox has no categories. Can't change mode."
    );
    assert_eq!(message(ws.update_toolbox(None)), "Can't nullify an existing toolbox.");
    assert!(message(ws.update_toolbox(Some(ToolboxDefinition::flyout(&["nope"])))).contains("'nope'"));

    ws.update_toolbox(Some(ToolboxDefinition::flyout(&["math_number", "text_print"])))
        .unwrap();
    assert_eq!(ws.toolbox().unwrap().block_types(), vec!["math_number", "text_print"]);

    let mut bare = standard_workspace();
    assert_eq!(
        message(bare.update_toolbox(Some(ToolboxDefinition::flyout(&[])))),
        "Existing toolbox is null. Can't create new toolbox."
    );
    assert!(bare.update_toolbox(None).is_ok());
}

#[test]
fn test_registry_rejects_bad_definitions() {
    let mut registry = BlockRegistry::new();

    assert!(matches!(
        registry.define(BlockDefinition::new("both").with_output(&[]).with_previous(&[])),
        Err(DefinitionError::OutputAndPrevious { .. })
    ));
    assert_eq!(
        registry.define(BlockDefinition::new("vec").with_output(&["Vector"])),
        Err(DefinitionError::UnknownCheckTag {
            block_type: "vec".to_string(),
            tag: "Vector".to_string(),
        })
    );
    assert!(matches!(
        registry.define(
            BlockDefinition::new("dummy").with_input(InputDefinition::dummy("D").with_check(&["Number"]))
        ),
        Err(DefinitionError::CheckOnDummyInput { .. })
    ));
    assert!(matches!(
        registry.define(
            BlockDefinition::new("twice")
                .with_input(InputDefinition::value("A"))
                .with_input(InputDefinition::value("A"))
        ),
        Err(DefinitionError::DuplicateInput { .. })
    ));
    assert!(registry.is_empty());

    registry.register_check_tag("Vector");
    registry.define(BlockDefinition::new("vec").with_output(&["Vector"])).unwrap();
    assert!(registry.contains("vec"));
}

#[test]
fn test_define_json_is_all_or_nothing() {
    let mut registry = BlockRegistry::new();
    let json = r#"[
        {"type": "ok_block", "message0": "ok", "previousStatement": null},
        {"type": "bad_block", "message0": "%1", "args0": [{"type": "input_value", "name": "X", "check": "Nope"}]}
    ]"#;

    assert!(matches!(
        registry.define_json(json),
        Err(DefinitionError::UnknownCheckTag { .. })
    ));
    assert!(registry.is_empty());
    assert!(matches!(registry.define_json("not json"), Err(DefinitionError::JsonParseError(_))));

    let count = registry
        .define_json(r#"[{"type": "ok_block", "message0": "go %1", "args0": [{"type": "input_statement", "name": "DO"}], "nextStatement": null}]"#)
        .unwrap();
    assert_eq!(count, 1);
    let definition = registry.get("ok_block").unwrap();
    assert_eq!(definition.inputs.len(), 1);
    assert_eq!(definition.inputs[0].kind, InputKind::Statement);
    assert!(definition.next.is_some());
}

#[test]
fn test_parse_hex_rejects_non_hex_text() {
    assert_eq!(parse_hex("#aéaaa"), None);
    assert_eq!(parse_hex("#ééé"), None);
    assert_eq!(parse_hex("#12345g"), None);
    assert_eq!(parse_hex("#+1a"), None);
    assert_eq!(parse_hex("#fff"), Some([255.0, 255.0, 255.0]));
    assert_eq!(BlockStyle::from_colour("#aéaaa").colour_primary, DEFAULT_COLOUR);
}

#[test]
fn test_registry_rejects_invalid_colour() {
    let mut registry = BlockRegistry::new();
    let json = r##"[{"type": "bad_colour", "message0": "x", "colour": "#aéaaa", "previousStatement": null}]"##;

    assert_eq!(
        registry.define_json(json),
        Err(DefinitionError::InvalidColour {
            block_type: "bad_colour".to_string(),
            colour: "#aéaaa".to_string(),
        })
    );
    assert!(matches!(
        registry.define(BlockDefinition::new("named").with_colour("red")),
        Err(DefinitionError::InvalidColour { .. })
    ));
    assert!(registry.is_empty());

    registry.define(BlockDefinition::new("short").with_colour("#0F0")).unwrap();
    let mut ws = Workspace::new(registry);
    let id = ws.create_block("short").unwrap();
    assert_eq!(ws.rendered(&id).unwrap().path.style().colour_primary, "#0f0");
}

#[test]
fn test_spacer_rows_span_the_block() {
    let mut ws = standard_workspace();
    let statement = ws.create_block("controls_ifelse").unwrap();
    let value = ws.create_block("math_arithmetic").unwrap();

    for id in [&statement, &value] {
        let info = &ws.rendered(id).unwrap().info;
        let spacers: Vec<_> = info
            .rows
            .iter()
            .filter(|row| row.kind == RowKind::Spacer)
            .collect();

        assert!(!spacers.is_empty());
        for row in spacers {
            assert!((row.width - (info.width - info.start_x)).abs() < 1e-9);
            let spacer_width: f64 = row.elements.iter().map(|elem| elem.width).sum();
            assert!((spacer_width - row.width).abs() < 1e-9);
        }
    }
}
