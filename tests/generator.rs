//! Tests for block trees and JavaScript generation.
mod common;
use common::*;
use kumiki::block::InputKind;
use kumiki::error::GeneratorError;
use kumiki::generator::{javascript, prefix_lines, InputNode};
use kumiki::prelude::*;

fn arithmetic(op: &str, a: BlockState, b: BlockState) -> BlockState {
    BlockState::new("math_arithmetic")
        .with_field("OP", FieldValue::Text(op.to_string()))
        .with_input("A", a)
        .with_input("B", b)
}

fn print(value: BlockState) -> BlockState {
    BlockState::new("text_print").with_input("TEXT", value)
}

fn text(value: &str) -> BlockState {
    BlockState::new("text").with_field("TEXT", FieldValue::Text(value.to_string()))
}

fn generate(state: BlockState) -> String {
    let mut ws = standard_workspace();
    ws.append(&state).unwrap();
    javascript::builder().build().workspace_to_code(&ws).unwrap()
}

#[test]
fn test_print_sum() {
    let code = generate(print(arithmetic("ADD", number(1.0), number(2.0))));

    assert_eq!(code, "console.log(1 + 2);\n");
}

#[test]
fn test_looser_operand_is_parenthesised() {
    let sum = arithmetic("ADD", number(1.0), number(2.0));

    let code = generate(print(arithmetic("MULTIPLY", sum, number(3.0))));

    assert_eq!(code, "console.log((1 + 2) * 3);\n");
}

#[test]
fn test_tighter_operand_is_left_alone() {
    let product = arithmetic("MULTIPLY", number(2.0), number(3.0));

    let code = generate(print(arithmetic("ADD", number(1.0), product)));

    assert_eq!(code, "console.log(1 + 2 * 3);\n");
}

#[test]
fn test_equal_precedence_operand_is_parenthesised() {
    let inner = arithmetic("MINUS", number(2.0), number(3.0));

    let code = generate(print(arithmetic("MINUS", number(1.0), inner)));

    assert_eq!(code, "console.log(1 - (2 - 3));\n");
}

#[test]
fn test_power_uses_function_call() {
    let code = generate(print(arithmetic("POWER", number(2.0), number(8.0))));

    assert_eq!(code, "console.log(Math.pow(2, 8));\n");
}

#[test]
fn test_empty_inputs_use_defaults() {
    let code = generate(BlockState::new("text_print"));

    assert_eq!(code, "console.log('');\n");
}

#[test]
fn test_shadow_values_are_generated() {
    let code = generate(print_with_shadow("s", 5.0));

    assert_eq!(code, "console.log(5);\n");
}

#[test]
fn test_text_literal_is_quoted() {
    let code = generate(print(text("say \"hi\"")));

    assert_eq!(code, "console.log(\"say \\\"hi\\\"\");\n");
}

#[test]
fn test_statement_body_is_indented() {
    let state = BlockState::new("controls_repeat_ext")
        .with_input("TIMES", number(3.0))
        .with_input("DO", print(text("hi")));
    let mut ws = standard_workspace();
    ws.append(&state).unwrap();

    let two = javascript::builder().build().workspace_to_code(&ws).unwrap();
    let four = javascript::builder().indent("    ").build().workspace_to_code(&ws).unwrap();

    assert_eq!(two, "for (let count = 0; count < 3; count++) {\n  console.log(\"hi\");\n}\n");
    assert_eq!(four, "for (let count = 0; count < 3; count++) {\n    console.log(\"hi\");\n}\n");
}

#[test]
fn test_until_negates_condition() {
    let condition = BlockState::new("logic_compare")
        .with_field("OP", FieldValue::Text("LT".to_string()))
        .with_input("A", BlockState::new("variables_get").with_field("VAR", FieldValue::Text("x".to_string())))
        .with_input("B", number(10.0));
    let state = BlockState::new("controls_whileUntil")
        .with_field("MODE", FieldValue::Text("UNTIL".to_string()))
        .with_input("BOOL", condition);

    let code = generate(state);

    assert_eq!(code, "while (!(x < 10)) {\n}\n");
}

#[test]
fn test_if_else() {
    let condition = BlockState::new("logic_boolean").with_field("BOOL", FieldValue::Text("TRUE".to_string()));
    let state = BlockState::new("controls_ifelse")
        .with_input("IF0", condition)
        .with_input("DO0", print(number(1.0)))
        .with_input("ELSE", print(number(2.0)));

    let code = generate(state);

    assert_eq!(code, "if (true) {\n  console.log(1);\n} else {\n  console.log(2);\n}\n");
}

#[test]
fn test_variable_names_become_identifiers() {
    let state = BlockState::new("variables_set")
        .with_field("VAR", FieldValue::Text("my var".to_string()))
        .with_input("VALUE", number(1.0));

    let code = generate(state);

    assert_eq!(code, "my_var = 1;\n");
}

#[test]
fn test_disabled_statement_is_skipped() {
    let state = print(number(1.0)).with_next(
        print(number(2.0))
            .with_id("skipped")
            .with_next(print(number(3.0))),
    );
    let mut ws = standard_workspace();
    ws.append(&state).unwrap();
    ws.set_enabled(&BlockId::from("skipped"), false).unwrap();

    let code = javascript::builder().build().workspace_to_code(&ws).unwrap();

    assert_eq!(code, "console.log(1);\nconsole.log(3);\n");
}

#[test]
fn test_disabled_value_falls_back_to_default() {
    let mut ws = standard_workspace();
    ws.append(&print(number(7.0).with_id("seven"))).unwrap();
    ws.set_enabled(&BlockId::from("seven"), false).unwrap();

    let code = javascript::builder().build().workspace_to_code(&ws).unwrap();

    assert_eq!(code, "console.log('');\n");
}

#[test]
fn test_stacks_generate_in_reading_order() {
    let mut ws = standard_workspace();
    ws.append(&print(number(2.0)).at(0.0, 100.0)).unwrap();
    ws.append(&number(3.0).at(0.0, 200.0)).unwrap();
    ws.append(&print(number(1.0)).at(50.0, 0.0)).unwrap();

    let code = javascript::builder().build().workspace_to_code(&ws).unwrap();

    assert_eq!(code, "console.log(1);\nconsole.log(2);\n3\n");
}

#[test]
fn test_missing_emitter_is_an_error() {
    let mut ws = standard_workspace();
    ws.append(&number(1.0)).unwrap();

    let result = Generator::builder().build().workspace_to_code(&ws);

    assert_eq!(result, Err(GeneratorError::MissingEmitter("math_number".to_string())));
}

fn step(_: &BlockNode, _: &Generator) -> std::result::Result<Code, GeneratorError> {
    Ok(Code::statement("step();\n"))
}

#[test]
fn test_type_alias_reuses_emitter() {
    let mut ws = test_workspace();
    ws.append(&BlockState::new("stack").with_next(BlockState::new("stack"))).unwrap();
    let generator = javascript::builder()
        .with_emitter("step", step)
        .with_type_alias("stack", "step")
        .build();

    assert!(generator.has_emitter("stack"));
    assert_eq!(generator.workspace_to_code(&ws).unwrap(), "step();\nstep();\n");
}

#[test]
fn test_value_emitter_in_statement_input_is_rejected() {
    let mut ws = test_workspace();
    ws.append(&BlockState::new("controls_repeat_ext").with_input("DO", BlockState::new("stack")))
        .unwrap();
    let generator = javascript::builder()
        .with_type_alias("stack", "math_random_float")
        .build();

    let result = generator.workspace_to_code(&ws);

    assert_eq!(
        result,
        Err(GeneratorError::WrongCodeKind {
            block_type: "stack".to_string(),
            expected: "statement",
            found: "value",
        })
    );
}

#[test]
fn test_prefix_lines_skips_blank_lines() {
    assert_eq!(prefix_lines("a\n\nb\n", "  "), "  a\n\n  b\n");
    assert_eq!(prefix_lines("", "  "), "");
}

#[test]
fn test_block_tree_mirrors_structure() {
    let mut ws = standard_workspace();
    let root = ws
        .append(&print(arithmetic("ADD", number(1.0), number(2.0))).with_next(print_with_shadow("s", 4.0)))
        .unwrap();

    let tree = ws.block_tree(&root).unwrap();

    assert_eq!(tree.block_count(), 6);
    let sum = tree.input("TEXT").unwrap();
    assert_eq!(sum.block_type, "math_arithmetic");
    assert_eq!(sum.field("OP"), Some(&FieldValue::Text("ADD".to_string())));
    assert_eq!(sum.input("B").unwrap().field("NUM"), Some(&FieldValue::Number(2.0)));
    let next = tree.next.as_deref().unwrap();
    assert!(next.input("TEXT").unwrap().shadow);
    assert!(!sum.shadow);
}

#[test]
fn test_block_tree_omits_dummy_inputs() {
    let mut ws = test_workspace();
    let id = ws.create_block("stack").unwrap();
    let sum = ws.create_block("math_arithmetic").unwrap();

    let stack = ws.block_tree(&id).unwrap();
    let arithmetic = ws.block_tree(&sum).unwrap();

    assert!(stack.inputs.is_empty());
    assert_eq!(arithmetic.inputs.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    assert!(matches!(
        arithmetic.inputs.get("A"),
        Some(InputNode { kind: InputKind::Value, block: None })
    ));
    assert!(ws.block_tree(&BlockId::from("missing")).is_none());
}
