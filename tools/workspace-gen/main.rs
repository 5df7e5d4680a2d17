use clap::Parser;
use kumiki::block::FieldValue;
use kumiki::serialization::{BlockState, WorkspaceState};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::fs;

const COMPARE_OPS: [&str; 6] = ["EQ", "NEQ", "LT", "LTE", "GT", "GTE"];
const ARITHMETIC_OPS: [&str; 5] = ["ADD", "MINUS", "MULTIPLY", "DIVIDE", "POWER"];
const VARIABLES: [&str; 4] = ["count", "total", "item", "flag"];

/// A CLI tool to generate random saved workspaces for the kumiki engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_workspace.json")]
    output: String,

    /// Number of top-level stacks
    #[arg(short, long, default_value_t = 5)]
    stacks: usize,

    /// Maximum statements chained in one stack or statement input
    #[arg(long, default_value_t = 4)]
    max_length: usize,

    /// Maximum nesting depth of statement and value inputs
    #[arg(long, default_value_t = 3)]
    max_depth: usize,

    /// Side of the square area top-level stacks are scattered over
    #[arg(long, default_value_t = 800.0)]
    spread: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.max_length == 0 {
        eprintln!("Error: --max-length must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating {} stacks (up to {} statements, depth {})...",
        cli.stacks, cli.max_length, cli.max_depth
    );

    let blocks: Vec<BlockState> = (0..cli.stacks)
        .map(|_| {
            let x = rng.random_range(0.0..cli.spread).round();
            let y = rng.random_range(0.0..cli.spread).round();
            statement_chain(&mut rng, cli.max_length, cli.max_depth)
                .unwrap_or_else(|| value_block(&mut rng, cli.max_depth))
                .at(x, y)
        })
        .collect();

    let state = WorkspaceState::new(blocks);
    let total: usize = state.top_blocks().iter().map(BlockState::block_count).sum();
    fs::write(&cli.output, state.to_json())?;

    println!(
        "Successfully generated {} blocks and saved them to '{}'",
        total, cli.output
    );
    Ok(())
}

/// A random run of statements linked through next connections.
fn statement_chain(rng: &mut ThreadRng, max_length: usize, depth: usize) -> Option<BlockState> {
    let length = rng.random_range(1..=max_length);
    (0..length)
        .map(|_| statement_block(rng, max_length, depth))
        .rev()
        .fold(None, |next, block| {
            Some(match next {
                Some(next) => block.with_next(next),
                None => block,
            })
        })
}

fn statement_block(rng: &mut ThreadRng, max_length: usize, depth: usize) -> BlockState {
    let nested = depth > 0;
    let choice = if nested { rng.random_range(0..5) } else { rng.random_range(0..2) };
    let child_depth = depth.saturating_sub(1);
    match choice {
        0 => BlockState::new("text_print").with_input("TEXT", text_value(rng, child_depth)),
        1 => BlockState::new("variables_set")
            .with_field("VAR", variable(rng))
            .with_input("VALUE", number_value(rng, child_depth)),
        2 => {
            let block = BlockState::new("controls_repeat_ext").with_shadow(
                "TIMES",
                number_literal(rng.random_range(1..=10) as f64),
            );
            with_body(rng, block, "DO", max_length, child_depth)
        }
        3 => {
            let block = BlockState::new("controls_whileUntil")
                .with_field("MODE", text_field(if rng.random_bool(0.5) { "WHILE" } else { "UNTIL" }))
                .with_input("BOOL", boolean_value(rng, child_depth));
            with_body(rng, block, "DO", max_length, child_depth)
        }
        _ => {
            let block_type = if rng.random_bool(0.5) { "controls_if" } else { "controls_ifelse" };
            let mut block = BlockState::new(block_type).with_input("IF0", boolean_value(rng, child_depth));
            block = with_body(rng, block, "DO0", max_length, child_depth);
            if block_type == "controls_ifelse" {
                block = with_body(rng, block, "ELSE", max_length, child_depth);
            }
            block
        }
    }
}

fn with_body(
    rng: &mut ThreadRng,
    block: BlockState,
    input: &str,
    max_length: usize,
    depth: usize,
) -> BlockState {
    if rng.random_bool(0.8) {
        if let Some(body) = statement_chain(rng, max_length, depth) {
            return block.with_input(input, body);
        }
    }
    block
}

fn value_block(rng: &mut ThreadRng, depth: usize) -> BlockState {
    match rng.random_range(0..3) {
        0 => number_value(rng, depth),
        1 => boolean_value(rng, depth),
        _ => text_value(rng, depth),
    }
}

fn number_value(rng: &mut ThreadRng, depth: usize) -> BlockState {
    if depth == 0 || rng.random_bool(0.4) {
        return match rng.random_range(0..3) {
            0 => BlockState::new("math_random_float"),
            _ => number_literal(rng.random_range(-100..=100) as f64),
        };
    }
    let op = ARITHMETIC_OPS[rng.random_range(0..ARITHMETIC_OPS.len())];
    BlockState::new("math_arithmetic")
        .with_field("OP", text_field(op))
        .with_input("A", number_value(rng, depth - 1))
        .with_input("B", number_value(rng, depth - 1))
}

fn boolean_value(rng: &mut ThreadRng, depth: usize) -> BlockState {
    if depth == 0 || rng.random_bool(0.3) {
        let value = if rng.random_bool(0.5) { "TRUE" } else { "FALSE" };
        return BlockState::new("logic_boolean").with_field("BOOL", text_field(value));
    }
    match rng.random_range(0..3) {
        0 => BlockState::new("logic_negate").with_input("BOOL", boolean_value(rng, depth - 1)),
        1 => {
            let op = if rng.random_bool(0.5) { "AND" } else { "OR" };
            BlockState::new("logic_operation")
                .with_field("OP", text_field(op))
                .with_input("A", boolean_value(rng, depth - 1))
                .with_input("B", boolean_value(rng, depth - 1))
        }
        _ => {
            let op = COMPARE_OPS[rng.random_range(0..COMPARE_OPS.len())];
            BlockState::new("logic_compare")
                .with_field("OP", text_field(op))
                .with_input("A", number_value(rng, depth - 1))
                .with_input("B", number_value(rng, depth - 1))
        }
    }
}

fn text_value(rng: &mut ThreadRng, depth: usize) -> BlockState {
    match rng.random_range(0..3) {
        0 => BlockState::new("variables_get").with_field("VAR", variable(rng)),
        1 if depth > 0 => number_value(rng, depth),
        _ => {
            let words = ["hello", "world", "blocks", "done", ""];
            BlockState::new("text").with_field("TEXT", text_field(words[rng.random_range(0..words.len())]))
        }
    }
}

fn number_literal(value: f64) -> BlockState {
    BlockState::new("math_number").with_field("NUM", FieldValue::Number(value))
}

fn variable(rng: &mut ThreadRng) -> FieldValue {
    text_field(VARIABLES[rng.random_range(0..VARIABLES.len())])
}

fn text_field(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}
