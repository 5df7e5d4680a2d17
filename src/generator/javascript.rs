//! JavaScript emitters for the standard block library.

use super::{BlockNode, Code, Generator, GeneratorBuilder, Order, ORDER_ATOMIC, ORDER_NONE};
use crate::error::GeneratorError;

pub const ORDER_FUNCTION_CALL: Order = 2;
pub const ORDER_LOGICAL_NOT: Order = 4;
pub const ORDER_UNARY_NEGATION: Order = 4;
pub const ORDER_MULTIPLICATIVE: Order = 5;
pub const ORDER_ADDITIVE: Order = 6;
pub const ORDER_RELATIONAL: Order = 8;
pub const ORDER_EQUALITY: Order = 9;
pub const ORDER_LOGICAL_AND: Order = 13;
pub const ORDER_LOGICAL_OR: Order = 14;
pub const ORDER_ASSIGNMENT: Order = 16;

type Emit = Result<Code, GeneratorError>;

/// A generator builder preloaded with emitters for every standard block.
pub fn builder() -> GeneratorBuilder {
    Generator::builder()
        .with_emitter("logic_boolean", logic_boolean)
        .with_emitter("logic_negate", logic_negate)
        .with_emitter("logic_compare", logic_compare)
        .with_emitter("logic_operation", logic_operation)
        .with_emitter("controls_if", controls_if)
        .with_emitter("controls_ifelse", controls_if)
        .with_emitter("controls_repeat_ext", controls_repeat)
        .with_emitter("controls_whileUntil", controls_while_until)
        .with_emitter("math_number", math_number)
        .with_emitter("math_arithmetic", math_arithmetic)
        .with_emitter("math_random_float", math_random_float)
        .with_emitter("text", text)
        .with_emitter("text_print", text_print)
        .with_emitter("variables_get", variables_get)
        .with_emitter("variables_set", variables_set)
}

fn field_text(node: &BlockNode, name: &str) -> String {
    node.field(name).map(|v| v.to_string()).unwrap_or_default()
}

fn value_or(
    generator: &Generator,
    node: &BlockNode,
    input: &str,
    order: Order,
    default: &str,
) -> Result<String, GeneratorError> {
    let code = generator.value_to_code(node, input, order)?;
    Ok(if code.is_empty() { default.to_string() } else { code })
}

/// Variable names become identifiers: anything outside `[A-Za-z0-9_]` turns into `_`.
fn identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

fn logic_boolean(node: &BlockNode, _: &Generator) -> Emit {
    let code = if field_text(node, "BOOL") == "TRUE" { "true" } else { "false" };
    Ok(Code::value(code, ORDER_ATOMIC))
}

fn logic_negate(node: &BlockNode, generator: &Generator) -> Emit {
    let operand = value_or(generator, node, "BOOL", ORDER_LOGICAL_NOT, "true")?;
    Ok(Code::value(format!("!{}", operand), ORDER_LOGICAL_NOT))
}

fn logic_compare(node: &BlockNode, generator: &Generator) -> Emit {
    let (operator, order) = match field_text(node, "OP").as_str() {
        "NEQ" => ("!=", ORDER_EQUALITY),
        "LT" => ("<", ORDER_RELATIONAL),
        "LTE" => ("<=", ORDER_RELATIONAL),
        "GT" => (">", ORDER_RELATIONAL),
        "GTE" => (">=", ORDER_RELATIONAL),
        _ => ("==", ORDER_EQUALITY),
    };
    let a = value_or(generator, node, "A", order, "0")?;
    let b = value_or(generator, node, "B", order, "0")?;
    Ok(Code::value(format!("{} {} {}", a, operator, b), order))
}

fn logic_operation(node: &BlockNode, generator: &Generator) -> Emit {
    let (operator, order) = match field_text(node, "OP").as_str() {
        "OR" => ("||", ORDER_LOGICAL_OR),
        _ => ("&&", ORDER_LOGICAL_AND),
    };
    let a = value_or(generator, node, "A", order, "false")?;
    let b = value_or(generator, node, "B", order, "false")?;
    Ok(Code::value(format!("{} {} {}", a, operator, b), order))
}

fn controls_if(node: &BlockNode, generator: &Generator) -> Emit {
    let condition = value_or(generator, node, "IF0", ORDER_NONE, "false")?;
    let body = generator.statement_to_code(node, "DO0")?;
    let mut code = format!("if ({}) {{\n{}}}", condition, body);
    if node.inputs.contains_key("ELSE") {
        let otherwise = generator.statement_to_code(node, "ELSE")?;
        code.push_str(&format!(" else {{\n{}}}", otherwise));
    }
    code.push('\n');
    Ok(Code::statement(code))
}

fn controls_repeat(node: &BlockNode, generator: &Generator) -> Emit {
    let times = value_or(generator, node, "TIMES", ORDER_ASSIGNMENT, "0")?;
    let body = generator.statement_to_code(node, "DO")?;
    Ok(Code::statement(format!(
        "for (let count = 0; count < {}; count++) {{\n{}}}\n",
        times, body
    )))
}

fn controls_while_until(node: &BlockNode, generator: &Generator) -> Emit {
    let until = field_text(node, "MODE") == "UNTIL";
    let order = if until { ORDER_LOGICAL_NOT } else { ORDER_NONE };
    let mut condition = value_or(generator, node, "BOOL", order, "false")?;
    if until {
        condition = format!("!{}", condition);
    }
    let body = generator.statement_to_code(node, "DO")?;
    Ok(Code::statement(format!("while ({}) {{\n{}}}\n", condition, body)))
}

fn math_number(node: &BlockNode, _: &Generator) -> Emit {
    let value = node.field("NUM").and_then(|v| v.as_f64()).unwrap_or(0.0);
    let order = if value < 0.0 { ORDER_UNARY_NEGATION } else { ORDER_ATOMIC };
    Ok(Code::value(field_text(node, "NUM"), order))
}

fn math_arithmetic(node: &BlockNode, generator: &Generator) -> Emit {
    let op = field_text(node, "OP");
    if op == "POWER" {
        let a = value_or(generator, node, "A", ORDER_NONE, "0")?;
        let b = value_or(generator, node, "B", ORDER_NONE, "0")?;
        return Ok(Code::value(format!("Math.pow({}, {})", a, b), ORDER_FUNCTION_CALL));
    }
    let (operator, order) = match op.as_str() {
        "MINUS" => ("-", ORDER_ADDITIVE),
        "MULTIPLY" => ("*", ORDER_MULTIPLICATIVE),
        "DIVIDE" => ("/", ORDER_MULTIPLICATIVE),
        _ => ("+", ORDER_ADDITIVE),
    };
    let a = value_or(generator, node, "A", order, "0")?;
    let b = value_or(generator, node, "B", order, "0")?;
    Ok(Code::value(format!("{} {} {}", a, operator, b), order))
}

fn math_random_float(_: &BlockNode, _: &Generator) -> Emit {
    Ok(Code::value("Math.random()", ORDER_FUNCTION_CALL))
}

fn text(node: &BlockNode, _: &Generator) -> Emit {
    let literal = serde_json::to_string(&field_text(node, "TEXT")).unwrap_or_else(|_| "\"\"".to_string());
    Ok(Code::value(literal, ORDER_ATOMIC))
}

fn text_print(node: &BlockNode, generator: &Generator) -> Emit {
    let message = value_or(generator, node, "TEXT", ORDER_NONE, "''")?;
    Ok(Code::statement(format!("console.log({});\n", message)))
}

fn variables_get(node: &BlockNode, _: &Generator) -> Emit {
    Ok(Code::value(identifier(&field_text(node, "VAR")), ORDER_ATOMIC))
}

fn variables_set(node: &BlockNode, generator: &Generator) -> Emit {
    let value = value_or(generator, node, "VALUE", ORDER_ASSIGNMENT, "0")?;
    Ok(Code::statement(format!(
        "{} = {};\n",
        identifier(&field_text(node, "VAR")),
        value
    )))
}
