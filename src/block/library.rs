//! The standard block library: logic, loops, math, text and variables.

use super::registry::BlockRegistry;
use crate::error::DefinitionError;

const LOGIC_BLOCKS: &str = r#"[
  {
    "type": "logic_boolean",
    "message0": "%1",
    "args0": [
      {"type": "field_dropdown", "name": "BOOL", "options": [["true", "TRUE"], ["false", "FALSE"]]}
    ],
    "output": "Boolean",
    "outputShape": "hexagonal",
    "colour": 210
  },
  {
    "type": "logic_negate",
    "message0": "not %1",
    "args0": [{"type": "input_value", "name": "BOOL", "check": "Boolean"}],
    "output": "Boolean",
    "outputShape": "hexagonal",
    "colour": 210
  },
  {
    "type": "logic_compare",
    "message0": "%1 %2 %3",
    "args0": [
      {"type": "input_value", "name": "A"},
      {"type": "field_dropdown", "name": "OP", "options": [
        ["=", "EQ"], ["≠", "NEQ"], ["<", "LT"], ["≤", "LTE"], [">", "GT"], ["≥", "GTE"]
      ]},
      {"type": "input_value", "name": "B"}
    ],
    "inputsInline": true,
    "output": "Boolean",
    "outputShape": "hexagonal",
    "colour": 210
  },
  {
    "type": "logic_operation",
    "message0": "%1 %2 %3",
    "args0": [
      {"type": "input_value", "name": "A", "check": "Boolean"},
      {"type": "field_dropdown", "name": "OP", "options": [["and", "AND"], ["or", "OR"]]},
      {"type": "input_value", "name": "B", "check": "Boolean"}
    ],
    "inputsInline": true,
    "output": "Boolean",
    "outputShape": "hexagonal",
    "colour": 210
  },
  {
    "type": "controls_if",
    "message0": "if %1",
    "args0": [{"type": "input_value", "name": "IF0", "check": "Boolean"}],
    "message1": "do %1",
    "args1": [{"type": "input_statement", "name": "DO0"}],
    "previousStatement": null,
    "nextStatement": null,
    "colour": 210
  },
  {
    "type": "controls_ifelse",
    "message0": "if %1",
    "args0": [{"type": "input_value", "name": "IF0", "check": "Boolean"}],
    "message1": "do %1",
    "args1": [{"type": "input_statement", "name": "DO0"}],
    "message2": "else %1",
    "args2": [{"type": "input_statement", "name": "ELSE"}],
    "previousStatement": null,
    "nextStatement": null,
    "colour": 210
  }
]"#;

const LOOP_BLOCKS: &str = r#"[
  {
    "type": "controls_repeat_ext",
    "message0": "repeat %1 times",
    "args0": [{"type": "input_value", "name": "TIMES", "check": "Number"}],
    "message1": "do %1",
    "args1": [{"type": "input_statement", "name": "DO"}],
    "previousStatement": null,
    "nextStatement": null,
    "colour": 120
  },
  {
    "type": "controls_whileUntil",
    "message0": "%1 %2",
    "args0": [
      {"type": "field_dropdown", "name": "MODE", "options": [["repeat while", "WHILE"], ["repeat until", "UNTIL"]]},
      {"type": "input_value", "name": "BOOL", "check": "Boolean"}
    ],
    "message1": "do %1",
    "args1": [{"type": "input_statement", "name": "DO"}],
    "previousStatement": null,
    "nextStatement": null,
    "colour": 120
  }
]"#;

const MATH_BLOCKS: &str = r#"[
  {
    "type": "math_number",
    "message0": "%1",
    "args0": [{"type": "field_number", "name": "NUM", "value": 0}],
    "output": "Number",
    "outputShape": "round",
    "colour": 230
  },
  {
    "type": "math_arithmetic",
    "message0": "%1 %2 %3",
    "args0": [
      {"type": "input_value", "name": "A", "check": "Number"},
      {"type": "field_dropdown", "name": "OP", "options": [
        ["+", "ADD"], ["-", "MINUS"], ["×", "MULTIPLY"], ["÷", "DIVIDE"], ["^", "POWER"]
      ]},
      {"type": "input_value", "name": "B", "check": "Number"}
    ],
    "inputsInline": true,
    "output": "Number",
    "outputShape": "round",
    "colour": 230
  },
  {
    "type": "math_random_float",
    "message0": "random fraction",
    "output": "Number",
    "outputShape": "round",
    "colour": 230
  }
]"#;

const TEXT_BLOCKS: &str = r#"[
  {
    "type": "text",
    "message0": "“ %1 ”",
    "args0": [{"type": "field_input", "name": "TEXT", "text": ""}],
    "output": "String",
    "outputShape": "round",
    "colour": 160
  },
  {
    "type": "text_print",
    "message0": "print %1",
    "args0": [{"type": "input_value", "name": "TEXT"}],
    "previousStatement": null,
    "nextStatement": null,
    "colour": 160
  }
]"#;

const VARIABLE_BLOCKS: &str = r#"[
  {
    "type": "variables_get",
    "message0": "%1",
    "args0": [{"type": "field_variable", "name": "VAR", "variable": "item"}],
    "output": null,
    "outputShape": "round",
    "colour": 330
  },
  {
    "type": "variables_set",
    "message0": "set %1 to %2",
    "args0": [
      {"type": "field_variable", "name": "VAR", "variable": "item"},
      {"type": "input_value", "name": "VALUE"}
    ],
    "previousStatement": null,
    "nextStatement": null,
    "colour": 330
  }
]"#;

/// Registers every standard block type.
pub fn register_standard_blocks(registry: &mut BlockRegistry) -> Result<(), DefinitionError> {
    for group in [
        LOGIC_BLOCKS,
        LOOP_BLOCKS,
        MATH_BLOCKS,
        TEXT_BLOCKS,
        VARIABLE_BLOCKS,
    ] {
        registry.define_json(group)?;
    }
    Ok(())
}
