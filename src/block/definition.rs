use super::{Align, Block, BlockId, Connection, ConnectionKind, Field, FieldKind, FieldValue};
use super::{Input, InputKind, OutputShape};
use crate::error::DefinitionError;
use crate::geometry::Coordinate;
use crate::render::colour;
use serde::{Deserialize, Serialize};

/// The canonical definition of a block type, ready for registration.
///
/// Definitions can be built in code with the `with_*` methods or parsed from the
/// message/args JSON shape through [`JsonBlockDefinition`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDefinition {
    pub block_type: String,
    pub inputs: Vec<InputDefinition>,
    pub output: Option<Vec<String>>,
    pub previous: Option<Vec<String>>,
    pub next: Option<Vec<String>>,
    pub inputs_inline: Option<bool>,
    pub output_shape: Option<OutputShape>,
    pub colour: String,
    pub tooltip: Option<String>,
}

/// Definition of one input and the fields that precede its connection.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDefinition {
    pub name: String,
    pub kind: InputKind,
    pub check: Vec<String>,
    pub align: Align,
    pub fields: Vec<FieldDefinition>,
}

/// Definition of one field and its initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: Option<String>,
    pub kind: FieldKind,
    pub default: FieldValue,
}

impl BlockDefinition {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            inputs: Vec::new(),
            output: None,
            previous: None,
            next: None,
            inputs_inline: None,
            output_shape: None,
            colour: colour::DEFAULT_COLOUR.to_string(),
            tooltip: None,
        }
    }

    pub fn with_input(mut self, input: InputDefinition) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, check: &[&str]) -> Self {
        self.output = Some(to_tags(check));
        self
    }

    pub fn with_previous(mut self, check: &[&str]) -> Self {
        self.previous = Some(to_tags(check));
        self
    }

    pub fn with_next(mut self, check: &[&str]) -> Self {
        self.next = Some(to_tags(check));
        self
    }

    pub fn with_inputs_inline(mut self, inline: bool) -> Self {
        self.inputs_inline = Some(inline);
        self
    }

    pub fn with_output_shape(mut self, shape: OutputShape) -> Self {
        self.output_shape = Some(shape);
        self
    }

    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = colour.into();
        self
    }

    pub fn with_hue(mut self, hue: f64) -> Self {
        self.colour = colour::hue_to_hex(hue);
        self
    }

    /// All type tags mentioned anywhere in the definition.
    pub fn check_tags(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .flat_map(|input| input.check.iter())
            .chain(self.output.iter().flatten())
            .chain(self.previous.iter().flatten())
            .chain(self.next.iter().flatten())
            .map(String::as_str)
    }

    /// Creates a fresh, unconnected block of this type.
    pub(crate) fn instantiate(&self, id: BlockId, sequence: u64) -> Block {
        let inputs = self
            .inputs
            .iter()
            .map(|def| Input {
                name: def.name.clone(),
                kind: def.kind,
                align: def.align,
                fields: def.fields.iter().map(FieldDefinition::instantiate).collect(),
                connection: match def.kind {
                    InputKind::Value => {
                        Some(Connection::new(ConnectionKind::InputValue, def.check.clone()))
                    }
                    InputKind::Statement => {
                        Some(Connection::new(ConnectionKind::Next, def.check.clone()))
                    }
                    InputKind::Dummy => None,
                },
                visible: true,
            })
            .collect();

        Block {
            id,
            block_type: self.block_type.clone(),
            inputs,
            previous: self
                .previous
                .clone()
                .map(|check| Connection::new(ConnectionKind::Previous, check)),
            next: self
                .next
                .clone()
                .map(|check| Connection::new(ConnectionKind::Next, check)),
            output: self
                .output
                .clone()
                .map(|check| Connection::new(ConnectionKind::Output, check)),
            position: Coordinate::ORIGIN,
            movable: true,
            deletable: true,
            editable: true,
            collapsed: false,
            enabled: true,
            shadow: false,
            inputs_inline: self.inputs_inline,
            output_shape: self.output_shape,
            colour: self.colour.clone(),
            comment: None,
            sequence,
        }
    }
}

impl InputDefinition {
    fn new(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            check: Vec::new(),
            align: Align::Left,
            fields: Vec::new(),
        }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self::new(name, InputKind::Value)
    }

    pub fn statement(name: impl Into<String>) -> Self {
        Self::new(name, InputKind::Statement)
    }

    pub fn dummy(name: impl Into<String>) -> Self {
        Self::new(name, InputKind::Dummy)
    }

    pub fn with_check(mut self, check: &[&str]) -> Self {
        self.check = to_tags(check);
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_label(self, text: &str) -> Self {
        self.with_field(FieldDefinition::label(text))
    }
}

impl FieldDefinition {
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            name: None,
            kind: FieldKind::Label,
            default: FieldValue::Text(text.into()),
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: FieldKind::Text,
            default: FieldValue::Text(value.into()),
        }
    }

    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: Some(name.into()),
            kind: FieldKind::Number,
            default: FieldValue::Number(value),
        }
    }

    /// A dropdown defaulting to its first option.
    pub fn dropdown(name: impl Into<String>, options: &[(&str, &str)]) -> Self {
        let options: Vec<(String, String)> = options
            .iter()
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect();
        let default = options
            .first()
            .map(|(_, value)| FieldValue::Text(value.clone()))
            .unwrap_or_else(|| FieldValue::Text(String::new()));
        Self {
            name: Some(name.into()),
            kind: FieldKind::Dropdown { options },
            default,
        }
    }

    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: Some(name.into()),
            kind: FieldKind::Checkbox,
            default: FieldValue::Bool(checked),
        }
    }

    pub fn variable(name: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: FieldKind::Variable,
            default: FieldValue::Text(variable.into()),
        }
    }

    fn instantiate(&self) -> Field {
        Field::new(self.name.clone(), self.kind.clone(), self.default.clone())
    }
}

fn to_tags(check: &[&str]) -> Vec<String> {
    check.iter().map(|tag| tag.to_string()).collect()
}

// --- Message/args JSON shape ---

/// A check given either as a single tag or a list of tags. `null` means no check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonCheck {
    One(String),
    Many(Vec<String>),
}

impl JsonCheck {
    fn into_tags(self) -> Vec<String> {
        match self {
            JsonCheck::One(tag) => vec![tag],
            JsonCheck::Many(tags) => tags,
        }
    }
}

/// One `%n` argument of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonArg {
    InputValue {
        name: String,
        #[serde(default)]
        check: Option<JsonCheck>,
        #[serde(default)]
        align: Option<Align>,
    },
    InputStatement {
        name: String,
        #[serde(default)]
        check: Option<JsonCheck>,
    },
    InputDummy {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        align: Option<Align>,
    },
    FieldLabel {
        text: String,
    },
    FieldInput {
        name: String,
        #[serde(default)]
        text: String,
    },
    FieldNumber {
        name: String,
        #[serde(default)]
        value: f64,
    },
    FieldDropdown {
        name: String,
        options: Vec<(String, String)>,
    },
    FieldCheckbox {
        name: String,
        #[serde(default)]
        checked: bool,
    },
    FieldVariable {
        name: String,
        #[serde(default)]
        variable: String,
    },
}

/// Colour given as a hue in degrees or a `#rrggbb` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonColour {
    Hue(f64),
    Hex(String),
}

/// Block definition in the message/args JSON shape.
///
/// A key that is present with `null` (for example `"output": null`) is treated the
/// same as an empty check list, so the connection exists and accepts anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBlockDefinition {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub message0: Option<String>,
    #[serde(default)]
    pub args0: Vec<JsonArg>,
    #[serde(default)]
    pub message1: Option<String>,
    #[serde(default)]
    pub args1: Vec<JsonArg>,
    #[serde(default)]
    pub message2: Option<String>,
    #[serde(default)]
    pub args2: Vec<JsonArg>,
    #[serde(default, deserialize_with = "present_check")]
    pub output: Option<JsonCheck>,
    #[serde(default, alias = "previousStatement", deserialize_with = "present_check")]
    pub previous_statement: Option<JsonCheck>,
    #[serde(default, alias = "nextStatement", deserialize_with = "present_check")]
    pub next_statement: Option<JsonCheck>,
    #[serde(default, alias = "inputsInline")]
    pub inputs_inline: Option<bool>,
    #[serde(default, alias = "outputShape")]
    pub output_shape: Option<OutputShape>,
    #[serde(default)]
    pub colour: Option<JsonColour>,
    #[serde(default)]
    pub tooltip: Option<String>,
}

/// Maps a present `null` to an empty check list; absent keys stay `None` via `default`.
fn present_check<'de, D>(deserializer: D) -> Result<Option<JsonCheck>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<JsonCheck> = Option::deserialize(deserializer)?;
    Ok(Some(value.unwrap_or(JsonCheck::Many(Vec::new()))))
}

impl TryFrom<JsonBlockDefinition> for BlockDefinition {
    type Error = DefinitionError;

    fn try_from(json: JsonBlockDefinition) -> Result<Self, Self::Error> {
        let mut definition = BlockDefinition::new(json.block_type.clone());
        let messages = [
            (json.message0, json.args0),
            (json.message1, json.args1),
            (json.message2, json.args2),
        ];
        for (message, args) in messages {
            if let Some(message) = message {
                interpolate(&json.block_type, &message, args, &mut definition.inputs)?;
            }
        }
        definition.output = json.output.map(JsonCheck::into_tags);
        definition.previous = json.previous_statement.map(JsonCheck::into_tags);
        definition.next = json.next_statement.map(JsonCheck::into_tags);
        definition.inputs_inline = json.inputs_inline;
        definition.output_shape = json.output_shape;
        definition.tooltip = json.tooltip;
        if let Some(colour) = json.colour {
            definition.colour = match colour {
                JsonColour::Hue(hue) => colour::hue_to_hex(hue),
                JsonColour::Hex(hex) => hex,
            };
        }
        Ok(definition)
    }
}

/// Splits a message on its `%n` references, turning text into labels and args into
/// fields and inputs. Fields gather onto the next input; trailing fields get a dummy input.
fn interpolate(
    block_type: &str,
    message: &str,
    args: Vec<JsonArg>,
    inputs: &mut Vec<InputDefinition>,
) -> Result<(), DefinitionError> {
    let mut args: Vec<Option<JsonArg>> = args.into_iter().map(Some).collect();
    let mut pending: Vec<FieldDefinition> = Vec::new();
    let mut text = String::new();
    let mut chars = message.chars().peekable();

    let flush_text = |text: &mut String, pending: &mut Vec<FieldDefinition>| {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pending.push(FieldDefinition::label(trimmed));
        }
        text.clear();
    };

    while let Some(c) = chars.next() {
        if c != '%' || !chars.peek().is_some_and(char::is_ascii_digit) {
            text.push(c);
            continue;
        }
        let mut digits = String::new();
        while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(d);
            chars.next();
        }
        flush_text(&mut text, &mut pending);
        let index: usize = digits.parse().map_err(|_| {
            DefinitionError::JsonParseError(format!("bad reference '%{}' in '{}'", digits, block_type))
        })?;
        let arg = index
            .checked_sub(1)
            .and_then(|i| args.get_mut(i))
            .and_then(Option::take)
            .ok_or_else(|| {
                DefinitionError::JsonParseError(format!(
                    "message of '{}' references missing or reused argument %{}",
                    block_type, index
                ))
            })?;
        apply_arg(arg, &mut pending, inputs);
    }
    flush_text(&mut text, &mut pending);

    if !pending.is_empty() {
        let mut input = InputDefinition::dummy("");
        input.fields = pending;
        inputs.push(input);
    }
    Ok(())
}

fn apply_arg(arg: JsonArg, pending: &mut Vec<FieldDefinition>, inputs: &mut Vec<InputDefinition>) {
    let input = match arg {
        JsonArg::InputValue { name, check, align } => {
            let mut input = InputDefinition::value(name);
            input.check = check.map(JsonCheck::into_tags).unwrap_or_default();
            input.align = align.unwrap_or_default();
            input
        }
        JsonArg::InputStatement { name, check } => {
            let mut input = InputDefinition::statement(name);
            input.check = check.map(JsonCheck::into_tags).unwrap_or_default();
            input
        }
        JsonArg::InputDummy { name, align } => {
            InputDefinition::dummy(name.unwrap_or_default()).with_align(align.unwrap_or_default())
        }
        JsonArg::FieldLabel { text } => return pending.push(FieldDefinition::label(text)),
        JsonArg::FieldInput { name, text } => {
            return pending.push(FieldDefinition::text(name, text));
        }
        JsonArg::FieldNumber { name, value } => {
            return pending.push(FieldDefinition::number(name, value));
        }
        JsonArg::FieldDropdown { name, options } => {
            let default = options
                .first()
                .map(|(_, value)| FieldValue::Text(value.clone()))
                .unwrap_or_else(|| FieldValue::Text(String::new()));
            return pending.push(FieldDefinition {
                name: Some(name),
                kind: FieldKind::Dropdown { options },
                default,
            });
        }
        JsonArg::FieldCheckbox { name, checked } => {
            return pending.push(FieldDefinition::checkbox(name, checked));
        }
        JsonArg::FieldVariable { name, variable } => {
            return pending.push(FieldDefinition::variable(name, variable));
        }
    };
    let mut input = input;
    input.fields = std::mem::take(pending);
    inputs.push(input);
}

/// Parses a JSON array of block definitions.
pub fn parse_definitions(json: &str) -> Result<Vec<BlockDefinition>, DefinitionError> {
    let raw: Vec<JsonBlockDefinition> =
        serde_json::from_str(json).map_err(|e| DefinitionError::JsonParseError(e.to_string()))?;
    raw.into_iter().map(BlockDefinition::try_from).collect()
}
