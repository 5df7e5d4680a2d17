//! Blocks, their inputs and fields, and the typed connections joining them.
//!
//! Blocks never hold references to one another. Every link between two blocks is a
//! [`ConnectionRef`] naming the peer block and the slot on it, resolved through the
//! owning [`Workspace`](crate::workspace::Workspace).

pub mod connection;
pub mod definition;
pub mod library;
pub mod registry;

pub use connection::{Connection, ConnectionKind, ConnectionRef, ConnectionSlot};
pub use definition::{BlockDefinition, FieldDefinition, InputDefinition};
pub use registry::BlockRegistry;

use crate::geometry::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a block, unique within its workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The value stored in a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(s) if s == "TRUE" => Some(true),
            FieldValue::Text(s) if s == "FALSE" => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            FieldValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// What kind of editor a field represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Label,
    Text,
    Number,
    /// Options are `(display label, stored value)` pairs.
    Dropdown { options: Vec<(String, String)> },
    Checkbox,
    Variable,
}

/// A named (or anonymous label) field on an input.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) name: Option<String>,
    pub(crate) kind: FieldKind,
    pub(crate) value: FieldValue,
}

impl Field {
    pub fn new(name: Option<String>, kind: FieldKind, value: FieldValue) -> Self {
        Self { name, kind, value }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(None, FieldKind::Label, FieldValue::Text(text.into()))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Labels are part of the block definition and are not saved with the block.
    pub fn is_serializable(&self) -> bool {
        self.name.is_some() && self.kind != FieldKind::Label
    }

    pub fn is_editable(&self) -> bool {
        self.kind != FieldKind::Label
    }

    /// The text shown on the block for this field.
    pub fn display_text(&self) -> String {
        match &self.kind {
            FieldKind::Dropdown { options } => {
                let stored = self.value.to_string();
                options
                    .iter()
                    .find(|(_, value)| *value == stored)
                    .map(|(label, _)| label.clone())
                    .unwrap_or(stored)
            }
            FieldKind::Checkbox => String::new(),
            _ => self.value.to_string(),
        }
    }
}

/// The role an input plays on its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Value,
    Statement,
    Dummy,
}

/// Horizontal alignment of an input's fields within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Left,
    Centre,
    Right,
}

/// Outline of a block's output connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    #[default]
    Puzzle,
    Round,
    Hexagonal,
    Square,
}

/// A named slot on a block holding fields and at most one connection.
#[derive(Debug, Clone)]
pub struct Input {
    pub(crate) name: String,
    pub(crate) kind: InputKind,
    pub(crate) align: Align,
    pub(crate) fields: Vec<Field>,
    pub(crate) connection: Option<Connection>,
    pub(crate) visible: bool,
}

impl Input {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// A node of the block graph.
#[derive(Debug, Clone)]
pub struct Block {
    pub(crate) id: BlockId,
    pub(crate) block_type: String,
    pub(crate) inputs: Vec<Input>,
    pub(crate) previous: Option<Connection>,
    pub(crate) next: Option<Connection>,
    pub(crate) output: Option<Connection>,
    pub(crate) position: Coordinate,
    pub(crate) movable: bool,
    pub(crate) deletable: bool,
    pub(crate) editable: bool,
    pub(crate) collapsed: bool,
    pub(crate) enabled: bool,
    pub(crate) shadow: bool,
    pub(crate) inputs_inline: Option<bool>,
    pub(crate) output_shape: Option<OutputShape>,
    pub(crate) colour: String,
    pub(crate) comment: Option<String>,
    pub(crate) sequence: u64,
}

impl Block {
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|input| input.name == name)
    }

    pub(crate) fn input_mut(&mut self, name: &str) -> Option<&mut Input> {
        self.inputs.iter_mut().find(|input| input.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.inputs.iter().flat_map(|input| input.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|field| field.name() == Some(name))
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.inputs
            .iter_mut()
            .flat_map(|input| input.fields.iter_mut())
            .find(|field| field.name() == Some(name))
    }

    pub fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).map(Field::value)
    }

    pub fn connection(&self, slot: &ConnectionSlot) -> Option<&Connection> {
        match slot {
            ConnectionSlot::Previous => self.previous.as_ref(),
            ConnectionSlot::Next => self.next.as_ref(),
            ConnectionSlot::Output => self.output.as_ref(),
            ConnectionSlot::Input(name) => self.input(name).and_then(Input::connection),
        }
    }

    pub(crate) fn connection_mut(&mut self, slot: &ConnectionSlot) -> Option<&mut Connection> {
        match slot {
            ConnectionSlot::Previous => self.previous.as_mut(),
            ConnectionSlot::Next => self.next.as_mut(),
            ConnectionSlot::Output => self.output.as_mut(),
            ConnectionSlot::Input(name) => self
                .input_mut(name)
                .and_then(|input| input.connection.as_mut()),
        }
    }

    /// Every connection on the block, in input order followed by previous, output and next.
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionSlot, &Connection)> {
        let inputs = self.inputs.iter().filter_map(|input| {
            input
                .connection
                .as_ref()
                .map(|c| (ConnectionSlot::Input(input.name.clone()), c))
        });
        let edges = [
            (ConnectionSlot::Previous, self.previous.as_ref()),
            (ConnectionSlot::Output, self.output.as_ref()),
            (ConnectionSlot::Next, self.next.as_ref()),
        ]
        .into_iter()
        .filter_map(|(slot, c)| c.map(|c| (slot, c)));
        inputs.chain(edges)
    }

    pub fn previous_connection(&self) -> Option<&Connection> {
        self.previous.as_ref()
    }

    pub fn next_connection(&self) -> Option<&Connection> {
        self.next.as_ref()
    }

    pub fn output_connection(&self) -> Option<&Connection> {
        self.output.as_ref()
    }

    /// The connection this block hangs from, if it has a parent.
    pub fn parent_link(&self) -> Option<&ConnectionRef> {
        self.output
            .as_ref()
            .and_then(Connection::target)
            .or_else(|| self.previous.as_ref().and_then(Connection::target))
    }

    pub fn parent(&self) -> Option<&BlockId> {
        self.parent_link().map(|link| &link.block)
    }

    /// The slot on this block that links it to its parent.
    pub fn parent_slot(&self) -> Option<ConnectionSlot> {
        if self.output.as_ref().is_some_and(Connection::is_connected) {
            Some(ConnectionSlot::Output)
        } else if self.previous.as_ref().is_some_and(Connection::is_connected) {
            Some(ConnectionSlot::Previous)
        } else {
            None
        }
    }

    pub fn next_block(&self) -> Option<&BlockId> {
        self.next
            .as_ref()
            .and_then(Connection::target)
            .map(|link| &link.block)
    }

    /// Directly attached children: input occupants in input order, then the next block.
    pub fn children(&self) -> Vec<BlockId> {
        let mut children: Vec<BlockId> = self
            .inputs
            .iter()
            .filter_map(|input| input.connection.as_ref())
            .filter_map(|c| c.target().map(|link| link.block.clone()))
            .collect();
        if let Some(next) = self.next_block() {
            children.push(next.clone());
        }
        children
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn is_deletable(&self) -> bool {
        self.deletable
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_shadow(&self) -> bool {
        self.shadow
    }

    pub fn inputs_inline(&self) -> bool {
        self.inputs_inline.unwrap_or(false)
    }

    pub(crate) fn inputs_inline_setting(&self) -> Option<bool> {
        self.inputs_inline
    }

    pub fn output_shape(&self) -> Option<OutputShape> {
        self.output_shape
    }

    pub fn colour(&self) -> &str {
        &self.colour
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Text used when the block is collapsed: its field texts and labels joined by spaces.
    pub fn collapsed_text(&self) -> String {
        let text = self
            .inputs
            .iter()
            .filter(|input| input.visible)
            .flat_map(|input| input.fields.iter())
            .map(Field::display_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            self.block_type.clone()
        } else {
            text
        }
    }
}
