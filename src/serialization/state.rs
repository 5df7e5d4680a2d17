use crate::block::{BlockId, FieldValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_true(value: &bool) -> bool {
    *value
}

fn default_true() -> bool {
    true
}

/// Saved form of one block and everything attached below it.
///
/// Flags are only written when they differ from their defaults, so a minimal
/// record is just `{"type": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BlockId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub enabled: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub deletable: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub movable: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub editable: bool,
    /// Only present when the block overrides its definition's inline setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, ConnectionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<ConnectionState>>,
}

impl BlockState {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            id: None,
            x: None,
            y: None,
            collapsed: false,
            enabled: true,
            deletable: true,
            movable: true,
            editable: true,
            inline: None,
            comment: None,
            fields: IndexMap::new(),
            inputs: IndexMap::new(),
            next: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, block: BlockState) -> Self {
        self.inputs.entry(name.into()).or_default().block = Some(Box::new(block));
        self
    }

    pub fn with_shadow(mut self, name: impl Into<String>, shadow: BlockState) -> Self {
        self.inputs.entry(name.into()).or_default().shadow = Some(Box::new(shadow));
        self
    }

    pub fn with_next(mut self, block: BlockState) -> Self {
        self.next.get_or_insert_with(Default::default).block = Some(Box::new(block));
        self
    }

    pub fn immovable(mut self) -> Self {
        self.movable = false;
        self
    }

    /// Number of blocks in this record, shadows included.
    pub fn block_count(&self) -> usize {
        let inputs: usize = self.inputs.values().map(ConnectionState::block_count).sum();
        let next = self.next.as_ref().map_or(0, |next| next.block_count());
        1 + inputs + next
    }

    /// The same record with every id removed, for comparing structure.
    pub fn without_ids(&self) -> BlockState {
        let mut state = self.clone();
        state.strip_ids();
        state
    }

    fn strip_ids(&mut self) {
        self.id = None;
        for connection in self.inputs.values_mut() {
            connection.strip_ids();
        }
        if let Some(next) = self.next.as_mut() {
            next.strip_ids();
        }
    }
}

/// What is plugged into one connection: a real block, a shadow, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Box<BlockState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Box<BlockState>>,
}

impl ConnectionState {
    fn block_count(&self) -> usize {
        let block = self.block.as_ref().map_or(0, |b| b.block_count());
        let shadow = self.shadow.as_ref().map_or(0, |s| s.block_count());
        block + shadow
    }

    fn strip_ids(&mut self) {
        if let Some(block) = self.block.as_mut() {
            block.strip_ids();
        }
        if let Some(shadow) = self.shadow.as_mut() {
            shadow.strip_ids();
        }
    }
}

/// Top-level blocks of a workspace, in their saved order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlocksState {
    #[serde(rename = "languageVersion", default)]
    pub language_version: u32,
    #[serde(default)]
    pub blocks: Vec<BlockState>,
}

/// Saved form of a whole workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceState {
    #[serde(default)]
    pub blocks: BlocksState,
}

impl WorkspaceState {
    pub fn new(blocks: Vec<BlockState>) -> Self {
        Self {
            blocks: BlocksState {
                language_version: 0,
                blocks,
            },
        }
    }

    pub fn from_json(json: &str) -> Result<Self, crate::error::SerializationError> {
        serde_json::from_str(json)
            .map_err(|e| crate::error::SerializationError::JsonParseError(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn top_blocks(&self) -> &[BlockState] {
        &self.blocks.blocks
    }
}
