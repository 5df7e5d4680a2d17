use super::Workspace;
use crate::error::WorkspaceError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One entry of a flyout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToolboxItem {
    Block {
        #[serde(rename = "type")]
        block_type: String,
    },
    Label {
        text: String,
    },
    Sep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolboxCategory {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(default)]
    pub contents: Vec<ToolboxItem>,
}

/// The palette offered next to the workspace: either one flat flyout or a list of
/// categories, each opening its own flyout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ToolboxDefinition {
    FlyoutToolbox {
        #[serde(default)]
        contents: Vec<ToolboxItem>,
    },
    CategoryToolbox {
        #[serde(default)]
        contents: Vec<ToolboxCategory>,
    },
}

impl ToolboxDefinition {
    pub fn flyout(block_types: &[&str]) -> Self {
        ToolboxDefinition::FlyoutToolbox {
            contents: block_types
                .iter()
                .map(|t| ToolboxItem::Block {
                    block_type: t.to_string(),
                })
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, WorkspaceError> {
        serde_json::from_str(json).map_err(|e| WorkspaceError::InvalidToolboxState(e.to_string()))
    }

    pub fn has_categories(&self) -> bool {
        matches!(self, ToolboxDefinition::CategoryToolbox { .. })
    }

    /// Every block type offered, in palette order.
    pub fn block_types(&self) -> Vec<&str> {
        let items: Box<dyn Iterator<Item = &ToolboxItem>> = match self {
            ToolboxDefinition::FlyoutToolbox { contents } => Box::new(contents.iter()),
            ToolboxDefinition::CategoryToolbox { contents } => {
                Box::new(contents.iter().flat_map(|category| category.contents.iter()))
            }
        };
        items
            .filter_map(|item| match item {
                ToolboxItem::Block { block_type } => Some(block_type.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Workspace {
    pub fn toolbox(&self) -> Option<&ToolboxDefinition> {
        self.toolbox.as_ref()
    }

    /// Replaces the toolbox contents. The toolbox cannot be added, removed, or switched
    /// between flat and categorised after the workspace is built.
    pub fn update_toolbox(
        &mut self,
        definition: Option<ToolboxDefinition>,
    ) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let invalid = |message: &str| WorkspaceError::InvalidToolboxState(message.to_string());
        let definition = match (definition, &self.toolbox) {
            (None, Some(_)) => return Err(invalid("Can't nullify an existing toolbox.")),
            (None, None) => return Ok(()),
            (Some(_), None) => {
                return Err(invalid("Existing toolbox is null. Can't create new toolbox."))
            }
            (Some(new), Some(current)) => {
                if new.has_categories() && !current.has_categories() {
                    return Err(invalid("Existing toolbox has no categories. Can't change mode."));
                }
                if !new.has_categories() && current.has_categories() {
                    return Err(invalid("Existing toolbox has categories. Can't change mode."));
                }
                new
            }
        };
        if let Some(unknown) = definition
            .block_types()
            .into_iter()
            .find(|block_type| !self.registry.contains(block_type))
        {
            return Err(WorkspaceError::InvalidToolboxState(format!(
                "Toolbox offers unregistered block type '{}'.",
                unknown
            )));
        }
        debug!(entries = definition.block_types().len(), "updated toolbox");
        self.toolbox = Some(definition);
        Ok(())
    }
}
