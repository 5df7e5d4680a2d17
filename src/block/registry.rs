use super::definition::{parse_definitions, BlockDefinition};
use super::InputKind;
use crate::error::DefinitionError;
use crate::render::colour;
use ahash::AHashSet;
use indexmap::IndexMap;
use tracing::debug;

/// Check tags every registry knows about.
pub const BUILTIN_CHECK_TAGS: &[&str] = &["Boolean", "Number", "String", "Array", "Colour"];

/// Registered block types and the vocabulary of type-check tags they may use.
///
/// Tags are validated when a definition is registered, so a misspelt check fails
/// at startup rather than silently refusing every connection later.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    definitions: IndexMap<String, BlockDefinition>,
    check_tags: AHashSet<String>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// An empty registry that knows the built-in check tags.
    pub fn new() -> Self {
        Self {
            definitions: IndexMap::new(),
            check_tags: BUILTIN_CHECK_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// A registry preloaded with the standard block library.
    pub fn with_standard_library() -> Result<Self, DefinitionError> {
        let mut registry = Self::new();
        super::library::register_standard_blocks(&mut registry)?;
        Ok(registry)
    }

    pub fn register_check_tag(&mut self, tag: impl Into<String>) {
        self.check_tags.insert(tag.into());
    }

    pub fn is_known_tag(&self, tag: &str) -> bool {
        self.check_tags.contains(tag)
    }

    /// Validates and registers a definition, replacing any earlier one of the same type.
    pub fn define(&mut self, definition: BlockDefinition) -> Result<(), DefinitionError> {
        self.validate(&definition)?;
        debug!(block_type = %definition.block_type, "registered block definition");
        self.definitions
            .insert(definition.block_type.clone(), definition);
        Ok(())
    }

    /// Registers every definition in a JSON array. Nothing is registered if any fails.
    pub fn define_json(&mut self, json: &str) -> Result<usize, DefinitionError> {
        let definitions = parse_definitions(json)?;
        for definition in &definitions {
            self.validate(definition)?;
        }
        let count = definitions.len();
        for definition in definitions {
            self.definitions
                .insert(definition.block_type.clone(), definition);
        }
        Ok(count)
    }

    pub fn get(&self, block_type: &str) -> Option<&BlockDefinition> {
        self.definitions.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.definitions.contains_key(block_type)
    }

    pub fn block_types(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn validate(&self, definition: &BlockDefinition) -> Result<(), DefinitionError> {
        let block_type = &definition.block_type;

        if definition.output.is_some() && definition.previous.is_some() {
            return Err(DefinitionError::OutputAndPrevious {
                block_type: block_type.clone(),
            });
        }

        if colour::parse_hex(&definition.colour).is_none() {
            return Err(DefinitionError::InvalidColour {
                block_type: block_type.clone(),
                colour: definition.colour.clone(),
            });
        }

        if let Some(tag) = definition.check_tags().find(|tag| !self.is_known_tag(tag)) {
            return Err(DefinitionError::UnknownCheckTag {
                block_type: block_type.clone(),
                tag: tag.to_string(),
            });
        }

        let mut seen = AHashSet::new();
        for input in &definition.inputs {
            if input.kind == InputKind::Dummy {
                if !input.check.is_empty() {
                    return Err(DefinitionError::CheckOnDummyInput {
                        block_type: block_type.clone(),
                        input: input.name.clone(),
                    });
                }
                if input.name.is_empty() {
                    continue;
                }
            }
            if !seen.insert(input.name.as_str()) {
                return Err(DefinitionError::DuplicateInput {
                    block_type: block_type.clone(),
                    input: input.name.clone(),
                });
            }
        }
        Ok(())
    }
}
