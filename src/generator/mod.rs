//! Turning block trees into source text.
//!
//! The workspace exposes each stack as a [`BlockNode`] tree. A [`Generator`] walks
//! it, handing every block to the [`BlockEmitter`] registered for its type. The
//! generator knows nothing about the target language beyond operator precedence
//! numbers and the indent string.

pub mod javascript;
pub mod tree;

pub use tree::{BlockNode, InputNode};

use crate::error::GeneratorError;
use crate::workspace::Workspace;
use ahash::AHashMap;
use tracing::debug;

/// Binding strength of an expression. Lower binds tighter.
pub type Order = u8;

pub const ORDER_ATOMIC: Order = 0;
pub const ORDER_NONE: Order = 99;

/// What an emitter produced for one block.
#[derive(Debug, Clone, PartialEq)]
pub enum Code {
    /// An expression and the precedence of its outermost operator.
    Value { code: String, order: Order },
    /// One or more complete statements, newline terminated.
    Statement(String),
}

impl Code {
    pub fn value(code: impl Into<String>, order: Order) -> Self {
        Code::Value {
            code: code.into(),
            order,
        }
    }

    pub fn statement(code: impl Into<String>) -> Self {
        Code::Statement(code.into())
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Code::Value { .. } => "value",
            Code::Statement(_) => "statement",
        }
    }
}

/// Produces code for one block type.
pub trait BlockEmitter {
    fn emit(&self, node: &BlockNode, generator: &Generator) -> Result<Code, GeneratorError>;
}

impl<F> BlockEmitter for F
where
    F: Fn(&BlockNode, &Generator) -> Result<Code, GeneratorError>,
{
    fn emit(&self, node: &BlockNode, generator: &Generator) -> Result<Code, GeneratorError> {
        self(node, generator)
    }
}

/// Builder for [`Generator`].
pub struct GeneratorBuilder {
    emitters: AHashMap<String, Box<dyn BlockEmitter>>,
    aliases: AHashMap<String, String>,
    indent: String,
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self {
            emitters: AHashMap::new(),
            aliases: AHashMap::new(),
            indent: "  ".to_string(),
        }
    }

    pub fn with_emitter(
        mut self,
        block_type: impl Into<String>,
        emitter: impl BlockEmitter + 'static,
    ) -> Self {
        self.emitters.insert(block_type.into(), Box::new(emitter));
        self
    }

    /// Generates `alias` blocks with the emitter registered for `target`.
    pub fn with_type_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn build(self) -> Generator {
        Generator {
            emitters: self.emitters,
            aliases: self.aliases,
            indent: self.indent,
        }
    }
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks block trees and asks registered emitters for their code.
pub struct Generator {
    emitters: AHashMap<String, Box<dyn BlockEmitter>>,
    aliases: AHashMap<String, String>,
    indent: String,
}

impl Generator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    pub fn indent_str(&self) -> &str {
        &self.indent
    }

    pub fn has_emitter(&self, block_type: &str) -> bool {
        self.emitter_for(block_type).is_some()
    }

    fn emitter_for(&self, block_type: &str) -> Option<&dyn BlockEmitter> {
        let resolved = self
            .aliases
            .get(block_type)
            .map(String::as_str)
            .unwrap_or(block_type);
        self.emitters.get(resolved).map(Box::as_ref)
    }

    fn emit(&self, node: &BlockNode) -> Result<Code, GeneratorError> {
        self.emitter_for(&node.block_type)
            .ok_or_else(|| GeneratorError::MissingEmitter(node.block_type.clone()))?
            .emit(node, self)
    }

    /// Code for one block. Statement code includes every block below it.
    ///
    /// A disabled block contributes nothing; for statements, generation carries on
    /// with the block after it.
    pub fn block_to_code(&self, node: &BlockNode) -> Result<Code, GeneratorError> {
        if !node.enabled {
            return match &node.next {
                Some(next) => self.block_to_code(next),
                None => Ok(Code::statement("")),
            };
        }
        match self.emit(node)? {
            Code::Statement(mut code) => {
                if let Some(next) = &node.next {
                    match self.block_to_code(next)? {
                        Code::Statement(rest) => code.push_str(&rest),
                        other => {
                            return Err(GeneratorError::WrongCodeKind {
                                block_type: next.block_type.clone(),
                                expected: "statement",
                                found: other.kind_name(),
                            })
                        }
                    }
                }
                Ok(Code::Statement(code))
            }
            value => Ok(value),
        }
    }

    /// Code of the value plugged into `input`, parenthesised when its own operator
    /// binds looser than `outer_order`. An empty input gives an empty string.
    pub fn value_to_code(
        &self,
        node: &BlockNode,
        input: &str,
        outer_order: Order,
    ) -> Result<String, GeneratorError> {
        let slot = node
            .inputs
            .get(input)
            .ok_or_else(|| GeneratorError::UnknownInput(node.id.clone(), input.to_string()))?;
        let Some(child) = slot.block.as_ref().filter(|child| child.enabled) else {
            return Ok(String::new());
        };
        match self.emit(child)? {
            Code::Value { code, order } => {
                let same_neutral =
                    order == outer_order && (outer_order == ORDER_ATOMIC || outer_order == ORDER_NONE);
                if !code.is_empty() && outer_order <= order && !same_neutral {
                    Ok(format!("({})", code))
                } else {
                    Ok(code)
                }
            }
            other => Err(GeneratorError::WrongCodeKind {
                block_type: child.block_type.clone(),
                expected: "value",
                found: other.kind_name(),
            }),
        }
    }

    /// Code of the statements plugged into `input`, indented one level.
    pub fn statement_to_code(&self, node: &BlockNode, input: &str) -> Result<String, GeneratorError> {
        let slot = node
            .inputs
            .get(input)
            .ok_or_else(|| GeneratorError::UnknownInput(node.id.clone(), input.to_string()))?;
        let Some(child) = slot.block.as_ref() else {
            return Ok(String::new());
        };
        match self.block_to_code(child)? {
            Code::Statement(code) => Ok(prefix_lines(&code, &self.indent)),
            other => Err(GeneratorError::WrongCodeKind {
                block_type: child.block_type.clone(),
                expected: "statement",
                found: other.kind_name(),
            }),
        }
    }

    /// Generates every top-level stack in reading order.
    ///
    /// Loose value blocks are written on a line of their own.
    pub fn workspace_to_code(&self, workspace: &Workspace) -> Result<String, GeneratorError> {
        let mut output = String::new();
        let trees = workspace.block_trees();
        for tree in &trees {
            match self.block_to_code(tree)? {
                Code::Statement(code) => output.push_str(&code),
                Code::Value { code, .. } if !code.is_empty() => {
                    output.push_str(&code);
                    output.push('\n');
                }
                Code::Value { .. } => {}
            }
        }
        debug!(stacks = trees.len(), bytes = output.len(), "generated code");
        Ok(output)
    }
}

/// Prepends `prefix` to every non-empty line.
pub fn prefix_lines(text: &str, prefix: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect()
}
