use crate::block::{BlockId, FieldValue, InputKind};
use crate::workspace::Workspace;
use indexmap::IndexMap;
use serde::Serialize;

/// A connected child as seen from its parent input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputNode {
    pub kind: InputKind,
    pub block: Option<BlockNode>,
}

/// Read-only logical view of one block and everything attached below it.
///
/// This is all an emitter sees: no geometry, no connection bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockNode {
    pub id: BlockId,
    pub block_type: String,
    pub enabled: bool,
    pub shadow: bool,
    pub fields: IndexMap<String, FieldValue>,
    pub inputs: IndexMap<String, InputNode>,
    pub next: Option<Box<BlockNode>>,
}

impl BlockNode {
    /// Builds the tree rooted at `id`, or `None` if no such block exists.
    pub fn from_workspace(workspace: &Workspace, id: &BlockId) -> Option<BlockNode> {
        let block = workspace.get_block(id)?;
        let fields = block
            .fields()
            .filter_map(|field| field.name().map(|name| (name.to_string(), field.value().clone())))
            .collect();
        let inputs = block
            .inputs()
            .iter()
            .filter(|input| input.kind() != InputKind::Dummy)
            .map(|input| {
                let child = input
                    .connection()
                    .and_then(|c| c.target())
                    .and_then(|target| BlockNode::from_workspace(workspace, &target.block));
                (
                    input.name().to_string(),
                    InputNode {
                        kind: input.kind(),
                        block: child,
                    },
                )
            })
            .collect();
        let next = block
            .next_block()
            .and_then(|next| BlockNode::from_workspace(workspace, next))
            .map(Box::new);

        Some(BlockNode {
            id: block.id().clone(),
            block_type: block.block_type().to_string(),
            enabled: block.is_enabled(),
            shadow: block.is_shadow(),
            fields,
            inputs,
            next,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The block plugged into `name`, if any.
    pub fn input(&self, name: &str) -> Option<&BlockNode> {
        self.inputs.get(name).and_then(|input| input.block.as_ref())
    }

    /// Number of blocks in the tree, this one included.
    pub fn block_count(&self) -> usize {
        let inputs: usize = self
            .inputs
            .values()
            .filter_map(|input| input.block.as_ref())
            .map(BlockNode::block_count)
            .sum();
        1 + inputs + self.next.as_ref().map_or(0, |next| next.block_count())
    }
}

impl Workspace {
    pub fn block_tree(&self, id: &BlockId) -> Option<BlockNode> {
        BlockNode::from_workspace(self, id)
    }

    /// One tree per top-level stack, in reading order.
    pub fn block_trees(&self) -> Vec<BlockNode> {
        self.top_blocks_ordered()
            .into_iter()
            .filter_map(|block| self.block_tree(block.id()))
            .collect()
    }
}
