use super::colour::BlockStyle;
use super::constants::ConstantProvider;
use super::drawer::Drawer;
use super::highlighter::Highlighter;
use super::info::{ConnectedBlock, RenderInfo};
use super::path_object::{BasicPathObject, GerasPathObject, PathObject};
use crate::block::{Block, BlockId, Connection};
use crate::error::RenderError;
use crate::geometry::{Coordinate, Size};
use crate::options::{RendererKind, WorkspaceOptions};
use crate::workspace::Workspace;
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// The measured layout and drawn paths of one block.
#[derive(Debug)]
pub struct RenderedBlock {
    pub info: RenderInfo,
    pub path: Box<dyn PathObject>,
    /// Own height and width including connected inputs.
    pub size: Size,
    /// Size including every block attached below through next connections.
    pub stack_size: Size,
}

/// Everything measured for one stack, not yet written back to the workspace.
#[derive(Debug)]
pub struct RenderPass {
    pub root: BlockId,
    /// Children before their parents.
    pub blocks: Vec<(BlockId, RenderedBlock)>,
}

impl RenderPass {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Stores connection offsets and rendered geometry, then moves every
    /// descendant so its connections line up with its parent's.
    pub fn commit(self, workspace: &mut Workspace) {
        let root = self.root;
        for (id, rendered) in self.blocks {
            if let Some(block) = workspace.block_mut(&id) {
                for (slot, offset) in rendered.info.connection_offsets() {
                    if let Some(connection) = block.connection_mut(&slot) {
                        connection.offset = offset;
                    }
                }
            }
            workspace.store_rendered(id, rendered);
        }
        position_children(workspace, &root);
    }
}

fn position_children(workspace: &mut Workspace, root: &BlockId) {
    let mut stack = vec![root.clone()];
    while let Some(id) = stack.pop() {
        let Some(parent) = workspace.get_block(&id) else {
            continue;
        };
        let origin = parent.position();
        let mut moves = Vec::new();
        for child_id in parent.children() {
            let Some(child) = workspace.get_block(&child_id) else {
                continue;
            };
            let (Some(link), Some(slot)) = (child.parent_link(), child.parent_slot()) else {
                continue;
            };
            let parent_offset = parent
                .connection(&link.slot)
                .map(Connection::offset)
                .unwrap_or(Coordinate::ORIGIN);
            let child_offset = child
                .connection(&slot)
                .map(Connection::offset)
                .unwrap_or(Coordinate::ORIGIN);
            moves.push((child_id, origin + parent_offset - child_offset));
        }
        for (child_id, position) in moves {
            if let Some(child) = workspace.block_mut(&child_id) {
                child.position = position;
            }
            stack.push(child_id);
        }
    }
}

/// Measures and draws blocks with one set of constants.
#[derive(Debug, Clone)]
pub struct Renderer {
    constants: ConstantProvider,
    rtl: bool,
    kind: RendererKind,
}

impl Renderer {
    pub fn new(options: &WorkspaceOptions) -> Self {
        Self {
            constants: options.constants.clone(),
            rtl: options.rtl,
            kind: options.renderer,
        }
    }

    pub fn constants(&self) -> &ConstantProvider {
        &self.constants
    }

    pub fn kind(&self) -> RendererKind {
        self.kind
    }

    /// Measures `root` and everything attached to it, children first.
    ///
    /// Nothing is written to the workspace, so a failure leaves it untouched.
    pub fn measure(&self, workspace: &Workspace, root: &BlockId) -> Result<RenderPass, RenderError> {
        let mut pass = RenderPass {
            root: root.clone(),
            blocks: Vec::new(),
        };
        let mut visited = AHashSet::new();
        let mut connected = AHashMap::new();
        self.visit(workspace, root, &mut visited, &mut connected, &mut pass)?;
        debug!(root = %root, blocks = pass.len(), "measured stack");
        Ok(pass)
    }

    fn visit(
        &self,
        workspace: &Workspace,
        id: &BlockId,
        visited: &mut AHashSet<BlockId>,
        connected: &mut AHashMap<BlockId, ConnectedBlock>,
        pass: &mut RenderPass,
    ) -> Result<(), RenderError> {
        if !visited.insert(id.clone()) {
            return Err(RenderError::Cycle(id.clone()));
        }
        let block = workspace
            .get_block(id)
            .ok_or_else(|| RenderError::MissingBlock(id.clone()))?;
        for child in block.children() {
            self.visit(workspace, &child, visited, connected, pass)?;
        }

        let mut rendered = self.render_block(block, connected);
        let mut stack_size = rendered.size;
        if let Some(next) = block.next_block().and_then(|next| connected.get(next)) {
            stack_size.height += next.size.height - self.constants.notch_height;
            stack_size.width = stack_size.width.max(next.size.width);
        }
        rendered.stack_size = stack_size;
        connected.insert(
            id.clone(),
            ConnectedBlock {
                size: stack_size,
                output_shape: block.output_shape(),
            },
        );
        pass.blocks.push((id.clone(), rendered));
        Ok(())
    }

    /// Measures and draws one block. Connected children must already be in `connected`.
    pub fn render_block(
        &self,
        block: &Block,
        connected: &AHashMap<BlockId, ConnectedBlock>,
    ) -> RenderedBlock {
        let info = RenderInfo::measure(block, &self.constants, self.rtl, connected);
        let outline = Drawer::new(&info, &self.constants).draw();
        let highlight = Highlighter::new(&info, &self.constants).draw();

        let mut path = self.make_path_object(BlockStyle::from_colour(block.colour()));
        path.set_path(&outline);
        path.set_highlight_path(&highlight);
        path.apply_colour(block.is_shadow(), !block.is_enabled());
        if self.rtl {
            path.flip_rtl();
        }

        let size = info.size();
        RenderedBlock {
            info,
            path,
            size,
            stack_size: size,
        }
    }

    pub fn make_path_object(&self, style: BlockStyle) -> Box<dyn PathObject> {
        match self.kind {
            RendererKind::Basic => Box::new(BasicPathObject::new(style)),
            RendererKind::Geras => Box::new(GerasPathObject::new(style)),
        }
    }
}
