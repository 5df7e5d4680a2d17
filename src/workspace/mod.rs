//! The workspace: owner of every block, the event bus and the deferred task queue.
//!
//! Blocks live in an arena keyed by [`BlockId`]. All structural edits go through
//! methods on [`Workspace`], which keep peers consistent, queue change events and
//! re-render the affected stacks.

pub mod connect;
pub mod display;
pub mod drag;
pub mod toolbox;

pub use display::DisplayWorkspace;
pub use drag::{DragOutcome, DragSession};
pub use toolbox::{ToolboxCategory, ToolboxDefinition, ToolboxItem};

use crate::block::{Block, BlockId, BlockRegistry, ConnectionRef, FieldValue};
use crate::error::WorkspaceError;
use crate::events::{
    ChangeElement, Event, EventBus, EventPayload, ListenerHandle, Placement, Task, TaskQueue,
};
use crate::geometry::{Coordinate, Rect};
use crate::layout::viewport::ViewportState;
use crate::options::WorkspaceOptions;
use crate::render::{RenderedBlock, Renderer};
use ahash::AHashMap;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_WORKSPACE: AtomicU64 = AtomicU64::new(1);

/// A surface holding blocks, their rendered geometry and the viewport onto them.
#[derive(Debug)]
pub struct Workspace {
    pub(crate) id: String,
    pub(crate) registry: BlockRegistry,
    pub(crate) options: WorkspaceOptions,
    pub(crate) blocks: IndexMap<BlockId, Block>,
    pub(crate) top_blocks: Vec<BlockId>,
    pub(crate) next_sequence: u64,
    pub(crate) next_id: u64,
    pub(crate) renderer: Renderer,
    pub(crate) rendered: AHashMap<BlockId, RenderedBlock>,
    pub(crate) viewport: ViewportState,
    pub(crate) bus: EventBus,
    pub(crate) tasks: TaskQueue,
    pub(crate) group: Option<String>,
    pub(crate) next_group: u64,
    pub(crate) toolbox: Option<ToolboxDefinition>,
    pub(crate) drag: Option<DragSession>,
    pub(crate) disposed: bool,
}

/// Builder for [`Workspace`].
pub struct WorkspaceBuilder {
    registry: BlockRegistry,
    options: WorkspaceOptions,
    id: Option<String>,
    toolbox: Option<ToolboxDefinition>,
}

impl WorkspaceBuilder {
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            registry,
            options: WorkspaceOptions::default(),
            id: None,
            toolbox: None,
        }
    }

    pub fn with_options(mut self, options: WorkspaceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_toolbox(mut self, toolbox: ToolboxDefinition) -> Self {
        self.toolbox = Some(toolbox);
        self
    }

    pub fn build(self) -> Workspace {
        let id = self.id.unwrap_or_else(|| {
            format!("workspace_{}", NEXT_WORKSPACE.fetch_add(1, Ordering::Relaxed))
        });
        Workspace {
            id,
            renderer: Renderer::new(&self.options),
            viewport: ViewportState::new(&self.options.zoom),
            registry: self.registry,
            options: self.options,
            blocks: IndexMap::new(),
            top_blocks: Vec::new(),
            next_sequence: 0,
            next_id: 0,
            rendered: AHashMap::new(),
            bus: EventBus::new(),
            tasks: TaskQueue::new(),
            group: None,
            next_group: 0,
            toolbox: self.toolbox,
            drag: None,
            disposed: false,
        }
    }
}

impl Workspace {
    pub fn builder(registry: BlockRegistry) -> WorkspaceBuilder {
        WorkspaceBuilder::new(registry)
    }

    pub fn new(registry: BlockRegistry) -> Self {
        Self::builder(registry).build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &WorkspaceOptions {
        &self.options
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn ensure_live(&self) -> Result<(), WorkspaceError> {
        if self.disposed {
            Err(WorkspaceError::WorkspaceDisposed)
        } else {
            Ok(())
        }
    }

    // ---- lookup ----

    pub fn get_block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn block(&self, id: &BlockId) -> Result<&Block, WorkspaceError> {
        self.blocks
            .get(id)
            .ok_or_else(|| WorkspaceError::DisposedReference(id.clone()))
    }

    pub(crate) fn block_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Every block in creation order, attached ones included.
    pub fn all_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Ids of unattached blocks in the order they became top-level.
    pub fn top_block_ids(&self) -> Vec<BlockId> {
        self.top_blocks.clone()
    }

    /// Top-level blocks sorted by position, top to bottom then along the reading direction.
    pub fn top_blocks_ordered(&self) -> Vec<&Block> {
        let direction = if self.options.rtl { -1.0 } else { 1.0 };
        let mut blocks: Vec<&Block> = self
            .top_blocks
            .iter()
            .filter_map(|id| self.blocks.get(id))
            .collect();
        blocks.sort_by(|a, b| {
            let (pa, pb) = (a.position(), b.position());
            pa.y.total_cmp(&pb.y)
                .then((pa.x * direction).total_cmp(&(pb.x * direction)))
                .then(a.sequence().cmp(&b.sequence()))
        });
        blocks
    }

    /// `id` and everything attached below it, parents before children.
    pub fn descendants(&self, id: &BlockId) -> Vec<BlockId> {
        let mut result = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            let Some(block) = self.blocks.get(&current) else {
                continue;
            };
            if result.len() > self.blocks.len() {
                break;
            }
            stack.extend(block.children().into_iter().rev());
            result.push(current);
        }
        result
    }

    /// The top-level block of the stack containing `id`.
    pub fn root_of(&self, id: &BlockId) -> Result<BlockId, WorkspaceError> {
        let mut current = self.block(id)?;
        for _ in 0..self.blocks.len() {
            match current.parent() {
                Some(parent) => current = self.block(parent)?,
                None => return Ok(current.id().clone()),
            }
        }
        Ok(current.id().clone())
    }

    /// True when `ancestor` is `id` or one of its parents.
    pub fn is_ancestor(&self, ancestor: &BlockId, id: &BlockId) -> bool {
        let mut current = Some(id.clone());
        let mut steps = 0;
        while let Some(block_id) = current {
            if &block_id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.blocks.len() {
                return false;
            }
            current = self.blocks.get(&block_id).and_then(|b| b.parent().cloned());
        }
        false
    }

    /// The block attached to a connection, if any.
    pub fn target_block(&self, connection: &ConnectionRef) -> Option<&Block> {
        let target = self
            .blocks
            .get(&connection.block)?
            .connection(&connection.slot)?
            .target()?;
        self.blocks.get(&target.block)
    }

    // ---- rendered geometry ----

    pub fn rendered(&self, id: &BlockId) -> Option<&RenderedBlock> {
        self.rendered.get(id)
    }

    pub(crate) fn store_rendered(&mut self, id: BlockId, rendered: RenderedBlock) {
        self.rendered.insert(id, rendered);
    }

    /// Re-renders the whole stack containing `id`.
    pub fn render(&mut self, id: &BlockId) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let root = self.root_of(id)?;
        let pass = self.renderer.measure(self, &root)?;
        pass.commit(self);
        Ok(())
    }

    pub fn render_all(&mut self) -> Result<(), WorkspaceError> {
        for id in self.top_block_ids() {
            self.render(&id)?;
        }
        Ok(())
    }

    /// Bounding box of a block and everything below it, in workspace units.
    pub fn block_bounds(&self, id: &BlockId) -> Option<Rect> {
        let block = self.blocks.get(id)?;
        let size = self.rendered.get(id)?.stack_size;
        let position = block.position();
        let (left, right) = if self.options.rtl {
            (position.x - size.width, position.x)
        } else {
            (position.x, position.x + size.width)
        };
        Some(Rect::new(position.y, position.y + size.height, left, right))
    }

    /// Union of every top-level stack's bounds, or `None` when the workspace is empty.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.top_blocks
            .iter()
            .filter_map(|id| self.block_bounds(id))
            .reduce(|acc, rect| acc.union(&rect))
    }

    pub fn set_highlighted(&mut self, id: &BlockId, highlighted: bool) -> Result<(), WorkspaceError> {
        self.block(id)?;
        if let Some(rendered) = self.rendered.get_mut(id) {
            rendered.path.update_highlighted(highlighted);
        }
        Ok(())
    }

    // ---- creation and deletion ----

    /// Creates a top-level block at the origin and fires a create event.
    pub fn create_block(&mut self, block_type: &str) -> Result<BlockId, WorkspaceError> {
        self.create_block_at(block_type, Coordinate::ORIGIN)
    }

    pub fn create_block_at(
        &mut self,
        block_type: &str,
        position: Coordinate,
    ) -> Result<BlockId, WorkspaceError> {
        self.ensure_live()?;
        let id = self.insert_block(block_type, None)?;
        if let Some(block) = self.blocks.get_mut(&id) {
            block.position = position;
        }
        self.render(&id)?;
        self.fire_create(&id);
        self.tasks.schedule(Task::ResizeContents);
        debug!(block = %id, block_type, "created block");
        Ok(id)
    }

    /// Adds an unconnected block without firing events or rendering.
    ///
    /// `id` is used when it is free; otherwise a fresh one is generated.
    pub(crate) fn insert_block(
        &mut self,
        block_type: &str,
        id: Option<BlockId>,
    ) -> Result<BlockId, WorkspaceError> {
        if !self.registry.contains(block_type) {
            return Err(WorkspaceError::UnknownBlockType(block_type.to_string()));
        }
        let id = match id {
            Some(id) if !self.blocks.contains_key(&id) => id,
            _ => self.generate_id(),
        };
        let block = self
            .registry
            .get(block_type)
            .map(|definition| definition.instantiate(id.clone(), self.next_sequence))
            .ok_or_else(|| WorkspaceError::UnknownBlockType(block_type.to_string()))?;
        self.next_sequence += 1;
        self.blocks.insert(id.clone(), block);
        self.top_blocks.push(id.clone());
        Ok(id)
    }

    fn generate_id(&mut self) -> BlockId {
        loop {
            self.next_id += 1;
            let candidate = BlockId::new(format!("block_{}", self.next_id));
            if !self.blocks.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub(crate) fn fire_create(&mut self, id: &BlockId) {
        let Some(state) = self.save_block(id) else {
            return;
        };
        let ids = self.descendants(id);
        self.fire(EventPayload::BlockCreate {
            block: id.clone(),
            ids,
            state: Box::new(state),
        });
    }

    /// Deletes a block and everything attached below it.
    ///
    /// If the block sat in an input with a shadow, the shadow is respawned.
    pub fn delete_block(&mut self, id: &BlockId) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let block = self.block(id)?;
        let was_shadow = block.is_shadow();
        let parent_link = block.parent_link().cloned();
        let old_state = self.save_block(id);
        let ids = self.descendants(id);

        if let Some(link) = &parent_link {
            if let Some(connection) = self
                .blocks
                .get_mut(&link.block)
                .and_then(|parent| parent.connection_mut(&link.slot))
            {
                connection.target = None;
            }
        }
        self.remove_subtree(id);

        if let Some(old_state) = old_state {
            self.fire(EventPayload::BlockDelete {
                block: id.clone(),
                ids,
                old_state: Box::new(old_state),
                was_shadow,
            });
        }
        if let Some(link) = parent_link {
            if !was_shadow {
                self.respawn_shadow(&link)?;
            }
            self.render(&link.block)?;
        }
        self.tasks.schedule(Task::ResizeContents);
        debug!(block = %id, "deleted block");
        Ok(())
    }

    /// Removes `id` and its descendants from the arena without firing events.
    /// The caller is responsible for clearing the parent's side of the link.
    pub(crate) fn remove_subtree(&mut self, id: &BlockId) -> Vec<BlockId> {
        let ids = self.descendants(id);
        for removed in &ids {
            self.blocks.shift_remove(removed);
            self.rendered.remove(removed);
        }
        self.top_blocks.retain(|top| !ids.contains(top));
        ids
    }

    /// Deletes every block, firing a delete event for each top-level stack.
    pub fn clear(&mut self) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        for id in self.top_block_ids() {
            self.delete_block(&id)?;
        }
        Ok(())
    }

    /// Tears the workspace down. Listeners are dropped and further calls fail.
    pub fn dispose(&mut self) {
        self.bus.clear();
        self.tasks.clear();
        self.blocks.clear();
        self.top_blocks.clear();
        self.rendered.clear();
        self.drag = None;
        self.disposed = true;
        debug!(workspace = %self.id, "disposed workspace");
    }

    // ---- block properties ----

    pub fn set_field_value(
        &mut self,
        id: &BlockId,
        name: &str,
        value: FieldValue,
    ) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let field = self
            .blocks
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::DisposedReference(id.clone()))?
            .field_mut(name)
            .ok_or_else(|| WorkspaceError::UnknownField {
                block: id.clone(),
                field: name.to_string(),
            })?;
        let old = std::mem::replace(&mut field.value, value.clone());
        self.fire_change(id, ChangeElement::Field, Some(name), to_json(&old), to_json(&value));
        self.render(id)
    }

    pub fn set_collapsed(&mut self, id: &BlockId, collapsed: bool) -> Result<(), WorkspaceError> {
        let old = self.update_block(id, |block| std::mem::replace(&mut block.collapsed, collapsed))?;
        self.fire_change(id, ChangeElement::Collapsed, None, old.into(), collapsed.into());
        self.render(id)
    }

    pub fn set_enabled(&mut self, id: &BlockId, enabled: bool) -> Result<(), WorkspaceError> {
        let old = self.update_block(id, |block| std::mem::replace(&mut block.enabled, enabled))?;
        self.fire_change(id, ChangeElement::Disabled, None, (!old).into(), (!enabled).into());
        let is_shadow = self.block(id)?.is_shadow();
        if let Some(rendered) = self.rendered.get_mut(id) {
            rendered.path.apply_colour(is_shadow, !enabled);
        }
        Ok(())
    }

    pub fn set_inputs_inline(&mut self, id: &BlockId, inline: bool) -> Result<(), WorkspaceError> {
        let old = self.update_block(id, |block| {
            std::mem::replace(&mut block.inputs_inline, Some(inline)).unwrap_or(false)
        })?;
        self.fire_change(id, ChangeElement::Inline, None, old.into(), inline.into());
        self.render(id)
    }

    pub fn set_comment(&mut self, id: &BlockId, comment: Option<String>) -> Result<(), WorkspaceError> {
        let new_value = to_json(&comment);
        let old = self.update_block(id, |block| std::mem::replace(&mut block.comment, comment))?;
        self.fire_change(id, ChangeElement::Comment, None, to_json(&old), new_value);
        Ok(())
    }

    pub fn set_movable(&mut self, id: &BlockId, movable: bool) -> Result<(), WorkspaceError> {
        self.update_block(id, |block| block.movable = movable)
    }

    pub fn set_deletable(&mut self, id: &BlockId, deletable: bool) -> Result<(), WorkspaceError> {
        self.update_block(id, |block| block.deletable = deletable)
    }

    pub fn set_editable(&mut self, id: &BlockId, editable: bool) -> Result<(), WorkspaceError> {
        self.update_block(id, |block| block.editable = editable)
    }

    fn update_block<T>(
        &mut self,
        id: &BlockId,
        update: impl FnOnce(&mut Block) -> T,
    ) -> Result<T, WorkspaceError> {
        self.ensure_live()?;
        let block = self
            .blocks
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::DisposedReference(id.clone()))?;
        Ok(update(block))
    }

    // ---- movement ----

    /// Moves a top-level block (and its stack) to an absolute position.
    pub fn move_to(&mut self, id: &BlockId, position: Coordinate) -> Result<(), WorkspaceError> {
        self.move_block(id, position, Vec::new())
    }

    pub fn move_by(&mut self, id: &BlockId, dx: f64, dy: f64) -> Result<(), WorkspaceError> {
        let position = self.block(id)?.position().translate(dx, dy);
        self.move_block(id, position, Vec::new())
    }

    pub(crate) fn move_block(
        &mut self,
        id: &BlockId,
        position: Coordinate,
        reason: Vec<String>,
    ) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let block = self.block(id)?;
        if block.parent().is_some() {
            return Err(WorkspaceError::NotTopLevel(id.clone()));
        }
        let old = block.position();
        self.translate_stack(id, position.x - old.x, position.y - old.y);
        self.fire(EventPayload::BlockMove {
            block: id.clone(),
            old: Placement::top_level(old),
            new: Placement::top_level(position),
            reason,
        });
        self.tasks.schedule(Task::ResizeContents);
        Ok(())
    }

    /// Shifts a block and its descendants without firing events.
    pub(crate) fn translate_stack(&mut self, id: &BlockId, dx: f64, dy: f64) {
        for descendant in self.descendants(id) {
            if let Some(block) = self.blocks.get_mut(&descendant) {
                block.position = block.position.translate(dx, dy);
            }
        }
    }

    // ---- events ----

    pub(crate) fn fire(&mut self, payload: EventPayload) {
        let event = Event::new(self.id.clone(), self.group.clone(), payload);
        if self.bus.push(event) {
            self.tasks.schedule(Task::FireEvents);
        }
    }

    fn fire_change(
        &mut self,
        id: &BlockId,
        element: ChangeElement,
        name: Option<&str>,
        old_value: serde_json::Value,
        new_value: serde_json::Value,
    ) {
        self.fire(EventPayload::BlockChange {
            block: id.clone(),
            element,
            name: name.map(str::to_string),
            old_value,
            new_value,
        });
    }

    pub fn add_change_listener(&mut self, listener: impl FnMut(&Event) + 'static) -> ListenerHandle {
        self.bus.subscribe(listener)
    }

    pub fn remove_change_listener(&mut self, handle: ListenerHandle) -> bool {
        self.bus.unsubscribe(handle)
    }

    /// Events queued but not yet delivered.
    pub fn pending_events(&self) -> &[Event] {
        self.bus.pending()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn set_group(&mut self, group: Option<String>) {
        self.group = group;
    }

    /// Opens an event group unless one is already open. Returns true when it opened one.
    pub fn start_group(&mut self) -> bool {
        if self.group.is_some() {
            return false;
        }
        self.next_group += 1;
        self.group = Some(format!("group_{}", self.next_group));
        true
    }

    pub fn end_group(&mut self) {
        self.group = None;
    }

    /// Runs every pending task: delivers events and settles the viewport.
    ///
    /// Returns the events delivered to listeners, in order.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut delivered = Vec::new();
        while let Some(task) = self.tasks.pop() {
            match task {
                Task::FireEvents => delivered.extend(self.bus.deliver()),
                Task::ResizeContents => {
                    self.clamp_scroll();
                    self.tasks.schedule(Task::ViewportCheck);
                }
                Task::ViewportCheck => self.check_viewport(),
            }
        }
        delivered
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
