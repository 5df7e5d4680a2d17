use super::state::{BlockState, ConnectionState, WorkspaceState};
use crate::block::connection::checks_intersect;
use crate::block::{Block, BlockId, Connection, ConnectionKind, ConnectionRef, ConnectionSlot, InputKind};
use crate::error::{SerializationError, WorkspaceError};
use crate::events::{EventPayload, Task};
use crate::geometry::Coordinate;
use crate::workspace::Workspace;
use tracing::info;

/// Vertical gap left between existing content and a batch added by `append_workspace`.
pub const APPEND_GAP: f64 = 10.0;

impl Workspace {
    /// Saves one block and everything attached below it.
    ///
    /// Top-level blocks carry their position; attached blocks do not.
    pub fn save_block(&self, id: &BlockId) -> Option<BlockState> {
        let block = self.blocks.get(id)?;
        Some(self.block_state(block, block.parent().is_none()))
    }

    /// Saves every top-level stack in top-block order.
    pub fn save(&self) -> WorkspaceState {
        WorkspaceState::new(
            self.top_blocks
                .iter()
                .filter_map(|id| self.save_block(id))
                .collect(),
        )
    }

    pub fn save_json(&self) -> String {
        self.save().to_json()
    }

    fn block_state(&self, block: &Block, with_position: bool) -> BlockState {
        let mut state = BlockState::new(block.block_type()).with_id(block.id().clone());
        if with_position {
            let position = block.position();
            state = state.at(position.x, position.y);
        }
        state.collapsed = block.is_collapsed();
        state.enabled = block.is_enabled();
        state.deletable = block.is_deletable();
        state.movable = block.is_movable();
        state.editable = block.is_editable();
        let default_inline = self
            .registry
            .get(block.block_type())
            .and_then(|definition| definition.inputs_inline);
        if block.inputs_inline_setting() != default_inline {
            state.inline = block.inputs_inline_setting();
        }
        state.comment = block.comment().map(str::to_string);

        for field in block.fields().filter(|field| field.is_serializable()) {
            if let Some(name) = field.name() {
                state.fields.insert(name.to_string(), field.value().clone());
            }
        }
        for input in block.inputs() {
            if let Some(saved) = input.connection().and_then(|c| self.connection_state(c)) {
                state.inputs.insert(input.name().to_string(), saved);
            }
        }
        state.next = block
            .next_connection()
            .and_then(|c| self.connection_state(c))
            .map(Box::new);
        state
    }

    fn connection_state(&self, connection: &Connection) -> Option<ConnectionState> {
        let occupant = connection.target().and_then(|t| self.blocks.get(&t.block));
        let saved_shadow = || connection.shadow_state().cloned().map(Box::new);
        let saved = match occupant {
            Some(child) if child.is_shadow() => ConnectionState {
                block: None,
                shadow: Some(Box::new(self.block_state(child, false))),
            },
            Some(child) => ConnectionState {
                block: Some(Box::new(self.block_state(child, false))),
                shadow: saved_shadow(),
            },
            None => ConnectionState {
                block: None,
                shadow: saved_shadow(),
            },
        };
        (saved.block.is_some() || saved.shadow.is_some()).then_some(saved)
    }

    /// Checks a record against the registry without creating anything.
    pub fn validate_state(&self, state: &BlockState) -> Result<(), SerializationError> {
        let definition = self
            .registry
            .get(&state.block_type)
            .ok_or_else(|| SerializationError::UnknownBlockType(state.block_type.clone()))?;

        for name in state.fields.keys() {
            let known = definition
                .inputs
                .iter()
                .flat_map(|input| input.fields.iter())
                .any(|field| field.name.as_deref() == Some(name.as_str()));
            if !known {
                return Err(SerializationError::UnknownField {
                    block_type: state.block_type.clone(),
                    field: name.clone(),
                });
            }
        }

        for (name, connection) in &state.inputs {
            let input = definition
                .inputs
                .iter()
                .find(|input| &input.name == name)
                .ok_or_else(|| SerializationError::UnknownInput {
                    block_type: state.block_type.clone(),
                    input: name.clone(),
                })?;
            for child in connection.block.iter().chain(connection.shadow.iter()) {
                self.validate_state(child)?;
                let child_definition = self.registry.get(&child.block_type);
                let fits = match input.kind {
                    InputKind::Value => child_definition
                        .and_then(|d| d.output.as_ref())
                        .is_some_and(|check| checks_intersect(&input.check, check)),
                    InputKind::Statement => child_definition
                        .and_then(|d| d.previous.as_ref())
                        .is_some_and(|check| checks_intersect(&input.check, check)),
                    InputKind::Dummy => false,
                };
                if !fits {
                    return Err(SerializationError::MissingConnection {
                        block_type: state.block_type.clone(),
                        connection: format!("input '{}'", name),
                        child_type: child.block_type.clone(),
                    });
                }
            }
        }

        if let Some(next) = &state.next {
            for child in next.block.iter().chain(next.shadow.iter()) {
                self.validate_state(child)?;
                let fits = definition
                    .next
                    .as_ref()
                    .zip(self.registry.get(&child.block_type).and_then(|d| d.previous.as_ref()))
                    .is_some_and(|(next, previous)| checks_intersect(next, previous));
                if !fits {
                    return Err(SerializationError::MissingConnection {
                        block_type: state.block_type.clone(),
                        connection: "next".to_string(),
                        child_type: child.block_type.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Creates the blocks of a validated record without firing events or rendering.
    pub(crate) fn build_block(
        &mut self,
        state: &BlockState,
        shadow: bool,
    ) -> Result<BlockId, WorkspaceError> {
        let id = self.insert_block(&state.block_type, state.id.clone())?;
        if let Some(block) = self.blocks.get_mut(&id) {
            block.position = Coordinate::new(state.x.unwrap_or(0.0), state.y.unwrap_or(0.0));
            block.collapsed = state.collapsed;
            block.enabled = state.enabled;
            block.deletable = state.deletable;
            block.movable = state.movable;
            block.editable = state.editable;
            block.shadow = shadow;
            if state.inline.is_some() {
                block.inputs_inline = state.inline;
            }
            block.comment = state.comment.clone();
            for (name, value) in &state.fields {
                if let Some(field) = block.field_mut(name) {
                    field.value = value.clone();
                }
            }
        }

        for (name, connection) in &state.inputs {
            let parent = ConnectionRef::input(id.clone(), name.clone());
            self.attach_state(&parent, connection, shadow)?;
        }
        if let Some(next) = &state.next {
            self.attach_state(&ConnectionRef::next(id.clone()), next, shadow)?;
        }
        Ok(id)
    }

    fn attach_state(
        &mut self,
        parent: &ConnectionRef,
        connection: &ConnectionState,
        parent_is_shadow: bool,
    ) -> Result<(), WorkspaceError> {
        let Some(kind) = self.connection_mut(parent).map(|conn| {
            if let Some(shadow) = &connection.shadow {
                conn.shadow_state = Some((**shadow).clone());
            }
            conn.kind
        }) else {
            return Ok(());
        };
        let (child, is_shadow) = match (&connection.block, &connection.shadow) {
            (Some(block), _) => (block, parent_is_shadow),
            (None, Some(shadow)) => (shadow, true),
            (None, None) => return Ok(()),
        };
        let child_id = self.build_block(child, is_shadow)?;
        let child_slot = match kind {
            ConnectionKind::InputValue => ConnectionSlot::Output,
            _ => ConnectionSlot::Previous,
        };
        self.link(parent, &ConnectionRef::new(child_id, child_slot));
        Ok(())
    }

    /// Adds a block record to the workspace as a new top-level stack.
    ///
    /// Ids already in use are replaced with fresh ones, so appending the same record
    /// twice yields two independent copies.
    pub fn append(&mut self, state: &BlockState) -> Result<BlockId, SerializationError> {
        self.ensure_live()?;
        self.validate_state(state)?;
        let id = self.build_block(state, false)?;
        self.render(&id)?;
        self.fire_create(&id);
        self.tasks.schedule(Task::ResizeContents);
        Ok(id)
    }

    /// Appends every stack of `state`. When the workspace already has content, the new
    /// batch is moved to sit just below it, aligned with its leading edge.
    pub fn append_workspace(
        &mut self,
        state: &WorkspaceState,
    ) -> Result<Vec<BlockId>, SerializationError> {
        self.ensure_live()?;
        for block in state.top_blocks() {
            self.validate_state(block)?;
        }
        let existing = self.content_bounds();
        let ids = state
            .top_blocks()
            .iter()
            .map(|block| self.append(block))
            .collect::<Result<Vec<_>, _>>()?;

        let added = ids
            .iter()
            .filter_map(|id| self.block_bounds(id))
            .reduce(|acc, rect| acc.union(&rect));
        if let (Some(existing), Some(added)) = (existing, added) {
            let dx = if self.options.rtl {
                existing.right - added.right
            } else {
                existing.left - added.left
            };
            let dy = existing.bottom + APPEND_GAP - added.top;
            for id in &ids {
                self.move_by(id, dx, dy)?;
            }
        }
        Ok(ids)
    }

    /// Replaces the workspace contents with `state`.
    ///
    /// The state is validated first, so a bad record leaves the workspace untouched.
    pub fn load(&mut self, state: &WorkspaceState) -> Result<Vec<BlockId>, SerializationError> {
        self.ensure_live()?;
        for block in state.top_blocks() {
            self.validate_state(block)?;
        }
        let opened = self.start_group();
        self.clear()?;
        let ids = state
            .top_blocks()
            .iter()
            .map(|block| self.append(block))
            .collect::<Result<Vec<_>, _>>();
        self.fire(EventPayload::FinishedLoading);
        if opened {
            self.end_group();
        }
        let ids = ids?;
        info!(stacks = ids.len(), blocks = self.block_count(), "loaded workspace");
        Ok(ids)
    }

    pub fn load_json(&mut self, json: &str) -> Result<Vec<BlockId>, SerializationError> {
        let state = WorkspaceState::from_json(json)?;
        self.load(&state)
    }
}
