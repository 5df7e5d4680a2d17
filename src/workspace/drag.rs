use super::Workspace;
use crate::block::{BlockId, ConnectionRef, ConnectionSlot};
use crate::error::WorkspaceError;
use crate::events::{EventPayload, Placement, Task};
use crate::geometry::Coordinate;
use tracing::{debug, warn};

/// How a drag gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Leave the block where it was released, snapped to the grid.
    Drop,
    /// Attach `slot` of the dragged block to `target`.
    Connect {
        slot: ConnectionSlot,
        target: ConnectionRef,
    },
    /// Put everything back the way it was.
    Cancel,
}

/// A block being dragged, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    block: BlockId,
    origin_parent: Option<(ConnectionSlot, ConnectionRef)>,
    origin_position: Coordinate,
    detached_position: Coordinate,
    opened_group: bool,
}

impl DragSession {
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    /// The socket the block was attached to when the drag started.
    pub fn origin_parent(&self) -> Option<&ConnectionRef> {
        self.origin_parent.as_ref().map(|(_, parent)| parent)
    }

    pub fn origin_position(&self) -> Coordinate {
        self.origin_position
    }
}

impl Workspace {
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Picks a block up, detaching it from its parent.
    pub fn begin_drag(&mut self, id: &BlockId) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        if let Some(session) = &self.drag {
            return Err(WorkspaceError::DragInProgress(session.block.clone()));
        }
        let block = self.block(id)?;
        if !block.is_movable() || block.is_shadow() {
            return Err(WorkspaceError::Immovable(id.clone()));
        }
        let origin_parent = block
            .parent_slot()
            .zip(block.parent_link().cloned());
        let origin_position = block.position();

        let opened_group = self.start_group();
        if let Err(err) = self.unplug(id) {
            if opened_group {
                self.end_group();
            }
            return Err(err);
        }
        let detached_position = self.block(id)?.position();
        self.drag = Some(DragSession {
            block: id.clone(),
            origin_parent,
            origin_position,
            detached_position,
            opened_group,
        });
        debug!(block = %id, "drag started");
        Ok(())
    }

    /// Moves the dragged block. No events are raised until the drag ends.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> Result<(), WorkspaceError> {
        let id = self
            .drag
            .as_ref()
            .map(|session| session.block.clone())
            .ok_or(WorkspaceError::NoDragInProgress)?;
        self.translate_stack(&id, dx, dy);
        Ok(())
    }

    /// Ends the drag. A failed connect is rolled back and its error returned.
    pub fn end_drag(&mut self, outcome: DragOutcome) -> Result<(), WorkspaceError> {
        let session = self.drag.take().ok_or(WorkspaceError::NoDragInProgress)?;
        let result = match outcome {
            DragOutcome::Drop => self.drop_dragged(&session),
            DragOutcome::Connect { slot, target } => {
                let dragged = ConnectionRef::new(session.block.clone(), slot);
                match self.connect(&dragged, &target) {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        warn!(block = %session.block, error = %err, "drag commit failed, rolling back");
                        self.rollback_drag(&session).and(Err(err))
                    }
                }
            }
            DragOutcome::Cancel => self.rollback_drag(&session),
        };
        if session.opened_group {
            self.end_group();
        }
        result
    }

    fn drop_dragged(&mut self, session: &DragSession) -> Result<(), WorkspaceError> {
        let current = self.block(&session.block)?.position();
        let grid = self.options.grid;
        let snapped = Coordinate::new(grid.snap_value(current.x), grid.snap_value(current.y));
        self.translate_stack(&session.block, snapped.x - current.x, snapped.y - current.y);
        self.fire(EventPayload::BlockMove {
            block: session.block.clone(),
            old: Placement::top_level(session.detached_position),
            new: Placement::top_level(snapped),
            reason: vec!["drag".to_string()],
        });
        self.tasks.schedule(Task::ResizeContents);
        Ok(())
    }

    fn rollback_drag(&mut self, session: &DragSession) -> Result<(), WorkspaceError> {
        warn!(block = %session.block, "rolling back drag");
        match &session.origin_parent {
            Some((slot, parent)) => {
                let dragged = ConnectionRef::new(session.block.clone(), slot.clone());
                self.connect(&dragged, parent)
            }
            None => {
                let current = self.block(&session.block)?.position();
                let origin = session.origin_position;
                self.translate_stack(&session.block, origin.x - current.x, origin.y - current.y);
                Ok(())
            }
        }
    }
}
