use super::Workspace;
use crate::block::connection::checks_intersect;
use crate::block::{BlockId, Connection, ConnectionKind, ConnectionRef, ConnectionSlot};
use crate::error::{ConnectionError, IncompatibleReason, WorkspaceError};
use crate::events::{EventPayload, Placement, Task};
use tracing::debug;

/// A checked pairing, oriented so `parent` is the socket that owns `child`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub parent: ConnectionRef,
    pub child: ConnectionRef,
}

/// The kind a slot would carry. Statement inputs report `InputValue` here since the
/// slot alone does not say which input kind it names.
fn slot_kind(slot: &ConnectionSlot) -> ConnectionKind {
    match slot {
        ConnectionSlot::Previous => ConnectionKind::Previous,
        ConnectionSlot::Next => ConnectionKind::Next,
        ConnectionSlot::Output => ConnectionKind::Output,
        ConnectionSlot::Input(_) => ConnectionKind::InputValue,
    }
}

fn input_name(slot: &ConnectionSlot) -> Option<String> {
    match slot {
        ConnectionSlot::Input(name) => Some(name.clone()),
        _ => None,
    }
}

impl Workspace {
    pub(crate) fn connection_mut(&mut self, connection: &ConnectionRef) -> Option<&mut Connection> {
        self.blocks
            .get_mut(&connection.block)?
            .connection_mut(&connection.slot)
    }

    /// Checks whether `a` and `b` could be connected right now, without touching anything.
    pub fn check_connection(
        &self,
        a: &ConnectionRef,
        b: &ConnectionRef,
    ) -> Result<Pairing, ConnectionError> {
        let block_a = self
            .blocks
            .get(&a.block)
            .ok_or_else(|| ConnectionError::DisposedReference(a.block.clone()))?;
        let block_b = self
            .blocks
            .get(&b.block)
            .ok_or_else(|| ConnectionError::DisposedReference(b.block.clone()))?;

        let conn_a = block_a.connection(&a.slot);
        let conn_b = block_b.connection(&b.slot);
        let kind_a = conn_a.map_or_else(|| slot_kind(&a.slot), Connection::kind);
        let kind_b = conn_b.map_or_else(|| slot_kind(&b.slot), Connection::kind);
        let incompatible = |reason: IncompatibleReason| ConnectionError::Incompatible {
            source_block: a.block.clone(),
            source_kind: kind_a,
            target_block: b.block.clone(),
            target_kind: kind_b,
            reason,
        };

        let conn_a = conn_a.ok_or_else(|| {
            incompatible(IncompatibleReason::MissingConnection {
                block: a.block.clone(),
                slot: a.slot.to_string(),
            })
        })?;
        let conn_b = conn_b.ok_or_else(|| {
            incompatible(IncompatibleReason::MissingConnection {
                block: b.block.clone(),
                slot: b.slot.to_string(),
            })
        })?;

        if a.block == b.block {
            return Err(incompatible(IncompatibleReason::SelfConnection));
        }
        if kind_b != kind_a.opposite() {
            return Err(incompatible(IncompatibleReason::WrongKind(kind_a, kind_b)));
        }

        let (parent, parent_conn, child, child_conn) = if kind_a.is_superior() {
            (a, conn_a, b, conn_b)
        } else {
            (b, conn_b, a, conn_a)
        };

        if !checks_intersect(parent_conn.check(), child_conn.check()) {
            return Err(incompatible(IncompatibleReason::ChecksFailed(
                parent_conn.check().to_vec(),
                child_conn.check().to_vec(),
            )));
        }
        if child_conn.is_connected() {
            return Err(incompatible(IncompatibleReason::AlreadyConnected(
                child.block.clone(),
            )));
        }
        if let Some(occupant) = parent_conn.target() {
            let occupant_is_shadow = self
                .blocks
                .get(&occupant.block)
                .is_some_and(|block| block.is_shadow());
            if !occupant_is_shadow {
                return Err(incompatible(IncompatibleReason::AlreadyConnected(
                    occupant.block.clone(),
                )));
            }
        }

        let parent_block = if parent.block == a.block { block_a } else { block_b };
        let child_block = if child.block == a.block { block_a } else { block_b };
        if parent_block.is_shadow() && !child_block.is_shadow() {
            return Err(incompatible(IncompatibleReason::ShadowParent(
                child.block.clone(),
            )));
        }
        if self.is_ancestor(&child.block, &parent.block) {
            return Err(ConnectionError::Cyclic {
                parent: parent.block.clone(),
                child: child.block.clone(),
            });
        }

        Ok(Pairing {
            parent: parent.clone(),
            child: child.clone(),
        })
    }

    /// Connects two connections. Either argument order works.
    ///
    /// A shadow in the parent socket is disposed and its state kept for respawning.
    /// Nothing changes when the pairing is refused.
    pub fn connect(&mut self, a: &ConnectionRef, b: &ConnectionRef) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let pairing = self.check_connection(a, b)?;
        let Pairing { parent, child } = pairing;

        if let Some(occupant) = self
            .blocks
            .get(&parent.block)
            .and_then(|block| block.connection(&parent.slot))
            .and_then(Connection::target)
            .map(|target| target.block.clone())
        {
            self.dispose_shadow(&parent, &occupant);
        }

        let old = self.block(&child.block)?.position();
        self.link(&parent, &child);
        self.fire(EventPayload::BlockMove {
            block: child.block.clone(),
            old: Placement::top_level(old),
            new: Placement {
                parent: Some(parent.block.clone()),
                input: input_name(&parent.slot),
                coordinate: None,
            },
            reason: vec!["connect".to_string()],
        });
        self.tasks.schedule(Task::ResizeContents);
        debug!(parent = %parent, child = %child, "connected");
        self.render(&parent.block)
    }

    /// Breaks the link at `connection`. The detached block becomes top-level where it
    /// stands, and the parent socket's shadow is respawned.
    ///
    /// Does nothing when the connection is empty or holds its own shadow.
    pub fn disconnect(&mut self, connection: &ConnectionRef) -> Result<(), WorkspaceError> {
        self.ensure_live()?;
        let Some(conn) = self.block(&connection.block)?.connection(&connection.slot) else {
            return Ok(());
        };
        let Some(peer) = conn.target().cloned() else {
            return Ok(());
        };
        let (parent, child) = if conn.kind().is_superior() {
            (connection.clone(), peer)
        } else {
            (peer, connection.clone())
        };
        let child_block = self.block(&child.block)?;
        if child_block.is_shadow() {
            return Ok(());
        }
        let position = child_block.position();

        self.unlink(&parent, &child);
        self.fire(EventPayload::BlockMove {
            block: child.block.clone(),
            old: Placement {
                parent: Some(parent.block.clone()),
                input: input_name(&parent.slot),
                coordinate: None,
            },
            new: Placement::top_level(position),
            reason: vec!["disconnect".to_string()],
        });
        self.respawn_shadow(&parent)?;
        self.tasks.schedule(Task::ResizeContents);
        debug!(parent = %parent, child = %child, "disconnected");
        self.render(&parent.block)?;
        self.render(&child.block)
    }

    /// Detaches a block from whatever it hangs from. No-op for top-level blocks.
    pub fn unplug(&mut self, id: &BlockId) -> Result<(), WorkspaceError> {
        match self.block(id)?.parent_slot() {
            Some(slot) => self.disconnect(&ConnectionRef::new(id.clone(), slot)),
            None => Ok(()),
        }
    }

    /// Sets both peers and removes the child from the top-level list.
    pub(crate) fn link(&mut self, parent: &ConnectionRef, child: &ConnectionRef) {
        if let Some(connection) = self.connection_mut(parent) {
            connection.target = Some(child.clone());
        }
        if let Some(connection) = self.connection_mut(child) {
            connection.target = Some(parent.clone());
        }
        self.top_blocks.retain(|id| id != &child.block);
    }

    pub(crate) fn unlink(&mut self, parent: &ConnectionRef, child: &ConnectionRef) {
        if let Some(connection) = self.connection_mut(parent) {
            connection.target = None;
        }
        if let Some(connection) = self.connection_mut(child) {
            connection.target = None;
        }
        if !self.top_blocks.contains(&child.block) {
            self.top_blocks.push(child.block.clone());
        }
    }

    /// Removes the shadow in `parent`, saving its current state for respawning.
    fn dispose_shadow(&mut self, parent: &ConnectionRef, shadow: &BlockId) {
        let state = self.save_block(shadow);
        if let Some(connection) = self.connection_mut(parent) {
            connection.target = None;
            if state.is_some() {
                connection.shadow_state = state;
            }
        }
        self.remove_subtree(shadow);
        debug!(shadow = %shadow, "disposed shadow");
    }

    /// Rebuilds the shadow of an empty socket from its saved state.
    ///
    /// The saved id is reused when no live block holds it.
    pub(crate) fn respawn_shadow(
        &mut self,
        parent: &ConnectionRef,
    ) -> Result<Option<BlockId>, WorkspaceError> {
        let Some(connection) = self
            .blocks
            .get(&parent.block)
            .and_then(|block| block.connection(&parent.slot))
        else {
            return Ok(None);
        };
        if connection.is_connected() {
            return Ok(None);
        }
        let Some(state) = connection.shadow_state().cloned() else {
            return Ok(None);
        };
        let child_slot = match connection.kind() {
            ConnectionKind::InputValue => ConnectionSlot::Output,
            _ => ConnectionSlot::Previous,
        };
        let id = self.build_block(&state, true)?;
        self.link(parent, &ConnectionRef::new(id.clone(), child_slot));
        debug!(shadow = %id, parent = %parent, "respawned shadow");
        Ok(Some(id))
    }
}
