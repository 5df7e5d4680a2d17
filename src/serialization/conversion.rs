use super::state::{BlockState, WorkspaceState};
use crate::block::BlockId;
use crate::error::{SerializationError, StateConversionError};
use crate::workspace::Workspace;

/// A trait for custom data models that can be converted into a kumiki `WorkspaceState`.
///
/// Implement it on your own project format to load it into a workspace without
/// first writing it out as kumiki JSON.
///
/// # Example
///
/// ```rust,no_run
/// use kumiki::prelude::*;
/// use kumiki::error::StateConversionError;
///
/// // 1. Your own format: a flat list of arithmetic steps.
/// struct Step { value: f64 }
/// struct Program { steps: Vec<Step> }
///
/// // 2. Map each step onto a block record.
/// impl IntoWorkspaceState for Program {
///     fn into_workspace_state(self) -> std::result::Result<WorkspaceState, StateConversionError> {
///         let blocks = self
///             .steps
///             .into_iter()
///             .enumerate()
///             .map(|(i, step)| {
///                 BlockState::new("math_number")
///                     .with_field("NUM", FieldValue::Number(step.value))
///                     .at(0.0, i as f64 * 50.0)
///             })
///             .collect();
///         Ok(WorkspaceState::new(blocks))
///     }
/// }
/// ```
pub trait IntoWorkspaceState {
    /// Consumes the object and converts it into workspace state.
    fn into_workspace_state(self) -> Result<WorkspaceState, StateConversionError>;
}

impl IntoWorkspaceState for WorkspaceState {
    fn into_workspace_state(self) -> Result<WorkspaceState, StateConversionError> {
        Ok(self)
    }
}

impl IntoWorkspaceState for Vec<BlockState> {
    fn into_workspace_state(self) -> Result<WorkspaceState, StateConversionError> {
        Ok(WorkspaceState::new(self))
    }
}

impl Workspace {
    /// Converts `source` and loads it, replacing the current contents.
    pub fn load_from<T: IntoWorkspaceState>(
        &mut self,
        source: T,
    ) -> Result<Vec<BlockId>, SerializationError> {
        let state = source.into_workspace_state()?;
        self.load(&state)
    }

    /// Converts `source` and appends it below the current contents.
    pub fn append_from<T: IntoWorkspaceState>(
        &mut self,
        source: T,
    ) -> Result<Vec<BlockId>, SerializationError> {
        let state = source.into_workspace_state()?;
        self.append_workspace(&state)
    }
}
