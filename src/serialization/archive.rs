use super::state::WorkspaceState;
use crate::error::SerializationError;
use crate::workspace::Workspace;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

pub const ARCHIVE_VERSION: u32 = 1;

/// A saved workspace packed into a compact binary file.
///
/// Block records use optional and untagged fields that only a self-describing
/// format can read back, so the state travels as JSON text inside the archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkspaceArchive {
    pub version: u32,
    pub block_count: usize,
    pub state: String,
}

impl WorkspaceArchive {
    pub fn from_state(state: &WorkspaceState) -> Result<Self, SerializationError> {
        let json = serde_json::to_string(state)
            .map_err(|e| SerializationError::Archive(format!("Serialization failed: {}", e)))?;
        Ok(Self {
            version: ARCHIVE_VERSION,
            block_count: state.top_blocks().iter().map(|b| b.block_count()).sum(),
            state: json,
        })
    }

    pub fn from_workspace(workspace: &Workspace) -> Result<Self, SerializationError> {
        Self::from_state(&workspace.save())
    }

    /// The workspace state held by the archive.
    pub fn state(&self) -> Result<WorkspaceState, SerializationError> {
        if self.version != ARCHIVE_VERSION {
            return Err(SerializationError::Archive(format!(
                "Unsupported archive version {}",
                self.version
            )));
        }
        WorkspaceState::from_json(&self.state)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        encode_to_vec(self, standard())
            .map_err(|e| SerializationError::Archive(format!("Serialization failed: {}", e)))
    }

    /// Saves the archive to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), SerializationError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| {
            SerializationError::Archive(format!("Could not create file '{}': {}", path, e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            SerializationError::Archive(format!("Could not write to file '{}': {}", path, e))
        })?;
        Ok(())
    }

    pub fn from_file(path: &str) -> Result<Self, SerializationError> {
        let mut file = fs::File::open(path).map_err(|e| {
            SerializationError::Archive(format!("Could not open file '{}': {}", path, e))
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            SerializationError::Archive(format!("Could not read from file '{}': {}", path, e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        decode_from_slice(bytes, standard())
            .map(|(archive, _)| archive)
            .map_err(|e| SerializationError::Archive(format!("Deserialization failed: {}", e)))
    }
}
