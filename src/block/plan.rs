//! File formats that drive a ledger from disk: the decoder's block index and
//! an edit plan produced by analysis tooling.

use std::fs;
use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::BlockError;
use super::ledger::BlockLedger;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Edit {index} has invalid base64 payload: {source}")]
    Payload {
        index: usize,
        source: base64::DecodeError,
    },
    #[error("Edit {index} rejected: {source}")]
    Rejected { index: usize, source: BlockError },
}

/// Record offsets reported by the decoder, ending with the end-of-file offset
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockIndex {
    pub offsets: Vec<u64>,
}

impl BlockIndex {
    pub fn read_from_path(path: &Path) -> Result<Self, PlanError> {
        let contents = fs::read(path)?;
        Ok(serde_json::from_slice(&contents)?)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), PlanError> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn build_ledger(&self) -> Result<BlockLedger, BlockError> {
        BlockLedger::from_offsets(&self.offsets)
    }
}

/// A single edit; a missing payload deletes the original block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edit {
    pub primary: usize,
    #[serde(default)]
    pub secondary: i64,
    /// Base64-encoded replacement or insertion bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl Edit {
    pub fn delete(primary: usize) -> Self {
        Self {
            primary,
            secondary: 0,
            payload: None,
        }
    }

    pub fn with_bytes(primary: usize, secondary: i64, bytes: &[u8]) -> Self {
        Self {
            primary,
            secondary,
            payload: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditPlan {
    pub edits: Vec<Edit>,
}

impl EditPlan {
    pub fn read_from_path(path: &Path) -> Result<Self, PlanError> {
        let contents = fs::read(path)?;
        Ok(serde_json::from_slice(&contents)?)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), PlanError> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Register every edit on a finalized ledger, stopping at the first rejection
    pub fn apply(&self, ledger: &mut BlockLedger) -> Result<(), PlanError> {
        for (index, edit) in self.edits.iter().enumerate() {
            let payload = edit
                .payload
                .as_deref()
                .map(|encoded| base64::engine::general_purpose::STANDARD.decode(encoded))
                .transpose()
                .map_err(|source| PlanError::Payload { index, source })?;

            ledger
                .add_modification(edit.primary, edit.secondary, payload)
                .map_err(|source| PlanError::Rejected { index, source })?;
        }
        tracing::debug!(edits = self.edits.len(), "Applied edit plan");
        Ok(())
    }
}
