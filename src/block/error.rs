//! Errors raised by the block ledger and its visitors

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Cannot add original blocks to a finalized ledger")]
    Finalized,
    #[error("Unexpected block index {index}, expected {expected}")]
    IndexMismatch { index: usize, expected: usize },
    #[error("Original block map is empty")]
    NoBlocks,
    #[error("Block {index} has non-increasing offset {offset} (next block starts at {next})")]
    NonIncreasingOffset { index: usize, offset: u64, next: u64 },
    #[error("Ledger must be finalized first")]
    NotFinalized,
    #[error("Primary id {primary} out of range ({count} original blocks)")]
    PrimaryOutOfRange { primary: usize, count: usize },
    #[error("Modification already exists at ({primary}, {secondary})")]
    ModificationExists { primary: usize, secondary: i64 },
    #[error("Deletion is only valid at secondary 0, got ({primary}, {secondary})")]
    TombstoneNotAtZero { primary: usize, secondary: i64 },
    #[error("No modification at ({primary}, {secondary})")]
    ModificationNotFound { primary: usize, secondary: i64 },
    #[error("Empty payload at ({primary}, {secondary})")]
    EmptyPayload { primary: usize, secondary: i64 },
    #[error("Destination {} is the source container", .0.display())]
    SameFile(PathBuf),
    #[error("Deletion marker reached a block visitor")]
    TombstoneVisited,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
