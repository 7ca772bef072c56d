//! Block ledger for patching capture containers
//!
//! The ledger records where every encoded record of the source container
//! starts, then holds a sparse set of modifications keyed by
//! `(primary, secondary)`. A rewrite copies untouched records byte for byte
//! and splices modifications in around them, so the container is never
//! re-encoded.
//!
//! Secondary ids order modifications anchored on the same original block:
//! negative ids are emitted before it, positive ids after it, and id 0
//! replaces it (or deletes it when the payload is absent).

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use super::error::BlockError;
use super::types::{BlockVisitor, IndexedBlock, ModificationBlock, OriginalBlock};
use super::writer::{CopyingVisitor, DEFAULT_COPY_CHUNK_SIZE};

/// Original block layout plus pending modifications for one container
#[derive(Debug, Default, Clone)]
pub struct BlockLedger {
    originals: Vec<OriginalBlock>,
    header_size: u64,
    finalized: bool,
    modifications: HashMap<usize, BTreeMap<i64, ModificationBlock>>,
}

impl BlockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a finalized ledger from decoder offsets, the last one being the
    /// end-of-file sentinel.
    pub fn from_offsets(offsets: &[u64]) -> Result<Self, BlockError> {
        let mut ledger = Self::new();
        for (index, offset) in offsets.iter().enumerate() {
            ledger.add_original_block(index, *offset)?;
        }
        ledger.finalize()?;
        Ok(ledger)
    }

    /// Record the start of the next block in the source container
    pub fn add_original_block(&mut self, index: usize, offset: u64) -> Result<(), BlockError> {
        if self.finalized {
            tracing::error!(index, offset, "Cannot add original block to a finalized ledger");
            return Err(BlockError::Finalized);
        }

        let expected = self.originals.len();
        if index != expected {
            tracing::error!(index, expected, "Unexpected block index");
            return Err(BlockError::IndexMismatch { index, expected });
        }

        self.originals.push(OriginalBlock { offset, size: 0 });
        Ok(())
    }

    /// Compute block sizes, drop the end-of-file sentinel and lock the layout.
    ///
    /// Calling this on a finalized ledger is a no-op. On failure the ledger
    /// is left untouched.
    pub fn finalize(&mut self) -> Result<(), BlockError> {
        if self.finalized {
            return Ok(());
        }

        if self.originals.is_empty() {
            tracing::error!("Original block map is empty");
            return Err(BlockError::NoBlocks);
        }

        let mut sizes = Vec::with_capacity(self.originals.len() - 1);
        for (index, pair) in self.originals.windows(2).enumerate() {
            let (current, next) = (pair[0], pair[1]);
            if next.offset <= current.offset {
                tracing::error!(
                    index,
                    offset = current.offset,
                    next = next.offset,
                    "Non-increasing block offsets"
                );
                return Err(BlockError::NonIncreasingOffset {
                    index,
                    offset: current.offset,
                    next: next.offset,
                });
            }
            sizes.push(next.offset - current.offset);
        }

        self.header_size = self.originals[0].offset;
        // The sentinel only exists to size the last real block
        self.originals.pop();
        for (block, size) in self.originals.iter_mut().zip(sizes) {
            block.size = size;
        }

        self.finalized = true;
        tracing::debug!(
            blocks = self.originals.len(),
            header_size = self.header_size,
            "Finalized block ledger"
        );
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of original blocks (excluding the sentinel once finalized)
    pub fn block_count(&self) -> usize {
        self.originals.len()
    }

    /// Bytes preceding block 0
    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    pub fn original_block(&self, primary: usize) -> Option<&OriginalBlock> {
        self.originals.get(primary)
    }

    pub fn modification_count(&self) -> usize {
        self.modifications.values().map(BTreeMap::len).sum()
    }

    pub fn modification_exists(&self, primary: usize, secondary: i64) -> bool {
        self.modifications
            .get(&primary)
            .is_some_and(|slots| slots.contains_key(&secondary))
    }

    /// Anchor a modification on an original block.
    ///
    /// A `None` payload deletes the original block and is only accepted at
    /// secondary 0. An occupied slot is never overwritten; remove it first.
    pub fn add_modification(
        &mut self,
        primary: usize,
        secondary: i64,
        payload: Option<Vec<u8>>,
    ) -> Result<(), BlockError> {
        if !self.finalized {
            tracing::error!(primary, secondary, "Cannot modify an unfinalized ledger");
            return Err(BlockError::NotFinalized);
        }

        let count = self.originals.len();
        if primary >= count {
            tracing::error!(primary, count, "Modification primary id out of range");
            return Err(BlockError::PrimaryOutOfRange { primary, count });
        }

        if payload.is_none() && secondary != 0 {
            tracing::error!(primary, secondary, "Deletion must use secondary 0");
            return Err(BlockError::TombstoneNotAtZero { primary, secondary });
        }

        if self.modification_exists(primary, secondary) {
            tracing::error!(primary, secondary, "Modification already exists");
            return Err(BlockError::ModificationExists { primary, secondary });
        }

        self.modifications
            .entry(primary)
            .or_default()
            .insert(secondary, ModificationBlock { payload });
        Ok(())
    }

    pub fn remove_modification(&mut self, primary: usize, secondary: i64) -> Result<(), BlockError> {
        let removed = self
            .modifications
            .get_mut(&primary)
            .and_then(|slots| slots.remove(&secondary));
        if removed.is_none() {
            tracing::error!(primary, secondary, "No modification to remove");
            return Err(BlockError::ModificationNotFound { primary, secondary });
        }
        if self
            .modifications
            .get(&primary)
            .is_some_and(BTreeMap::is_empty)
        {
            self.modifications.remove(&primary);
        }
        Ok(())
    }

    pub fn clear_all_modifications(&mut self) {
        self.modifications.clear();
    }

    /// Visit the blocks of the rewritten container in output order.
    ///
    /// Deleted originals produce nothing. Traversal stops at the first
    /// visitor error or empty replacement payload.
    pub fn traverse_blocks<V: BlockVisitor + ?Sized>(
        &self,
        visitor: &mut V,
    ) -> Result<(), BlockError> {
        if !self.finalized {
            tracing::error!("Ledger must be finalized before traversal");
            return Err(BlockError::NotFinalized);
        }

        for (primary, original) in self.originals.iter().enumerate() {
            let Some(slots) = self.modifications.get(&primary) else {
                IndexedBlock::Original(original).accept(visitor)?;
                continue;
            };

            // Without a slot 0 entry the original block stands in as secondary 0
            let mut original_pending = !slots.contains_key(&0);
            for (&secondary, modification) in slots {
                if original_pending && secondary > 0 {
                    IndexedBlock::Original(original).accept(visitor)?;
                    original_pending = false;
                }

                let Some(payload) = &modification.payload else {
                    continue;
                };
                if payload.is_empty() {
                    tracing::error!(primary, secondary, "Empty modification payload");
                    return Err(BlockError::EmptyPayload { primary, secondary });
                }
                IndexedBlock::Modification(modification).accept(visitor)?;
            }

            if original_pending {
                IndexedBlock::Original(original).accept(visitor)?;
            }
        }

        Ok(())
    }

    /// Write the patched container to `dest_path`.
    ///
    /// On failure the destination is left as written so far. Writing over
    /// the source itself is refused before anything is truncated.
    pub fn write_container(&self, source_path: &Path, dest_path: &Path) -> Result<(), BlockError> {
        self.write_container_with_chunk_size(source_path, dest_path, DEFAULT_COPY_CHUNK_SIZE)
    }

    pub fn write_container_with_chunk_size(
        &self,
        source_path: &Path,
        dest_path: &Path,
        chunk_size: usize,
    ) -> Result<(), BlockError> {
        if !self.finalized {
            tracing::error!("Ledger must be finalized before writing a container");
            return Err(BlockError::NotFinalized);
        }

        let source = File::open(source_path).map_err(|e| {
            tracing::error!(path = %source_path.display(), error = %e, "Failed to open source");
            e
        })?;
        if same_file(source_path, dest_path) {
            tracing::error!(
                path = %dest_path.display(),
                "Destination is the source container; refusing to overwrite it"
            );
            return Err(BlockError::SameFile(dest_path.to_path_buf()));
        }
        let dest = File::create(dest_path).map_err(|e| {
            tracing::error!(path = %dest_path.display(), error = %e, "Failed to create destination");
            e
        })?;

        let mut visitor = CopyingVisitor::new(source, BufWriter::new(dest), chunk_size);

        if let Err(e) = visitor.copy_range(0, self.header_size) {
            tracing::error!(error = %e, "Could not copy header");
            return Err(e);
        }
        if let Err(e) = self.traverse_blocks(&mut visitor) {
            tracing::error!(error = %e, "Could not write blocks");
            return Err(e);
        }

        let largest_block = visitor.largest_block();
        let (_source, dest) = visitor.into_inner();
        let dest = dest.into_inner().map_err(|e| e.into_error())?;
        dest.sync_all()?;

        if largest_block > chunk_size as u64 {
            tracing::warn!(
                chunk_size,
                largest_block,
                "Largest block exceeds the copy chunk; raise [rewrite] copy_chunk_size for faster rewrites"
            );
        }

        tracing::info!(path = %dest_path.display(), "Wrote new capture file");
        Ok(())
    }
}

/// Both paths name the same existing file
fn same_file(source: &Path, dest: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(dest)) {
        (Ok(source), Ok(dest)) => source == dest,
        _ => false,
    }
}
