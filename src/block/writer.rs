//! Byte-copying block visitor used to write patched containers

use std::io::{Read, Seek, SeekFrom, Write};

use super::error::BlockError;
use super::types::{BlockVisitor, ModificationBlock, OriginalBlock};

/// Chunk size used when copying original blocks
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 4096;

/// Copies original blocks from `source` and writes modification payloads,
/// in visit order, to `dest`. Peak memory is bounded by the chunk size.
pub struct CopyingVisitor<R, W> {
    source: R,
    dest: W,
    buffer: Vec<u8>,
    largest_block: u64,
}

impl<R: Read + Seek, W: Write> CopyingVisitor<R, W> {
    pub fn new(source: R, dest: W, chunk_size: usize) -> Self {
        Self {
            source,
            dest,
            buffer: vec![0; chunk_size.max(1)],
            largest_block: 0,
        }
    }

    /// Copy `size` bytes starting at `offset` of the source
    pub fn copy_range(&mut self, offset: u64, size: u64) -> Result<(), BlockError> {
        self.largest_block = self.largest_block.max(size);
        self.source.seek(SeekFrom::Start(offset))?;

        let mut remaining = size;
        while remaining > 0 {
            let chunk = remaining.min(self.buffer.len() as u64) as usize;
            self.source.read_exact(&mut self.buffer[..chunk])?;
            self.dest.write_all(&self.buffer[..chunk])?;
            remaining -= chunk as u64;
        }
        Ok(())
    }

    /// Largest range copied so far
    pub fn largest_block(&self) -> u64 {
        self.largest_block
    }

    pub fn into_inner(self) -> (R, W) {
        (self.source, self.dest)
    }
}

impl<R: Read + Seek, W: Write> BlockVisitor for CopyingVisitor<R, W> {
    fn visit_original(&mut self, block: &OriginalBlock) -> Result<(), BlockError> {
        self.copy_range(block.offset, block.size)
    }

    fn visit_modification(&mut self, block: &ModificationBlock) -> Result<(), BlockError> {
        // Deletions are filtered out during traversal
        if block.is_tombstone() {
            tracing::error!("Deletion marker reached the copying visitor");
            return Err(BlockError::TombstoneVisited);
        }
        self.dest.write_all(block.payload.as_deref().unwrap_or_default())?;
        Ok(())
    }
}
