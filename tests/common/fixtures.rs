//! On-disk fixtures for rewrite and scan tests

use std::fs;
use std::path::PathBuf;

use capsplice::scan::{CallRecord, CallTape, CommandBufferId, DrawKind, SubmitInfo};
use capsplice::BlockIndex;
use tempfile::TempDir;

/// A small capture container: a 4-byte header followed by three records
pub struct TestContainer {
    pub dir: TempDir,
    pub source: PathBuf,
    pub index: PathBuf,
}

pub const HEADER: &[u8] = b"CAP1";
pub const RECORDS: [&[u8]; 3] = [b"alpha", b"bravo-record", b"charlie"];

impl TestContainer {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source = dir.path().join("source.cap");
        let index = dir.path().join("index.json");

        let mut bytes = HEADER.to_vec();
        let mut offsets = Vec::new();
        for record in RECORDS {
            offsets.push(bytes.len() as u64);
            bytes.extend_from_slice(record);
        }
        offsets.push(bytes.len() as u64);

        fs::write(&source, &bytes).expect("Failed to write container");
        BlockIndex { offsets }
            .write_to_path(&index)
            .expect("Failed to write block index");

        Self { dir, source, index }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn offsets(&self) -> Vec<u64> {
        BlockIndex::read_from_path(&self.index)
            .expect("Failed to read block index")
            .offsets
    }
}

impl Default for TestContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds call records with consecutive block indices
pub struct TapeBuilder {
    next_index: u64,
    records: Vec<CallRecord>,
}

impl TapeBuilder {
    pub fn new() -> Self {
        Self {
            next_index: 1,
            records: Vec::new(),
        }
    }

    fn take_index(&mut self) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    pub fn begin(mut self, cb: u64) -> Self {
        let block_index = self.take_index();
        self.records.push(CallRecord::BeginCommandBuffer {
            block_index,
            command_buffer: CommandBufferId(cb),
        });
        self
    }

    pub fn begin_render_pass(mut self, cb: u64) -> Self {
        let block_index = self.take_index();
        self.records.push(CallRecord::BeginRenderPass {
            block_index,
            command_buffer: CommandBufferId(cb),
        });
        self
    }

    pub fn draw(mut self, cb: u64) -> Self {
        let block_index = self.take_index();
        self.records.push(CallRecord::Draw {
            block_index,
            command_buffer: CommandBufferId(cb),
            kind: DrawKind::Draw,
        });
        self
    }

    pub fn end_render_pass(mut self, cb: u64) -> Self {
        let block_index = self.take_index();
        self.records.push(CallRecord::EndRenderPass {
            block_index,
            command_buffer: CommandBufferId(cb),
        });
        self
    }

    pub fn submit(mut self, cbs: &[u64]) -> Self {
        let block_index = self.take_index();
        self.records.push(CallRecord::QueueSubmit {
            block_index,
            submits: vec![SubmitInfo {
                command_buffers: cbs.iter().copied().map(CommandBufferId).collect(),
            }],
        });
        self
    }

    pub fn records(self) -> Vec<CallRecord> {
        self.records
    }

    pub fn tape(self) -> CallTape {
        CallTape::new(self.records)
    }
}

impl Default for TapeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
