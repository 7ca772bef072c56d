//! Dump candidates: the stream positions needed to replay one command buffer
//! recording in isolation.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A render pass bracket under construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpRenderPass {
    pub begin_block_index: u64,
    pub end_block_index: Option<u64>,
}

/// Partial candidate accumulated while a recording is scanned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpEntry {
    pub begin_command_buffer_block_index: Option<u64>,
    pub render_passes: Vec<DumpRenderPass>,
    pub draws: Vec<u64>,
    pub queue_submit_block_index: Option<u64>,
}

impl DumpEntry {
    pub fn is_complete(&self) -> bool {
        self.begin_command_buffer_block_index.is_some()
            && self.queue_submit_block_index.is_some()
            && !self.render_passes.is_empty()
            && !self.draws.is_empty()
            && self
                .render_passes
                .iter()
                .all(|pass| pass.end_block_index.is_some())
    }

    /// Convert into a candidate, or `None` if anything is missing
    pub fn into_candidate(self) -> Option<DumpCandidate> {
        if !self.is_complete() {
            return None;
        }
        let render_passes = self
            .render_passes
            .iter()
            .map(|pass| {
                pass.end_block_index.map(|end| CandidateRenderPass {
                    begin_block_index: pass.begin_block_index,
                    end_block_index: end,
                })
            })
            .collect::<Option<Vec<_>>>()?;

        Some(DumpCandidate {
            begin_command_buffer_block_index: self.begin_command_buffer_block_index?,
            render_passes,
            draws: self.draws,
            queue_submit_block_index: self.queue_submit_block_index?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRenderPass {
    pub begin_block_index: u64,
    pub end_block_index: u64,
}

/// A complete, replayable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpCandidate {
    pub begin_command_buffer_block_index: u64,
    pub render_passes: Vec<CandidateRenderPass>,
    pub draws: Vec<u64>,
    pub queue_submit_block_index: u64,
}

impl DumpCandidate {
    /// Keep only the final draw. Each dumped draw costs replay time, and the
    /// last one usually shows the presented image.
    pub fn keep_last_draw(&mut self) {
        if self.draws.len() > 1 {
            self.draws.drain(..self.draws.len() - 1);
        }
    }
}

/// Candidates laid out as parallel arrays, one element per candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpResources {
    #[serde(rename = "BeginCommandBuffer")]
    pub begin_command_buffer: Vec<u64>,
    #[serde(rename = "RenderPass")]
    pub render_pass: Vec<Vec<[u64; 2]>>,
    #[serde(rename = "Draw")]
    pub draw: Vec<Vec<u64>>,
    #[serde(rename = "QueueSubmit")]
    pub queue_submit: Vec<u64>,
}

impl DumpResources {
    pub fn from_candidates(candidates: &[DumpCandidate]) -> Self {
        let mut resources = Self::default();
        for candidate in candidates {
            resources
                .begin_command_buffer
                .push(candidate.begin_command_buffer_block_index);
            resources.render_pass.push(
                candidate
                    .render_passes
                    .iter()
                    .map(|pass| [pass.begin_block_index, pass.end_block_index])
                    .collect(),
            );
            resources.draw.push(candidate.draws.clone());
            resources
                .queue_submit
                .push(candidate.queue_submit_block_index);
        }
        resources
    }

    pub fn len(&self) -> usize {
        self.begin_command_buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.begin_command_buffer.is_empty()
    }

    pub fn save_json(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(io::Error::other)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
