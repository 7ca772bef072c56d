use serde::{Deserialize, Serialize};

/// Capture-time handle of a command buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandBufferId(pub u64);

impl std::fmt::Display for CommandBufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CommandBufferId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawKind {
    #[default]
    Draw,
    DrawIndexed,
}

/// Command buffers named by one submission of a queue submit call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitInfo {
    pub command_buffers: Vec<CommandBufferId>,
}

/// A decoded call relevant to dump-candidate scanning.
///
/// `block_index` is the call's position in the capture stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallRecord {
    BeginCommandBuffer {
        block_index: u64,
        command_buffer: CommandBufferId,
    },
    BeginRenderPass {
        block_index: u64,
        command_buffer: CommandBufferId,
    },
    Draw {
        block_index: u64,
        command_buffer: CommandBufferId,
        #[serde(default)]
        kind: DrawKind,
    },
    EndRenderPass {
        block_index: u64,
        command_buffer: CommandBufferId,
    },
    QueueSubmit {
        block_index: u64,
        submits: Vec<SubmitInfo>,
    },
}

impl CallRecord {
    pub fn block_index(&self) -> u64 {
        match self {
            CallRecord::BeginCommandBuffer { block_index, .. }
            | CallRecord::BeginRenderPass { block_index, .. }
            | CallRecord::Draw { block_index, .. }
            | CallRecord::EndRenderPass { block_index, .. }
            | CallRecord::QueueSubmit { block_index, .. } => *block_index,
        }
    }

    /// The recording command buffer, `None` for queue submits
    pub fn command_buffer(&self) -> Option<CommandBufferId> {
        match self {
            CallRecord::BeginCommandBuffer { command_buffer, .. }
            | CallRecord::BeginRenderPass { command_buffer, .. }
            | CallRecord::Draw { command_buffer, .. }
            | CallRecord::EndRenderPass { command_buffer, .. } => Some(*command_buffer),
            CallRecord::QueueSubmit { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CallRecord::BeginCommandBuffer { .. } => "begin_command_buffer",
            CallRecord::BeginRenderPass { .. } => "begin_render_pass",
            CallRecord::Draw {
                kind: DrawKind::Draw,
                ..
            } => "draw",
            CallRecord::Draw {
                kind: DrawKind::DrawIndexed,
                ..
            } => "draw_indexed",
            CallRecord::EndRenderPass { .. } => "end_render_pass",
            CallRecord::QueueSubmit { .. } => "queue_submit",
        }
    }
}
