//! Per-command-buffer scanning state machine.
//!
//! A session follows one recording from `BeginCommandBuffer` to the queue
//! submit that executes it:
//!
//! ```text
//! LookingForBegin --begin--> LookingForRenderPass --begin pass--> LookingForDraw
//!                            ^          |                          |  (draws)
//!                            |          +--submit--> Finished <----+ submit
//!                            +-----------end pass------------------+
//! ```
//!
//! Completeness is only judged at submit time, so a submit that arrives while
//! a render pass is still open reaches the decision and is rejected there.

use super::dump_entry::{DumpCandidate, DumpEntry, DumpRenderPass};
use super::events::{CallRecord, CommandBufferId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LookingForBegin,
    LookingForRenderPass,
    LookingForDraw,
    /// Submitted; further events are ignored
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Accepted(DumpCandidate),
    Rejected,
}

#[derive(Debug, Clone)]
pub struct RecordingSession {
    command_buffer: CommandBufferId,
    state: SessionState,
    entry: DumpEntry,
}

impl RecordingSession {
    pub fn new(command_buffer: CommandBufferId) -> Self {
        Self {
            command_buffer,
            state: SessionState::LookingForBegin,
            entry: DumpEntry::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The candidate accumulated so far
    pub fn entry(&self) -> &DumpEntry {
        &self.entry
    }

    /// Discard everything and wait for a new `BeginCommandBuffer`
    pub fn reset(&mut self) {
        self.state = SessionState::LookingForBegin;
        self.entry = DumpEntry::default();
    }

    /// Feed one call record addressed to this session.
    ///
    /// Queue submits are assumed to name this session's command buffer; the
    /// registry does that filtering. Returns the outcome once the session
    /// reaches a submit.
    pub fn process(&mut self, record: &CallRecord) -> Option<SessionOutcome> {
        match record {
            CallRecord::BeginCommandBuffer { block_index, .. } => {
                self.begin_command_buffer(*block_index)
            }
            CallRecord::BeginRenderPass { block_index, .. } => self.begin_render_pass(*block_index),
            CallRecord::Draw { block_index, .. } => self.draw(*block_index),
            CallRecord::EndRenderPass { block_index, .. } => self.end_render_pass(*block_index),
            CallRecord::QueueSubmit { block_index, .. } => return self.queue_submit(*block_index),
        }
        None
    }

    pub fn begin_command_buffer(&mut self, block_index: u64) {
        match self.state {
            SessionState::LookingForBegin => {
                self.entry.begin_command_buffer_block_index = Some(block_index);
                self.state = SessionState::LookingForRenderPass;
            }
            state => self.ignore("begin_command_buffer", block_index, state),
        }
    }

    pub fn begin_render_pass(&mut self, block_index: u64) {
        match self.state {
            SessionState::LookingForRenderPass => {
                self.entry.render_passes.push(DumpRenderPass {
                    begin_block_index: block_index,
                    end_block_index: None,
                });
                self.state = SessionState::LookingForDraw;
            }
            state => self.ignore("begin_render_pass", block_index, state),
        }
    }

    pub fn draw(&mut self, block_index: u64) {
        match self.state {
            SessionState::LookingForDraw => self.entry.draws.push(block_index),
            state => self.ignore("draw", block_index, state),
        }
    }

    pub fn end_render_pass(&mut self, block_index: u64) {
        match self.state {
            SessionState::LookingForDraw => {
                if let Some(pass) = self.entry.render_passes.last_mut() {
                    pass.end_block_index = Some(block_index);
                }
                self.state = SessionState::LookingForRenderPass;
            }
            state => self.ignore("end_render_pass", block_index, state),
        }
    }

    /// Record the submit and decide
    pub fn queue_submit(&mut self, block_index: u64) -> Option<SessionOutcome> {
        match self.state {
            SessionState::LookingForRenderPass | SessionState::LookingForDraw => {
                self.entry.queue_submit_block_index = Some(block_index);
                Some(self.done())
            }
            state => {
                self.ignore("queue_submit", block_index, state);
                None
            }
        }
    }

    fn done(&mut self) -> SessionOutcome {
        self.state = SessionState::Finished;
        let entry = std::mem::take(&mut self.entry);
        match entry.into_candidate() {
            Some(candidate) => {
                tracing::debug!(command_buffer = %self.command_buffer, "Accepted recording");
                SessionOutcome::Accepted(candidate)
            }
            None => {
                tracing::debug!(command_buffer = %self.command_buffer, "Rejected recording");
                SessionOutcome::Rejected
            }
        }
    }

    fn ignore(&self, call: &str, block_index: u64, state: SessionState) {
        tracing::trace!(
            command_buffer = %self.command_buffer,
            call,
            block_index,
            ?state,
            "Ignoring call in current state"
        );
    }
}
