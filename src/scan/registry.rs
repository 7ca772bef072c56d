//! Routes call records to one recording session per command buffer

use std::collections::HashMap;

use super::dump_entry::DumpCandidate;
use super::events::{CallRecord, CommandBufferId};
use super::session::{RecordingSession, SessionOutcome};

/// Pass-scoped table of in-flight recordings.
///
/// Every concluded session (accepted or rejected) is handed to the outcome
/// callback and dropped from the table.
pub struct SessionRegistry<'a> {
    sessions: HashMap<CommandBufferId, RecordingSession>,
    on_outcome: Box<dyn FnMut(CommandBufferId, SessionOutcome) + 'a>,
}

impl<'a> SessionRegistry<'a> {
    pub fn new(on_outcome: impl FnMut(CommandBufferId, SessionOutcome) + 'a) -> Self {
        Self {
            sessions: HashMap::new(),
            on_outcome: Box::new(on_outcome),
        }
    }

    pub fn process(&mut self, record: &CallRecord) {
        match record {
            CallRecord::BeginCommandBuffer {
                block_index,
                command_buffer,
            } => self.begin_command_buffer(*command_buffer, *block_index),
            CallRecord::QueueSubmit {
                block_index,
                submits,
            } => {
                tracing::debug!(block_index, "Queue submit");
                for command_buffer in submits.iter().flat_map(|s| &s.command_buffers) {
                    self.submit(*command_buffer, *block_index);
                }
            }
            CallRecord::BeginRenderPass {
                block_index,
                command_buffer,
            } => {
                if let Some(session) = self.recording(record, *command_buffer) {
                    session.begin_render_pass(*block_index);
                }
            }
            CallRecord::Draw {
                block_index,
                command_buffer,
                ..
            } => {
                if let Some(session) = self.recording(record, *command_buffer) {
                    session.draw(*block_index);
                }
            }
            CallRecord::EndRenderPass {
                block_index,
                command_buffer,
            } => {
                if let Some(session) = self.recording(record, *command_buffer) {
                    session.end_render_pass(*block_index);
                }
            }
        }
    }

    /// Live session for a recording call, warning when the buffer never began
    fn recording(
        &mut self,
        record: &CallRecord,
        command_buffer: CommandBufferId,
    ) -> Option<&mut RecordingSession> {
        let session = self.sessions.get_mut(&command_buffer);
        if session.is_none() {
            tracing::warn!(
                command_buffer = %command_buffer,
                call = record.name(),
                block_index = record.block_index(),
                "Command buffer never started; ignoring"
            );
        }
        session
    }

    fn begin_command_buffer(&mut self, command_buffer: CommandBufferId, block_index: u64) {
        let session = self
            .sessions
            .entry(command_buffer)
            .and_modify(|session| {
                tracing::warn!(
                    command_buffer = %command_buffer,
                    block_index,
                    "Command buffer never submitted; discarding previous state"
                );
                session.reset();
            })
            .or_insert_with(|| RecordingSession::new(command_buffer));
        session.begin_command_buffer(block_index);
    }

    fn submit(&mut self, command_buffer: CommandBufferId, block_index: u64) {
        let Some(session) = self.sessions.get_mut(&command_buffer) else {
            tracing::warn!(
                command_buffer = %command_buffer,
                block_index,
                "Submitted command buffer never started; ignoring"
            );
            return;
        };

        if let Some(outcome) = session.queue_submit(block_index) {
            self.sessions.remove(&command_buffer);
            (self.on_outcome)(command_buffer, outcome);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Command buffers still waiting for a submit, in ascending order
    pub fn pending_handles(&self) -> Vec<CommandBufferId> {
        let mut handles: Vec<_> = self.sessions.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// End the pass, returning recordings that were never submitted
    pub fn finish(self) -> Vec<CommandBufferId> {
        let pending = self.pending_handles();
        if !pending.is_empty() {
            tracing::debug!(count = pending.len(), "Recordings never submitted");
        }
        pending
    }
}

/// Scan a call stream and collect accepted candidates in acceptance order
pub fn scan_records<'r>(records: impl IntoIterator<Item = &'r CallRecord>) -> Vec<DumpCandidate> {
    let mut candidates = Vec::new();
    let mut rejected = 0usize;
    {
        let mut registry = SessionRegistry::new(|_, outcome| match outcome {
            SessionOutcome::Accepted(candidate) => candidates.push(candidate),
            SessionOutcome::Rejected => rejected += 1,
        });
        for record in records {
            registry.process(record);
        }
        registry.finish();
    }
    tracing::info!(
        accepted = candidates.len(),
        rejected,
        "Finished scanning for dump candidates"
    );
    candidates
}
