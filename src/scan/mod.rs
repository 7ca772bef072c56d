//! Dump-candidate scanning over decoded call streams.
//!
//! Each command buffer recording is tracked independently; a recording that
//! opens a render pass, draws, closes it and is then submitted becomes a
//! candidate for isolated replay.

pub mod dump_entry;
pub mod events;
pub mod registry;
pub mod session;
pub mod tape;

pub use dump_entry::{CandidateRenderPass, DumpCandidate, DumpEntry, DumpRenderPass, DumpResources};
pub use events::{CallRecord, CommandBufferId, DrawKind, SubmitInfo};
pub use registry::{scan_records, SessionRegistry};
pub use session::{RecordingSession, SessionOutcome, SessionState};
pub use tape::{scan_tape, CallTape, TapeError, CALL_TAPE_SCHEMA_VERSION};
