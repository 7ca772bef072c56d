pub mod block;
pub mod config;
pub mod scan;
pub mod util;

pub use block::{
    BlockError, BlockIndex, BlockLedger, BlockVisitor, CopyingVisitor, Edit, EditPlan,
    IndexedBlock, ModificationBlock, OriginalBlock, PlanError,
};
pub use config::Config;
pub use scan::{
    scan_records, scan_tape, CallRecord, CallTape, CommandBufferId, DumpCandidate, DumpEntry,
    DumpResources, RecordingSession, SessionOutcome, SessionRegistry,
};
pub use util::DataDir;
