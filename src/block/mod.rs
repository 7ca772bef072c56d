//! Structure-aware patching of capture containers.
//!
//! Records are tracked as byte ranges of the source file; edits are kept on
//! the side and applied only when a new container is written.

pub mod error;
pub mod ledger;
pub mod plan;
pub mod types;
pub mod writer;

pub use error::BlockError;
pub use ledger::BlockLedger;
pub use plan::{BlockIndex, Edit, EditPlan, PlanError};
pub use types::{BlockVisitor, IndexedBlock, ModificationBlock, OriginalBlock};
pub use writer::{CopyingVisitor, DEFAULT_COPY_CHUNK_SIZE};
