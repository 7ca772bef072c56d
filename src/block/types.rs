//! Block variants and the visitor used to walk them

use super::error::BlockError;

/// A byte range in the pristine source container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalBlock {
    pub offset: u64,
    /// Zero until the ledger is finalized
    pub size: u64,
}

/// A replacement, insertion, or deletion anchored on an original block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationBlock {
    /// `None` marks the anchored original block as deleted
    pub payload: Option<Vec<u8>>,
}

impl ModificationBlock {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload: Some(payload),
        }
    }

    pub fn tombstone() -> Self {
        Self { payload: None }
    }

    pub fn is_tombstone(&self) -> bool {
        self.payload.is_none()
    }
}

/// A block as seen during traversal
#[derive(Debug, Clone, Copy)]
pub enum IndexedBlock<'a> {
    Original(&'a OriginalBlock),
    Modification(&'a ModificationBlock),
}

impl IndexedBlock<'_> {
    pub fn accept<V: BlockVisitor + ?Sized>(&self, visitor: &mut V) -> Result<(), BlockError> {
        match self {
            IndexedBlock::Original(block) => visitor.visit_original(block),
            IndexedBlock::Modification(block) => visitor.visit_modification(block),
        }
    }
}

/// One case per block variant. Adding a variant means updating every implementer.
pub trait BlockVisitor {
    fn visit_original(&mut self, block: &OriginalBlock) -> Result<(), BlockError>;

    fn visit_modification(&mut self, block: &ModificationBlock) -> Result<(), BlockError>;
}
