use crate::decoder::DecodeError;
use crate::ledger::LedgerError;
use crate::store::PersistError;

/// Error types for pipeline runs
#[allow(clippy::enum_variant_names)]
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Ledger error: {0}")]
    LedgerError(#[from] LedgerError),

    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Persist error: {0}")]
    PersistError(#[from] PersistError),

    #[error("A sync run is already in progress")]
    RunInProgress,
}

impl SyncError {
    /// Whether the requested account does not exist on the ledger.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::LedgerError(e) if e.is_not_found())
    }
}

/// Whether pipeline runs may overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunAdmission {
    /// Runs may overlap; concurrent upserts of one mint are last-write-wins.
    #[default]
    Concurrent,
    /// At most one run at a time; an overlapping run is rejected with `RunInProgress`.
    Exclusive,
}

/// Outcome of the enrichment stage for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    /// The record has no metadata URI.
    Skipped,
    Resolved,
    /// The lookup failed and the image was left as it was.
    Failed,
}
