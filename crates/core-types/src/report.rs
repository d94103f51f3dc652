use crate::{ReportHash, Slot};

/// The report descriptor fixed by a quorum of committee votes for one frame.
///
/// `processing_started` flips to true exactly once, when the matching full
/// payload is accepted. A report that is never processed is superseded by
/// the next frame's report, not cancelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsensusReport {
    /// The agreed payload hash.
    pub hash: ReportHash,

    /// The frame's reference slot.
    pub ref_slot: Slot,

    /// The frame's processing deadline (advisory).
    pub deadline_slot: Slot,

    /// Whether the full payload for this report has been accepted.
    pub processing_started: bool,
}

/// Per-consumer submission bookkeeping for the current reference slot.
///
/// Reset to a fresh state whenever a new consensus report arrives;
/// `data_submitted` is the single-writer guard that makes full-payload
/// submission at-most-once per reference slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessingState {
    /// Reference slot of the report being processed.
    pub ref_slot: Slot,

    /// Hash the submitted payload must match.
    pub data_hash: Option<ReportHash>,

    /// Whether the full payload has been accepted for this reference slot.
    pub data_submitted: bool,

    /// Declared format of the accepted payload.
    pub data_format: u64,

    /// Number of requests carried by the accepted payload.
    pub requests_count: u64,

    /// Number of requests the consumer has processed so far.
    pub requests_submitted: u64,
}
