use quorumbus_core_types::{MemberId, ReportHash, Slot};
use thiserror::Error;

/// Errors returned by [`Lifecycle::submit`](crate::Lifecycle::submit).
///
/// Generic over the decoder's error type, like the decoder seam itself.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum LifecycleError<E>
where
    E: std::error::Error,
{
    /// The caller is neither a committee member nor an explicit submitter.
    #[error("{0} is not allowed to submit report data")]
    SenderNotAllowed(MemberId),

    /// The declared contract version does not match the configured one.
    #[error("unexpected contract version {got}, expected {expected}")]
    UnexpectedContractVersion {
        /// The configured contract version.
        expected: u64,
        /// The declared contract version.
        got: u64,
    },

    /// The declared consensus version does not match the configured one.
    #[error("unexpected consensus version {got}, expected {expected}")]
    UnexpectedConsensusVersion {
        /// The configured consensus version.
        expected: u64,
        /// The declared consensus version.
        got: u64,
    },

    /// No consensus report is active for the current frame.
    #[error("no consensus report to submit data for")]
    NoConsensusReport,

    /// The payload does not hash to the agreed report hash.
    #[error("unexpected data hash {got}, consensus agreed on {expected}")]
    UnexpectedDataHash {
        /// The hash fixed by consensus.
        expected: ReportHash,
        /// The recomputed hash of the submitted payload.
        got: ReportHash,
    },

    /// A payload has already been accepted for this reference slot.
    #[error("data for reference slot {0} is already being processed")]
    RefSlotAlreadyProcessing(Slot),

    /// The consumer's decoder rejected the payload.
    #[error("failed to decode report data")]
    Decode(#[source] E),
}
