use quorumbus_core_types::{MemberId, ReportHash, Slot};
use thiserror::Error;

/// Errors returned by [`Committee`](crate::Committee) operations.
///
/// Every error is a hard rejection of the whole call; the tally and the
/// member set are left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommitteeError {
    /// The frame schedule has not started yet.
    #[error("the reported chain's genesis is yet to arrive")]
    GenesisNotReached,

    /// The caller is not a committee member.
    #[error("{0} is not a member of the committee")]
    NonMember(MemberId),

    /// Only fast-lane members may vote this early in the frame.
    #[error("{0} is not a fast-lane member and the fast-lane window is still open")]
    FastLaneRestricted(MemberId),

    /// The vote refers to a reference slot other than the current frame's.
    #[error("stale reference slot {got}, current frame reports on {expected}")]
    StaleRefSlot {
        /// The current frame's reference slot.
        expected: Slot,
        /// The reference slot carried by the vote.
        got: Slot,
    },

    /// The vote declares a consensus version other than the configured one.
    #[error("unexpected consensus version {got}, expected {expected}")]
    UnexpectedConsensusVersion {
        /// The configured consensus version.
        expected: u64,
        /// The version declared by the vote.
        got: u64,
    },

    /// The member already voted for this exact hash in this frame.
    #[error("{member} already voted for {hash} in this frame")]
    DuplicateVote {
        /// The re-voting member.
        member: MemberId,
        /// The repeated hash.
        hash: ReportHash,
    },

    /// The requested quorum does not satisfy `members/2 < quorum <= members`.
    ///
    /// Requiring a strict majority makes two distinct hashes reaching quorum
    /// in the same frame impossible.
    #[error("invalid quorum {quorum} for a committee of {members} members")]
    InvalidQuorum {
        /// The requested quorum.
        quorum: usize,
        /// The (post-change) committee size.
        members: usize,
    },

    /// The member being added is already in the committee.
    #[error("{0} is already a member of the committee")]
    DuplicateMember(MemberId),

    /// The member being removed is not in the committee.
    #[error("{0} is not a member of the committee")]
    UnknownMember(MemberId),
}
