use std::collections::BTreeMap;

use quorumbus_core_types::{MemberId, ReportHash};

/// The vote tally for a single frame.
///
/// Each member holds at most one vote; re-voting overwrites the previous
/// one. History is not retained across frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameVotes {
    votes: BTreeMap<MemberId, ReportHash>,
}

impl FrameVotes {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a member's vote, returning the hash it replaces, if any.
    pub fn record(&mut self, member: MemberId, hash: ReportHash) -> Option<ReportHash> {
        self.votes.insert(member, hash)
    }

    /// The hash the member voted for in this frame, if any.
    pub fn vote_of(&self, member: &MemberId) -> Option<&ReportHash> {
        self.votes.get(member)
    }

    /// Number of members currently voting for the given hash.
    pub fn support_for(&self, hash: &ReportHash) -> usize {
        self.votes.values().filter(|h| *h == hash).count()
    }

    /// Total number of votes cast this frame.
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    /// Whether no votes have been cast this frame.
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Drop all votes. Used when the committee advances to a new frame.
    pub fn clear(&mut self) {
        self.votes.clear();
    }
}
