use std::collections::BTreeSet;

use tracing::{debug, info};

use quorumbus_core_types::{ConsensusReport, Frame, FrameConfig, MemberId, ReportHash, Slot, Timestamp};

use crate::{CommitteeError, FrameVotes};

/// Event emitted the first time a hash gathers a quorum of votes in a frame.
///
/// This is the narrow callback surface report consumers subscribe to; see
/// `Lifecycle::on_consensus_reached` in the lifecycle crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConsensusReached {
    /// Reference slot of the frame the report is for.
    pub ref_slot: Slot,

    /// The agreed payload hash.
    pub hash: ReportHash,

    /// The frame's processing deadline.
    pub deadline_slot: Slot,
}

/// Read-only snapshot of the committee for external observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusState {
    /// The frame the current tally belongs to, if genesis has been reached.
    pub frame: Option<Frame>,

    /// Current quorum threshold.
    pub quorum: usize,

    /// Current member set.
    pub members: Vec<MemberId>,

    /// Number of votes cast in the current frame.
    pub votes_cast: usize,

    /// The current frame's consensus report, if quorum has been reached.
    pub report: Option<ConsensusReport>,
}

/// Membership and quorum changes staged for the next frame boundary.
///
/// Changes never apply mid-frame so that an in-flight tally is always
/// judged against the member set its voters knew about.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingChange {
    members: BTreeSet<MemberId>,
    fast_lane_members: BTreeSet<MemberId>,
    quorum: usize,
}

/// The permissioned reporting committee for one report type.
///
/// Holds the member set and quorum threshold, records one hash vote per
/// member per frame, and fixes the frame's [`ConsensusReport`] when a
/// quorum of members agree on the same hash.
#[derive(Clone, Debug)]
pub struct Committee {
    config: FrameConfig,
    consensus_version: u64,

    members: BTreeSet<MemberId>,
    fast_lane_members: BTreeSet<MemberId>,
    quorum: usize,
    pending: Option<PendingChange>,

    frame: Option<Frame>,
    votes: FrameVotes,
    report: Option<ConsensusReport>,
}

impl Committee {
    /// Build a committee with the given schedule, initial member set and
    /// quorum. Fails if the member list contains duplicates or the quorum
    /// is not a strict majority.
    pub fn new(
        config: FrameConfig,
        consensus_version: u64,
        initial_members: impl IntoIterator<Item = MemberId>,
        quorum: usize,
    ) -> Result<Self, CommitteeError> {
        let mut members = BTreeSet::new();

        for member in initial_members {
            if !members.insert(member) {
                return Err(CommitteeError::DuplicateMember(member));
            }
        }

        check_quorum(quorum, members.len())?;

        Ok(Self {
            config,
            consensus_version,
            members,
            fast_lane_members: BTreeSet::new(),
            quorum,
            pending: None,
            frame: None,
            votes: FrameVotes::new(),
            report: None,
        })
    }

    /// The frame schedule this committee runs on.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// The consensus version votes must declare.
    pub fn consensus_version(&self) -> u64 {
        self.consensus_version
    }

    /// Whether the given identity is a current committee member.
    pub fn is_member(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    /// The current frame, advancing the committee to it first.
    pub fn current_frame(&mut self, now: Timestamp) -> Result<Frame, CommitteeError> {
        self.advance(now).ok_or(CommitteeError::GenesisNotReached)
    }

    /// The current frame's consensus report, if quorum has been reached.
    pub fn consensus_report(&self) -> Option<&ConsensusReport> {
        self.report.as_ref()
    }

    /// The hash the member voted for in the current frame, if any.
    pub fn member_vote(&self, member: &MemberId) -> Option<&ReportHash> {
        self.votes.vote_of(member)
    }

    /// Read-only snapshot for external observers.
    pub fn consensus_state(&self) -> ConsensusState {
        ConsensusState {
            frame: self.frame,
            quorum: self.quorum,
            members: self.members.iter().copied().collect(),
            votes_cast: self.votes.len(),
            report: self.report,
        }
    }

    /// Record a member's hash vote for the current frame.
    ///
    /// Returns `Some(ConsensusReached)` if this vote is the one that first
    /// brings some hash to quorum in this frame. Once a report is fixed,
    /// later votes are still recorded but can no longer change it.
    pub fn submit_vote(
        &mut self,
        now: Timestamp,
        member: MemberId,
        ref_slot: Slot,
        hash: ReportHash,
        consensus_version: u64,
    ) -> Result<Option<ConsensusReached>, CommitteeError> {
        let frame = self.current_frame(now)?;

        if !self.members.contains(&member) {
            return Err(CommitteeError::NonMember(member));
        }

        if self.config.in_fast_lane(now)
            && !self.fast_lane_members.is_empty()
            && !self.fast_lane_members.contains(&member)
        {
            return Err(CommitteeError::FastLaneRestricted(member));
        }

        if ref_slot != frame.ref_slot {
            return Err(CommitteeError::StaleRefSlot {
                expected: frame.ref_slot,
                got: ref_slot,
            });
        }

        if consensus_version != self.consensus_version {
            return Err(CommitteeError::UnexpectedConsensusVersion {
                expected: self.consensus_version,
                got: consensus_version,
            });
        }

        if self.votes.vote_of(&member) == Some(&hash) {
            return Err(CommitteeError::DuplicateVote { member, hash });
        }

        let previous = self.votes.record(member, hash);
        debug!(%member, %hash, ref_slot = %frame.ref_slot, revote = previous.is_some(), "Vote recorded");

        // The first hash to reach quorum is fixed for the rest of the frame.
        if self.report.is_some() {
            return Ok(None);
        }

        if self.votes.support_for(&hash) >= self.quorum {
            let report = ConsensusReport {
                hash,
                ref_slot: frame.ref_slot,
                deadline_slot: frame.deadline_slot,
                processing_started: false,
            };

            info!(%hash, ref_slot = %frame.ref_slot, "Consensus reached");
            self.report = Some(report);

            return Ok(Some(ConsensusReached {
                ref_slot: frame.ref_slot,
                hash,
                deadline_slot: frame.deadline_slot,
            }));
        }

        Ok(None)
    }

    /// Mark the current report's payload as accepted.
    ///
    /// Called by the report consumer after a successful full-payload
    /// submission; the flag flips at most once per frame.
    pub fn mark_processing_started(&mut self, ref_slot: Slot) {
        if let Some(report) = self.report.as_mut() {
            if report.ref_slot == ref_slot {
                report.processing_started = true;
            }
        }
    }

    /// Stage the addition of a member, with the quorum the enlarged
    /// committee will use. Takes effect at the next frame boundary.
    pub fn add_member(
        &mut self,
        now: Timestamp,
        member: MemberId,
        new_quorum: usize,
    ) -> Result<(), CommitteeError> {
        self.update_membership(now, |change| {
            if !change.members.insert(member) {
                return Err(CommitteeError::DuplicateMember(member));
            }

            change.quorum = new_quorum;
            Ok(())
        })
    }

    /// Stage the removal of a member, with the quorum the shrunk committee
    /// will use. Takes effect at the next frame boundary.
    pub fn remove_member(
        &mut self,
        now: Timestamp,
        member: MemberId,
        new_quorum: usize,
    ) -> Result<(), CommitteeError> {
        self.update_membership(now, |change| {
            if !change.members.remove(&member) {
                return Err(CommitteeError::UnknownMember(member));
            }

            change.fast_lane_members.remove(&member);
            change.quorum = new_quorum;
            Ok(())
        })
    }

    /// Stage a quorum change. Takes effect at the next frame boundary.
    pub fn set_quorum(&mut self, now: Timestamp, quorum: usize) -> Result<(), CommitteeError> {
        self.update_membership(now, |change| {
            change.quorum = quorum;
            Ok(())
        })
    }

    /// Stage the designated fast-lane subset. Members outside the current
    /// (post-change) member set are rejected. Takes effect at the next
    /// frame boundary.
    pub fn set_fast_lane_members(
        &mut self,
        now: Timestamp,
        fast_lane: impl IntoIterator<Item = MemberId>,
    ) -> Result<(), CommitteeError> {
        let fast_lane: BTreeSet<_> = fast_lane.into_iter().collect();

        self.update_membership(now, |change| {
            if let Some(stranger) = fast_lane.iter().find(|m| !change.members.contains(m)) {
                return Err(CommitteeError::UnknownMember(*stranger));
            }

            change.fast_lane_members = fast_lane;
            Ok(())
        })
    }

    /// Roll the committee forward to the frame containing `now`, applying
    /// any staged membership change and dropping the previous frame's tally
    /// and (possibly unprocessed) report.
    fn advance(&mut self, now: Timestamp) -> Option<Frame> {
        let frame = self.config.frame_at(now)?;

        match self.frame {
            Some(current) if current.index >= frame.index => Some(current),
            _ => {
                if let Some(change) = self.pending.take() {
                    info!(
                        members = change.members.len(),
                        quorum = change.quorum,
                        "Applying staged committee change at frame boundary"
                    );

                    self.members = change.members;
                    self.fast_lane_members = change.fast_lane_members;
                    self.quorum = change.quorum;
                }

                if let Some(report) = self.report.take() {
                    if !report.processing_started {
                        debug!(hash = %report.hash, ref_slot = %report.ref_slot,
                            "Unprocessed report superseded by new frame");
                    }
                }

                self.votes.clear();
                self.frame = Some(frame);
                Some(frame)
            }
        }
    }

    /// Stage (or, before the first frame, apply directly) a membership
    /// change, validating the resulting quorum.
    fn update_membership(
        &mut self,
        now: Timestamp,
        f: impl FnOnce(&mut PendingChange) -> Result<(), CommitteeError>,
    ) -> Result<(), CommitteeError> {
        let in_flight = self.advance(now).is_some();

        let mut change = self.pending.clone().unwrap_or_else(|| PendingChange {
            members: self.members.clone(),
            fast_lane_members: self.fast_lane_members.clone(),
            quorum: self.quorum,
        });

        f(&mut change)?;
        check_quorum(change.quorum, change.members.len())?;

        if in_flight {
            // An in-flight tally keeps the member set its voters knew about.
            self.pending = Some(change);
        } else {
            self.members = change.members;
            self.fast_lane_members = change.fast_lane_members;
            self.quorum = change.quorum;
        }

        Ok(())
    }
}

fn check_quorum(quorum: usize, members: usize) -> Result<(), CommitteeError> {
    if quorum > members / 2 && quorum <= members {
        Ok(())
    } else {
        Err(CommitteeError::InvalidQuorum { quorum, members })
    }
}
