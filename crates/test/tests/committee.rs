use pretty_assertions::assert_eq;

use quorumbus_core_committee::{CommitteeError, ConsensusReached};
use quorumbus_core_types::{ReportHash, Slot};

use quorumbus_test::*;

#[test]
fn happy_path_quorum_of_three() {
    let mut committee = committee(frame_config(), 3);
    let now = at_slot(100);
    let frame = committee.current_frame(now).unwrap();
    let ref_slot = frame.ref_slot;

    let hash = ReportHash::of(b"report");

    assert_eq!(
        committee.submit_vote(now, ALICE, ref_slot, hash, CONSENSUS_VERSION),
        Ok(None)
    );
    assert_eq!(
        committee.submit_vote(now, CAROL, ref_slot, hash, CONSENSUS_VERSION),
        Ok(None)
    );

    let event = committee
        .submit_vote(now, BOB, ref_slot, hash, CONSENSUS_VERSION)
        .unwrap();

    assert_eq!(
        event,
        Some(ConsensusReached {
            ref_slot,
            hash,
            deadline_slot: frame.deadline_slot,
        })
    );

    let report = committee.consensus_report().unwrap();
    assert_eq!(report.hash, hash);
    assert_eq!(report.ref_slot, ref_slot);
    assert!(!report.processing_started);
}

#[test]
fn first_hash_to_reach_quorum_is_fixed() {
    let mut committee = committee(frame_config(), 3);
    let now = at_slot(0);
    let ref_slot = committee.current_frame(now).unwrap().ref_slot;

    let hash_a = ReportHash::of(b"a");
    let hash_b = ReportHash::of(b"b");

    for member in [ALICE, BOB] {
        committee
            .submit_vote(now, member, ref_slot, hash_a, CONSENSUS_VERSION)
            .unwrap();
    }
    let event = committee
        .submit_vote(now, CAROL, ref_slot, hash_a, CONSENSUS_VERSION)
        .unwrap();
    assert!(event.is_some());

    // The whole committee now changes its mind; the report must not move.
    for member in [ALICE, BOB, CAROL, DAVE, ERIN] {
        let event = committee
            .submit_vote(now, member, ref_slot, hash_b, CONSENSUS_VERSION)
            .unwrap();
        assert_eq!(event, None);
    }

    assert_eq!(committee.consensus_report().unwrap().hash, hash_a);
    assert_eq!(committee.member_vote(&ALICE), Some(&hash_b));
}

#[test]
fn revote_retallies_before_quorum() {
    let mut committee = committee(frame_config(), 3);
    let now = at_slot(0);
    let ref_slot = committee.current_frame(now).unwrap().ref_slot;

    let hash_a = ReportHash::of(b"a");
    let hash_b = ReportHash::of(b"b");

    committee
        .submit_vote(now, ALICE, ref_slot, hash_a, CONSENSUS_VERSION)
        .unwrap();
    committee
        .submit_vote(now, BOB, ref_slot, hash_b, CONSENSUS_VERSION)
        .unwrap();
    committee
        .submit_vote(now, CAROL, ref_slot, hash_b, CONSENSUS_VERSION)
        .unwrap();

    // Alice switches to b, completing its quorum.
    let event = committee
        .submit_vote(now, ALICE, ref_slot, hash_b, CONSENSUS_VERSION)
        .unwrap();
    assert!(event.is_some());
    assert_eq!(committee.consensus_report().unwrap().hash, hash_b);
}

#[test]
fn vote_validation_errors() {
    let mut committee = committee(frame_config(), 3);
    let now = at_slot(40); // frame 1
    let ref_slot = committee.current_frame(now).unwrap().ref_slot;
    assert_eq!(ref_slot, Slot::new(32));

    let hash = ReportHash::of(b"report");

    assert_eq!(
        committee.submit_vote(now, OUTSIDER, ref_slot, hash, CONSENSUS_VERSION),
        Err(CommitteeError::NonMember(OUTSIDER))
    );

    assert_eq!(
        committee.submit_vote(now, ALICE, Slot::new(0), hash, CONSENSUS_VERSION),
        Err(CommitteeError::StaleRefSlot {
            expected: ref_slot,
            got: Slot::new(0),
        })
    );

    assert_eq!(
        committee.submit_vote(now, ALICE, ref_slot, hash, CONSENSUS_VERSION + 1),
        Err(CommitteeError::UnexpectedConsensusVersion {
            expected: CONSENSUS_VERSION,
            got: CONSENSUS_VERSION + 1,
        })
    );

    committee
        .submit_vote(now, ALICE, ref_slot, hash, CONSENSUS_VERSION)
        .unwrap();
    assert_eq!(
        committee.submit_vote(now, ALICE, ref_slot, hash, CONSENSUS_VERSION),
        Err(CommitteeError::DuplicateVote {
            member: ALICE,
            hash
        })
    );
}

#[test]
fn votes_do_not_carry_across_frames() {
    let mut committee = committee(frame_config(), 3);
    let hash = ReportHash::of(b"report");

    let now = at_slot(0);
    let ref_slot = committee.current_frame(now).unwrap().ref_slot;
    committee
        .submit_vote(now, ALICE, ref_slot, hash, CONSENSUS_VERSION)
        .unwrap();
    committee
        .submit_vote(now, BOB, ref_slot, hash, CONSENSUS_VERSION)
        .unwrap();

    // Next frame: the tally starts over and the old ref slot is stale.
    let later = at_slot(SLOTS_PER_FRAME);
    let next_ref_slot = committee.current_frame(later).unwrap().ref_slot;

    assert_eq!(
        committee.submit_vote(later, CAROL, ref_slot, hash, CONSENSUS_VERSION),
        Err(CommitteeError::StaleRefSlot {
            expected: next_ref_slot,
            got: ref_slot,
        })
    );

    committee
        .submit_vote(later, CAROL, next_ref_slot, hash, CONSENSUS_VERSION)
        .unwrap();
    assert_eq!(committee.consensus_state().votes_cast, 1);
}

#[test]
fn unprocessed_report_is_superseded_next_frame() {
    let mut committee = committee(frame_config(), 3);
    let hash = ReportHash::of(b"report");

    let now = at_slot(0);
    let ref_slot = committee.current_frame(now).unwrap().ref_slot;
    for member in [ALICE, BOB, CAROL] {
        committee
            .submit_vote(now, member, ref_slot, hash, CONSENSUS_VERSION)
            .unwrap();
    }
    assert!(committee.consensus_report().is_some());

    committee.current_frame(at_slot(SLOTS_PER_FRAME)).unwrap();
    assert_eq!(committee.consensus_report(), None);
}

#[test]
fn membership_changes_apply_at_the_next_frame() {
    let mut committee = committee(frame_config(), 3);
    let now = at_slot(0);
    let ref_slot = committee.current_frame(now).unwrap().ref_slot;

    committee.add_member(now, OUTSIDER, 4).unwrap();

    // Still not a member within the current frame.
    let hash = ReportHash::of(b"report");
    assert_eq!(
        committee.submit_vote(now, OUTSIDER, ref_slot, hash, CONSENSUS_VERSION),
        Err(CommitteeError::NonMember(OUTSIDER))
    );
    assert_eq!(committee.consensus_state().quorum, 3);

    // Next frame: the change has been applied.
    let later = at_slot(SLOTS_PER_FRAME);
    let next_ref_slot = committee.current_frame(later).unwrap().ref_slot;

    committee
        .submit_vote(later, OUTSIDER, next_ref_slot, hash, CONSENSUS_VERSION)
        .unwrap();
    assert_eq!(committee.consensus_state().quorum, 4);
    assert_eq!(committee.consensus_state().members.len(), 6);
}

#[test]
fn staged_changes_batch_within_a_frame() {
    let mut committee = committee(frame_config(), 3);
    let now = at_slot(0);
    committee.current_frame(now).unwrap();

    committee.add_member(now, OUTSIDER, 4).unwrap();
    committee.remove_member(now, ERIN, 4).unwrap();
    committee.set_quorum(now, 4).unwrap();

    let later = at_slot(SLOTS_PER_FRAME);
    committee.current_frame(later).unwrap();

    let state = committee.consensus_state();
    assert_eq!(state.members.len(), 5);
    assert!(state.members.contains(&OUTSIDER));
    assert!(!state.members.contains(&ERIN));
    assert_eq!(state.quorum, 4);
}

#[test]
fn quorum_must_be_a_strict_majority() {
    let mut committee = committee(frame_config(), 3);
    let now = at_slot(0);

    // 2 of 5 is not a majority.
    assert_eq!(
        committee.set_quorum(now, 2),
        Err(CommitteeError::InvalidQuorum {
            quorum: 2,
            members: 5
        })
    );

    // 6 of 5 is impossible.
    assert_eq!(
        committee.set_quorum(now, 6),
        Err(CommitteeError::InvalidQuorum {
            quorum: 6,
            members: 5
        })
    );
}

#[test]
fn fast_lane_restricts_early_votes_only() {
    let mut committee = committee(fast_lane_config(), 3);
    let hash = ReportHash::of(b"report");

    // Configure the fast lane before the first frame is entered.
    committee.set_fast_lane_members(at_slot(0), [ALICE, BOB, CAROL]).unwrap();

    let early = at_slot(SLOTS_PER_FRAME); // slot 32: frame 1, fast lane open
    let ref_slot = committee.current_frame(early).unwrap().ref_slot;

    assert_eq!(
        committee.submit_vote(early, DAVE, ref_slot, hash, CONSENSUS_VERSION),
        Err(CommitteeError::FastLaneRestricted(DAVE))
    );
    assert_eq!(
        committee.submit_vote(early, ALICE, ref_slot, hash, CONSENSUS_VERSION),
        Ok(None)
    );

    // Slot 40 is past the 8-slot window; the whole committee may vote.
    let late = at_slot(SLOTS_PER_FRAME + 8);
    assert_eq!(
        committee.submit_vote(late, DAVE, ref_slot, hash, CONSENSUS_VERSION),
        Ok(None)
    );
}

#[test]
fn fast_lane_members_must_be_members() {
    let mut committee = committee(fast_lane_config(), 3);

    assert_eq!(
        committee.set_fast_lane_members(at_slot(0), [ALICE, OUTSIDER]),
        Err(CommitteeError::UnknownMember(OUTSIDER))
    );
}

#[test]
fn before_genesis_nothing_runs() {
    let mut committee = committee(frame_config(), 3);

    assert_eq!(
        committee.current_frame(quorumbus_core_types::Timestamp::new(GENESIS - 1)),
        Err(CommitteeError::GenesisNotReached)
    );
}
