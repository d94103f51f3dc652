use bytes::Bytes;
use pretty_assertions::assert_eq;

use quorumbus_core_committee::Committee;
use quorumbus_core_lifecycle::{Lifecycle, LifecycleError};
use quorumbus_core_types::{ReportHash, Slot, Timestamp};
use quorumbus_exit_bus::{ExitBus, DATA_FORMAT_LIST};

use quorumbus_test::*;

fn agree_on(
    committee: &mut Committee,
    lifecycle: &mut Lifecycle<ExitBus>,
    payload: &Bytes,
    now: Timestamp,
) {
    let ref_slot = committee.current_frame(now).unwrap().ref_slot;
    let hash = ReportHash::of(payload);

    let mut event = None;
    for member in [ALICE, BOB, CAROL] {
        event = committee
            .submit_vote(now, member, ref_slot, hash, CONSENSUS_VERSION)
            .unwrap();
    }

    lifecycle.on_consensus_reached(event.unwrap());
}

fn setup(count: u64) -> (Committee, Lifecycle<ExitBus>, Bytes, Timestamp) {
    let mut committee = committee(frame_config(), 3);
    let mut lifecycle = Lifecycle::new(CONTRACT_VERSION, CONSENSUS_VERSION, ExitBus::new(CONTRACT_VERSION));
    let payload = exit_payload(count);
    let now = at_slot(1);

    agree_on(&mut committee, &mut lifecycle, &payload, now);
    (committee, lifecycle, payload, now)
}

#[test]
fn accepts_the_matching_payload_exactly_once() {
    let (mut committee, mut lifecycle, payload, now) = setup(3);

    let events = lifecycle
        .submit(
            &mut committee,
            ALICE,
            payload.clone(),
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            now,
        )
        .unwrap();

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].timestamp, now);

    let state = lifecycle.processing_state();
    assert!(state.data_submitted);
    assert_eq!(state.requests_count, 3);
    assert_eq!(state.data_format, DATA_FORMAT_LIST);

    assert!(lifecycle.consensus_report().unwrap().processing_started);
    assert!(committee.consensus_report().unwrap().processing_started);

    // An identical second submission is rejected.
    let err = lifecycle
        .submit(
            &mut committee,
            BOB,
            payload,
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            now,
        )
        .unwrap_err();

    assert_eq!(
        err,
        LifecycleError::RefSlotAlreadyProcessing(lifecycle.processing_state().ref_slot)
    );
}

#[test]
fn rejects_unauthorized_senders() {
    let (mut committee, mut lifecycle, payload, now) = setup(1);

    let err = lifecycle
        .submit(
            &mut committee,
            OUTSIDER,
            payload.clone(),
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            now,
        )
        .unwrap_err();
    assert_eq!(err, LifecycleError::SenderNotAllowed(OUTSIDER));

    // An explicit grant opens the door for non-members.
    lifecycle.grant_submitter(OUTSIDER);
    lifecycle
        .submit(
            &mut committee,
            OUTSIDER,
            payload,
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            now,
        )
        .unwrap();
}

#[test]
fn rejects_version_mismatches() {
    let (mut committee, mut lifecycle, payload, now) = setup(1);

    let err = lifecycle
        .submit(
            &mut committee,
            ALICE,
            payload.clone(),
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION + 1,
            now,
        )
        .unwrap_err();
    assert_eq!(
        err,
        LifecycleError::UnexpectedContractVersion {
            expected: CONTRACT_VERSION,
            got: CONTRACT_VERSION + 1,
        }
    );

    let err = lifecycle
        .submit(
            &mut committee,
            ALICE,
            payload,
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION + 1,
            CONTRACT_VERSION,
            now,
        )
        .unwrap_err();
    assert_eq!(
        err,
        LifecycleError::UnexpectedConsensusVersion {
            expected: CONSENSUS_VERSION,
            got: CONSENSUS_VERSION + 1,
        }
    );
}

#[test]
fn rejects_a_payload_with_the_wrong_hash() {
    let (mut committee, mut lifecycle, payload, now) = setup(2);

    let other = exit_payload(5);
    let err = lifecycle
        .submit(
            &mut committee,
            ALICE,
            other.clone(),
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            now,
        )
        .unwrap_err();

    assert_eq!(
        err,
        LifecycleError::UnexpectedDataHash {
            expected: ReportHash::of(&payload),
            got: ReportHash::of(&other),
        }
    );
    assert!(!lifecycle.processing_state().data_submitted);
}

#[test]
fn submission_without_consensus_fails() {
    let mut committee = committee(frame_config(), 3);
    let mut lifecycle = Lifecycle::new(CONTRACT_VERSION, CONSENSUS_VERSION, ExitBus::new(CONTRACT_VERSION));
    let payload = exit_payload(1);

    let err = lifecycle
        .submit(
            &mut committee,
            ALICE,
            payload,
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            at_slot(1),
        )
        .unwrap_err();
    assert_eq!(err, LifecycleError::NoConsensusReport);
}

#[test]
fn decode_failure_leaves_state_untouched() {
    let mut committee = committee(frame_config(), 3);
    let mut lifecycle = Lifecycle::new(CONTRACT_VERSION, CONSENSUS_VERSION, ExitBus::new(CONTRACT_VERSION));

    // The committee agrees on a malformed payload: 65 bytes, not a record
    // multiple. Consensus is hash-only, so this can happen.
    let payload = Bytes::from(vec![0u8; 65]);
    let now = at_slot(1);
    agree_on(&mut committee, &mut lifecycle, &payload, now);

    let err = lifecycle
        .submit(
            &mut committee,
            ALICE,
            payload,
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            now,
        )
        .unwrap_err();

    assert!(matches!(err, LifecycleError::Decode(_)));
    assert!(!lifecycle.processing_state().data_submitted);
    assert!(!lifecycle.consensus_report().unwrap().processing_started);
    assert!(!committee.consensus_report().unwrap().processing_started);
}

#[test]
fn new_consensus_resets_the_processing_state() {
    let (mut committee, mut lifecycle, payload, now) = setup(2);

    lifecycle
        .submit(
            &mut committee,
            ALICE,
            payload,
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            now,
        )
        .unwrap();
    lifecycle.note_requests_submitted(2);
    assert_eq!(lifecycle.processing_state().requests_submitted, 2);

    // Next frame, new report: the state starts over.
    let next = exit_payload(4);
    let later = at_slot(SLOTS_PER_FRAME + 1);
    agree_on(&mut committee, &mut lifecycle, &next, later);

    let state = lifecycle.processing_state();
    assert!(!state.data_submitted);
    assert_eq!(state.requests_count, 0);
    assert_eq!(state.requests_submitted, 0);
    assert_eq!(state.data_hash, Some(ReportHash::of(&next)));
}

#[test]
fn deadline_is_advisory() {
    let (mut committee, mut lifecycle, payload, _) = setup(1);

    let deadline = lifecycle.consensus_report().unwrap().deadline_slot;
    assert!(lifecycle.is_deadline_missed(deadline));
    assert!(!lifecycle.is_deadline_missed(Slot::new(deadline.as_u64() - 1)));

    // Late within the frame is still accepted.
    let late = at_slot(SLOTS_PER_FRAME - 1);
    lifecycle
        .submit(
            &mut committee,
            ALICE,
            payload,
            DATA_FORMAT_LIST,
            CONSENSUS_VERSION,
            CONTRACT_VERSION,
            late,
        )
        .unwrap();
}
