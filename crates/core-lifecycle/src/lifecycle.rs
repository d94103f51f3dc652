use std::collections::BTreeSet;

use bytes::Bytes;
use tracing::{debug, info};

use quorumbus_core_committee::{Committee, ConsensusReached};
use quorumbus_core_types::{ConsensusReport, MemberId, ProcessingState, ReportHash, Slot, Timestamp};

use crate::{LifecycleError, ReportDecoder};

/// The shared one-report-per-frame submission state machine.
///
/// One instance exists per report consumer; the concrete consumer supplies
/// the [`ReportDecoder`] that interprets accepted payloads. The instance is
/// reset to a fresh idle state by [`on_consensus_reached`] whenever the
/// committee fixes a report for a new frame.
///
/// [`on_consensus_reached`]: Lifecycle::on_consensus_reached
#[derive(Debug)]
pub struct Lifecycle<D>
where
    D: ReportDecoder,
{
    contract_version: u64,
    consensus_version: u64,
    submitters: BTreeSet<MemberId>,
    report: Option<ConsensusReport>,
    state: ProcessingState,
    decoder: D,
}

impl<D> Lifecycle<D>
where
    D: ReportDecoder,
{
    /// Build a lifecycle with the given configured versions and decoder.
    pub fn new(contract_version: u64, consensus_version: u64, decoder: D) -> Self {
        Self {
            contract_version,
            consensus_version,
            submitters: BTreeSet::new(),
            report: None,
            state: ProcessingState::default(),
            decoder,
        }
    }

    /// The consumer-specific decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Mutable access to the consumer-specific decoder.
    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    /// Allow a non-member identity to submit report data.
    pub fn grant_submitter(&mut self, submitter: MemberId) {
        self.submitters.insert(submitter);
    }

    /// Withdraw a previously granted submit permission.
    pub fn revoke_submitter(&mut self, submitter: &MemberId) {
        self.submitters.remove(submitter);
    }

    /// The active consensus report, if any.
    pub fn consensus_report(&self) -> Option<&ConsensusReport> {
        self.report.as_ref()
    }

    /// Submission bookkeeping for the current reference slot.
    pub fn processing_state(&self) -> &ProcessingState {
        &self.state
    }

    /// Whether the active report's processing deadline has passed.
    ///
    /// Advisory: the lifecycle itself still accepts a late submission
    /// within the frame; staleness policy belongs to the consumer.
    pub fn is_deadline_missed(&self, current_slot: Slot) -> bool {
        self.report
            .is_some_and(|report| current_slot >= report.deadline_slot)
    }

    /// Install the report the committee just agreed on and reset the
    /// processing state for its reference slot.
    pub fn on_consensus_reached(&mut self, event: ConsensusReached) {
        debug!(hash = %event.hash, ref_slot = %event.ref_slot, "New consensus report installed");

        self.report = Some(ConsensusReport {
            hash: event.hash,
            ref_slot: event.ref_slot,
            deadline_slot: event.deadline_slot,
            processing_started: false,
        });

        self.state = ProcessingState {
            ref_slot: event.ref_slot,
            data_hash: Some(event.hash),
            ..ProcessingState::default()
        };
    }

    /// Accept the full payload matching the active consensus report.
    ///
    /// At most one submission succeeds per reference slot. On success the
    /// payload is handed to the decoder and its output returned; a decode
    /// failure rejects the submission with no state change.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        committee: &mut Committee,
        caller: MemberId,
        payload: Bytes,
        format: u64,
        consensus_version: u64,
        contract_version: u64,
        now: Timestamp,
    ) -> Result<D::Output, LifecycleError<D::Error>> {
        if !committee.is_member(&caller) && !self.submitters.contains(&caller) {
            return Err(LifecycleError::SenderNotAllowed(caller));
        }

        if contract_version != self.contract_version {
            return Err(LifecycleError::UnexpectedContractVersion {
                expected: self.contract_version,
                got: contract_version,
            });
        }

        if consensus_version != self.consensus_version {
            return Err(LifecycleError::UnexpectedConsensusVersion {
                expected: self.consensus_version,
                got: consensus_version,
            });
        }

        let report = self.report.ok_or(LifecycleError::NoConsensusReport)?;

        let hash = ReportHash::of(&payload);
        if hash != report.hash {
            return Err(LifecycleError::UnexpectedDataHash {
                expected: report.hash,
                got: hash,
            });
        }

        if self.state.data_submitted {
            return Err(LifecycleError::RefSlotAlreadyProcessing(self.state.ref_slot));
        }

        let decoded = self
            .decoder
            .decode(format, &payload, now)
            .map_err(LifecycleError::Decode)?;

        self.state.data_submitted = true;
        self.state.data_format = format;
        self.state.requests_count = decoded.requests_count;

        if let Some(report) = self.report.as_mut() {
            report.processing_started = true;
        }
        committee.mark_processing_started(report.ref_slot);

        info!(
            %hash,
            ref_slot = %report.ref_slot,
            requests = decoded.requests_count,
            "Report data accepted"
        );

        Ok(decoded.output)
    }

    /// Record progress made by the consumer on the accepted payload.
    ///
    /// Clamped to the payload's request count; progress never regresses.
    pub fn note_requests_submitted(&mut self, submitted: u64) {
        let submitted = submitted.min(self.state.requests_count);
        self.state.requests_submitted = self.state.requests_submitted.max(submitted);
    }
}
