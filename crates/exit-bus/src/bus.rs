use bytes::Bytes;
use tracing::{debug, info};

use quorumbus_core_lifecycle::{Decoded, ReportDecoder};
use quorumbus_core_types::{MemberId, ReportHash, Timestamp};

use crate::{
    codec, CodecError, DeliveryTracker, ExitBusError, ExitGateway, TriggerableExit,
    ValidatorExitRequest, DATA_FORMAT_LIST,
};

/// Value returned to the refund recipient after a trigger call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Refund {
    /// Who receives the unspent value.
    pub recipient: MemberId,

    /// Unspent value, possibly zero.
    pub amount: u128,
}

/// Outcome of a successful [`ExitBus::trigger_exits`] call.
///
/// Fees are pass-through: `fee_paid` went to the gateway and `refund`
/// returns the rest, so the bus itself retains nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TriggerReceipt {
    /// Number of exits forwarded to the gateway.
    pub triggered: u64,

    /// Total fee forwarded to the gateway.
    pub fee_paid: u128,

    /// The unspent remainder of the caller's value.
    pub refund: Refund,
}

/// The validator exit request bus.
///
/// Consumes exit-request report payloads (as the [`ReportDecoder`] plugged
/// into the report lifecycle), tracks their delivery, and triggers the
/// requested exits against the downstream gateway.
#[derive(Clone, Debug, Default)]
pub struct ExitBus {
    tracker: DeliveryTracker,
}

impl ExitBus {
    /// Build a bus stamping new request statuses with the given version.
    pub fn new(contract_version: u64) -> Self {
        Self {
            tracker: DeliveryTracker::new(contract_version),
        }
    }

    /// The per-hash delivery bookkeeping.
    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    /// Pre-register an exit requests hash through the trusted side door,
    /// ahead of (and independent of) consensus.
    ///
    /// Access control for this path lives with the caller; the bus only
    /// guarantees that a registered hash is unusable for triggering until
    /// its payload has actually been delivered and matched.
    pub fn submit_exit_requests_hash(&mut self, hash: ReportHash) -> Result<(), ExitBusError> {
        self.tracker.register(hash)
    }

    /// Deliver the next chunk of a pre-registered payload, at most `limit`
    /// entries, resuming from the recorded high-water mark.
    ///
    /// Emits one notification per newly delivered record, in record order.
    pub fn deliver_exit_requests(
        &mut self,
        payload: &Bytes,
        format: u64,
        limit: u64,
        now: Timestamp,
    ) -> Result<Vec<ValidatorExitRequest>, ExitBusError> {
        if limit == 0 {
            return Err(ExitBusError::ZeroArgument("limit"));
        }

        if format != DATA_FORMAT_LIST {
            return Err(CodecError::UnsupportedDataFormat(format).into());
        }

        let total = codec::request_count(payload)?;
        if total == 0 {
            return Err(ExitBusError::ZeroArgument("exit_requests_data"));
        }

        let hash = ReportHash::of(payload);
        if !self.tracker.contains(&hash) {
            return Err(ExitBusError::ExitHashNotSubmitted(hash));
        }

        let start = match self.tracker.last_delivered(&hash) {
            Some(last) if last + 1 >= total => {
                return Err(ExitBusError::RequestsAlreadyDelivered(total))
            }
            Some(last) => last + 1,
            None => 0,
        };

        let end = start.saturating_add(limit).min(total) - 1;
        let events = self.emit_range(payload, start, end, now)?;
        self.tracker.record_delivery(&hash, end, now)?;

        info!(%hash, start, end, total, "Exit requests delivered");
        Ok(events)
    }

    /// Forward the selected entries of a delivered payload to the gateway.
    ///
    /// `indexes` must be strictly increasing, every selected entry must
    /// already be delivered, and `value` must cover the gateway fee for
    /// the whole selection. The unspent remainder is refunded to
    /// `refund_recipient`, defaulting to the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn trigger_exits<G>(
        &self,
        payload: &Bytes,
        format: u64,
        indexes: &[u64],
        value: u128,
        caller: MemberId,
        refund_recipient: Option<MemberId>,
        gateway: &mut G,
    ) -> Result<TriggerReceipt, ExitBusError>
    where
        G: ExitGateway,
    {
        if indexes.is_empty() {
            return Err(ExitBusError::ZeroArgument("exit_data_indexes"));
        }

        if value == 0 {
            return Err(ExitBusError::ZeroArgument("value"));
        }

        if format != DATA_FORMAT_LIST {
            return Err(CodecError::UnsupportedDataFormat(format).into());
        }

        let hash = ReportHash::of(payload);
        let status = self
            .tracker
            .status(&hash)
            .ok_or(ExitBusError::ExitHashNotSubmitted(hash))?;

        let last_delivered = status
            .last_delivered_index()
            .ok_or(ExitBusError::RequestsNotDelivered(hash))?;

        // Strict ascending order makes duplicates detectable in one pass
        // and fixes the forwarded batch order.
        for (position, window) in indexes.windows(2).enumerate() {
            if window[1] <= window[0] {
                return Err(ExitBusError::InvalidExitDataIndexSortOrder {
                    position: position + 1,
                });
            }
        }

        let mut exits = Vec::with_capacity(indexes.len());

        for &index in indexes {
            let request = codec::decode_at(payload, index)?;

            if index > last_delivered {
                return Err(ExitBusError::RequestsNotDelivered(hash));
            }

            if request.module_id == 0 {
                return Err(ExitBusError::InvalidModuleId { index });
            }

            exits.push(TriggerableExit {
                module_id: request.module_id,
                node_operator_id: request.node_operator_id,
                pubkey: request.pubkey,
            });
        }

        let fee_per_exit = gateway.exit_request_fee();
        let required = fee_per_exit.saturating_mul(exits.len() as u128);

        if value < required {
            return Err(ExitBusError::InsufficientPayment {
                required,
                provided: value,
            });
        }

        gateway.trigger_exits(&exits, fee_per_exit)?;

        let recipient = refund_recipient.unwrap_or(caller);
        info!(
            %hash,
            triggered = exits.len(),
            fee_paid = required,
            refund = value - required,
            "Exits triggered"
        );

        Ok(TriggerReceipt {
            triggered: exits.len() as u64,
            fee_paid: required,
            refund: Refund {
                recipient,
                amount: value - required,
            },
        })
    }

    fn emit_range(
        &self,
        payload: &Bytes,
        start: u64,
        end: u64,
        now: Timestamp,
    ) -> Result<Vec<ValidatorExitRequest>, ExitBusError> {
        let mut events = Vec::with_capacity((end - start + 1) as usize);

        for index in start..=end {
            let request = codec::decode_at(payload, index)?;

            debug!(
                index,
                module_id = request.module_id,
                node_operator_id = request.node_operator_id,
                validator_index = request.validator_index,
                pubkey = %request.pubkey,
                "Validator exit requested"
            );

            events.push(ValidatorExitRequest {
                index,
                request,
                timestamp: now,
            });
        }

        Ok(events)
    }
}

impl ReportDecoder for ExitBus {
    type Output = Vec<ValidatorExitRequest>;
    type Error = ExitBusError;

    /// Consensus delivery path: decode the whole payload, emit one
    /// notification per record in record order, and record full delivery
    /// under the payload's hash (sharing any status the side door already
    /// created for it).
    fn decode(
        &mut self,
        format: u64,
        payload: &Bytes,
        now: Timestamp,
    ) -> Result<Decoded<Self::Output>, Self::Error> {
        if format != DATA_FORMAT_LIST {
            return Err(CodecError::UnsupportedDataFormat(format).into());
        }

        let total = codec::request_count(payload)?;
        let events = if total == 0 {
            Vec::new()
        } else {
            self.emit_range(payload, 0, total - 1, now)?
        };

        let hash = ReportHash::of(payload);
        self.tracker.ensure(hash);
        if total > 0 {
            self.tracker.record_delivery(&hash, total - 1, now)?;
        }

        Ok(Decoded {
            output: events,
            requests_count: total,
        })
    }
}
