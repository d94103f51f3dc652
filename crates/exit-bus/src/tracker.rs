use std::collections::BTreeMap;

use tracing::debug;

use quorumbus_core_types::{ReportHash, Timestamp};

use crate::ExitBusError;

/// One step of a payload's delivery history.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeliveryEntry {
    /// Highest entry index delivered so far (cumulative high-water mark).
    pub last_delivered_index: u64,

    /// When this step was recorded.
    pub timestamp: Timestamp,
}

/// Per-hash delivery bookkeeping.
///
/// A status exists once a hash is either delivered through consensus or
/// pre-registered through the trusted side door; both paths share one
/// status per hash. The history is append-only and its high-water mark
/// only grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestStatus {
    /// Contract version at the time the status was created.
    pub contract_version: u64,

    /// Delivery steps in insertion order.
    pub delivery_history: Vec<DeliveryEntry>,
}

impl RequestStatus {
    /// Highest delivered entry index, or `None` if nothing delivered yet.
    pub fn last_delivered_index(&self) -> Option<u64> {
        self.delivery_history
            .last()
            .map(|entry| entry.last_delivered_index)
    }

    /// Whether any entries of this payload have been delivered.
    pub fn is_delivered(&self) -> bool {
        !self.delivery_history.is_empty()
    }
}

/// Records how much of each known payload has been delivered and when.
///
/// Supports resumable delivery: a deliverer may stop after a prefix of the
/// payload and any authorized party may resume later, as long as the
/// cumulative delivered index only grows.
#[derive(Clone, Debug, Default)]
pub struct DeliveryTracker {
    contract_version: u64,
    statuses: BTreeMap<ReportHash, RequestStatus>,
}

impl DeliveryTracker {
    /// Build a tracker stamping new statuses with the given version.
    pub fn new(contract_version: u64) -> Self {
        Self {
            contract_version,
            statuses: BTreeMap::new(),
        }
    }

    /// Whether a status exists for the hash.
    pub fn contains(&self, hash: &ReportHash) -> bool {
        self.statuses.contains_key(hash)
    }

    /// The status for the hash, if known.
    pub fn status(&self, hash: &ReportHash) -> Option<&RequestStatus> {
        self.statuses.get(hash)
    }

    /// The hash's delivery history in insertion order.
    pub fn delivery_history(&self, hash: &ReportHash) -> &[DeliveryEntry] {
        self.statuses
            .get(hash)
            .map(|status| status.delivery_history.as_slice())
            .unwrap_or_default()
    }

    /// Highest delivered entry index for the hash, if any step was recorded.
    pub fn last_delivered(&self, hash: &ReportHash) -> Option<u64> {
        self.statuses.get(hash)?.last_delivered_index()
    }

    /// Pre-register a hash through the trusted side door.
    ///
    /// Fails if the hash already has a status, from either path. Entries
    /// under the hash stay unusable until the payload itself is delivered.
    pub fn register(&mut self, hash: ReportHash) -> Result<(), ExitBusError> {
        if self.statuses.contains_key(&hash) {
            return Err(ExitBusError::ExitHashAlreadySubmitted(hash));
        }

        debug!(%hash, "Exit requests hash registered ahead of delivery");
        self.statuses.insert(
            hash,
            RequestStatus {
                contract_version: self.contract_version,
                ..RequestStatus::default()
            },
        );

        Ok(())
    }

    /// The status for the hash, creating an empty one if needed.
    ///
    /// Used by the consensus delivery path, which may land on a hash
    /// already registered through the side door.
    pub(crate) fn ensure(&mut self, hash: ReportHash) -> &mut RequestStatus {
        self.statuses
            .entry(hash)
            .or_insert_with(|| RequestStatus {
                contract_version: self.contract_version,
                ..RequestStatus::default()
            })
    }

    /// Record delivery progress up to `upto_index` (inclusive).
    ///
    /// Appends a history entry only if the index exceeds the current
    /// high-water mark; returns whether an entry was appended. The hash
    /// must already have a status.
    pub fn record_delivery(
        &mut self,
        hash: &ReportHash,
        upto_index: u64,
        now: Timestamp,
    ) -> Result<bool, ExitBusError> {
        let status = self
            .statuses
            .get_mut(hash)
            .ok_or(ExitBusError::ExitHashNotSubmitted(*hash))?;

        if status
            .last_delivered_index()
            .is_some_and(|last| upto_index <= last)
        {
            return Ok(false);
        }

        debug!(%hash, upto_index, "Delivery progress recorded");
        status.delivery_history.push(DeliveryEntry {
            last_delivered_index: upto_index,
            timestamp: now,
        });

        Ok(true)
    }
}
