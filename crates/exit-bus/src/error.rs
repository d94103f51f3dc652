use thiserror::Error;

use quorumbus_core_types::ReportHash;

use crate::{CodecError, GatewayError};

/// Errors returned by the exit bus operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExitBusError {
    /// A required argument was empty or zero.
    #[error("argument `{0}` must be non-zero")]
    ZeroArgument(&'static str),

    /// The payload is malformed or an index is out of range.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// No status exists for the recomputed payload hash.
    #[error("exit requests hash {0} has not been submitted")]
    ExitHashNotSubmitted(ReportHash),

    /// The hash already has a status from a previous registration or
    /// delivery.
    #[error("exit requests hash {0} has already been submitted")]
    ExitHashAlreadySubmitted(ReportHash),

    /// The hash is registered but the selected entries have not been
    /// delivered yet.
    #[error("exit requests for hash {0} have not been delivered yet")]
    RequestsNotDelivered(ReportHash),

    /// Every entry of the payload has already been delivered.
    #[error("all {0} exit requests have already been delivered")]
    RequestsAlreadyDelivered(u64),

    /// The selected entry indexes are not strictly increasing.
    #[error("exit data indexes must be strictly increasing, violated at position {position}")]
    InvalidExitDataIndexSortOrder {
        /// Position in the selection at which the order breaks.
        position: usize,
    },

    /// The entry carries the reserved zero module id.
    #[error("exit data entry {index} has invalid module id 0")]
    InvalidModuleId {
        /// Index of the offending entry.
        index: u64,
    },

    /// The provided value does not cover the gateway fee for the selection.
    #[error("insufficient payment: {provided} provided, {required} required")]
    InsufficientPayment {
        /// Total fee required for the selection.
        required: u128,
        /// Value provided by the caller.
        provided: u128,
    },

    /// The downstream gateway refused the batch.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
