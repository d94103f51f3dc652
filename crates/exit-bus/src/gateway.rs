use thiserror::Error;

use crate::ValidatorPubkey;

/// One exit request as forwarded to the downstream gateway.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TriggerableExit {
    /// Staking module the validator belongs to.
    pub module_id: u32,

    /// Node operator within the module.
    pub node_operator_id: u64,

    /// The validator's public key.
    pub pubkey: ValidatorPubkey,
}

/// The gateway refused the batch; no exits were performed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("exit gateway rejected the batch: {0}")]
pub struct GatewayError(pub String);

/// The downstream system that performs forced validator exits.
///
/// The gateway either accepts a whole forwarded batch or fails the call;
/// partial acceptance is not part of the boundary.
pub trait ExitGateway {
    /// The current fee charged per triggered exit.
    fn exit_request_fee(&self) -> u128;

    /// Perform the forwarded exits, charging `fee_per_exit` for each.
    fn trigger_exits(
        &mut self,
        exits: &[TriggerableExit],
        fee_per_exit: u128,
    ) -> Result<(), GatewayError>;
}
