//! Validator exit request bus: the concrete report consumer.
//!
//! An exit-request report payload is a packed list of fixed-width records,
//! one per validator the committee wants exited. This crate decodes that
//! format, keeps the per-hash delivery history that makes multi-transaction
//! delivery resumable, and forwards selected requests to the downstream
//! [`ExitGateway`] that performs the actual forced exits.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod bus;
pub use bus::{ExitBus, Refund, TriggerReceipt};

mod codec;
pub use codec::{
    decode_at, decode_list, request_count, CodecError, ExitRequest, ValidatorExitRequest,
    ValidatorPubkey, DATA_FORMAT_LIST, RECORD_SIZE,
};

mod error;
pub use error::ExitBusError;

mod gateway;
pub use gateway::{ExitGateway, GatewayError, TriggerableExit};

mod tracker;
pub use tracker::{DeliveryEntry, DeliveryTracker, RequestStatus};
