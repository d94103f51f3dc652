//! Generic one-report-per-frame submission state machine.
//!
//! Every report consumer shares the same submission rules: the sender must
//! be authorized, the declared versions must match the configured ones, the
//! payload must hash to the agreed report hash, and at most one payload is
//! accepted per reference slot. [`Lifecycle`] implements those rules once,
//! parameterized over a [`ReportDecoder`] supplied by the concrete consumer.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod decoder;
pub use decoder::{Decoded, ReportDecoder};

mod error;
pub use error::LifecycleError;

mod lifecycle;
pub use lifecycle::Lifecycle;
