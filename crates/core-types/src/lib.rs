//! Core data types for the quorumbus oracle engine.
//!
//! Everything here is a plain value type shared between the committee,
//! the report lifecycle and the report consumers. No state lives here.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod frame;
mod hash;
mod member;
mod report;
mod time;

pub use frame::{Frame, FrameConfig, FrameConfigError};
pub use hash::ReportHash;
pub use member::MemberId;
pub use report::{ConsensusReport, ProcessingState};
pub use time::{Slot, Timestamp};
