//! Committee and quorum tracking for the quorumbus oracle engine.
//!
//! The [`Committee`] owns the member set, the frame schedule and the vote
//! tally for the current frame, and emits a [`ConsensusReached`] event the
//! first time some report hash gathers a quorum of votes within a frame.

#![forbid(unsafe_code)]
#![deny(unused_crate_dependencies, trivial_casts, trivial_numeric_casts)]
#![warn(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod committee;
pub use committee::{Committee, ConsensusReached, ConsensusState};

mod error;
pub use error::CommitteeError;

mod tally;
pub use tally::FrameVotes;
