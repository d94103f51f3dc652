use bytes::Bytes;

use quorumbus_core_types::Timestamp;

/// A decoded report payload plus the bookkeeping the lifecycle records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The consumer-specific decoded output.
    pub output: T,

    /// Number of requests carried by the payload.
    pub requests_count: u64,
}

/// The format-specific half of a report consumer.
///
/// The lifecycle owns the submission rules; the decoder owns the payload
/// interpretation. A failed decode rejects the whole submission, leaving
/// the processing state untouched.
pub trait ReportDecoder {
    /// Consumer-specific decoded output, handed back to the submitter.
    type Output;

    /// Decode failure reason.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Decode an accepted payload in the given declared format.
    fn decode(
        &mut self,
        format: u64,
        payload: &Bytes,
        now: Timestamp,
    ) -> Result<Decoded<Self::Output>, Self::Error>;
}
