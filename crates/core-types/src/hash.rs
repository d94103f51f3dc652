use core::fmt;

use sha3::{Digest, Keccak256};

/// The keccak-256 digest of a full report payload.
///
/// Votes carry only this hash; the payload itself is submitted separately
/// and re-hashed on arrival to check it against the agreed value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportHash([u8; Self::LENGTH]);

impl ReportHash {
    /// Length of the digest in bytes.
    pub const LENGTH: usize = 32;

    /// Wrap a raw digest.
    pub const fn new(value: [u8; Self::LENGTH]) -> Self {
        Self(value)
    }

    /// Compute the hash of a payload.
    pub fn of(payload: &[u8]) -> Self {
        let digest = Keccak256::digest(payload);
        let mut hash = [0; Self::LENGTH];
        hash.copy_from_slice(&digest);
        Self(hash)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl fmt::Display for ReportHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ReportHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportHash({self})")
    }
}
