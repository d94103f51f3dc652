use core::fmt;
use core::ops::Add;

/// A wall-clock time on the reported chain, in seconds since the Unix epoch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(u64);

impl Timestamp {
    /// Wrap a raw timestamp.
    pub const fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Seconds since the Unix epoch.
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for Timestamp {
    type Output = Timestamp;

    fn add(self, secs: u64) -> Timestamp {
        Timestamp(self.0 + secs)
    }
}

/// A slot number of the reported chain, counted from its genesis.
///
/// Slots are the time unit frames are measured in; each frame's reference
/// slot is the primary key of the report for that frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot(u64);

impl Slot {
    /// Wrap a raw slot number.
    pub const fn new(slot: u64) -> Self {
        Self(slot)
    }

    /// The raw slot number.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
