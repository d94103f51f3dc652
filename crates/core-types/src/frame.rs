use core::fmt;

use thiserror::Error;

use crate::{Slot, Timestamp};

/// Static parameters of the frame schedule.
///
/// Given a current time, the schedule deterministically yields a sequence of
/// contiguous, non-overlapping frames. The committee agrees on one report
/// per frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameConfig {
    /// Time of slot zero of the reported chain.
    pub genesis_time: Timestamp,

    /// Duration of one slot, in seconds.
    pub seconds_per_slot: u64,

    /// Number of slots in one frame.
    pub slots_per_frame: u64,

    /// Length of the fast-lane window at the start of each frame, in slots.
    /// Must be strictly shorter than the frame.
    pub fast_lane_slots: u64,
}

/// Invalid frame schedule parameters.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FrameConfigError {
    /// `seconds_per_slot` must be non-zero.
    #[error("seconds_per_slot must be non-zero")]
    ZeroSecondsPerSlot,

    /// `slots_per_frame` must be non-zero.
    #[error("slots_per_frame must be non-zero")]
    ZeroSlotsPerFrame,

    /// The fast lane must end before the frame does.
    #[error("fast lane of {fast_lane_slots} slots does not fit in a frame of {slots_per_frame} slots")]
    FastLaneTooLong {
        /// Configured fast-lane length.
        fast_lane_slots: u64,
        /// Configured frame length.
        slots_per_frame: u64,
    },
}

impl FrameConfig {
    /// Validate and build a frame schedule.
    pub fn new(
        genesis_time: Timestamp,
        seconds_per_slot: u64,
        slots_per_frame: u64,
        fast_lane_slots: u64,
    ) -> Result<Self, FrameConfigError> {
        if seconds_per_slot == 0 {
            return Err(FrameConfigError::ZeroSecondsPerSlot);
        }

        if slots_per_frame == 0 {
            return Err(FrameConfigError::ZeroSlotsPerFrame);
        }

        if fast_lane_slots >= slots_per_frame {
            return Err(FrameConfigError::FastLaneTooLong {
                fast_lane_slots,
                slots_per_frame,
            });
        }

        Ok(Self {
            genesis_time,
            seconds_per_slot,
            slots_per_frame,
            fast_lane_slots,
        })
    }

    /// The slot containing `now`, or `None` before genesis.
    pub fn slot_at(&self, now: Timestamp) -> Option<Slot> {
        let elapsed = now.as_secs().checked_sub(self.genesis_time.as_secs())?;
        Some(Slot::new(elapsed / self.seconds_per_slot))
    }

    /// The frame containing `now`, or `None` before genesis.
    pub fn frame_at(&self, now: Timestamp) -> Option<Frame> {
        let slot = self.slot_at(now)?;
        Some(self.frame_of(slot))
    }

    /// The frame containing the given slot.
    pub fn frame_of(&self, slot: Slot) -> Frame {
        let index = slot.as_u64() / self.slots_per_frame;

        Frame {
            index,
            ref_slot: Slot::new(index * self.slots_per_frame),
            deadline_slot: Slot::new((index + 1) * self.slots_per_frame),
        }
    }

    /// Whether `now` falls within the fast-lane window of its frame.
    ///
    /// During this window only the designated fast-lane members may vote;
    /// afterwards the whole committee may.
    pub fn in_fast_lane(&self, now: Timestamp) -> bool {
        let Some(slot) = self.slot_at(now) else {
            return false;
        };

        slot.as_u64() % self.slots_per_frame < self.fast_lane_slots
    }
}

/// One reporting window of the frame schedule.
///
/// `ref_slot` is the frame's first slot and the primary key of its report;
/// `deadline_slot` is the first slot of the next frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Zero-based frame number since genesis.
    pub index: u64,

    /// The frame's reference slot.
    pub ref_slot: Slot,

    /// The next frame boundary; reports for `ref_slot` should be processed
    /// before it. Advisory, not enforced by the core.
    pub deadline_slot: Slot,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} (ref_slot {}, deadline {})",
            self.index, self.ref_slot, self.deadline_slot
        )
    }
}
