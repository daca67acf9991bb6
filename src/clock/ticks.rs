//! Wrapping monotonic timestamps.
//!
//! The hardware counter behind `TimeSource::now` is a free-running `u32`
//! that overflows (after ~49 days at 1 kHz, much sooner on boards with a
//! faster or narrower counter). All comparisons go through wrapping
//! arithmetic so a deadline just past the wrap point still sorts after one
//! just before it.

/// A reading of the monotonic counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ticks(pub u32);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    /// Ticks elapsed from `earlier` to `self`, correct across one wrap.
    pub fn wrapping_since(self, earlier: Ticks) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Signed distance from `other` to `self`. Positive when `self` is later.
    pub fn signed_diff(self, other: Ticks) -> i32 {
        self.0.wrapping_sub(other.0) as i32
    }

    /// True once `now` has reached or passed this deadline.
    pub fn is_reached(self, now: Ticks) -> bool {
        now.signed_diff(self) >= 0
    }

    /// True when the raw counter went backwards, i.e. it overflowed in between.
    pub fn wrapped_since(self, earlier: Ticks) -> bool {
        self.0 < earlier.0
    }

    pub fn offset(self, period: u32) -> Ticks {
        Ticks(self.0.wrapping_add(period))
    }
}
