//! Front button long-press detector.
//!
//! ```text
//!   Idle --down--> Held --up--> Idle   (emits Short or Long)
//!                   |
//!                   +-- poll past threshold --> long hold (fires once)
//! ```
//!
//! The poll timer counts while the button is down. A release before the
//! short-press limit is a short press, anything later a long press. Holding
//! past the long-hold threshold fires immediately, without waiting for the
//! release.

/// Held ticks below which a release counts as a short press.
pub const SHORT_PRESS_LIMIT: u16 = 15;

/// Held ticks after which the long-hold action fires.
pub const LONG_HOLD_THRESHOLD: u16 = 150;

/// What a button release means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonState {
    Idle,
    Held,
    /// Held past the long-hold threshold; the action already fired.
    HoldFired,
}

#[derive(Debug, Clone)]
pub struct LongPress {
    state: ButtonState,
    held_ticks: u16,
    short_limit: u16,
    hold_threshold: u16,
}

impl LongPress {
    pub fn new() -> Self {
        Self::with_thresholds(SHORT_PRESS_LIMIT, LONG_HOLD_THRESHOLD)
    }

    pub fn with_thresholds(short_limit: u16, hold_threshold: u16) -> Self {
        Self {
            state: ButtonState::Idle,
            held_ticks: 0,
            short_limit,
            hold_threshold,
        }
    }

    /// Button went down.
    pub fn press(&mut self) {
        if self.state == ButtonState::Idle {
            self.state = ButtonState::Held;
            self.held_ticks = 1;
        }
    }

    /// Button went up. Returns the press kind, if one completed.
    pub fn release(&mut self) -> Option<Press> {
        let press = match self.state {
            ButtonState::Idle | ButtonState::HoldFired => None,
            ButtonState::Held if self.held_ticks < self.short_limit => Some(Press::Short),
            ButtonState::Held => Some(Press::Long),
        };
        self.state = ButtonState::Idle;
        self.held_ticks = 0;
        press
    }

    /// Poll tick. Returns true exactly once per hold, when the hold
    /// crosses the long-hold threshold.
    pub fn poll(&mut self) -> bool {
        if self.state != ButtonState::Held {
            return false;
        }
        self.held_ticks = self.held_ticks.saturating_add(1);
        if self.held_ticks > self.hold_threshold {
            self.state = ButtonState::HoldFired;
            return true;
        }
        false
    }

    pub fn held_ticks(&self) -> u16 {
        self.held_ticks
    }

    pub fn is_held(&self) -> bool {
        self.state != ButtonState::Idle
    }
}

impl Default for LongPress {
    fn default() -> Self {
        Self::new()
    }
}
