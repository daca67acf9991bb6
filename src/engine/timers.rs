//! The firmware's timers.

use super::scheduler::{Scheduler, TimerHandle};

/// Which timer fired. One variant per recurring timer in the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Internal clock generator; fires twice per step
    TempoClock,
    /// Counts how long the front button is held
    ButtonPoll,
    /// Samples the tempo knob
    KnobPoll,
    /// Asks the grid transport for new key data
    GridPoll,
    /// Checks whether the grid needs redrawing
    GridRefresh,
}

/// Handles of the timers currently registered.
#[derive(Debug, Clone, Default)]
pub struct TimerHandles {
    pub tempo: Option<TimerHandle>,
    pub button: Option<TimerHandle>,
    pub knob: Option<TimerHandle>,
    pub grid_poll: Option<TimerHandle>,
    pub grid_refresh: Option<TimerHandle>,
}

impl TimerHandles {
    /// Add a timer unless one for this slot already exists.
    pub fn ensure(
        slot: &mut Option<TimerHandle>,
        scheduler: &mut Scheduler<TimerKind>,
        period: u32,
        kind: TimerKind,
    ) {
        if slot.map_or(true, |handle| !scheduler.contains(handle)) {
            *slot = Some(scheduler.add(period, kind));
        }
    }

    /// Remove the timer in `slot`, if any.
    pub fn release(slot: &mut Option<TimerHandle>, scheduler: &mut Scheduler<TimerKind>) {
        if let Some(handle) = slot.take() {
            scheduler.remove(handle);
        }
    }
}
