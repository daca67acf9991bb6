//! Clock source arbitration.
//!
//! Two producers can drive the sequencer: edges arriving on the external
//! clock input, and the internal tempo timer. Both keep running all the
//! time; the arbiter decides which one is honored. Edges from the source
//! that isn't selected still update bookkeeping (jitter tracking) but
//! never reach the sequencer.

use super::{
    button::LongPress,
    jitter::JitterBuffer,
    tempo::{half_period_ms, knob_reading, DEFAULT_HALF_PERIOD_MS},
    ticks::Ticks,
};

/// Where clock edges currently come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Internal,
    External,
}

#[derive(Debug, Clone)]
pub struct ClockArbiter {
    button: LongPress,
    /// Phase of the internal generator (true = high)
    phase: bool,
    half_period_ms: u32,
    /// `None` until the first knob poll, so that poll always sets the tempo
    last_reading: Option<u16>,
    external: bool,
    jitter: JitterBuffer,
}

impl ClockArbiter {
    pub fn new(button: LongPress) -> Self {
        Self {
            button,
            phase: false,
            half_period_ms: DEFAULT_HALF_PERIOD_MS,
            last_reading: None,
            external: false,
            jitter: JitterBuffer::new(),
        }
    }

    /// Reset to power-on state with the cable level read at boot.
    pub fn boot(&mut self, cable_present: bool, now: Ticks) {
        self.phase = false;
        self.half_period_ms = DEFAULT_HALF_PERIOD_MS;
        self.last_reading = None;
        self.external = cable_present;
        self.jitter.clear(now);
        self.button.release();
    }

    pub fn source(&self) -> ClockSource {
        if self.external {
            ClockSource::External
        } else {
            ClockSource::Internal
        }
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    /// The clock cable was plugged in or pulled out.
    ///
    /// Returns true when the selected source changed. The step position is
    /// left alone; the internal generator restarts from its low phase so
    /// its next tick is a rising edge.
    pub fn set_external(&mut self, present: bool) -> bool {
        if self.external == present {
            return false;
        }
        self.external = present;
        self.phase = false;
        log::info!(target: "clock", "clock source: {:?}", self.source());
        true
    }

    /// New sample from the tempo knob ADC (10-bit).
    ///
    /// Returns the new half-period when the reading changed.
    pub fn knob_changed(&mut self, sample: u16) -> Option<u32> {
        let reading = knob_reading(sample);
        if self.last_reading == Some(reading) {
            return None;
        }
        self.last_reading = Some(reading);
        self.half_period_ms = half_period_ms(reading);
        log::debug!(target: "clock", "tempo knob {} -> {} ms", reading, self.half_period_ms);
        Some(self.half_period_ms)
    }

    /// The internal tempo timer fired.
    ///
    /// Returns the phase to advance the sequencer with, or `None` while the
    /// external clock is in charge.
    pub fn internal_tick(&mut self) -> Option<bool> {
        if self.external {
            return None;
        }
        self.phase = !self.phase;
        Some(self.phase)
    }

    /// An edge arrived on the external clock input at time `at`.
    ///
    /// Rising edges are tracked for jitter regardless of the selected
    /// source. Returns the phase to advance with when the external clock
    /// is selected.
    ///
    /// An edge stamped before the last tracked edge (or before boot, for
    /// edges still queued across a reboot) is ignored entirely.
    pub fn external_edge(&mut self, high: bool, at: Ticks) -> Option<bool> {
        if at.signed_diff(self.jitter.last_edge()) < 0 {
            log::debug!(target: "clock", "stale clock edge at {} ignored", at.0);
            return None;
        }
        if high {
            self.jitter.record(at);
        }
        self.external.then_some(high)
    }

    pub fn half_period_ms(&self) -> u32 {
        self.half_period_ms
    }

    pub fn jitter(&self) -> &JitterBuffer {
        &self.jitter
    }

    pub fn button(&self) -> &LongPress {
        &self.button
    }

    pub fn button_mut(&mut self) -> &mut LongPress {
        &mut self.button
    }
}

impl Default for ClockArbiter {
    fn default() -> Self {
        Self::new(LongPress::new())
    }
}
