//! In-memory hardware that records what the core did to it.
//!
//! Used by the unit tests, the integration tests and the benches.

use std::collections::VecDeque;

use super::{GateOutputs, GridDevice, GridKey, PanelInputs, PatternStore, System, TimeSource};
use crate::{
    clock::Ticks,
    sequencing::{Pattern, NUM_ROWS, NUM_STEPS},
};

#[derive(Debug, Clone, Default)]
pub struct MockHardware {
    pub triggers: [bool; NUM_ROWS],
    pub clock_out: bool,
    /// Rising edges seen per trigger output
    pub trigger_pulses: [usize; NUM_ROWS],
    pub clock_pulses: usize,

    pub cable_present: bool,
    pub knob: u16,
    pub now: Ticks,

    pub leds: [[u8; NUM_STEPS]; NUM_ROWS],
    pub commits: usize,
    pub transport_setups: usize,
    pub read_requests: usize,
    pub pending_keys: VecDeque<GridKey>,

    pub stored: Option<Pattern>,
    pub saves: usize,
    pub resets: usize,
}

impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stored(pattern: Pattern) -> Self {
        Self {
            stored: Some(pattern),
            ..Self::default()
        }
    }

    pub fn advance_time(&mut self, ms: u32) {
        self.now = self.now.offset(ms);
    }

    /// Queue a key report for the next read.
    pub fn push_key(&mut self, x: u8, y: u8, pressed: bool) {
        self.pending_keys.push_back(GridKey { x, y, pressed });
    }

    pub fn any_output_high(&self) -> bool {
        self.clock_out || self.triggers.iter().any(|&t| t)
    }
}

impl GateOutputs for MockHardware {
    fn set_trigger(&mut self, row: usize, high: bool) {
        if let Some(out) = self.triggers.get_mut(row) {
            if high && !*out {
                self.trigger_pulses[row] += 1;
            }
            *out = high;
        }
    }

    fn set_clock_out(&mut self, high: bool) {
        if high && !self.clock_out {
            self.clock_pulses += 1;
        }
        self.clock_out = high;
    }
}

impl PanelInputs for MockHardware {
    fn clock_cable_present(&self) -> bool {
        self.cable_present
    }

    fn read_tempo_knob(&mut self) -> u16 {
        self.knob
    }
}

impl TimeSource for MockHardware {
    fn now(&self) -> Ticks {
        self.now
    }
}

impl GridDevice for MockHardware {
    fn setup_transport(&mut self) {
        self.transport_setups += 1;
    }

    fn request_read(&mut self) -> bool {
        self.read_requests += 1;
        !self.pending_keys.is_empty()
    }

    fn read_keys(&mut self, sink: &mut dyn FnMut(GridKey)) {
        while let Some(key) = self.pending_keys.pop_front() {
            sink(key);
        }
    }

    fn set_cell(&mut self, x: usize, y: usize, level: u8) {
        if let Some(cell) = self.leds.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = level;
        }
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}

impl PatternStore for MockHardware {
    fn load_pattern(&mut self) -> Option<Pattern> {
        self.stored
    }

    fn save_pattern(&mut self, pattern: &Pattern) {
        self.stored = Some(*pattern);
        self.saves += 1;
    }
}

impl System for MockHardware {
    fn soft_reset(&mut self) {
        self.resets += 1;
    }
}
