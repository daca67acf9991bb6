// Purpose - the hardware the core talks to, as traits
//
// Each platform (the board, the terminal simulator, the test double)
// implements these. None of them carry state machines of their own; all
// timing decisions live in the core.

pub mod mock;

use crate::{clock::Ticks, sequencing::Pattern};

/// Trigger and clock output pins.
pub trait GateOutputs {
    /// Drive trigger output `row` (0..8). Out-of-range rows are ignored.
    fn set_trigger(&mut self, row: usize, high: bool);
    fn set_clock_out(&mut self, high: bool);
}

/// Panel inputs polled from the main loop.
pub trait PanelInputs {
    /// Level of the clock-normal jack switch: true when a cable is plugged.
    fn clock_cable_present(&self) -> bool;
    /// Raw 10-bit sample of the tempo knob.
    fn read_tempo_knob(&mut self) -> u16;
}

/// Free-running millisecond counter. Wraps at `u32::MAX`.
pub trait TimeSource {
    fn now(&self) -> Ticks;
}

/// A key report from the grid controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridKey {
    pub x: u8,
    pub y: u8,
    pub pressed: bool,
}

/// The grid controller and the serial transport it hangs off.
pub trait GridDevice {
    /// Configure the serial transport after it enumerates.
    fn setup_transport(&mut self);
    /// Start a non-blocking read. Returns true when data is waiting.
    fn request_read(&mut self) -> bool;
    /// Drain pending key reports.
    fn read_keys(&mut self, sink: &mut dyn FnMut(GridKey));
    fn set_cell(&mut self, x: usize, y: usize, level: u8);
    /// Push the LED buffer to the device.
    fn commit(&mut self);
}

/// Non-volatile pattern storage.
pub trait PatternStore {
    /// `None` when nothing was ever written (or it can't be read).
    fn load_pattern(&mut self) -> Option<Pattern>;
    fn save_pattern(&mut self, pattern: &Pattern);
}

/// Whole-device control.
pub trait System {
    fn soft_reset(&mut self);
}

/// Everything the firmware needs from its platform.
pub trait Hardware:
    GateOutputs + PanelInputs + TimeSource + GridDevice + PatternStore + System
{
}

impl<T> Hardware for T where
    T: GateOutputs + PanelInputs + TimeSource + GridDevice + PatternStore + System
{
}
