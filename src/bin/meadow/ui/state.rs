//! State sent from the firmware thread to the UI
//!
//! Everything here is `Copy` so the firmware side never allocates while
//! publishing.

use meadow_seq::{clock::JitterSummary, sequencing::LedFrame};

/// One update pushed through the UI ring buffer.
#[derive(Clone, Copy, Debug)]
pub enum UiUpdate {
    /// Output pins changed (bit n = trigger n)
    Gates { triggers: u8, clock: bool },
    /// The firmware committed a new LED frame
    Leds(LedFrame),
    /// Periodic snapshot of the firmware's clock state
    Status(FirmwareStatus),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FirmwareStatus {
    pub half_period_ms: u32,
    pub external: bool,
    pub step: Option<usize>,
    pub jitter: Option<JitterSummary>,
    pub dropped_events: u32,
    /// Poll ticks the front button has been held, while it is down
    pub button_held: Option<u16>,
}

/// What the UI currently shows.
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub triggers: u8,
    pub clock: bool,
    pub leds: Option<LedFrame>,
    pub status: FirmwareStatus,
}

impl UiState {
    pub fn apply(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::Gates { triggers, clock } => {
                self.triggers = triggers;
                self.clock = clock;
            }
            UiUpdate::Leds(frame) => self.leds = Some(frame),
            UiUpdate::Status(status) => self.status = status,
        }
    }
}

/// Panel controls owned by the UI thread, shown next to firmware state.
#[derive(Clone, Copy, Debug)]
pub struct PanelView {
    pub knob: u16,
    pub cable: bool,
    pub ext_bpm: f64,
    pub grid_connected: bool,
}
