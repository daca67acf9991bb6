//! The simulated board
//!
//! `Panel` holds the inputs the terminal can change while the firmware runs
//! (jack switch, knob, millisecond counter). `SimHardware` is what the
//! firmware thread owns: it forwards outputs to the UI and the click
//! synth, and keeps the grid's key reports until the firmware polls them.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU16, Ordering},
        Arc,
    },
    time::Instant,
};

use meadow_seq::{
    io::{GateOutputs, GridDevice, GridKey, PanelInputs, PatternStore, System, TimeSource},
    sequencing::LedFrame,
    Pattern, Ticks, NUM_ROWS, NUM_STEPS,
};
use rtrb::{Consumer, Producer};

use crate::{store::PatternFile, ui::state::UiUpdate};

pub const KNOB_MAX: u16 = 0x3FF;

/// Inputs shared between the terminal and the firmware thread.
pub struct Panel {
    epoch: Instant,
    cable: AtomicBool,
    knob: AtomicU16,
    grid: AtomicBool,
    quit: AtomicBool,
}

impl Panel {
    pub fn new(knob: u16, cable: bool) -> Self {
        Self {
            epoch: Instant::now(),
            cable: AtomicBool::new(cable),
            knob: AtomicU16::new(knob.min(KNOB_MAX)),
            grid: AtomicBool::new(false),
            quit: AtomicBool::new(false),
        }
    }

    pub fn now(&self) -> Ticks {
        // truncation is the wrap
        Ticks(self.epoch.elapsed().as_millis() as u32)
    }

    pub fn cable(&self) -> bool {
        self.cable.load(Ordering::Acquire)
    }

    pub fn set_cable(&self, present: bool) {
        self.cable.store(present, Ordering::Release);
    }

    pub fn knob(&self) -> u16 {
        self.knob.load(Ordering::Relaxed)
    }

    /// Turn the knob by `delta` raw units, clamped to the ADC range.
    pub fn turn_knob(&self, delta: i32) -> u16 {
        let value = (i32::from(self.knob()) + delta).clamp(0, i32::from(KNOB_MAX)) as u16;
        self.knob.store(value, Ordering::Relaxed);
        value
    }

    /// Whether the grid is plugged into the transport.
    pub fn grid(&self) -> bool {
        self.grid.load(Ordering::Acquire)
    }

    pub fn set_grid(&self, plugged: bool) {
        self.grid.store(plugged, Ordering::Release);
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Release);
    }

    pub fn should_quit(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }
}

pub struct SimHardware {
    panel: Arc<Panel>,
    ui_tx: Producer<UiUpdate>,
    keys_rx: Consumer<GridKey>,
    clicks_tx: Option<Producer<usize>>,
    store: PatternFile,
    triggers: u8,
    clock: bool,
    leds: LedFrame,
    transport_ready: bool,
    reset_requested: bool,
}

impl SimHardware {
    pub fn new(
        panel: Arc<Panel>,
        ui_tx: Producer<UiUpdate>,
        keys_rx: Consumer<GridKey>,
        clicks_tx: Option<Producer<usize>>,
        store: PatternFile,
    ) -> Self {
        Self {
            panel,
            ui_tx,
            keys_rx,
            clicks_tx,
            store,
            triggers: 0,
            clock: false,
            leds: LedFrame::default(),
            transport_ready: false,
            reset_requested: false,
        }
    }

    /// Send an update to the UI. A full ring drops it; the next one
    /// carries the same state.
    pub fn publish(&mut self, update: UiUpdate) {
        let _ = self.ui_tx.push(update);
    }

    /// True once after the firmware asked for a soft reset.
    pub fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }

    /// Drop every output, as when the board powers down.
    pub fn silence(&mut self) {
        for row in 0..NUM_ROWS {
            self.set_trigger(row, false);
        }
        self.set_clock_out(false);
    }

    fn publish_gates(&mut self) {
        self.publish(UiUpdate::Gates {
            triggers: self.triggers,
            clock: self.clock,
        });
    }
}

impl GateOutputs for SimHardware {
    fn set_trigger(&mut self, row: usize, high: bool) {
        if row >= NUM_ROWS {
            return;
        }
        let bit = 1u8 << row;
        let was_high = self.triggers & bit != 0;
        if was_high == high {
            return;
        }
        if high {
            self.triggers |= bit;
            if let Some(clicks) = self.clicks_tx.as_mut() {
                let _ = clicks.push(row);
            }
        } else {
            self.triggers &= !bit;
        }
        self.publish_gates();
    }

    fn set_clock_out(&mut self, high: bool) {
        if self.clock != high {
            self.clock = high;
            self.publish_gates();
        }
    }
}

impl PanelInputs for SimHardware {
    fn clock_cable_present(&self) -> bool {
        self.panel.cable()
    }

    fn read_tempo_knob(&mut self) -> u16 {
        self.panel.knob()
    }
}

impl TimeSource for SimHardware {
    fn now(&self) -> Ticks {
        self.panel.now()
    }
}

impl GridDevice for SimHardware {
    fn setup_transport(&mut self) {
        log::debug!(target: "grid", "transport configured");
        self.transport_ready = true;
    }

    fn request_read(&mut self) -> bool {
        self.transport_ready && self.panel.grid() && !self.keys_rx.is_empty()
    }

    fn read_keys(&mut self, sink: &mut dyn FnMut(GridKey)) {
        while let Ok(key) = self.keys_rx.pop() {
            sink(key);
        }
    }

    fn set_cell(&mut self, x: usize, y: usize, level: u8) {
        if x < NUM_STEPS && y < NUM_ROWS {
            self.leds.levels[y][x] = level;
        }
    }

    fn commit(&mut self) {
        let frame = self.leds;
        self.publish(UiUpdate::Leds(frame));
    }
}

impl PatternStore for SimHardware {
    fn load_pattern(&mut self) -> Option<Pattern> {
        match self.store.load() {
            Ok(pattern) => pattern,
            Err(err) => {
                let path = self.store.path().display();
                log::warn!(target: "firmware", "can't read {path}: {err}");
                None
            }
        }
    }

    fn save_pattern(&mut self, pattern: &Pattern) {
        let path = self.store.path().display();
        match self.store.save(pattern) {
            Ok(()) => log::info!(target: "firmware", "pattern saved to {path}"),
            Err(err) => log::error!(target: "firmware", "can't write {path}: {err}"),
        }
    }
}

impl System for SimHardware {
    fn soft_reset(&mut self) {
        self.reset_requested = true;
    }
}
