//! Meadow - simulator builder and runner

use std::{
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use meadow_seq::{io::GridKey, Config, Event, Firmware};
use rtrb::RingBuffer;

use crate::{
    audio,
    hardware::{Panel, SimHardware},
    store::PatternFile,
    ui::{
        state::{FirmwareStatus, UiUpdate},
        UiApp,
    },
};

/// Longest the firmware thread sleeps with nothing scheduled
const IDLE_WAIT_MS: u32 = 50;
/// Minimum spacing of status snapshots sent to the UI
const STATUS_INTERVAL: Duration = Duration::from_millis(40);

/// Main simulator builder
pub struct Meadow {
    config: Config,
    pattern_path: PathBuf,
    ext_bpm: f64,
    knob: u16,
    cable: bool,
    audio: bool,
}

impl Meadow {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pattern_path: PathBuf::from("meadow-pattern.json"),
            ext_bpm: 120.0,
            knob: 0x200,
            cable: false,
            audio: true,
        }
    }

    /// Where the pattern is saved on a long press
    pub fn pattern_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pattern_path = path.into();
        self
    }

    /// Tempo of the simulated external clock, in quarter notes per minute
    /// at four pulses per beat
    pub fn ext_bpm(mut self, bpm: f64) -> Self {
        self.ext_bpm = bpm;
        self
    }

    /// Initial raw knob position (0..=1023)
    pub fn knob(mut self, knob: u16) -> Self {
        self.knob = knob;
        self
    }

    /// Boot with a cable in the clock input
    pub fn cable(mut self, present: bool) -> Self {
        self.cable = present;
        self
    }

    pub fn audio(mut self, enabled: bool) -> Self {
        self.audio = enabled;
        self
    }

    /// Boot the firmware on its own thread and run the terminal UI until
    /// the user quits.
    pub fn run(self) -> EyreResult<()> {
        let panel = Arc::new(Panel::new(self.knob, self.cable));
        let (ui_tx, ui_rx) = RingBuffer::<UiUpdate>::new(1024);
        let (keys_tx, keys_rx) = RingBuffer::<GridKey>::new(64);

        let (clicks, clicks_tx) = if self.audio {
            match audio::start() {
                Ok((clicks, tx)) => (Some(clicks), Some(tx)),
                Err(err) => {
                    log::warn!(target: "audio", "running silent: {err:#}");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        let hw = SimHardware::new(
            panel.clone(),
            ui_tx,
            keys_rx,
            clicks_tx,
            PatternFile::new(self.pattern_path),
        );
        let (firmware, irq) = Firmware::new(hw, self.config).wrap_err("invalid firmware config")?;

        let firmware_panel = panel.clone();
        let firmware_thread = thread::Builder::new()
            .name("firmware".into())
            .spawn(move || run_firmware(firmware, firmware_panel))
            .wrap_err("failed to spawn firmware thread")?;

        let mut app = UiApp::new(
            panel.clone(),
            irq,
            firmware_thread.thread().clone(),
            ui_rx,
            keys_tx,
            self.ext_bpm,
        );

        let mut terminal = ratatui::init();
        let result = app.run(&mut terminal);
        ratatui::restore();

        panel.request_quit();
        firmware_thread.thread().unpark();
        firmware_thread
            .join()
            .map_err(|_| eyre!("firmware thread panicked"))?;
        drop(clicks);

        result
    }
}

/// The firmware's main loop: run, then sleep until the next deadline or
/// until an interrupt unparks the thread.
fn run_firmware(mut firmware: Firmware<SimHardware>, panel: Arc<Panel>) {
    let mut last_status: Option<(Instant, FirmwareStatus)> = None;
    log::info!(target: "firmware", "running with {:?}", firmware.config());

    while !panel.should_quit() {
        let deadline = firmware.step();

        if firmware.hardware_mut().take_reset_request() {
            firmware.reboot();
            if panel.grid() {
                // the grid enumerates again after a reset
                firmware.post(Event::TransportConnect);
                firmware.post(Event::GridConnect);
            }
            continue;
        }

        publish_status(&mut firmware, &mut last_status);

        if firmware.has_pending_events() {
            continue;
        }
        let wait = deadline.map_or(IDLE_WAIT_MS, |deadline| {
            deadline.signed_diff(panel.now()).clamp(0, IDLE_WAIT_MS as i32) as u32
        });
        if wait > 0 {
            thread::park_timeout(Duration::from_millis(u64::from(wait)));
        }
    }

    firmware.hardware_mut().silence();
    log::info!(target: "firmware", "stopped");
}

fn publish_status(
    firmware: &mut Firmware<SimHardware>,
    last: &mut Option<(Instant, FirmwareStatus)>,
) {
    let status = FirmwareStatus {
        half_period_ms: firmware.arbiter().half_period_ms(),
        external: firmware.arbiter().is_external(),
        step: firmware.state().current_step(),
        jitter: firmware.arbiter().jitter().summary(),
        dropped_events: firmware.dropped_events(),
        button_held: firmware
            .arbiter()
            .button()
            .is_held()
            .then(|| firmware.arbiter().button().held_ticks()),
    };

    let due = match last {
        Some((at, previous)) => *previous != status && at.elapsed() >= STATUS_INTERVAL,
        None => true,
    };
    if due {
        firmware.hardware_mut().publish(UiUpdate::Status(status));
        *last = Some((Instant::now(), status));
    }
}
