//! Firmware - boot sequence and main loop
//!
//! ```ignore
//! let (mut firmware, mut irq) = Firmware::new(board, Config::default())?;
//! // hand `irq` to the interrupt handlers, then:
//! loop {
//!     let deadline = firmware.step();
//!     board.sleep_until(deadline); // wakes early on any interrupt
//! }
//! ```

mod config;

pub use config::{Config, ConfigError};

use crate::{
    clock::{ClockArbiter, LongPress, Ticks},
    engine::{Scheduler, TimerHandles, TimerKind},
    events::{Context, Event, EventQueue, EventSender},
    io::{GateOutputs, Hardware, PanelInputs, PatternStore, TimeSource},
    sequencing::{SequencerState, NUM_ROWS},
};

pub struct Firmware<H: Hardware> {
    scheduler: Scheduler<TimerKind>,
    ctx: Context<H>,
}

impl<H: Hardware> Firmware<H> {
    /// Boot the firmware on `hw`. Returns the sender interrupt handlers
    /// post through.
    pub fn new(hw: H, config: Config) -> Result<(Self, EventSender), ConfigError> {
        config.validate()?;
        let (queue, sender) = EventQueue::new(config.queue_capacity, config.queue_reserve);
        let button =
            LongPress::with_thresholds(config.short_press_limit, config.long_hold_threshold);
        let now = hw.now();

        let mut firmware = Self {
            scheduler: Scheduler::starting_at(now),
            ctx: Context {
                hw,
                state: SequencerState::new(),
                arbiter: ClockArbiter::new(button),
                queue,
                timers: TimerHandles::default(),
                config,
            },
        };
        firmware.boot();
        Ok((firmware, sender))
    }

    fn boot(&mut self) {
        let ctx = &mut self.ctx;
        let now = ctx.hw.now();

        for row in 0..NUM_ROWS {
            ctx.hw.set_trigger(row, false);
        }
        ctx.hw.set_clock_out(false);

        ctx.arbiter.boot(ctx.hw.clock_cable_present(), now);

        ctx.state = SequencerState::new();
        match ctx.hw.load_pattern() {
            Some(pattern) => {
                log::info!(
                    target: "firmware",
                    "restored pattern ({} steps on)",
                    pattern.active_count()
                );
                ctx.state.load_pattern(pattern);
            }
            None => log::info!(target: "firmware", "no stored pattern"),
        }

        self.scheduler.clear(now);
        ctx.timers = TimerHandles {
            tempo: Some(
                self.scheduler
                    .add(ctx.config.initial_half_period_ms, TimerKind::TempoClock),
            ),
            button: Some(self.scheduler.add(ctx.config.button_poll_ms, TimerKind::ButtonPoll)),
            knob: Some(self.scheduler.add(ctx.config.knob_poll_ms, TimerKind::KnobPoll)),
            grid_poll: None,
            grid_refresh: None,
        };

        log::info!(
            target: "firmware",
            "booted, clock source {:?}",
            ctx.arbiter.source()
        );
    }

    /// Start over as if power-cycled, keeping the hardware and any events
    /// the interrupt handlers already queued.
    pub fn reboot(&mut self) {
        log::info!(target: "firmware", "rebooting");
        self.ctx.queue.clear_local();
        self.boot();
    }

    /// One scheduling pass. Returns the next timer deadline.
    pub fn run_timers(&mut self) -> Option<Ticks> {
        let now = self.ctx.hw.now();
        let ctx = &mut self.ctx;
        self.scheduler.process(now, |kind| ctx.on_timer(kind))
    }

    /// Handle the oldest pending event, if any.
    pub fn dispatch_next(&mut self) -> Option<Event> {
        let event = self.ctx.queue.next()?;
        self.ctx.dispatch(event, &mut self.scheduler);
        Some(event)
    }

    /// One main-loop iteration: run due timers, then handle one event.
    ///
    /// Returns the deadline to sleep until, including any timer the
    /// handled event added. The sleep must end early when an interrupt
    /// posts an event.
    pub fn step(&mut self) -> Option<Ticks> {
        self.run_timers();
        self.dispatch_next();
        self.scheduler.next_deadline()
    }

    /// Handle events until the queue is empty. Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while self.dispatch_next().is_some() {
            handled += 1;
        }
        handled
    }

    pub fn state(&self) -> &SequencerState {
        &self.ctx.state
    }

    pub fn arbiter(&self) -> &ClockArbiter {
        &self.ctx.arbiter
    }

    pub fn hardware(&self) -> &H {
        &self.ctx.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.ctx.hw
    }

    pub fn scheduler(&self) -> &Scheduler<TimerKind> {
        &self.scheduler
    }

    pub fn timers(&self) -> &TimerHandles {
        &self.ctx.timers
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    /// Whether events are waiting; the main loop must not sleep if so.
    pub fn has_pending_events(&self) -> bool {
        !self.ctx.queue.is_empty()
    }

    /// Events rejected by a full queue since boot.
    pub fn dropped_events(&self) -> u32 {
        self.ctx.queue.dropped()
    }

    /// Post an event from main-loop context.
    pub fn post(&mut self, event: Event) -> bool {
        self.ctx.queue.post(event)
    }
}
