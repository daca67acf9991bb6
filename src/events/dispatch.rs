//! Event and timer handlers.
//!
//! `Context` is everything a handler may touch. The firmware owns one and
//! passes it (together with the scheduler, when a handler needs to add,
//! remove or retune timers) to every handler. Dispatch is an exhaustive
//! `match`, so an event kind without a handler doesn't compile.

use crate::{
    clock::{ClockArbiter, Press},
    engine::{Scheduler, TimerHandles, TimerKind},
    firmware::Config,
    io::{GridDevice, Hardware, PanelInputs, PatternStore, System},
    sequencing::SequencerState,
};

use super::{event::Event, queue::EventQueue};

pub(crate) struct Context<H> {
    pub(crate) hw: H,
    pub(crate) state: SequencerState,
    pub(crate) arbiter: ClockArbiter,
    pub(crate) queue: EventQueue,
    pub(crate) timers: TimerHandles,
    pub(crate) config: Config,
}

impl<H: Hardware> Context<H> {
    /// A soft timer fired. Runs inside the scheduling pass, so timers
    /// can't be touched here; anything that needs to is posted instead.
    pub(crate) fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::TempoClock => {
                if let Some(phase) = self.arbiter.internal_tick() {
                    self.state.advance(&mut self.hw, phase);
                }
            }
            TimerKind::ButtonPoll => {
                self.queue.post(Event::ButtonPoll);
            }
            TimerKind::KnobPoll => {
                self.queue.post(Event::KnobPoll);
            }
            TimerKind::GridPoll => {
                if self.hw.request_read() {
                    self.queue.post(Event::GridPoll);
                }
            }
            TimerKind::GridRefresh => {
                if self.state.is_dirty() {
                    self.queue.post(Event::GridRefresh);
                }
            }
        }
    }

    pub(crate) fn dispatch(&mut self, event: Event, scheduler: &mut Scheduler<TimerKind>) {
        match event {
            Event::Button { pressed } => self.on_button(pressed),
            Event::ShortPress => self.on_short_press(),
            Event::LongPress => self.on_long_press(),
            Event::ButtonPoll => self.on_button_poll(),
            Event::KnobPoll => self.on_knob_poll(scheduler),
            Event::ClockCable { present } => {
                self.arbiter.set_external(present);
            }
            Event::ExternalClock { high, at } => {
                if let Some(phase) = self.arbiter.external_edge(high, at) {
                    self.state.advance(&mut self.hw, phase);
                }
            }
            Event::TransportConnect => {
                log::info!(target: "grid", "transport connected");
                self.hw.setup_transport();
            }
            Event::TransportDisconnect => {
                log::info!(target: "grid", "transport disconnected");
                TimerHandles::release(&mut self.timers.grid_poll, scheduler);
                TimerHandles::release(&mut self.timers.grid_refresh, scheduler);
            }
            Event::GridConnect => self.on_grid_connect(scheduler),
            Event::GridDisconnect => {}
            Event::GridPoll => self.on_grid_poll(),
            Event::GridRefresh => {
                self.state.refresh(&mut self.hw);
            }
            Event::GridKey(key) => {
                self.state
                    .grid_press(usize::from(key.x), usize::from(key.y), key.pressed);
            }
        }
    }

    fn on_button(&mut self, pressed: bool) {
        let button = self.arbiter.button_mut();
        if pressed {
            button.press();
            return;
        }
        match button.release() {
            Some(Press::Short) => {
                self.queue.post(Event::ShortPress);
            }
            Some(Press::Long) => {
                self.queue.post(Event::LongPress);
            }
            None => {}
        }
    }

    fn on_short_press(&mut self) {
        log::info!(target: "clock", "clock tracking: {}", self.arbiter.jitter());
        self.state.reset();
    }

    fn on_long_press(&mut self) {
        log::info!(target: "firmware", "saving pattern");
        self.hw.save_pattern(self.state.pattern());
    }

    fn on_button_poll(&mut self) {
        if self.arbiter.button_mut().poll() {
            log::warn!(target: "firmware", "button held, resetting");
            self.hw.soft_reset();
        }
    }

    fn on_knob_poll(&mut self, scheduler: &mut Scheduler<TimerKind>) {
        let sample = self.hw.read_tempo_knob();
        if let Some(period) = self.arbiter.knob_changed(sample) {
            if let Some(tempo) = self.timers.tempo {
                scheduler.set_period(tempo, period);
            }
        }
    }

    fn on_grid_connect(&mut self, scheduler: &mut Scheduler<TimerKind>) {
        log::info!(target: "grid", "grid connected");
        TimerHandles::ensure(
            &mut self.timers.grid_poll,
            scheduler,
            self.config.grid_poll_ms,
            TimerKind::GridPoll,
        );
        TimerHandles::ensure(
            &mut self.timers.grid_refresh,
            scheduler,
            self.config.grid_refresh_ms,
            TimerKind::GridRefresh,
        );
        self.state.mark_dirty();
    }

    fn on_grid_poll(&mut self) {
        let queue = &mut self.queue;
        self.hw.read_keys(&mut |key| {
            queue.post(Event::GridKey(key));
        });
    }
}
