//! Terminal front panel
//!
//! The UI thread stands in for the board's interrupt handlers: key presses
//! become button edges, jack switch changes and grid traffic, and a timer
//! in the UI loop produces the external clock. Every event goes through the
//! firmware's `EventSender`, followed by an unpark to end its sleep.

mod grid;
pub mod state;
mod transport;

use std::{
    sync::Arc,
    thread::Thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use meadow_seq::{io::GridKey, Event, EventSender, NUM_ROWS, NUM_STEPS};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use crate::hardware::Panel;

use grid::render_grid;
use state::{PanelView, UiState, UiUpdate};
use transport::render_transport;

const FRAME: Duration = Duration::from_millis(16);
const KNOB_STEP: i32 = 16;
const BPM_STEP: f64 = 5.0;
const MIN_EXT_BPM: f64 = 20.0;
const MAX_EXT_BPM: f64 = 300.0;

/// Square wave on the simulated clock input.
struct ExternalClock {
    bpm: f64,
    high: bool,
    next_edge: Instant,
}

impl ExternalClock {
    fn new(bpm: f64) -> Self {
        Self {
            bpm: bpm.clamp(MIN_EXT_BPM, MAX_EXT_BPM),
            high: false,
            next_edge: Instant::now(),
        }
    }

    /// Four pulses per beat, 50% duty.
    fn half_period(&self) -> Duration {
        Duration::from_secs_f64(7.5 / self.bpm)
    }

    fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm.clamp(MIN_EXT_BPM, MAX_EXT_BPM);
    }

    /// Start again from a low level, first rising edge one half period out.
    fn restart(&mut self, now: Instant) {
        self.high = false;
        self.next_edge = now + self.half_period();
    }

    /// The level to drive if an edge is due at `now`.
    fn poll(&mut self, now: Instant) -> Option<bool> {
        if now < self.next_edge {
            return None;
        }
        self.high = !self.high;
        self.next_edge += self.half_period();
        if self.next_edge < now {
            // the UI stalled; skip the missed edges rather than bursting
            self.next_edge = now + self.half_period();
        }
        Some(self.high)
    }

    fn time_until_edge(&self, now: Instant) -> Duration {
        self.next_edge.saturating_duration_since(now)
    }
}

/// UI application state
pub struct UiApp {
    panel: Arc<Panel>,
    irq: EventSender,
    firmware: Thread,
    state_rx: Consumer<UiUpdate>,
    keys_tx: Producer<GridKey>,
    current_state: UiState,
    ext_clock: ExternalClock,
    cursor: (usize, usize),
    button_down: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        panel: Arc<Panel>,
        irq: EventSender,
        firmware: Thread,
        state_rx: Consumer<UiUpdate>,
        keys_tx: Producer<GridKey>,
        ext_bpm: f64,
    ) -> Self {
        Self {
            panel,
            irq,
            firmware,
            state_rx,
            keys_tx,
            current_state: UiState::default(),
            ext_clock: ExternalClock::new(ext_bpm),
            cursor: (0, 0),
            button_down: false,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.ext_clock.restart(Instant::now());
        self.set_grid_connected(true);

        while !self.should_quit {
            self.poll_state();
            self.drive_external_clock();

            terminal.draw(|frame| self.render(frame))?;

            let mut timeout = FRAME;
            if self.panel.cable() {
                timeout = timeout.min(self.ext_clock.time_until_edge(Instant::now()));
            }
            if event::poll(timeout)? {
                if let TermEvent::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Post from "interrupt context" and wake the firmware.
    fn interrupt(&mut self, event: Event) {
        if !self.irq.post(event) {
            log::debug!(target: "events", "queue full, {event:?} rejected");
        }
        self.firmware.unpark();
    }

    fn poll_state(&mut self) {
        while let Ok(update) = self.state_rx.pop() {
            self.current_state.apply(update);
        }
    }

    fn drive_external_clock(&mut self) {
        if !self.panel.cable() {
            return;
        }
        if let Some(high) = self.ext_clock.poll(Instant::now()) {
            let at = self.panel.now();
            self.interrupt(Event::ExternalClock { high, at });
        }
    }

    fn set_grid_connected(&mut self, connected: bool) {
        self.panel.set_grid(connected);
        if connected {
            self.interrupt(Event::TransportConnect);
            self.interrupt(Event::GridConnect);
        } else {
            self.interrupt(Event::GridDisconnect);
            self.interrupt(Event::TransportDisconnect);
        }
    }

    /// A full press and release of the grid key under the cursor.
    fn press_cursor(&mut self) {
        if !self.panel.grid() {
            return;
        }
        let (x, y) = self.cursor;
        for pressed in [true, false] {
            let key = GridKey {
                x: x as u8,
                y: y as u8,
                pressed,
            };
            if self.keys_tx.push(key).is_err() {
                log::debug!(target: "grid", "key buffer full");
            }
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor.0 = (self.cursor.0 + NUM_STEPS - 1) % NUM_STEPS;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.cursor.0 = (self.cursor.0 + 1) % NUM_STEPS;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor.1 = (self.cursor.1 + NUM_ROWS - 1) % NUM_ROWS;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor.1 = (self.cursor.1 + 1) % NUM_ROWS;
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.press_cursor(),
            KeyCode::Char('b') | KeyCode::Char('B') => {
                // terminals rarely report key releases, so the button latches
                self.button_down = !self.button_down;
                self.interrupt(Event::Button {
                    pressed: self.button_down,
                });
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                let present = !self.panel.cable();
                self.panel.set_cable(present);
                self.ext_clock.restart(Instant::now());
                self.interrupt(Event::ClockCable { present });
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                self.set_grid_connected(!self.panel.grid());
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.panel.turn_knob(KNOB_STEP);
            }
            KeyCode::Char('-') => {
                self.panel.turn_knob(-KNOB_STEP);
            }
            KeyCode::Char(']') => self.ext_clock.set_bpm(self.ext_clock.bpm + BPM_STEP),
            KeyCode::Char('[') => self.ext_clock.set_bpm(self.ext_clock.bpm - BPM_STEP),
            _ => {}
        }
    }

    fn panel_view(&self) -> PanelView {
        PanelView {
            knob: self.panel.knob(),
            cable: self.panel.cable(),
            ext_bpm: self.ext_clock.bpm,
            grid_connected: self.panel.grid(),
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                    // Transport bar
                Constraint::Length(NUM_ROWS as u16 + 2),  // Grid
                Constraint::Min(0),
                Constraint::Length(1),                    // Help bar
            ])
            .split(area);

        let view = self.panel_view();
        render_transport(frame, chunks[0], &self.current_state, &view);

        let title = if view.cable { " Grid (clock cable in) " } else { " Grid " };
        let grid_block = Block::default().title(title).borders(Borders::ALL);
        let grid_inner = grid_block.inner(chunks[1]);
        frame.render_widget(grid_block, chunks[1]);
        render_grid(
            frame,
            grid_inner,
            &self.current_state,
            self.cursor,
            view.grid_connected,
        );

        let help = Paragraph::new(concat!(
            " [Q] Quit  [Arrows] Move  [Space] Toggle  [B] Button  [C] Cable",
            "  [G] Grid  [+/-] Knob  [[/]] Ext BPM",
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_clock_alternates_levels() {
        let mut clock = ExternalClock::new(120.0);
        let start = Instant::now();
        clock.restart(start);
        let half = clock.half_period();

        assert_eq!(clock.poll(start), None);
        assert_eq!(clock.poll(start + half), Some(true));
        assert_eq!(clock.poll(start + half * 2), Some(false));
        assert_eq!(clock.poll(start + half * 3), Some(true));
    }

    #[test]
    fn test_external_clock_skips_after_stall() {
        let mut clock = ExternalClock::new(120.0);
        let start = Instant::now();
        clock.restart(start);
        let half = clock.half_period();

        let late = start + half * 10;
        assert_eq!(clock.poll(late), Some(true));
        // one edge per poll, next one a full half period out
        assert_eq!(clock.poll(late), None);
        assert_eq!(clock.time_until_edge(late), half);
    }

    #[test]
    fn test_external_clock_bpm_is_clamped() {
        let mut clock = ExternalClock::new(1000.0);
        assert_eq!(clock.bpm, MAX_EXT_BPM);
        clock.set_bpm(1.0);
        assert_eq!(clock.bpm, MIN_EXT_BPM);
    }
}
