//! Sequencer - turns clock phases into trigger gates
//!
//! A rising clock edge moves the playhead and raises the trigger of every
//! row active at the new step. The falling edge drops everything. Gates
//! are therefore exactly as wide as the high half of the clock: a 50%
//! duty gate, not a fixed-length pulse.

use super::{pattern::NUM_ROWS, state::SequencerState};
use crate::io::GateOutputs;

impl SequencerState {
    /// Apply one clock phase.
    pub fn advance(&mut self, outputs: &mut impl GateOutputs, phase: bool) {
        if phase {
            let step = self.tick();
            outputs.set_clock_out(true);
            for row in 0..NUM_ROWS {
                outputs.set_trigger(row, self.pattern().get(row, step));
            }
        } else {
            outputs.set_clock_out(false);
            for row in 0..NUM_ROWS {
                outputs.set_trigger(row, false);
            }
        }
    }

    /// Stop the playhead. The next rising edge plays step 0.
    pub fn reset(&mut self) {
        self.stop();
    }

    /// Flip one step of the pattern. Out-of-range indices change nothing
    /// but still mark the display dirty.
    pub fn toggle_step(&mut self, row: usize, step: usize) {
        self.pattern_mut().toggle(row, step);
    }

    /// A key on the grid: x is the step, y the row. Key-ups are ignored.
    pub fn grid_press(&mut self, x: usize, y: usize, pressed: bool) {
        if !pressed {
            return;
        }
        self.toggle_step(y, x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{io::mock::MockHardware, sequencing::NUM_STEPS};

    #[test]
    fn test_cycle_length_is_sixteen() {
        let mut state = SequencerState::new();
        let mut hw = MockHardware::new();
        state.advance(&mut hw, true);
        let first = state.current_step();
        assert_eq!(first, Some(0));
        for _ in 0..NUM_STEPS {
            state.advance(&mut hw, true);
        }
        assert_eq!(state.current_step(), first);
    }

    #[test]
    fn test_rising_edge_follows_pattern() {
        let mut state = SequencerState::new();
        let mut hw = MockHardware::new();
        state.toggle_step(2, 0);
        state.toggle_step(5, 0);
        state.toggle_step(5, 1);

        state.advance(&mut hw, true);
        assert!(hw.clock_out);
        assert_eq!(
            hw.triggers,
            [false, false, true, false, false, true, false, false]
        );

        state.advance(&mut hw, false);
        state.advance(&mut hw, true);
        assert_eq!(state.current_step(), Some(1));
        assert_eq!(
            hw.triggers,
            [false, false, false, false, false, true, false, false]
        );
    }

    #[test]
    fn test_falling_edge_clears_everything() {
        let mut state = SequencerState::new();
        let mut hw = MockHardware::new();
        hw.triggers = [true; NUM_ROWS];
        hw.clock_out = true;
        state.advance(&mut hw, false);
        assert!(!hw.any_output_high());

        // and again from a played step
        for row in 0..NUM_ROWS {
            state.toggle_step(row, 0);
        }
        state.advance(&mut hw, true);
        assert!(hw.triggers.iter().all(|&t| t));
        state.advance(&mut hw, false);
        assert!(!hw.any_output_high());
    }

    #[test]
    fn test_falling_edge_does_not_move_playhead() {
        let mut state = SequencerState::new();
        let mut hw = MockHardware::new();
        state.advance(&mut hw, true);
        state.advance(&mut hw, false);
        state.advance(&mut hw, false);
        assert_eq!(state.current_step(), Some(0));
    }

    #[test]
    fn test_reset_keeps_pattern() {
        let mut state = SequencerState::new();
        let mut hw = MockHardware::new();
        state.toggle_step(1, 1);
        state.advance(&mut hw, true);
        state.advance(&mut hw, true);
        state.reset();
        assert!(state.is_stopped());
        assert!(state.is_dirty());
        assert!(state.pattern().get(1, 1));
        state.advance(&mut hw, true);
        assert_eq!(state.current_step(), Some(0));
    }

    #[test]
    fn test_grid_press_ignores_key_up() {
        let mut state = SequencerState::new();
        state.grid_press(3, 2, false);
        assert!(!state.pattern().get(2, 3));
        state.grid_press(3, 2, true);
        assert!(state.pattern().get(2, 3));
        // out of range from a bigger controller
        state.grid_press(NUM_STEPS, 2, true);
        state.grid_press(3, NUM_ROWS + 4, true);
        assert_eq!(state.pattern().active_count(), 1);
    }
}
