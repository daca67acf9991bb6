//! Grid display - a read-only projection of the sequencer state
//!
//! Each cell picks the first matching rule:
//!
//! ```text
//!   active step under the playhead   -> PLAYING_LEVEL   (brightest)
//!   active step elsewhere            -> ACTIVE_LEVEL
//!   playhead column                  -> PLAYHEAD_LEVEL
//!   everything else                  -> 4x4 checkerboard
//! ```

use super::{
    pattern::{NUM_ROWS, NUM_STEPS},
    state::SequencerState,
};
use crate::io::GridDevice;

pub const PLAYING_LEVEL: u8 = 15;
pub const ACTIVE_LEVEL: u8 = 10;
pub const PLAYHEAD_LEVEL: u8 = 6;
pub const CHECKER_LEVEL: u8 = 2;
pub const BACKGROUND_LEVEL: u8 = 0;

/// LED levels (0..=15) for the whole grid, indexed `[row][step]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedFrame {
    pub levels: [[u8; NUM_STEPS]; NUM_ROWS],
}

impl LedFrame {
    pub fn level(&self, row: usize, step: usize) -> u8 {
        self.levels
            .get(row)
            .and_then(|r| r.get(step))
            .copied()
            .unwrap_or(BACKGROUND_LEVEL)
    }
}

impl Default for LedFrame {
    fn default() -> Self {
        Self {
            levels: [[BACKGROUND_LEVEL; NUM_STEPS]; NUM_ROWS],
        }
    }
}

fn checker_level(row: usize, step: usize) -> u8 {
    if (row / 4 + step / 4) % 2 == 0 {
        CHECKER_LEVEL
    } else {
        BACKGROUND_LEVEL
    }
}

/// Compute the LED frame for a state.
pub fn render(state: &SequencerState) -> LedFrame {
    let playhead = state.current_step();
    let mut frame = LedFrame::default();
    for (row, levels) in frame.levels.iter_mut().enumerate() {
        for (step, level) in levels.iter_mut().enumerate() {
            let active = state.pattern().get(row, step);
            let under_playhead = playhead == Some(step);
            *level = match (active, under_playhead) {
                (true, true) => PLAYING_LEVEL,
                (true, false) => ACTIVE_LEVEL,
                (false, true) => PLAYHEAD_LEVEL,
                (false, false) => checker_level(row, step),
            };
        }
    }
    frame
}

impl SequencerState {
    /// Draw the state onto the grid and mark the display clean.
    pub fn refresh(&mut self, grid: &mut impl GridDevice) -> LedFrame {
        let frame = render(self);
        for (row, levels) in frame.levels.iter().enumerate() {
            for (step, &level) in levels.iter().enumerate() {
                grid.set_cell(step, row, level);
            }
        }
        grid.commit();
        self.mark_clean();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mock::MockHardware;

    #[test]
    fn test_checkerboard_when_stopped_and_empty() {
        let state = SequencerState::new();
        let frame = render(&state);
        assert_eq!(frame.level(0, 0), CHECKER_LEVEL);
        assert_eq!(frame.level(0, 4), BACKGROUND_LEVEL);
        assert_eq!(frame.level(4, 0), BACKGROUND_LEVEL);
        assert_eq!(frame.level(4, 4), CHECKER_LEVEL);
        assert_eq!(frame.level(7, 15), CHECKER_LEVEL);
        assert_eq!(frame.level(3, 12), BACKGROUND_LEVEL);
        assert_eq!(frame.level(0, 8), CHECKER_LEVEL);
    }

    #[test]
    fn test_priority_order() {
        let mut state = SequencerState::new();
        let mut hw = MockHardware::new();
        state.toggle_step(0, 0);
        state.toggle_step(1, 5);
        state.advance(&mut hw, true); // playhead on step 0

        let frame = render(&state);
        assert_eq!(frame.level(0, 0), PLAYING_LEVEL);
        assert_eq!(frame.level(1, 5), ACTIVE_LEVEL);
        assert_eq!(frame.level(1, 0), PLAYHEAD_LEVEL);
        assert_eq!(frame.level(2, 1), CHECKER_LEVEL);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut state = SequencerState::new();
        let mut hw = MockHardware::new();
        state.toggle_step(6, 9);
        state.advance(&mut hw, true);
        let before = (state.current_step(), *state.pattern());

        let first = state.refresh(&mut hw);
        assert!(!state.is_dirty());
        let leds_after_first = hw.leds;

        state.mark_dirty();
        let second = state.refresh(&mut hw);
        assert!(!state.is_dirty());

        assert_eq!(first, second);
        assert_eq!(hw.leds, leds_after_first);
        assert_eq!(hw.leds, first.levels);
        assert_eq!((state.current_step(), *state.pattern()), before);
        assert_eq!(hw.commits, 2);
    }
}
