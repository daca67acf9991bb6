use super::pattern::{Pattern, NUM_STEPS};

/// Everything the sequencer knows: the pattern, the playhead, and whether
/// the grid display is out of date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerState {
    /// `None` while stopped (after a reset), otherwise a step in 0..16
    current_step: Option<usize>,
    dirty: bool,
    pattern: Pattern,
}

impl SequencerState {
    pub fn new() -> Self {
        Self {
            current_step: None,
            dirty: true,
            pattern: Pattern::new(),
        }
    }

    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    pub fn is_stopped(&self) -> bool {
        self.current_step.is_none()
    }

    /// Move the playhead one step. A stopped playhead starts at step 0.
    pub(crate) fn tick(&mut self) -> usize {
        let next = match self.current_step {
            None => 0,
            Some(step) => (step + 1) % NUM_STEPS,
        };
        self.current_step = Some(next);
        self.dirty = true;
        next
    }

    pub(crate) fn stop(&mut self) {
        self.current_step = None;
        self.dirty = true;
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Replace the whole pattern (restore from storage).
    pub fn load_pattern(&mut self, pattern: Pattern) {
        self.pattern = pattern;
        self.dirty = true;
    }

    pub(crate) fn pattern_mut(&mut self) -> &mut Pattern {
        self.dirty = true;
        &mut self.pattern
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Only the display refresh calls this.
    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Default for SequencerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SequencerState::new();
        assert!(state.is_stopped());
        assert!(state.is_dirty());
        assert_eq!(state.pattern().active_count(), 0);
    }

    #[test]
    fn test_tick_wraps_at_sixteen() {
        let mut state = SequencerState::new();
        assert_eq!(state.tick(), 0);
        for expected in 1..NUM_STEPS {
            assert_eq!(state.tick(), expected);
        }
        assert_eq!(state.tick(), 0);
    }
}
