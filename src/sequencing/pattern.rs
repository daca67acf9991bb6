#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Steps per row.
pub const NUM_STEPS: usize = 16;

/// Rows (one per trigger output).
pub const NUM_ROWS: usize = 8;

/// The 8 x 16 grid of active steps.
///
/// Indices outside the grid are ignored by every operation; the grid
/// controller is trusted to send in-range keys but a bad one must never
/// trap.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    rows: [[bool; NUM_STEPS]; NUM_ROWS],
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is the step at (row, step) active? Out of range reads as false.
    pub fn get(&self, row: usize, step: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(step))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, row: usize, step: usize, active: bool) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(step)) {
            *cell = active;
        }
    }

    /// Flip a step. Returns false (and does nothing) when out of range.
    pub fn toggle(&mut self, row: usize, step: usize) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(step)) {
            Some(cell) => {
                *cell = !*cell;
                true
            }
            None => false,
        }
    }

    pub fn active_count(&self) -> usize {
        self.rows.iter().flatten().filter(|&&on| on).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores() {
        let mut pattern = Pattern::new();
        for row in 0..NUM_ROWS {
            for step in 0..NUM_STEPS {
                let before = pattern.get(row, step);
                pattern.toggle(row, step);
                assert_ne!(pattern.get(row, step), before);
                pattern.toggle(row, step);
                assert_eq!(pattern.get(row, step), before);
            }
        }
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut pattern = Pattern::new();
        assert!(!pattern.toggle(NUM_ROWS, 0));
        assert!(!pattern.toggle(0, NUM_STEPS));
        assert!(!pattern.toggle(usize::MAX, usize::MAX));
        pattern.set(NUM_ROWS, 3, true);
        assert!(!pattern.get(NUM_ROWS, 0));
        assert!(!pattern.get(0, NUM_STEPS));
        assert_eq!(pattern, Pattern::new());
    }

    #[test]
    fn test_active_count() {
        let mut pattern = Pattern::new();
        pattern.set(0, 4, true);
        pattern.set(7, 4, true);
        pattern.set(3, 5, true);
        pattern.set(3, 5, true);
        assert_eq!(pattern.active_count(), 3);
        pattern.toggle(7, 4);
        assert_eq!(pattern.active_count(), 2);
    }
}
