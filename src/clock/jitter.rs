//! Clock tracking buffer.
//!
//! Keeps the last eight intervals between external clock rising edges so
//! timing problems with the incoming clock can be inspected on a short
//! press of the front button.

use std::fmt;

use super::ticks::Ticks;

/// Number of intervals kept.
pub const JITTER_SLOTS: usize = 8;

/// Fixed-capacity ring of inter-edge intervals (in ticks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JitterBuffer {
    slots: [Option<u32>; JITTER_SLOTS],
    /// Slot holding the most recent interval (or the next slot to fill)
    index: usize,
    /// Number of filled slots
    count: usize,
    last_edge: Ticks,
}

/// Aggregate view of the recorded intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterSummary {
    pub min: u32,
    pub max: u32,
    pub mean: u32,
    pub samples: usize,
}

impl JitterSummary {
    /// Difference between the slowest and fastest interval.
    pub fn spread(&self) -> u32 {
        self.max - self.min
    }
}

impl JitterBuffer {
    pub fn new() -> Self {
        Self {
            slots: [None; JITTER_SLOTS],
            index: 0,
            count: 0,
            last_edge: Ticks::ZERO,
        }
    }

    /// Forget all intervals. The next edge is measured from `now`.
    pub fn clear(&mut self, now: Ticks) {
        self.slots = [None; JITTER_SLOTS];
        self.index = 0;
        self.count = 0;
        self.last_edge = now;
    }

    /// Record a rising edge seen at `now`.
    ///
    /// Returns true when the counter overflowed since the previous edge.
    pub fn record(&mut self, now: Ticks) -> bool {
        // Only move on if the current slot is in use, so the first edge
        // after a clear lands in slot 0.
        if self.slots[self.index].is_some() {
            self.index = (self.index + 1) % JITTER_SLOTS;
        }

        let wrapped = now.wrapped_since(self.last_edge);
        if self.slots[self.index].is_none() {
            self.count += 1;
        }
        self.slots[self.index] = Some(now.wrapping_since(self.last_edge));
        self.last_edge = now;

        if wrapped {
            log::debug!(target: "clock", "tick counter overflow: {}", self);
        }
        wrapped
    }

    pub fn slots(&self) -> &[Option<u32>; JITTER_SLOTS] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn last_edge(&self) -> Ticks {
        self.last_edge
    }

    /// Recorded intervals, oldest first.
    pub fn intervals(&self) -> impl Iterator<Item = u32> + '_ {
        let start = if self.count < JITTER_SLOTS {
            0
        } else {
            (self.index + 1) % JITTER_SLOTS
        };
        (0..JITTER_SLOTS).filter_map(move |i| self.slots[(start + i) % JITTER_SLOTS])
    }

    pub fn summary(&self) -> Option<JitterSummary> {
        if self.is_empty() {
            return None;
        }
        let mut min = u32::MAX;
        let mut max = 0;
        let mut total = 0u64;
        for interval in self.intervals() {
            min = min.min(interval);
            max = max.max(interval);
            total += u64::from(interval);
        }
        Some(JitterSummary {
            min,
            max,
            mean: (total / self.count as u64) as u32,
            samples: self.count,
        })
    }
}

impl Default for JitterBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot order, `X` for empty slots: `120, 121, X, X, X, X, X, X`
impl fmt::Display for JitterBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Some(v) => write!(f, "{v}")?,
                None => f.write_str("X")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(buffer: &mut JitterBuffer, times: &[u32]) {
        for &t in times {
            buffer.record(Ticks(t));
        }
    }

    #[test]
    fn test_first_edge_fills_slot_zero() {
        let mut buffer = JitterBuffer::new();
        buffer.clear(Ticks(1000));
        buffer.record(Ticks(1120));
        assert_eq!(buffer.slots()[0], Some(120));
        assert!(buffer.slots()[1..].iter().all(Option::is_none));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_partial_fill_leaves_empty_slots() {
        let mut buffer = JitterBuffer::new();
        edges(&mut buffer, &[100, 200, 310]);
        assert_eq!(buffer.slots()[..3], [Some(100), Some(100), Some(110)]);
        assert!(buffer.slots()[3..].iter().all(Option::is_none));
        assert_eq!(buffer.to_string(), "100, 100, 110, X, X, X, X, X");
    }

    #[test]
    fn test_keeps_eight_most_recent() {
        let mut buffer = JitterBuffer::new();
        // intervals 1..=10
        let mut t = 0;
        let mut times = Vec::new();
        for interval in 1..=10 {
            t += interval;
            times.push(t);
        }
        edges(&mut buffer, &times);

        assert_eq!(buffer.len(), JITTER_SLOTS);
        let kept: Vec<u32> = buffer.intervals().collect();
        assert_eq!(kept, vec![3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(buffer.intervals().last(), Some(10));
        // oldest values were overwritten in place
        assert_eq!(buffer.slots()[0], Some(9));
        assert_eq!(buffer.slots()[1], Some(10));
    }

    #[test]
    fn test_overflow_uses_wrapping_interval() {
        let mut buffer = JitterBuffer::new();
        buffer.clear(Ticks(u32::MAX - 49));
        let wrapped = buffer.record(Ticks(50));
        assert!(wrapped);
        assert_eq!(buffer.intervals().last(), Some(100));
    }

    #[test]
    fn test_summary() {
        let mut buffer = JitterBuffer::new();
        assert!(buffer.summary().is_none());
        edges(&mut buffer, &[100, 198, 300, 400]);
        let summary = buffer.summary().unwrap();
        assert_eq!(summary.min, 98);
        assert_eq!(summary.max, 102);
        assert_eq!(summary.mean, 100);
        assert_eq!(summary.spread(), 4);
        assert_eq!(summary.samples, 4);
    }
}
