/*
Soft-Timer Scheduler
====================

A cooperative list of periodic timers, run from the main loop (never
from an interrupt). Each pass:

  1. read the clock once
  2. walk the timers in registration order; every timer whose deadline
     has been reached fires and is rescheduled to `now + period`
  3. report the earliest remaining deadline so the caller can sleep
     until just before it

Rescheduling from `now` rather than from the old deadline means a late
pass doesn't produce a burst of catch-up firings; the timer simply runs
late once.

Timers carry a callback tag `T` instead of a function pointer. The
caller matches on the tag, so every timer is handled by construction.
*/

use crate::clock::Ticks;

/// Identifies a timer for `remove` and `set_period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u32);

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    handle: TimerHandle,
    period: u32,
    deadline: Ticks,
    callback: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    timers: Vec<TimerEntry<T>>,
    next_handle: u32,
    /// Time of the last pass; new timers are scheduled from here
    now: Ticks,
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self::starting_at(Ticks::ZERO)
    }

    pub fn starting_at(now: Ticks) -> Self {
        Self {
            timers: Vec::new(),
            next_handle: 0,
            now,
        }
    }

    /// Add a timer firing every `period` ticks, first at `now + period`.
    pub fn add(&mut self, period: u32, callback: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.timers.push(TimerEntry {
            handle,
            period,
            deadline: self.now.offset(period),
            callback,
        });
        handle
    }

    /// Returns false when the timer was not registered.
    pub fn remove(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Change a timer's period. The pending deadline is kept; the new
    /// period applies from the next reschedule.
    pub fn set_period(&mut self, handle: TimerHandle, period: u32) -> bool {
        match self.timers.iter_mut().find(|t| t.handle == handle) {
            Some(timer) => {
                timer.period = period;
                true
            }
            None => false,
        }
    }

    pub fn period(&self, handle: TimerHandle) -> Option<u32> {
        self.timers.iter().find(|t| t.handle == handle).map(|t| t.period)
    }

    pub fn deadline(&self, handle: TimerHandle) -> Option<Ticks> {
        self.timers.iter().find(|t| t.handle == handle).map(|t| t.deadline)
    }

    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drop every timer (used on reboot).
    pub fn clear(&mut self, now: Ticks) {
        self.timers.clear();
        self.now = now;
    }

    /// Run one scheduling pass at `now`, calling `fire` for each due timer.
    ///
    /// Returns the earliest deadline left, or `None` with no timers.
    pub fn process(&mut self, now: Ticks, mut fire: impl FnMut(T)) -> Option<Ticks> {
        self.now = now;
        for timer in &mut self.timers {
            if timer.deadline.is_reached(now) {
                fire(timer.callback);
                timer.deadline = now.offset(timer.period);
            }
        }
        self.next_deadline()
    }

    pub fn next_deadline(&self) -> Option<Ticks> {
        self.timers
            .iter()
            .map(|t| t.deadline)
            .min_by_key(|deadline| deadline.signed_diff(self.now))
    }
}

impl<T: Copy> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        A,
        B,
    }

    /// Run a pass every millisecond up to and including `until`.
    fn run_until(scheduler: &mut Scheduler<Tag>, from: u32, until: u32) -> Vec<(u32, Tag)> {
        let mut fired = Vec::new();
        for t in from..=until {
            scheduler.process(Ticks(t), |tag| fired.push((t, tag)));
        }
        fired
    }

    #[test]
    fn test_fire_counts() {
        let mut scheduler = Scheduler::new();
        scheduler.add(10, Tag::A);
        scheduler.add(25, Tag::B);

        let fired = run_until(&mut scheduler, 0, 50);
        let a = fired.iter().filter(|(_, tag)| *tag == Tag::A).count();
        let b = fired.iter().filter(|(_, tag)| *tag == Tag::B).count();
        assert_eq!(a, 5);
        assert_eq!(b, 2);

        // at t=50 both fire, in registration order
        let at_50: Vec<Tag> = fired.iter().filter(|(t, _)| *t == 50).map(|(_, tag)| *tag).collect();
        assert_eq!(at_50, vec![Tag::A, Tag::B]);
    }

    #[test]
    fn test_next_deadline() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.next_deadline(), None);
        scheduler.add(10, Tag::A);
        scheduler.add(25, Tag::B);
        assert_eq!(scheduler.process(Ticks(0), |_| {}), Some(Ticks(10)));
        assert_eq!(scheduler.process(Ticks(10), |_| {}), Some(Ticks(20)));
        assert_eq!(scheduler.process(Ticks(20), |_| {}), Some(Ticks(25)));
    }

    #[test]
    fn test_late_pass_reschedules_from_now() {
        let mut scheduler = Scheduler::new();
        scheduler.add(10, Tag::A);
        let mut count = 0;
        scheduler.process(Ticks(35), |_| count += 1);
        assert_eq!(count, 1);
        assert_eq!(scheduler.next_deadline(), Some(Ticks(45)));
    }

    #[test]
    fn test_set_period_applies_on_next_reschedule() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.add(100, Tag::A);
        scheduler.set_period(handle, 10);
        // the pending deadline is untouched
        assert_eq!(scheduler.deadline(handle), Some(Ticks(100)));
        let fired = run_until(&mut scheduler, 1, 130);
        let times: Vec<u32> = fired.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![100, 110, 120, 130]);
    }

    #[test]
    fn test_remove() {
        let mut scheduler = Scheduler::new();
        let a = scheduler.add(10, Tag::A);
        let b = scheduler.add(10, Tag::B);
        assert!(scheduler.remove(a));
        assert!(!scheduler.remove(a));
        assert!(!scheduler.contains(a));
        assert!(scheduler.contains(b));
        let fired = run_until(&mut scheduler, 0, 20);
        assert!(fired.iter().all(|(_, tag)| *tag == Tag::B));
        assert!(!scheduler.set_period(a, 5));
    }

    #[test]
    fn test_deadlines_across_counter_wrap() {
        let start = u32::MAX - 15;
        let mut scheduler = Scheduler::starting_at(Ticks(start));
        scheduler.add(10, Tag::A);
        scheduler.add(25, Tag::B);

        let mut fired = Vec::new();
        let mut t = Ticks(start);
        for _ in 0..50 {
            t = t.offset(1);
            scheduler.process(t, |tag| fired.push(tag));
        }
        assert_eq!(fired.iter().filter(|&&tag| tag == Tag::A).count(), 5);
        assert_eq!(fired.iter().filter(|&&tag| tag == Tag::B).count(), 2);
        // the earliest deadline is picked by distance, not raw value
        let next = scheduler.next_deadline().unwrap();
        assert!(next.signed_diff(t) > 0);
    }
}
