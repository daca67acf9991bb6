/*
Event Queue
===========

Two lock-free single-producer/single-consumer rings (rtrb) feed the
main loop:

  interrupt lane   written by interrupt handlers through `EventSender`
  local lane       written by the main loop itself (timer callbacks,
                   handlers posting follow-up events)

Every event is stamped with a sequence number on entry, and `next`
always hands out the older of the two lane heads, so the consumer sees
one FIFO even though the producers never share a ring.

Overflow policy: reject the newest event. The last `reserve` slots of
each lane are kept for clock-critical events (external clock edges,
clock cable changes); anything else is turned away once the free space
drops to the reserve. Drops are counted on the producer side and
logged by the consumer; nothing logs from interrupt context.
*/

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};

use super::event::Event;

/// Slots per lane unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 32;

/// Slots per lane held back for clock-critical events.
pub const DEFAULT_RESERVE: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Stamped {
    seq: u32,
    event: Event,
}

#[derive(Debug, Default)]
struct Shared {
    seq: AtomicU32,
    dropped: AtomicU32,
}

fn push(tx: &mut Producer<Stamped>, shared: &Shared, reserve: usize, event: Event) -> bool {
    if !event.is_clock_critical() && tx.slots() <= reserve {
        shared.dropped.fetch_add(1, Ordering::Relaxed);
        return false;
    }
    let seq = shared.seq.fetch_add(1, Ordering::Relaxed);
    if tx.push(Stamped { seq, event }).is_err() {
        shared.dropped.fetch_add(1, Ordering::Relaxed);
        return false;
    }
    true
}

/// Interrupt-side handle. Move it into whatever plays the interrupt role.
pub struct EventSender {
    tx: Producer<Stamped>,
    shared: Arc<Shared>,
    reserve: usize,
}

impl EventSender {
    /// Returns false when the event was dropped.
    pub fn post(&mut self, event: Event) -> bool {
        push(&mut self.tx, &self.shared, self.reserve, event)
    }
}

/// Main-loop side: owns both consumers and the local producer.
pub struct EventQueue {
    interrupts: Consumer<Stamped>,
    local_tx: Producer<Stamped>,
    local_rx: Consumer<Stamped>,
    shared: Arc<Shared>,
    reserve: usize,
    reported_drops: u32,
}

impl EventQueue {
    /// Create a queue with `capacity` slots per lane.
    pub fn new(capacity: usize, reserve: usize) -> (Self, EventSender) {
        let shared = Arc::new(Shared::default());
        let (irq_tx, irq_rx) = RingBuffer::new(capacity);
        let (local_tx, local_rx) = RingBuffer::new(capacity);
        let queue = Self {
            interrupts: irq_rx,
            local_tx,
            local_rx,
            shared: Arc::clone(&shared),
            reserve,
            reported_drops: 0,
        };
        let sender = EventSender {
            tx: irq_tx,
            shared,
            reserve,
        };
        (queue, sender)
    }

    /// Post from the main loop.
    pub fn post(&mut self, event: Event) -> bool {
        push(&mut self.local_tx, &self.shared, self.reserve, event)
    }

    /// Remove and return the oldest pending event.
    pub fn next(&mut self) -> Option<Event> {
        self.report_drops();

        let take_local = match (self.interrupts.peek(), self.local_rx.peek()) {
            (Ok(irq), Ok(local)) => local.seq.wrapping_sub(irq.seq) as i32 <= 0,
            (Ok(_), Err(_)) => false,
            (Err(_), Ok(_)) => true,
            (Err(_), Err(_)) => return None,
        };
        let lane = if take_local {
            &mut self.local_rx
        } else {
            &mut self.interrupts
        };
        lane.pop().ok().map(|stamped| stamped.event)
    }

    pub fn len(&self) -> usize {
        self.interrupts.slots() + self.local_rx.slots()
    }

    pub fn is_empty(&self) -> bool {
        self.interrupts.is_empty() && self.local_rx.is_empty()
    }

    /// Total events rejected since creation.
    pub fn dropped(&self) -> u32 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Throw away events the main loop posted to itself.
    pub fn clear_local(&mut self) {
        while self.local_rx.pop().is_ok() {}
    }

    fn report_drops(&mut self) {
        let dropped = self.dropped();
        if dropped != self.reported_drops {
            log::warn!(
                target: "events",
                "event queue full: {} event(s) dropped",
                dropped.wrapping_sub(self.reported_drops)
            );
            self.reported_drops = dropped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Ticks;

    fn edge(t: u32) -> Event {
        Event::ExternalClock {
            high: true,
            at: Ticks(t),
        }
    }

    #[test]
    fn test_fifo_within_a_lane() {
        let (mut queue, _sender) = EventQueue::new(8, 2);
        queue.post(Event::KnobPoll);
        queue.post(Event::ButtonPoll);
        queue.post(Event::GridRefresh);
        assert_eq!(queue.next(), Some(Event::KnobPoll));
        assert_eq!(queue.next(), Some(Event::ButtonPoll));
        assert_eq!(queue.next(), Some(Event::GridRefresh));
        assert_eq!(queue.next(), None);
    }

    #[test]
    fn test_fifo_across_lanes() {
        let (mut queue, mut sender) = EventQueue::new(8, 2);
        sender.post(Event::Button { pressed: true });
        queue.post(Event::ButtonPoll);
        sender.post(edge(5));
        queue.post(Event::KnobPoll);

        assert_eq!(queue.len(), 4);
        assert_eq!(queue.next(), Some(Event::Button { pressed: true }));
        assert_eq!(queue.next(), Some(Event::ButtonPoll));
        assert_eq!(queue.next(), Some(edge(5)));
        assert_eq!(queue.next(), Some(Event::KnobPoll));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overflow_keeps_room_for_clock_edges() {
        let (mut queue, mut sender) = EventQueue::new(8, 2);
        let mut accepted = 0;
        for _ in 0..20 {
            if sender.post(Event::Button { pressed: true }) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 6);
        assert!(sender.post(edge(1)));
        assert!(sender.post(edge(2)));
        // completely full now, even clock edges bounce
        assert!(!sender.post(edge(3)));
        assert_eq!(queue.dropped(), 15);

        // the oldest events survive, the newest were rejected
        let drained: Vec<Event> = std::iter::from_fn(|| queue.next()).collect();
        assert_eq!(drained.len(), 8);
        assert_eq!(drained[6], edge(1));
        assert_eq!(drained[7], edge(2));
    }

    #[test]
    fn test_clear_local_keeps_interrupt_events() {
        let (mut queue, mut sender) = EventQueue::new(8, 2);
        queue.post(Event::ShortPress);
        sender.post(Event::GridConnect);
        queue.clear_local();
        assert_eq!(queue.next(), Some(Event::GridConnect));
        assert_eq!(queue.next(), None);
    }
}
