use crate::{clock::Ticks, io::GridKey};

/// Everything that can happen to the firmware.
///
/// Interrupt handlers and timer callbacks produce these; the main loop
/// consumes them one at a time. Events are plain values, copied into the
/// queue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    /// Front button edge
    Button { pressed: bool },
    /// Button released before the short-press limit
    ShortPress,
    /// Button released after the short-press limit
    LongPress,
    /// Long-press poll timer tick
    ButtonPoll,
    /// Tempo knob poll timer tick
    KnobPoll,
    /// Clock input jack switch changed
    ClockCable { present: bool },
    /// Edge on the external clock input, stamped in the interrupt
    ExternalClock { high: bool, at: Ticks },
    /// Serial transport for the grid enumerated
    TransportConnect,
    TransportDisconnect,
    /// Grid controller identified itself on the transport
    GridConnect,
    GridDisconnect,
    /// Transport has key data waiting
    GridPoll,
    /// Grid needs redrawing
    GridRefresh,
    GridKey(GridKey),
}

impl Event {
    /// Events that must never be dropped in favour of anything else.
    pub fn is_clock_critical(&self) -> bool {
        matches!(self, Event::ExternalClock { .. } | Event::ClockCable { .. })
    }
}
