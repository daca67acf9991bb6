pub mod clock; // Clock source arbitration, tempo, jitter tracking, front button
pub mod engine; // Soft-timer scheduler
pub mod events; // Interrupt-to-main-loop event path
pub mod firmware;
pub mod io;
pub mod sequencing; // Pattern, playhead, trigger gates, grid display

pub use clock::Ticks;
pub use events::{Event, EventSender};
pub use firmware::{Config, ConfigError, Firmware};
pub use sequencing::{Pattern, SequencerState, NUM_ROWS, NUM_STEPS};
