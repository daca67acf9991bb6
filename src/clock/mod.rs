// Purpose: clock source selection, tempo, timing diagnostics, front button

pub mod arbiter;
pub mod button;
pub mod jitter;
pub mod tempo;
pub mod ticks;

pub use arbiter::{ClockArbiter, ClockSource};
pub use button::{LongPress, Press};
pub use jitter::{JitterBuffer, JitterSummary};
pub use ticks::Ticks;
