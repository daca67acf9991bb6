// Purpose: getting work from interrupts and timers to the main loop

pub mod dispatch;
pub mod event;
pub mod queue;

pub(crate) use dispatch::Context;
pub use event::Event;
pub use queue::{EventQueue, EventSender};
