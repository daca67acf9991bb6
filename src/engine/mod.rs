pub mod scheduler;
pub mod timers;

pub use self::{
    scheduler::{Scheduler, TimerHandle},
    timers::{TimerHandles, TimerKind},
};
