mod dispatch;
mod scheduler;

pub use dispatch::bench_dispatch;
pub use scheduler::bench_scheduler;
