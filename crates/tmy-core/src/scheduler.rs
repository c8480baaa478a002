//! Timer abstraction
//!
//! Every suspension point in the engine is a scheduled [`Task`]. The host
//! runs the timers and hands fired tasks back to
//! `ContentSession::run_task`; cancelled handles must never fire.

/// Work the engine asks to run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Debounced re-evaluation
    Evaluate,
    /// One tick of an enforcement retry loop
    RetryTick { token: u64 },
    /// One startup poll
    StartupPoll,
}

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub u64);

pub trait Scheduler {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> f64;

    fn schedule(&mut self, delay_ms: u32, task: Task) -> TaskHandle;

    fn cancel(&mut self, handle: TaskHandle);
}
