//! Navigation/Mutation Watcher
//!
//! Funnels three independent change sources into one debounced
//! re-evaluation: the host's navigation-finished event, document
//! mutations, and a bounded startup poll. Requests are coalesced, never
//! queued: while an evaluation is pending, further requests only record
//! their source.

use crate::config::EngineConfig;
use crate::scheduler::{Scheduler, Task, TaskHandle};

bitflags::bitflags! {
    /// Sources that contributed to a pending evaluation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WatchSources: u8 {
        /// Client-side navigation finished
        const NAVIGATION = 1 << 0;
        /// Subtree mutation somewhere in the document
        const MUTATION = 1 << 1;
        /// Startup poll tick
        const STARTUP_POLL = 1 << 2;
    }
}

pub struct Watcher {
    debounce_ms: u32,
    startup_poll_interval_ms: u32,
    startup_poll_attempts: u32,

    pending: Option<TaskHandle>,
    pending_sources: WatchSources,

    startup_attempts: u32,
    startup_handle: Option<TaskHandle>,
}

impl Watcher {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            debounce_ms: config.debounce_ms,
            startup_poll_interval_ms: config.startup_poll_interval_ms,
            startup_poll_attempts: config.startup_poll_attempts,
            pending: None,
            pending_sources: WatchSources::empty(),
            startup_attempts: 0,
            startup_handle: None,
        }
    }

    /// Ask for a re-evaluation. Returns true when this request armed the
    /// debounce timer, false when it joined one already pending.
    pub fn request<S: Scheduler>(&mut self, scheduler: &mut S, source: WatchSources) -> bool {
        self.pending_sources |= source;
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(scheduler.schedule(self.debounce_ms, Task::Evaluate));
        true
    }

    /// Called when the debounce timer fires. `None` if nothing was pending.
    pub fn take_pending(&mut self) -> Option<WatchSources> {
        self.pending.take()?;
        let sources = self.pending_sources;
        self.pending_sources = WatchSources::empty();
        Some(sources)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    // =========================================================================
    // Startup poll
    // =========================================================================

    pub fn start_startup_poll<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.startup_handle.take() {
            scheduler.cancel(handle);
        }
        self.startup_attempts = 0;
        self.startup_handle = Some(scheduler.schedule(self.startup_poll_interval_ms, Task::StartupPoll));
    }

    /// One startup poll tick: request an evaluation, then re-arm until the
    /// attempt cap is reached.
    pub fn on_startup_poll<S: Scheduler>(&mut self, scheduler: &mut S) {
        if self.startup_handle.take().is_none() {
            return;
        }
        self.request(scheduler, WatchSources::STARTUP_POLL);
        self.startup_attempts += 1;
        if self.startup_attempts < self.startup_poll_attempts {
            self.startup_handle = Some(scheduler.schedule(self.startup_poll_interval_ms, Task::StartupPoll));
        } else {
            log::debug!("startup poll finished after {} attempts", self.startup_attempts);
        }
    }

    pub fn startup_attempts(&self) -> u32 {
        self.startup_attempts
    }

    pub fn is_polling(&self) -> bool {
        self.startup_handle.is_some()
    }

    /// Cancel every timer this watcher owns.
    pub fn stop<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
        if let Some(handle) = self.startup_handle.take() {
            scheduler.cancel(handle);
        }
        self.pending_sources = WatchSources::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeScheduler;

    #[test]
    fn test_requests_coalesce() {
        let mut scheduler = FakeScheduler::default();
        let mut watcher = Watcher::new(&EngineConfig::default());

        assert!(watcher.request(&mut scheduler, WatchSources::MUTATION));
        assert!(!watcher.request(&mut scheduler, WatchSources::MUTATION));
        assert!(!watcher.request(&mut scheduler, WatchSources::NAVIGATION));
        assert_eq!(scheduler.pending(), vec![Task::Evaluate]);

        assert_eq!(scheduler.pop_due(150.0), Some(Task::Evaluate));
        assert_eq!(
            watcher.take_pending(),
            Some(WatchSources::MUTATION | WatchSources::NAVIGATION)
        );
        assert!(!watcher.is_pending());
    }

    #[test]
    fn test_window_does_not_slide() {
        let mut scheduler = FakeScheduler::default();
        let mut watcher = Watcher::new(&EngineConfig::default());

        watcher.request(&mut scheduler, WatchSources::MUTATION);
        scheduler.now = 100.0;
        watcher.request(&mut scheduler, WatchSources::MUTATION);
        assert_eq!(scheduler.pop_due(150.0), Some(Task::Evaluate));
    }

    #[test]
    fn test_new_window_after_fire() {
        let mut scheduler = FakeScheduler::default();
        let mut watcher = Watcher::new(&EngineConfig::default());

        watcher.request(&mut scheduler, WatchSources::MUTATION);
        scheduler.pop_due(150.0);
        watcher.take_pending();
        assert!(watcher.request(&mut scheduler, WatchSources::MUTATION));
    }

    #[test]
    fn test_take_pending_without_request() {
        let mut watcher = Watcher::new(&EngineConfig::default());
        assert_eq!(watcher.take_pending(), None);
    }

    #[test]
    fn test_startup_poll_is_bounded() {
        let mut scheduler = FakeScheduler::default();
        let mut watcher = Watcher::new(&EngineConfig::default());
        watcher.start_startup_poll(&mut scheduler);

        let mut polls = 0;
        while let Some(task) = scheduler.pop_due(f64::MAX) {
            match task {
                Task::StartupPoll => {
                    polls += 1;
                    watcher.on_startup_poll(&mut scheduler);
                }
                Task::Evaluate => {
                    watcher.take_pending();
                }
                Task::RetryTick { .. } => unreachable!(),
            }
        }

        assert_eq!(polls, 20);
        assert_eq!(watcher.startup_attempts(), 20);
        assert!(!watcher.is_polling());
    }

    #[test]
    fn test_stop_cancels_timers() {
        let mut scheduler = FakeScheduler::default();
        let mut watcher = Watcher::new(&EngineConfig::default());
        watcher.start_startup_poll(&mut scheduler);
        watcher.request(&mut scheduler, WatchSources::MUTATION);
        watcher.stop(&mut scheduler);
        assert!(scheduler.pending().is_empty());
        assert!(!watcher.is_polling());
    }
}
