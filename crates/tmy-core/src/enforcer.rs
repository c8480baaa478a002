//! Rate Enforcer and Manual Override Detector
//!
//! Imposes a target playback rate on every video element and on any
//! reachable player object, then holds it with a bounded retry loop
//! against the player's own persistence and autoplay resets.
//!
//! # Phases
//!
//! ```text
//! Idle --apply--> Holding --user ratechange--> Overridden
//!                    |
//!                    +--attempt cap--> Settled
//! ```
//!
//! Applying is the synchronous [`Enforcer::apply_playback_rate_once`]
//! step; it always ends in `Holding` because the first retry tick runs
//! inline. `Overridden` and `Settled` hold until [`Enforcer::reset`]
//! (navigation, settings change) or a fresh apply for a new key/element.
//!
//! # Telling our changes from the user's
//!
//! Both go through the same native `ratechange` notification. A change is
//! attributed to us when it lands within the attribution window after our
//! last direct set, or when it already equals the target.

use std::collections::{HashMap, HashSet};

use crate::bridge::BridgeMessage;
use crate::config::EngineConfig;
use crate::page::{ElementKey, MediaEventKind, Page, HAVE_METADATA};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::types::PlaybackRate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementPhase {
    /// No enforcement cycle has run since the last reset
    Idle,
    /// Retry loop is running
    Holding,
    /// The user changed the rate; no further corrections until reset
    Overridden,
    /// Retry loop hit its attempt cap; the last rate set stays in place
    Settled,
}

/// Per-page enforcement bookkeeping. Replaced wholesale on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnforcementContext {
    /// Match key a rate was last imposed for
    pub applied_for_key: Option<String>,
    /// Element the last cycle enforced on
    pub applied_for_video: Option<ElementKey>,
    /// Element the user overrode; corrections stop while it is current
    pub manual_override_for_video: Option<ElementKey>,
}

#[derive(Debug)]
struct RetryLoop {
    token: u64,
    rate: f64,
    attempts: u32,
    handle: Option<TaskHandle>,
}

/// A one-shot media listener waiting to apply a rate.
#[derive(Debug, Clone, Copy)]
struct PendingReady {
    cycle: u64,
    rate: f64,
}

pub struct Enforcer {
    retry_interval_ms: u32,
    max_retry_attempts: u32,
    attribution_window_ms: f64,

    context: EnforcementContext,
    phase: EnforcementPhase,
    target: Option<f64>,

    /// Bumped on every apply and reset; one-shot listeners from older
    /// cycles are ignored
    cycle: u64,
    /// Bumped whenever a retry loop starts or is invalidated
    sync_token: u64,
    retry: Option<RetryLoop>,

    /// Elements with a rate-change listener attached
    wired: HashSet<ElementKey>,
    pending_metadata: HashMap<ElementKey, PendingReady>,
    pending_playing: HashMap<ElementKey, PendingReady>,
    last_programmatic_set_ms: f64,
}

impl Enforcer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            retry_interval_ms: config.retry_interval_ms,
            max_retry_attempts: config.max_retry_attempts,
            attribution_window_ms: config.attribution_window_ms,
            context: EnforcementContext::default(),
            phase: EnforcementPhase::Idle,
            target: None,
            cycle: 0,
            sync_token: 0,
            retry: None,
            wired: HashSet::new(),
            pending_metadata: HashMap::new(),
            pending_playing: HashMap::new(),
            last_programmatic_set_ms: f64::NEG_INFINITY,
        }
    }

    pub fn context(&self) -> &EnforcementContext {
        &self.context
    }

    pub fn phase(&self) -> EnforcementPhase {
        self.phase
    }

    /// Rate the current cycle is enforcing.
    pub fn target(&self) -> Option<f64> {
        self.target
    }

    /// Ticks run so far by the live retry loop.
    pub fn retry_attempts(&self) -> Option<u32> {
        self.retry.as_ref().map(|retry| retry.attempts)
    }

    pub fn mark_applied(&mut self, key: String) {
        self.context.applied_for_key = Some(key);
    }

    pub fn clear_manual_override(&mut self) {
        self.context.manual_override_for_video = None;
    }

    /// Drop all per-page state and cancel any in-flight retry loop.
    pub fn reset<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.stop_retry(scheduler);
        self.sync_token += 1;
        self.cycle += 1;
        self.context = EnforcementContext::default();
        self.target = None;
        self.pending_metadata.clear();
        self.pending_playing.clear();
        self.phase = EnforcementPhase::Idle;
    }

    // =========================================================================
    // Applying
    // =========================================================================

    /// Impose `speed` on every video in the page and start holding it.
    ///
    /// Returns false, with no side effects, when the speed is not a finite
    /// number greater than zero or when the page has no video yet.
    pub fn apply_playback_rate_once<P: Page, S: Scheduler>(
        &mut self,
        page: &mut P,
        scheduler: &mut S,
        speed: &str,
    ) -> bool {
        let Some(rate) = PlaybackRate::parse(speed) else {
            log::debug!("ignoring invalid speed {:?}", speed);
            return false;
        };
        let rate = rate.get();

        let videos = page.videos();
        if videos.is_empty() {
            return false;
        }

        // Forget elements that left the document
        self.wired.retain(|&video| page.is_connected(video));

        self.cycle += 1;
        self.target = Some(rate);
        let pending = PendingReady { cycle: self.cycle, rate };

        for &video in &videos {
            self.register_rate_change_listener(page, video);
            if page.ready_state(video) >= HAVE_METADATA {
                self.set_video_playback_rate(page, scheduler, video, rate);
                continue;
            }
            self.pending_metadata.insert(video, pending);
            page.watch_once(video, MediaEventKind::LoadedMetadata);
            self.pending_playing.insert(video, pending);
            page.watch_once(video, MediaEventKind::Playing);
        }

        self.start_retry_loop(page, scheduler, rate);
        self.context.applied_for_video = videos.first().copied();

        log::debug!("applied rate {} to {} video(s)", rate, videos.len());
        true
    }

    fn register_rate_change_listener<P: Page>(&mut self, page: &mut P, video: ElementKey) {
        if self.wired.insert(video) {
            page.watch_rate_changes(video);
        }
    }

    fn set_video_playback_rate<P: Page, S: Scheduler>(
        &mut self,
        page: &mut P,
        scheduler: &S,
        video: ElementKey,
        rate: f64,
    ) {
        if page.playback_rate(video) == Some(rate) {
            return;
        }
        self.last_programmatic_set_ms = scheduler.now_ms();
        page.set_playback_rate(video, rate);
    }

    // =========================================================================
    // Retry loop
    // =========================================================================

    fn start_retry_loop<P: Page, S: Scheduler>(&mut self, page: &mut P, scheduler: &mut S, rate: f64) {
        self.stop_retry(scheduler);
        self.sync_token += 1;
        self.retry = Some(RetryLoop {
            token: self.sync_token,
            rate,
            attempts: 0,
            handle: None,
        });
        self.phase = EnforcementPhase::Holding;
        self.retry_tick(page, scheduler, self.sync_token);
    }

    fn stop_retry<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(retry) = self.retry.take() {
            if let Some(handle) = retry.handle {
                scheduler.cancel(handle);
            }
        }
    }

    /// One enforcement pass. Ticks from a superseded loop are no-ops.
    pub fn retry_tick<P: Page, S: Scheduler>(&mut self, page: &mut P, scheduler: &mut S, token: u64) {
        let (rate, attempts) = match self.retry.as_mut() {
            Some(retry) if retry.token == token => {
                retry.handle = None;
                retry.attempts += 1;
                (retry.rate, retry.attempts)
            }
            _ => return,
        };

        let video = page.videos().first().copied();
        if video.is_some() && self.context.manual_override_for_video == video {
            self.retry = None;
            self.phase = EnforcementPhase::Overridden;
            log::debug!("retry loop stopped: manual override");
            return;
        }

        page.post_bridge_message(&BridgeMessage::set_playback_rate(rate));

        for api in page.player_apis() {
            if let Err(e) = api.set_playback_rate(rate) {
                log::trace!("player api rejected rate: {}", e);
            }
        }

        if let Some(video) = video {
            if matches!(page.playback_rate(video), Some(current) if current != rate) {
                self.set_video_playback_rate(page, scheduler, video, rate);
            }
        }

        log::trace!("retry tick {}/{} at rate {}", attempts, self.max_retry_attempts, rate);

        if attempts >= self.max_retry_attempts {
            self.retry = None;
            self.phase = EnforcementPhase::Settled;
            return;
        }

        let handle = scheduler.schedule(self.retry_interval_ms, Task::RetryTick { token });
        if let Some(retry) = self.retry.as_mut() {
            retry.handle = Some(handle);
        }
    }

    // =========================================================================
    // Media events
    // =========================================================================

    pub fn handle_media_event<P: Page, S: Scheduler>(
        &mut self,
        page: &mut P,
        scheduler: &mut S,
        video: ElementKey,
        kind: MediaEventKind,
    ) {
        match kind {
            MediaEventKind::RateChange => {
                self.on_rate_change(page, scheduler, video);
            }
            MediaEventKind::LoadedMetadata => {
                if let Some(pending) = self.take_pending(MediaEventKind::LoadedMetadata, video) {
                    self.set_video_playback_rate(page, scheduler, video, pending.rate);
                }
            }
            MediaEventKind::Playing => {
                if let Some(pending) = self.take_pending(MediaEventKind::Playing, video) {
                    self.start_retry_loop(page, scheduler, pending.rate);
                }
            }
        }
    }

    fn take_pending(&mut self, kind: MediaEventKind, video: ElementKey) -> Option<PendingReady> {
        let map = match kind {
            MediaEventKind::LoadedMetadata => &mut self.pending_metadata,
            MediaEventKind::Playing => &mut self.pending_playing,
            MediaEventKind::RateChange => return None,
        };
        map.remove(&video).filter(|pending| pending.cycle == self.cycle)
    }

    /// Manual override detection. Returns true when the change was
    /// attributed to the user.
    pub fn on_rate_change<P: Page, S: Scheduler>(
        &mut self,
        page: &mut P,
        scheduler: &mut S,
        video: ElementKey,
    ) -> bool {
        if !page.is_connected(video) {
            return false;
        }
        let Some(target) = self.target else {
            return false;
        };
        let Some(current) = page.playback_rate(video) else {
            return false;
        };
        if current == target {
            return false;
        }
        if scheduler.now_ms() - self.last_programmatic_set_ms < self.attribution_window_ms {
            return false;
        }

        log::debug!("manual rate change to {} on {:?}; suspending enforcement", current, video);
        self.context.manual_override_for_video = Some(video);
        self.stop_retry(scheduler);
        self.phase = EnforcementPhase::Overridden;
        true
    }
}
