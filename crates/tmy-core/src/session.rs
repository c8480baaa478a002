//! Content-script session
//!
//! One session per tab/frame. It owns the host handles, the current rule
//! snapshot and all enforcement state, and is the single entry point the
//! host calls into: settings loads, navigation and mutation notifications,
//! fired timers, media events and popup requests.

use crate::bridge::ContentRequest;
use crate::config::EngineConfig;
use crate::domains::is_recognized_host;
use crate::enforcer::{EnforcementContext, EnforcementPhase, Enforcer};
use crate::matcher::find_first_match;
use crate::page::{ElementKey, MediaEventKind, Page};
use crate::rules::RuleSet;
use crate::scheduler::{Scheduler, Task};
use crate::signals::extract_signals;
use crate::types::{PlaybackRate, QuickAddData};
use crate::url::{extract_host, match_key};
use crate::watcher::{WatchSources, Watcher};

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The page is not on a recognized video host
    UnrecognizedHost,
    /// A rate is already imposed for this key on this element
    AlreadyApplied,
    /// No rule matched
    NoMatch,
    /// A rule matched and its rate was imposed
    Applied { rule_index: usize, rate: f64 },
    /// A rule matched but nothing was applied (bad speed, no video yet)
    NotApplied { rule_index: usize },
}

pub struct ContentSession<P: Page, S: Scheduler> {
    page: P,
    scheduler: S,
    config: EngineConfig,
    rules: RuleSet,
    enforcer: Enforcer,
    watcher: Watcher,
    host_filter: fn(&str) -> bool,
}

impl<P: Page, S: Scheduler> ContentSession<P, S> {
    pub fn new(page: P, scheduler: S, config: EngineConfig) -> Self {
        let enforcer = Enforcer::new(&config);
        let watcher = Watcher::new(&config);
        Self {
            page,
            scheduler,
            config,
            rules: RuleSet::default(),
            enforcer,
            watcher,
            host_filter: is_recognized_host,
        }
    }

    /// Replace the recognized-host predicate.
    pub fn with_host_filter(mut self, host_filter: fn(&str) -> bool) -> Self {
        self.host_filter = host_filter;
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn phase(&self) -> EnforcementPhase {
        self.enforcer.phase()
    }

    pub fn enforcement(&self) -> &EnforcementContext {
        self.enforcer.context()
    }

    pub fn is_evaluation_pending(&self) -> bool {
        self.watcher.is_pending()
    }

    // =========================================================================
    // Host notifications
    // =========================================================================

    /// Arm the startup poll. Call once after the script is injected.
    pub fn start(&mut self) {
        self.watcher.start_startup_poll(&mut self.scheduler);
    }

    /// Cancel every outstanding timer.
    pub fn shutdown(&mut self) {
        self.watcher.stop(&mut self.scheduler);
        self.enforcer.reset(&mut self.scheduler);
    }

    /// A fresh rule snapshot arrived from the settings store. Enforcement
    /// restarts cold and the page is evaluated right away.
    pub fn apply_settings(&mut self, rules: RuleSet) -> Evaluation {
        log::debug!("settings loaded: {} rule(s)", rules.len());
        self.rules = rules;
        self.enforcer.reset(&mut self.scheduler);
        self.evaluate_and_apply()
    }

    /// The host finished an in-app navigation: a new logical page.
    pub fn on_navigate_finish(&mut self) {
        self.enforcer.reset(&mut self.scheduler);
        self.watcher.request(&mut self.scheduler, WatchSources::NAVIGATION);
    }

    /// Something in the document changed. Never evaluates synchronously.
    pub fn on_mutation(&mut self) {
        self.watcher.request(&mut self.scheduler, WatchSources::MUTATION);
    }

    /// Run a task the scheduler fired.
    pub fn run_task(&mut self, task: Task) {
        match task {
            Task::Evaluate => {
                if let Some(sources) = self.watcher.take_pending() {
                    log::trace!("evaluating after {:?}", sources);
                    self.evaluate_and_apply();
                }
            }
            Task::RetryTick { token } => {
                self.enforcer.retry_tick(&mut self.page, &mut self.scheduler, token);
            }
            Task::StartupPoll => {
                self.watcher.on_startup_poll(&mut self.scheduler);
            }
        }
    }

    /// Deliver a media event the page subscribed to on our behalf.
    pub fn handle_media_event(&mut self, video: ElementKey, kind: MediaEventKind) {
        self.enforcer
            .handle_media_event(&mut self.page, &mut self.scheduler, video, kind);
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Extract signals, pick the first matching rule and impose its rate,
    /// unless this key is already enforced on the same live element.
    pub fn evaluate_and_apply(&mut self) -> Evaluation {
        let href = self.page.location_href();
        let host = extract_host(&href).unwrap_or("");
        if !(self.host_filter)(host) {
            return Evaluation::UnrecognizedHost;
        }

        let key = match_key(&href);
        if self.enforcer.context().applied_for_key.as_deref() == Some(key.as_str()) {
            let current = self.page.videos().first().copied();
            let applied = self.enforcer.context().applied_for_video;
            if let (Some(applied), Some(current)) = (applied, current) {
                if applied == current && self.page.is_connected(current) {
                    return Evaluation::AlreadyApplied;
                }
            }
            if current.is_some() && applied != current {
                log::debug!("video element replaced under key {}", key);
                self.enforcer.clear_manual_override();
            }
        } else if self.enforcer.context().manual_override_for_video.is_some() {
            // An override belongs to the key it was made on
            log::debug!("key changed to {}; dropping manual override", key);
            self.enforcer.clear_manual_override();
        }

        let ctx = extract_signals(&self.page);
        let Some((rule_index, rule)) = find_first_match(self.rules.rules(), &ctx) else {
            return Evaluation::NoMatch;
        };
        let speed = rule.speed.clone();

        if !self
            .enforcer
            .apply_playback_rate_once(&mut self.page, &mut self.scheduler, &speed)
        {
            return Evaluation::NotApplied { rule_index };
        }

        log::debug!("rule #{} matched {}; rate {}", rule_index, key, speed);
        self.enforcer.mark_applied(key);
        Evaluation::Applied {
            rule_index,
            rate: PlaybackRate::parse(&speed).map_or(0.0, PlaybackRate::get),
        }
    }

    // =========================================================================
    // Popup requests
    // =========================================================================

    /// Read-only snapshot for the popup's quick-add buttons.
    pub fn quick_add_data(&self) -> QuickAddData {
        QuickAddData::from(extract_signals(&self.page))
    }

    pub fn handle_request(&self, request: ContentRequest) -> QuickAddData {
        match request {
            ContentRequest::GetQuickAddData => self.quick_add_data(),
        }
    }
}
