//! TooMuchYouTube Core Library
//!
//! Host-agnostic engine behind the TooMuchYouTube content script: decides,
//! per page, which user rule applies and keeps the resulting playback rate
//! in force against player resets, while backing off as soon as the user
//! picks a rate by hand.
//!
//! # Architecture
//!
//! The engine never touches a DOM or a timer. The host implements
//! [`page::Page`] and [`scheduler::Scheduler`] and forwards the events it
//! subscribed to back into a [`session::ContentSession`]. All state lives
//! in the session, so a fake page and a virtual clock drive every path in
//! the tests.
//!
//! # Modules
//!
//! - `types`: Rules, playback rates, match contexts, quick-add payloads
//! - `url`: Allocation-free URL slicing and video id extraction
//! - `domains`: Recognized video hosts
//! - `rules`: Rule snapshots loaded from the settings store
//! - `matcher`: First-match rule selection
//! - `signals`: Page signal extraction
//! - `enforcer`: Rate enforcement and manual override detection
//! - `watcher`: Debounced re-evaluation triggers
//! - `bridge`: Page bridge and popup request protocols
//! - `session`: Per-tab orchestration

pub mod bridge;
pub mod config;
pub mod domain_table;
pub mod domains;
pub mod enforcer;
pub mod error;
pub mod matcher;
pub mod page;
pub mod rules;
pub mod scheduler;
pub mod session;
pub mod signals;
pub mod types;
pub mod url;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use bridge::{BridgeCommand, BridgeMessage, ContentRequest, PAGE_SYNC_CHANNEL};
pub use config::EngineConfig;
pub use domains::is_recognized_host;
pub use enforcer::{EnforcementContext, EnforcementPhase};
pub use error::{ConfigError, PlayerError, RuleError, SettingsError};
pub use matcher::{find_first_match, matches_rule};
pub use page::{ElementKey, MediaEventKind, Page, PageSignals, PlayerApi};
pub use rules::RuleSet;
pub use scheduler::{Scheduler, Task, TaskHandle};
pub use session::{ContentSession, Evaluation};
pub use types::{MatchContext, PlaybackRate, QuickAddData, Rule, RuleType};
