//! In-memory page and scheduler used by the unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::bridge::BridgeMessage;
use crate::error::PlayerError;
use crate::page::{ElementKey, MediaEventKind, Page, PageSignals, PlayerApi};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::session::ContentSession;

// =============================================================================
// Player
// =============================================================================

/// Records every call; clones share the log.
#[derive(Clone, Default)]
pub struct FakePlayer {
    calls: Rc<RefCell<Vec<f64>>>,
    fail_with: Option<PlayerError>,
}

impl FakePlayer {
    pub fn failing(error: PlayerError) -> Self {
        Self {
            calls: Rc::default(),
            fail_with: Some(error),
        }
    }

    pub fn calls(&self) -> Vec<f64> {
        self.calls.borrow().clone()
    }
}

impl PlayerApi for FakePlayer {
    fn set_playback_rate(&self, rate: f64) -> Result<(), PlayerError> {
        self.calls.borrow_mut().push(rate);
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Page
// =============================================================================

#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub rate: f64,
    pub ready_state: u16,
    pub connected: bool,
    /// Direct rate sets are swallowed, like a player still loading
    pub rate_locked: bool,
}

#[derive(Default)]
pub struct FakePage {
    pub href: String,
    pub heading: Option<String>,
    pub title: String,
    pub channel_texts: Vec<String>,
    pub channel_hrefs: Vec<String>,
    pub meta: HashMap<String, String>,
    pub author: Option<String>,

    pub videos: BTreeMap<ElementKey, FakeVideo>,
    pub players: Vec<FakePlayer>,
    pub bridge_messages: RefCell<Vec<BridgeMessage>>,
    pub rate_sets: Vec<(ElementKey, f64)>,
    pub rate_watchers: Vec<ElementKey>,
    pub once_watchers: Vec<(ElementKey, MediaEventKind)>,
}

impl FakePage {
    pub fn add_video(&mut self, id: u64, ready_state: u16) -> ElementKey {
        let key = ElementKey(id);
        self.videos.insert(
            key,
            FakeVideo {
                rate: 1.0,
                ready_state,
                connected: true,
                rate_locked: false,
            },
        );
        key
    }

    pub fn video(&self, key: ElementKey) -> &FakeVideo {
        &self.videos[&key]
    }

    pub fn video_mut(&mut self, key: ElementKey) -> &mut FakeVideo {
        self.videos.get_mut(&key).expect("unknown video")
    }
}

impl PageSignals for FakePage {
    fn location_href(&self) -> String {
        self.href.clone()
    }

    fn heading_text(&self) -> Option<String> {
        self.heading.clone()
    }

    fn document_title(&self) -> String {
        self.title.clone()
    }

    fn channel_name_texts(&self) -> Vec<String> {
        self.channel_texts.clone()
    }

    fn channel_link_hrefs(&self) -> Vec<String> {
        self.channel_hrefs.clone()
    }

    fn meta_content(&self, itemprop: &str) -> Option<String> {
        self.meta.get(itemprop).cloned()
    }

    fn player_response_author(&self) -> Option<String> {
        self.author.clone()
    }
}

impl Page for FakePage {
    fn videos(&self) -> Vec<ElementKey> {
        self.videos
            .iter()
            .filter(|(_, video)| video.connected)
            .map(|(key, _)| *key)
            .collect()
    }

    fn is_connected(&self, video: ElementKey) -> bool {
        self.videos.get(&video).is_some_and(|v| v.connected)
    }

    fn ready_state(&self, video: ElementKey) -> u16 {
        self.videos.get(&video).map_or(0, |v| v.ready_state)
    }

    fn playback_rate(&self, video: ElementKey) -> Option<f64> {
        self.videos.get(&video).map(|v| v.rate)
    }

    fn set_playback_rate(&mut self, video: ElementKey, rate: f64) {
        self.rate_sets.push((video, rate));
        if let Some(v) = self.videos.get_mut(&video) {
            if !v.rate_locked {
                v.rate = rate;
            }
        }
    }

    fn watch_rate_changes(&mut self, video: ElementKey) {
        self.rate_watchers.push(video);
    }

    fn watch_once(&mut self, video: ElementKey, kind: MediaEventKind) {
        self.once_watchers.push((video, kind));
    }

    fn player_apis(&self) -> Vec<Box<dyn PlayerApi>> {
        self.players
            .iter()
            .map(|player| Box::new(player.clone()) as Box<dyn PlayerApi>)
            .collect()
    }

    fn post_bridge_message(&self, message: &BridgeMessage) {
        self.bridge_messages.borrow_mut().push(message.clone());
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Virtual clock. Tasks fire only when a test pops them.
#[derive(Default)]
pub struct FakeScheduler {
    pub now: f64,
    next_handle: u64,
    queue: Vec<(f64, TaskHandle, Task)>,
}

impl FakeScheduler {
    /// Remove and return the earliest task due at or before `until`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, until: f64) -> Option<Task> {
        let index = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, (due, _, _))| *due <= until)
            .min_by(|(_, a), (_, b)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(index, _)| index)?;
        let (due, _, task) = self.queue.remove(index);
        self.now = self.now.max(due);
        Some(task)
    }

    /// Tasks still queued, earliest first.
    pub fn pending(&self) -> Vec<Task> {
        let mut queue = self.queue.clone();
        queue.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        queue.into_iter().map(|(_, _, task)| task).collect()
    }
}

impl Scheduler for FakeScheduler {
    fn now_ms(&self) -> f64 {
        self.now
    }

    fn schedule(&mut self, delay_ms: u32, task: Task) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.queue.push((self.now + f64::from(delay_ms), handle, task));
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.queue.retain(|(_, queued, _)| *queued != handle);
    }
}

/// Run every task that comes due in the next `ms` milliseconds.
pub fn advance(session: &mut ContentSession<FakePage, FakeScheduler>, ms: f64) {
    let until = session.scheduler().now + ms;
    while let Some(task) = session.scheduler_mut().pop_due(until) {
        session.run_task(task);
    }
    session.scheduler_mut().now = until;
}
