use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NoticeId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NoticeEntry {
    pub id: Option<NoticeId>,
    pub message: String,
    pub kind: NoticeKind,
    pub auto_close_ms: Option<u32>,
}

impl NoticeEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: None,
            message: message.into(),
            kind: NoticeKind::Info,
            auto_close_ms: Some(5_000),
        }
    }

    pub fn kind(mut self, value: NoticeKind) -> Self {
        self.kind = value;
        self
    }

    pub fn auto_close_ms(mut self, value: Option<u32>) -> Self {
        self.auto_close_ms = value;
        self
    }

    pub fn auto_close(self, value: Duration) -> Self {
        let millis = u32::try_from(value.as_millis()).unwrap_or(u32::MAX);
        self.auto_close_ms(Some(millis))
    }
}

struct ShownNotice {
    entry: NoticeEntry,
    shown_at: Instant,
}

impl ShownNotice {
    fn expired(&self, now: Instant) -> bool {
        self.entry.auto_close_ms.is_some_and(|ms| {
            now.saturating_duration_since(self.shown_at) >= Duration::from_millis(u64::from(ms))
        })
    }
}

struct NoticeState {
    queue: VecDeque<ShownNotice>,
    max_visible: usize,
}

impl Default for NoticeState {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            max_visible: 3,
        }
    }
}

/// Transient notices shown above a form, newest last. Older entries fall
/// off once `max_visible` is exceeded.
#[derive(Clone, Default)]
pub struct NoticeManager {
    next_id: Arc<AtomicU64>,
    state: Arc<RwLock<NoticeState>>,
}

impl NoticeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_visible(&self, value: usize) {
        self.write().max_visible = value.max(1);
    }

    pub fn show(&self, entry: NoticeEntry) -> NoticeId {
        self.show_at(entry, Instant::now())
    }

    pub fn show_at(&self, mut entry: NoticeEntry, now: Instant) -> NoticeId {
        let id = NoticeId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        entry.id = Some(id);

        let mut state = self.write();
        state.queue.push_back(ShownNotice {
            entry,
            shown_at: now,
        });
        while state.queue.len() > state.max_visible {
            state.queue.pop_front();
        }
        id
    }

    pub fn dismiss(&self, id: NoticeId) -> bool {
        let mut state = self.write();
        match state
            .queue
            .iter()
            .position(|shown| shown.entry.id == Some(id))
        {
            Some(index) => {
                state.queue.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn dismiss_all(&self) {
        self.write().queue.clear();
    }

    /// Drops every notice whose auto-close period has elapsed at `now`.
    pub fn prune_expired(&self, now: Instant) -> Vec<NoticeId> {
        let mut state = self.write();
        let mut removed = Vec::new();
        state.queue.retain(|shown| {
            if shown.expired(now) {
                removed.extend(shown.entry.id);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn list(&self) -> Vec<NoticeEntry> {
        self.read()
            .queue
            .iter()
            .map(|shown| shown.entry.clone())
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, NoticeState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, NoticeState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
