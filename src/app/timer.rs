//! Deferred tasks over explicit millisecond timestamps.
//!
//! Nothing here reads a clock. Callers pass `now_ms`, so tests advance
//! virtual time and the host loop can sleep until [`ScheduledTask::due_at`].

/// Default quiet period before a render fires.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// A single deferred task that can be armed, cancelled and fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    delay_ms: u64,
    due_at: Option<u64>,
}

impl ScheduledTask {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            due_at: None,
        }
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Arm (or re-arm) the task to fire `delay_ms` after `now_ms`.
    pub const fn arm(&mut self, now_ms: u64) {
        self.due_at = Some(now_ms.saturating_add(self.delay_ms));
    }

    pub const fn cancel(&mut self) {
        self.due_at = None;
    }

    pub const fn is_armed(&self) -> bool {
        self.due_at.is_some()
    }

    pub const fn due_at(&self) -> Option<u64> {
        self.due_at
    }

    /// Disarm and return true if the task is due at `now_ms`.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.due_at {
            Some(due) if now_ms >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending { due_at: u64 },
}

/// Coalesces bursts of edit notifications into one render.
///
/// Every [`notify`](Self::notify) pushes the due time out to
/// `now + delay`. [`poll`](Self::poll) fires at most once per pending
/// period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    task: ScheduledTask,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl Debouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            task: ScheduledTask::new(delay_ms),
        }
    }

    pub const fn delay_ms(&self) -> u64 {
        self.task.delay_ms()
    }

    pub const fn notify(&mut self, now_ms: u64) {
        self.task.arm(now_ms);
    }

    /// Drop a pending render without firing it.
    pub const fn cancel_pending(&mut self) {
        self.task.cancel();
    }

    /// True exactly once when the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        self.task.take_due(now_ms)
    }

    pub const fn is_pending(&self) -> bool {
        self.task.is_armed()
    }

    pub const fn due_at(&self) -> Option<u64> {
        self.task.due_at()
    }

    pub const fn state(&self) -> DebounceState {
        match self.task.due_at() {
            Some(due_at) => DebounceState::Pending { due_at },
            None => DebounceState::Idle,
        }
    }
}
