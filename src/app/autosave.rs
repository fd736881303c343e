//! Periodic, condition-gated autosave.

use super::timer::ScheduledTask;

pub const DEFAULT_AUTOSAVE_PERIOD_MS: u64 = 30_000;

/// How long the "Auto-saved" notification stays up.
pub const AUTOSAVE_NOTICE_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveState {
    pub enabled: bool,
    /// Time of the last successful save, or of session start.
    pub last_save_ms: u64,
}

/// Fires every period and decides whether this cycle should write.
#[derive(Debug, Clone, Copy)]
pub struct AutosaveTimer {
    state: AutosaveState,
    task: ScheduledTask,
}

impl AutosaveTimer {
    /// A timer armed from `now_ms`, which also counts as the last save.
    pub const fn new(period_ms: u64, now_ms: u64) -> Self {
        let mut task = ScheduledTask::new(period_ms);
        task.arm(now_ms);
        Self {
            state: AutosaveState {
                enabled: true,
                last_save_ms: now_ms,
            },
            task,
        }
    }

    pub const fn period_ms(&self) -> u64 {
        self.task.delay_ms()
    }

    pub const fn state(&self) -> AutosaveState {
        self.state
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.state.enabled = enabled;
    }

    pub const fn record_save(&mut self, now_ms: u64) {
        self.state.last_save_ms = now_ms;
    }

    pub const fn next_check_at(&self) -> Option<u64> {
        self.task.due_at()
    }

    /// Whether a save should be attempted at `now_ms`.
    ///
    /// Returns false until the period elapses. When it does, the timer
    /// re-arms whatever the outcome, then all three conditions are checked.
    pub fn check(&mut self, now_ms: u64, has_bound_path: bool) -> bool {
        if !self.task.take_due(now_ms) {
            return false;
        }
        self.task.arm(now_ms);
        self.state.enabled
            && has_bound_path
            && now_ms.saturating_sub(self.state.last_save_ms) >= self.period_ms()
    }
}
