use tracing::warn;

use super::config::DEFAULT_ADVANCE_SECONDS;

/// What automatic playback does once the last iteration is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndPolicy {
    Halt,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaybackMode {
    Automatic,
    Manual,
}

impl PlaybackMode {
    pub(crate) fn toggled(self) -> Self {
        match self {
            PlaybackMode::Automatic => PlaybackMode::Manual,
            PlaybackMode::Manual => PlaybackMode::Automatic,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PlaybackMode::Automatic => "auto",
            PlaybackMode::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PlaybackScheduler {
    active_index: usize,
    len: usize,
    mode: PlaybackMode,
    end_policy: EndPolicy,
    interval_seconds: f32,
    timer_seconds: f32,
}

impl PlaybackScheduler {
    pub(crate) fn new(
        len: usize,
        mode: PlaybackMode,
        end_policy: EndPolicy,
        interval_seconds: f32,
    ) -> Self {
        Self {
            active_index: 0,
            len,
            mode,
            end_policy,
            interval_seconds: valid_interval(interval_seconds),
            timer_seconds: 0.0,
        }
    }

    pub(crate) fn active_index(&self) -> usize {
        self.active_index
    }

    pub(crate) fn last_index(&self) -> usize {
        self.len.saturating_sub(1)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub(crate) fn end_policy(&self) -> EndPolicy {
        self.end_policy
    }

    pub(crate) fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
        self.timer_seconds = 0.0;
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.active_index >= self.last_index()
    }

    /// Automatic driver. Returns the new index when the timer fired and the
    /// index moved.
    pub(crate) fn tick(&mut self, dt_seconds: f32) -> Option<usize> {
        if self.mode != PlaybackMode::Automatic || !(dt_seconds > 0.0) {
            return None;
        }
        self.timer_seconds += dt_seconds;
        if self.timer_seconds < self.interval_seconds {
            return None;
        }
        self.timer_seconds = (self.timer_seconds - self.interval_seconds).min(self.interval_seconds);

        if !self.is_terminal() {
            self.active_index += 1;
            return Some(self.active_index);
        }
        match self.end_policy {
            EndPolicy::Halt => {
                self.timer_seconds = 0.0;
                None
            }
            EndPolicy::Wrap if self.active_index != 0 => {
                self.active_index = 0;
                Some(0)
            }
            EndPolicy::Wrap => None,
        }
    }

    /// Manual step forward; a no-op at the last index.
    pub(crate) fn advance(&mut self) -> bool {
        self.timer_seconds = 0.0;
        if self.is_terminal() {
            return false;
        }
        self.active_index += 1;
        true
    }

    /// Manual step back; a no-op at index 0.
    pub(crate) fn retreat(&mut self) -> bool {
        self.timer_seconds = 0.0;
        if self.active_index == 0 {
            return false;
        }
        self.active_index -= 1;
        true
    }

    pub(crate) fn restart(&mut self, len: usize) {
        self.active_index = 0;
        self.len = len;
        self.timer_seconds = 0.0;
    }
}

fn valid_interval(seconds: f32) -> f32 {
    if seconds.is_finite() && seconds > 0.0 {
        return seconds;
    }
    warn!(
        value = seconds,
        fallback = DEFAULT_ADVANCE_SECONDS,
        "advance_interval_invalid"
    );
    DEFAULT_ADVANCE_SECONDS
}
