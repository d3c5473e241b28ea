//! Index build state and progress tracking.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Index build state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum IndexBuildState {
    Idle = 0,
    Building = 1,
    Ready = 2,
    Error = 3,
}

impl IndexBuildState {
    /// Loads the state from an atomic.
    pub fn load(atomic: &AtomicU8) -> Self {
        match atomic.load(Ordering::Acquire) {
            1 => Self::Building,
            2 => Self::Ready,
            3 => Self::Error,
            _ => Self::Idle,
        }
    }

    pub fn store(self, atomic: &AtomicU8) {
        atomic.store(self as u8, Ordering::Release);
    }

    /// Returns the state as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Building => "building",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

/// Progress tracking for rebuilds.
#[derive(Debug, Default)]
pub struct IndexBuildProgress {
    pub started_at: AtomicU64,
    pub finished_at: AtomicU64,
    /// Duration plus one, so a sub-millisecond build is distinct from unset.
    pub last_duration_ms: AtomicU64,
    pub completed_builds: AtomicU64,
    pub failed_builds: AtomicU64,
}

impl IndexBuildProgress {
    /// Resets timestamps for a new build.
    pub fn reset_for_build(&self, started_at: u64) {
        self.started_at.store(started_at, Ordering::Relaxed);
        self.finished_at.store(0, Ordering::Relaxed);
    }

    /// Records the end of a build attempt.
    pub fn record_finish(&self, finished_at: u64, duration_ms: u64, succeeded: bool) {
        self.finished_at.store(finished_at, Ordering::Relaxed);
        self.last_duration_ms
            .store(duration_ms.saturating_add(1), Ordering::Relaxed);
        let counter = if succeeded {
            &self.completed_builds
        } else {
            &self.failed_builds
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot of the progress values.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            started_at: zero_to_none(self.started_at.load(Ordering::Relaxed)),
            finished_at: zero_to_none(self.finished_at.load(Ordering::Relaxed)),
            last_duration_ms: self
                .last_duration_ms
                .load(Ordering::Relaxed)
                .checked_sub(1),
            completed_builds: self.completed_builds.load(Ordering::Relaxed),
            failed_builds: self.failed_builds.load(Ordering::Relaxed),
        }
    }
}

/// A snapshot of build progress values.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
    pub last_duration_ms: Option<u64>,
    pub completed_builds: u64,
    pub failed_builds: u64,
}

/// Returns the current Unix timestamp in seconds.
pub fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

/// Converts 0 to None for optional timestamps.
pub fn zero_to_none(value: u64) -> Option<u64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}
