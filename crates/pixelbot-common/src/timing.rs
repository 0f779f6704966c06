//! Sleeper trait for deterministic timing in tests.
//!
//! Every delay in the engine (pre/post action delays, recognition retry
//! delay, screenshot settle delay) goes through a [`Sleeper`], so tests can
//! substitute a mock that records durations without waiting.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Trait for abstracting sleep operations.
pub trait Sleeper: Send + Sync {
    /// Sleep for the specified duration.
    fn sleep(&self, duration: Duration);
}

/// Production sleeper that uses `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Mock sleeper for testing that records calls without sleeping.
#[derive(Debug, Default)]
pub struct MockSleeper {
    call_count: AtomicU64,
    total_duration_ms: AtomicU64,
    durations: Mutex<Vec<Duration>>,
}

impl MockSleeper {
    /// Create a new mock sleeper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of times sleep was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Returns the total duration of all sleep calls.
    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.total_duration_ms.load(Ordering::SeqCst))
    }

    /// Returns all individual sleep durations.
    pub fn durations(&self) -> Vec<Duration> {
        self.durations
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// Reset all tracking state.
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.total_duration_ms.store(0, Ordering::SeqCst);
        if let Ok(mut durations) = self.durations.lock() {
            durations.clear();
        }
    }
}

impl Sleeper for MockSleeper {
    fn sleep(&self, duration: Duration) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.total_duration_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        if let Ok(mut durations) = self.durations.lock() {
            durations.push(duration);
        }
    }
}
