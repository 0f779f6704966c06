//! Shared utilities for pixelbot crates.

#![deny(clippy::all)]

pub mod sync;
pub mod timing;

pub use sync::mutex_lock_or_recover;
pub use timing::MockSleeper;
pub use timing::RealSleeper;
pub use timing::Sleeper;
