//! Lock helpers that recover from poisoning instead of propagating panics.

use std::sync::Mutex;
use std::sync::MutexGuard;

use tracing::warn;

pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        warn!("recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_after_poisoning() {
        let lock = Mutex::new(7);
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = lock.lock().unwrap();
            panic!("poison it");
        }));
        assert!(lock.is_poisoned());
        assert_eq!(*mutex_lock_or_recover(&lock), 7);
    }
}
