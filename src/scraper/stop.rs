//! Stop signal for the page loop: a flag plus a condition variable so the between-page
//! delay can be cut short from another thread (e.g. a Ctrl+C handler).

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Cloneable stop handle. All clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop and wake any thread blocked in [StopSignal::wait_timeout].
    pub fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        cvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`. Returns true if a stop was requested (before or during the
    /// wait), false if the full interval elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Loop guards against spurious wakeups.
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = cvar
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            stopped = guard;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_elapses_without_stop() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!signal.is_stopped());
    }

    #[test]
    fn wait_returns_immediately_when_already_stopped() {
        let signal = StopSignal::new();
        signal.stop();
        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn stop_from_other_thread_interrupts_wait() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.stop();
        });
        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(10));
        handle.join().unwrap();
        assert!(signal.is_stopped());
    }

    #[test]
    fn zero_timeout_does_not_block() {
        let signal = StopSignal::new();
        assert!(!signal.wait_timeout(Duration::ZERO));
    }
}
