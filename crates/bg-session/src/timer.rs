use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bg_core::DISCONNECT_TIMEOUT_SECS;

/// Single-shot disconnect-forfeit timer. Unlike the teacher's dual
/// decision/showdown timers, a session only ever needs one: the 60s
/// grace period before an empty seat forfeits.
///
/// Arming a new timer bumps a generation counter; the spawned task
/// checks its own generation against the current one when it wakes, so
/// a stale timer that fires after being superseded by a rejoin is a
/// no-op rather than a race.
#[derive(Debug, Default)]
pub struct Timer {
    generation: Arc<AtomicU64>,
}

impl Timer {
    pub fn new() -> Self {
        Self { generation: Arc::new(AtomicU64::new(0)) }
    }

    /// Cancels any timer armed on this instance. Any rejoin must call
    /// this before the seat is considered safe again.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Arms the disconnect timer; `on_expiry` runs only if the timer is
    /// not cancelled before `DISCONNECT_TIMEOUT_SECS` elapses.
    pub fn arm<F, Fut>(&self, on_expiry: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.clone();
        let armed_at = generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(DISCONNECT_TIMEOUT_SECS)).await;
            if generation.load(Ordering::SeqCst) == armed_at {
                on_expiry().await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let timer = Timer::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        timer.arm(move || async move {
            flag.store(true, Ordering::SeqCst);
        });
        timer.cancel();
        tokio::time::advance(Duration::from_secs(DISCONNECT_TIMEOUT_SECS + 1)).await;
        tokio::task::yield_now().await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn uncancelled_timer_fires_after_timeout() {
        let timer = Timer::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        timer.arm(move || async move {
            flag.store(true, Ordering::SeqCst);
        });
        tokio::time::advance(Duration::from_secs(DISCONNECT_TIMEOUT_SECS + 1)).await;
        tokio::task::yield_now().await;
        assert!(fired.load(Ordering::SeqCst));
    }
}
