use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use super::{RateDecision, RateLimitError, RateLimitPolicy, RateLimiter};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// In-process fixed-window limiter.
///
/// Uses a sync [`Mutex`] since the critical section is very short (no awaits),
/// which also makes check-and-increment atomic per key.
#[derive(Debug)]
pub struct MemoryRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    policy: RateLimitPolicy,
}

impl MemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            policy,
        }
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let window = windows
            .entry(key.to_string())
            .and_modify(|w| {
                if now.duration_since(w.started) >= self.policy.window {
                    *w = Window {
                        started: now,
                        count: 0,
                    };
                }
            })
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if window.count >= self.policy.max_requests {
            let elapsed = now.duration_since(window.started);
            return RateDecision::Limited {
                retry_after: self.policy.window.saturating_sub(elapsed),
            };
        }

        window.count += 1;
        RateDecision::Allowed {
            remaining: self.policy.max_requests - window.count,
        }
    }

    /// Drops windows that have fully elapsed. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.started) < self.policy.window);
        before - windows.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .map(|w| w.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    /// Starts the periodic sweep. The task exits once `shutdown` flips to `true`
    /// or its sender is dropped.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.sweep();
                        if removed > 0 {
                            debug!(
                                "Rate limiter swept {removed} expired windows, {} still tracked",
                                self.tracked_keys()
                            );
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            debug!("Rate limiter sweeper stopped");
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateDecision, RateLimitError> {
        Ok(self.check_at(key, Instant::now()))
    }
}
