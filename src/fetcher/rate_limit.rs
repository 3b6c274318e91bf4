//! Request pacing with one-way exponential backoff.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

#[derive(Debug)]
struct LimiterState {
    last_request: Option<Instant>,
    current_delay: Duration,
}

/// Enforces a minimum spacing between requests.
///
/// Callers queue on the internal lock, so concurrent requests are released
/// one interval apart. The interval only ever grows: once the site has
/// throttled us, the session stays at the escalated pace.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
    ceiling: Duration,
}

impl RateLimiter {
    pub fn new(initial_delay: Duration, ceiling: Duration) -> Self {
        Self {
            state: Mutex::new(LimiterState {
                last_request: None,
                current_delay: initial_delay,
            }),
            ceiling,
        }
    }

    /// Wait until the current interval has passed since the previous request.
    pub async fn throttle(&self) {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_request {
            let ready_at = last + state.current_delay;
            let now = Instant::now();
            if ready_at > now {
                debug!("Throttling request for {:?}", ready_at - now);
                sleep_until(ready_at).await;
            }
        }

        state.last_request = Some(Instant::now());
    }

    /// Double the interval, capped at the ceiling, and return the new value.
    pub async fn escalate(&self) -> Duration {
        let mut state = self.state.lock().await;
        state.current_delay = state.current_delay.saturating_mul(2).min(self.ceiling);
        state.current_delay
    }

    pub async fn current_delay(&self) -> Duration {
        self.state.lock().await.current_delay
    }
}
