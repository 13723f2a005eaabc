use std::time::Duration;

use rand::Rng;

/// Exponential reconnect delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: u32,
    /// Give up after this many consecutive failed attempts. `None` retries
    /// for as long as the subscription is wanted.
    pub max_attempts: Option<u32>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
            multiplier: 2,
            max_attempts: None,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (1-based), without jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let factor = self.multiplier.max(1).saturating_pow(exp);
        self.initial.saturating_mul(factor).min(self.max)
    }

    /// `delay` plus up to 10% random jitter so many clients dropped by the
    /// same server restart do not reconnect in lockstep.
    pub fn jittered(&self, attempt: u32) -> Duration {
        let base = self.delay(attempt);
        let jitter = rand::rng().random_range(0.0..=0.1);
        base.saturating_add(base.mul_f64(jitter))
    }

    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt > max)
    }
}
