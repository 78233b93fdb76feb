use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::readiness::Generation;

/// Identifies one armed single-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<Generation> for TimerId {
    fn from(generation: Generation) -> Self {
        Self(generation.value())
    }
}

impl Display for TimerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single-shot timers. Expiry is reported out of band by the adapter
/// (see `lm_infra::time::Timer`).
#[async_trait::async_trait]
pub trait TimerPort: Send {
    /// Arms `timer_id`, replacing a timer already armed under the same id.
    async fn start(&mut self, timer_id: TimerId, ttl: Duration) -> anyhow::Result<()>;
    async fn stop(&mut self, timer_id: TimerId) -> anyhow::Result<()>;
}
