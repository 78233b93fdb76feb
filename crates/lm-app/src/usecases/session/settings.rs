use std::time::Duration;

use lm_core::AppConfig;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Tunables of the session readiness controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Liveness bound for reaching `Ready`.
    pub init_timeout: Duration,
    /// Automatic re-attempts after the first failed attempt.
    pub connect_retry_limit: u32,
    pub retry_base_delay: Duration,
    /// Secret handed to the access-control probe.
    pub admin_token: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            init_timeout: Duration::from_millis(config.init_timeout_ms),
            connect_retry_limit: config.connect_retry_limit,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            admin_token: config.admin_token.clone(),
        }
    }

    /// Delay before re-attempt number `attempt` (1-based): doubles each time,
    /// capped at 30 seconds.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_base_delay
            .checked_mul(factor)
            .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_config_defaults() {
        let settings = SessionSettings::default();
        assert_eq!(settings.init_timeout, Duration::from_millis(15_000));
        assert_eq!(settings.connect_retry_limit, 2);
        assert!(settings.admin_token.is_empty());
    }

    #[test]
    fn retry_delay_doubles_and_caps() {
        let settings = SessionSettings::default();
        assert_eq!(settings.retry_delay(1), Duration::from_secs(1));
        assert_eq!(settings.retry_delay(2), Duration::from_secs(2));
        assert_eq!(settings.retry_delay(3), Duration::from_secs(4));
        assert_eq!(settings.retry_delay(10), MAX_RETRY_DELAY);
        assert_eq!(settings.retry_delay(u32::MAX), MAX_RETRY_DELAY);
    }
}
