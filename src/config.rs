use std::time::Duration;

use crate::error::{RelayError, Result};
use crate::events::{DEFAULT_EVENT_TYPE, DEFAULT_SOURCE};
use crate::transfer::PollPolicy;

/// Process configuration for the relay core.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// `eventType` value envelopes must carry.
    pub expected_event_type: String,
    /// `source` value envelopes must carry.
    pub expected_source: String,
    pub cart_poll_interval_ms: u64,
    pub cart_poll_max_attempts: u32,
    pub upload_poll_interval_ms: u64,
    pub upload_poll_max_attempts: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            expected_event_type: DEFAULT_EVENT_TYPE.to_string(),
            expected_source: DEFAULT_SOURCE.to_string(),
            cart_poll_interval_ms: 1000,
            cart_poll_max_attempts: 600,
            upload_poll_interval_ms: 1000,
            upload_poll_max_attempts: 600,
        }
    }
}

impl RelayConfig {
    /// Build configuration from `RELAY_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(event_type) = std::env::var("RELAY_EVENT_TYPE") {
            config.expected_event_type = event_type;
        }
        if let Ok(source) = std::env::var("RELAY_SOURCE") {
            config.expected_source = source;
        }
        if let Ok(interval) = std::env::var("RELAY_CART_POLL_INTERVAL_MS") {
            config.cart_poll_interval_ms = parse(&interval, "cart_poll_interval_ms")?;
        }
        if let Ok(attempts) = std::env::var("RELAY_CART_POLL_MAX_ATTEMPTS") {
            config.cart_poll_max_attempts = parse(&attempts, "cart_poll_max_attempts")?;
        }
        if let Ok(interval) = std::env::var("RELAY_UPLOAD_POLL_INTERVAL_MS") {
            config.upload_poll_interval_ms = parse(&interval, "upload_poll_interval_ms")?;
        }
        if let Ok(attempts) = std::env::var("RELAY_UPLOAD_POLL_MAX_ATTEMPTS") {
            config.upload_poll_max_attempts = parse(&attempts, "upload_poll_max_attempts")?;
        }

        Ok(config)
    }

    /// Polling policy for the cart readiness wait.
    pub fn cart_poll(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.cart_poll_interval_ms),
            self.cart_poll_max_attempts,
        )
    }

    /// Polling policy for the upload status wait.
    pub fn upload_poll(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.upload_poll_interval_ms),
            self.upload_poll_max_attempts,
        )
    }
}

fn parse<T: std::str::FromStr>(value: &str, name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RelayError::configuration(format!("Invalid {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_ingest_vocabulary() {
        let config = RelayConfig::default();
        assert_eq!(config.expected_event_type, DEFAULT_EVENT_TYPE);
        assert_eq!(config.expected_source, DEFAULT_SOURCE);
        assert_eq!(config.cart_poll(), PollPolicy::default());
        assert_eq!(config.upload_poll(), PollPolicy::default());
    }

    #[test]
    fn invalid_numbers_are_configuration_errors() {
        let error = parse::<u32>("ten", "cart_poll_max_attempts").unwrap_err();
        assert_eq!(error.kind(), "ConfigurationError");
    }
}
