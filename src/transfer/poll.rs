use std::time::Duration;

/// Bounded fixed-interval polling discipline for the remote wait loops.
///
/// The cart-readiness wait and the upload status wait both probe an
/// external condition; expiry of the attempt budget is reported as
/// `TransferError::Timeout` so a stuck remote job cannot hold a worker
/// indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between consecutive probes.
    pub interval: Duration,
    /// Probe budget; must be at least 1.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 600,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_second_for_ten_minutes() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 600);
    }

    #[test]
    fn zero_attempts_is_clamped() {
        let policy = PollPolicy::new(Duration::from_millis(5), 0);
        assert_eq!(policy.max_attempts, 1);
    }
}
