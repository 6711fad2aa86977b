use std::time::Duration;

/// How a lock waiter polls for an exclusive lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockOptions {
    /// Sleep between acquisition attempts.
    pub poll_interval: Duration,
    /// Give up after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: None,
        }
    }
}

impl LockOptions {
    /// Poll every `poll_interval` and give up after `timeout`.
    pub fn bounded(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout: Some(timeout),
        }
    }
}
