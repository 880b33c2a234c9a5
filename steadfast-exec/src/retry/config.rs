use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// Use the computed backoff as is.
    #[default]
    None,
    /// Uniform delay in `[0, backoff]`.
    Full,
}

/// Process-wide retry settings. Per-attempt numbers come from the
/// classification's `RetryPolicy`; these only bound them.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Global cap applied on top of each policy's own `max_delay`.
    pub max_delay: Duration,
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_secs(60),
            jitter: Jitter::None,
        }
    }
}
