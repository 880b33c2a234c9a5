use std::collections::BTreeMap;
use std::time::Duration;

use crate::retry::RetryConfig;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for a single driver call (before any widening).
    pub call_timeout: Duration,
    /// Ceiling for a widened call timeout.
    pub max_call_timeout: Duration,
    /// Run post-navigation handlers (overlays, cookie notices, age gates).
    pub side_effects: bool,
    pub side_effect_timeout: Duration,
    /// How long an `element_present` precondition waits for its element.
    pub precondition_timeout: Duration,
    /// Extra evaluations for actions whose precondition policy is `retry`.
    pub precondition_retries: u32,
    pub precondition_backoff: Duration,
    /// Pause used by the settle-then-act strategy.
    pub settle_pause: Duration,
    /// Fetch page HTML before each pass so uniqueness counts into candidate scores.
    pub snapshot_scoring: bool,
    pub retry: RetryConfig,
    pub auto_fix: AutoFixConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            max_call_timeout: Duration::from_secs(60),
            side_effects: true,
            side_effect_timeout: Duration::from_secs(2),
            precondition_timeout: Duration::from_secs(2),
            precondition_retries: 3,
            precondition_backoff: Duration::from_millis(500),
            settle_pause: Duration::from_millis(500),
            snapshot_scoring: false,
            retry: RetryConfig::default(),
            auto_fix: AutoFixConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutoFixConfig {
    pub enabled: bool,
    /// Multiplier applied to the call timeout after a timeout-like failure.
    pub timeout_widening: f64,
    /// Minimum confidence for a learned alternate; the learning engine's own
    /// threshold still applies when it is higher.
    pub min_confidence: f64,
}

impl Default for AutoFixConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_widening: 1.5,
            min_confidence: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub global_concurrency: usize,
    pub per_website_concurrency: BTreeMap<String, usize>,
    /// Save learning models and metric snapshots after each task when a store is configured.
    pub persist: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            global_concurrency: 4,
            per_website_concurrency: BTreeMap::new(),
            persist: true,
        }
    }
}
