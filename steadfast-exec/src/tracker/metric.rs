use chrono::{DateTime, Utc};
use steadfast_core::LocatorKind;

use super::window::SampleWindow;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Samples kept per locator.
    pub window: usize,
    /// Samples required before a reliability verdict is given.
    pub min_samples: usize,
    pub reliable_rate: f64,
    pub reliable_stability: f64,
    /// Half-width of the "stable" trend band.
    pub trend_band: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window: 1000,
            min_samples: 10,
            reliable_rate: 0.8,
            reliable_stability: 0.6,
            trend_band: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Degrading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    Reliable,
    Unreliable,
    InsufficientData,
}

/// Rolling aggregates for one `(locator, website, task_type)`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorMetric {
    pub locator: String,
    pub kind: LocatorKind,
    pub website: String,
    pub task_type: String,
    pub total_attempts: u64,
    pub success_count: u64,
    pub failure_count: u64,
    /// Over the window, not lifetime.
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub stability: f64,
    pub degradation_rate: f64,
    pub trend: Trend,
    pub reliability: Reliability,
    pub recommendation: String,
    pub window_size: usize,
    pub last_seen: DateTime<Utc>,
}

impl SelectorMetric {
    pub fn is_reliable(&self) -> bool {
        self.reliability == Reliability::Reliable
    }
}

/// Mutable per-key state behind the tracker's per-key lock.
#[derive(Debug, Clone)]
pub(crate) struct SelectorStats {
    pub locator: String,
    pub kind: LocatorKind,
    pub website: String,
    pub task_type: String,
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub window: SampleWindow,
    pub last_seen: DateTime<Utc>,
}

impl SelectorStats {
    pub fn metric(&self, cfg: &TrackerConfig) -> SelectorMetric {
        let w = &self.window;
        let n = w.len();
        let success_rate = w.success_rate();
        let (min, max, sum) = w.latencies().fold((u64::MAX, 0u64, 0u64), |(lo, hi, sum), l| {
            (lo.min(l), hi.max(l), sum.saturating_add(l))
        });
        let avg = if n == 0 { 0.0 } else { sum as f64 / n as f64 };

        let stability = (1.0 - w.latency_cv().min(1.0)) * (1.0 - w.flap_rate());
        let (degradation_rate, trend) = match w.thirds() {
            Some((oldest, newest)) => {
                let delta = newest - oldest;
                let trend = if delta > cfg.trend_band {
                    Trend::Improving
                } else if delta < -cfg.trend_band {
                    Trend::Degrading
                } else {
                    Trend::Stable
                };
                (oldest - newest, trend)
            }
            None => (0.0, Trend::Stable),
        };

        let reliability = if n < cfg.min_samples {
            Reliability::InsufficientData
        } else if success_rate >= cfg.reliable_rate && stability >= cfg.reliable_stability {
            Reliability::Reliable
        } else {
            Reliability::Unreliable
        };

        SelectorMetric {
            locator: self.locator.clone(),
            kind: self.kind,
            website: self.website.clone(),
            task_type: self.task_type.clone(),
            total_attempts: self.total,
            success_count: self.success,
            failure_count: self.failure,
            success_rate,
            avg_latency_ms: avg,
            min_latency_ms: if n == 0 { 0 } else { min },
            max_latency_ms: max,
            stability,
            degradation_rate,
            trend,
            reliability,
            recommendation: recommendation(reliability, trend, success_rate).to_string(),
            window_size: n,
            last_seen: self.last_seen,
        }
    }
}

fn recommendation(reliability: Reliability, trend: Trend, success_rate: f64) -> &'static str {
    match (reliability, trend) {
        (Reliability::InsufficientData, _) => "collect more samples before relying on this locator",
        (_, Trend::Degrading) => "locator is degrading; regenerate candidates for this element",
        (Reliability::Reliable, _) => "keep as primary locator",
        (Reliability::Unreliable, _) if success_rate < 0.5 => {
            "replace this locator; it fails more often than it succeeds"
        }
        (Reliability::Unreliable, _) => "keep as fallback only; results are unstable",
    }
}
