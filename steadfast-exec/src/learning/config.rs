#[derive(Debug, Clone)]
pub struct LearningConfig {
    /// Weight kept by older observations each time a new one arrives.
    pub decay: f64,
    /// Minimum confidence for a learned suggestion to be acted upon.
    pub confidence_threshold: f64,
    /// Observations needed before a locator or strategy counts as learned.
    pub min_observations: u64,
    /// A pattern whose rate moves this far from its established baseline is superseded.
    pub contradiction_margin: f64,
    /// Chance that an unpinned task without a confident strategy tries the
    /// least-sampled one instead of `direct`. Only applies once the task type
    /// has some strategy history on the site.
    pub exploration_rate: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            decay: 0.9,
            confidence_threshold: 0.6,
            min_observations: 3,
            contradiction_margin: 0.3,
            exploration_rate: 0.1,
        }
    }
}
