use std::collections::HashMap;

use crate::types::{CandidateLocator, LocatorKind, LocatorSet};

use super::snapshot::PageSnapshot;

/// Neutral value for missing history or an unevaluable locator.
pub const NEUTRAL: f64 = 0.5;

/// Relative weight of each scoring term; normalized before use.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoringWeights {
    pub prior: f64,
    pub uniqueness: f64,
    pub history: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            prior: 0.4,
            uniqueness: 0.3,
            history: 0.3,
        }
    }
}

impl ScoringWeights {
    fn normalized(&self) -> (f64, f64, f64) {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let (p, u, h) = (clean(self.prior), clean(self.uniqueness), clean(self.history));
        let total = p + u + h;
        if total == 0.0 {
            return (1.0, 0.0, 0.0);
        }
        (p / total, u / total, h / total)
    }
}

/// Learned per-kind success rate for one site.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KindBias(pub HashMap<LocatorKind, f64>);

impl KindBias {
    pub fn get(&self, kind: LocatorKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    pub fn set(&mut self, kind: LocatorKind, rate: f64) {
        self.0.insert(kind, rate.clamp(0.0, 1.0));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What the scorer knows about the site and task beyond the page itself.
#[derive(Debug, Clone, Default)]
pub struct RankContext {
    pub website: String,
    pub task_type: String,
    /// Success rate per exact locator string.
    pub history: HashMap<String, f64>,
    pub kind_bias: KindBias,
}

impl RankContext {
    pub fn new(website: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            website: website.into(),
            task_type: task_type.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: HashMap<String, f64>) -> Self {
        self.history = history;
        self
    }

    pub fn with_kind_bias(mut self, bias: KindBias) -> Self {
        self.kind_bias = bias;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectorScorer {
    weights: ScoringWeights,
}

impl SelectorScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Weighted sum of prior, uniqueness and history; always within `[0, 1]`.
    ///
    /// `prior` is the static kind prior (or an authored score). A learned bias for
    /// the kind pulls it halfway towards the observed rate.
    pub fn score(
        &self,
        locator: &str,
        kind: LocatorKind,
        prior: f64,
        uniqueness: Option<f64>,
        ctx: &RankContext,
    ) -> f64 {
        let (wp, wu, wh) = self.weights.normalized();
        let prior = match ctx.kind_bias.get(kind) {
            Some(rate) => (prior + rate) / 2.0,
            None => prior,
        };
        let uniqueness = uniqueness.unwrap_or(NEUTRAL);
        let history = ctx.history.get(locator).copied().unwrap_or(NEUTRAL);
        let s = wp * unit(prior) + wu * unit(uniqueness) + wh * unit(history);
        unit(s)
    }

    /// Re-scores an authored set and returns it in ranking order.
    ///
    /// Without a snapshot every locator gets the neutral uniqueness term.
    pub fn rescore(
        &self,
        set: &LocatorSet,
        snapshot: Option<&PageSnapshot>,
        ctx: &RankContext,
    ) -> Vec<CandidateLocator> {
        let mut out: Vec<CandidateLocator> = set
            .candidates
            .iter()
            .map(|c| {
                let uniqueness = snapshot.and_then(|s| s.count(&c.locator)).map(uniqueness_of);
                let score = self.score(&c.locator, c.kind, c.score(), uniqueness, ctx);
                c.clone().with_score(score)
            })
            .collect();
        out.sort_by(|a, b| a.rank_cmp(b));
        out
    }
}

/// `1 / match_count`; a locator matching nothing is worthless on this page.
pub(crate) fn uniqueness_of(count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        1.0 / count as f64
    }
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_and_bias_move_the_score() {
        let scorer = SelectorScorer::default();
        let cold = RankContext::new("shop.test", "login");
        let base = scorer.score("#a", LocatorKind::Attribute, 0.9, Some(1.0), &cold);
        assert!((base - (0.4 * 0.9 + 0.3 + 0.15)).abs() < 1e-9);

        let mut history = HashMap::new();
        history.insert("#a".to_string(), 0.0);
        let mut bias = KindBias::default();
        bias.set(LocatorKind::Attribute, 0.1);
        let warm = cold.clone().with_history(history).with_kind_bias(bias);
        let s = scorer.score("#a", LocatorKind::Attribute, 0.9, Some(1.0), &warm);
        assert!(s < base);
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn degenerate_weights_stay_in_range() {
        let scorer = SelectorScorer::new(ScoringWeights {
            prior: f64::NAN,
            uniqueness: -1.0,
            history: 0.0,
        });
        let s = scorer.score("x", LocatorKind::Text, 0.35, None, &RankContext::default());
        assert!((s - 0.35).abs() < 1e-9);
    }
}
