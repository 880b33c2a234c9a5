use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use steadfast_core::{Experience, LocatorKind, Strategy};

use super::config::LearningConfig;
use super::shape::shape_of;

/// Recency-weighted success rate: every observation multiplies the previous
/// weight by the decay factor before adding itself.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedRate {
    pub weighted_success: f64,
    pub weighted_total: f64,
    pub observations: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl WeightedRate {
    pub fn observe(&mut self, success: bool, decay: f64, at: DateTime<Utc>) {
        self.weighted_success = self.weighted_success * decay + f64::from(u8::from(success));
        self.weighted_total = self.weighted_total * decay + 1.0;
        self.observations += 1;
        self.last_seen = Some(at);
    }

    pub fn rate(&self) -> f64 {
        if self.weighted_total <= 0.0 {
            return 0.0;
        }
        (self.weighted_success / self.weighted_total).clamp(0.0, 1.0)
    }

    /// Rate discounted by how much evidence backs it.
    pub fn confidence(&self, min_observations: u64) -> f64 {
        let needed = (min_observations.max(1) * 2) as f64;
        let evidence = (self.observations as f64 / needed).min(1.0);
        self.rate() * evidence
    }
}

/// Success statistics for one locator shape. Revisions are never deleted; a
/// contradicted revision is marked superseded and a new one takes over.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub task_type: String,
    pub shape: String,
    pub kind: LocatorKind,
    pub revision: u32,
    pub occurrences: u64,
    pub successes: u64,
    pub rate: WeightedRate,
    /// Rate captured once the revision had enough observations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    #[serde(default)]
    pub superseded: bool,
    pub created_at: DateTime<Utc>,
}

impl Pattern {
    fn new(task_type: &str, shape: String, kind: LocatorKind, revision: u32, at: DateTime<Utc>) -> Self {
        Self {
            task_type: task_type.to_string(),
            shape,
            kind,
            revision,
            occurrences: 0,
            successes: 0,
            rate: WeightedRate::default(),
            baseline: None,
            superseded: false,
            created_at: at,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.occurrences == 0 {
            return 0.0;
        }
        self.successes as f64 / self.occurrences as f64
    }
}

/// Everything learned about one website. Map keys are plain strings so the
/// blob stays readable and stable in storage.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningModel {
    pub domain: String,
    #[serde(default)]
    pub observations: u64,
    /// task type -> locator -> rate
    #[serde(default)]
    pub locators: BTreeMap<String, BTreeMap<String, WeightedRate>>,
    /// task type -> action id -> locator -> rate
    #[serde(default)]
    pub elements: BTreeMap<String, BTreeMap<String, BTreeMap<String, WeightedRate>>>,
    /// task type -> strategy id -> rate
    #[serde(default)]
    pub strategies: BTreeMap<String, BTreeMap<String, WeightedRate>>,
    /// locator kind -> rate
    #[serde(default)]
    pub kinds: BTreeMap<String, WeightedRate>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LearningModel {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observations == 0
    }

    pub fn observe(&mut self, exp: &Experience, cfg: &LearningConfig) {
        let at = exp.recorded_at;
        self.observations += 1;
        self.updated_at = Some(at);

        self.locators
            .entry(exp.task_type.clone())
            .or_default()
            .entry(exp.locator.clone())
            .or_default()
            .observe(exp.success, cfg.decay, at);

        if let Some(action_id) = &exp.action_id {
            self.elements
                .entry(exp.task_type.clone())
                .or_default()
                .entry(action_id.clone())
                .or_default()
                .entry(exp.locator.clone())
                .or_default()
                .observe(exp.success, cfg.decay, at);
        }

        // Page pseudo-locators say nothing about element addressing.
        if exp.locator_kind != LocatorKind::Page {
            self.kinds
                .entry(exp.locator_kind.as_str().to_string())
                .or_default()
                .observe(exp.success, cfg.decay, at);
            self.observe_pattern(exp, cfg);
        }

        if let Some(strategy) = exp.strategy {
            self.strategies
                .entry(exp.task_type.clone())
                .or_default()
                .entry(strategy.as_str().to_string())
                .or_default()
                .observe(exp.success, cfg.decay, at);
        }
    }

    fn observe_pattern(&mut self, exp: &Experience, cfg: &LearningConfig) {
        let at = exp.recorded_at;
        let shape = shape_of(&exp.locator);
        let idx = match self
            .patterns
            .iter()
            .position(|p| !p.superseded && p.task_type == exp.task_type && p.shape == shape)
        {
            Some(i) => i,
            None => {
                self.patterns
                    .push(Pattern::new(&exp.task_type, shape.clone(), exp.locator_kind, 1, at));
                self.patterns.len() - 1
            }
        };

        let p = &mut self.patterns[idx];
        p.occurrences += 1;
        p.successes += u64::from(exp.success);
        p.rate.observe(exp.success, cfg.decay, at);

        match p.baseline {
            None if p.occurrences >= cfg.min_observations => p.baseline = Some(p.rate.rate()),
            Some(baseline) if (p.rate.rate() - baseline).abs() >= cfg.contradiction_margin => {
                p.superseded = true;
                let mut next = Pattern::new(&exp.task_type, shape, exp.locator_kind, p.revision + 1, at);
                next.occurrences = 1;
                next.successes = u64::from(exp.success);
                next.rate.observe(exp.success, cfg.decay, at);
                self.patterns.push(next);
            }
            _ => {}
        }
    }

    /// Locator stats for one action of a task type.
    pub fn element(&self, task_type: &str, action_id: &str) -> Option<&BTreeMap<String, WeightedRate>> {
        self.elements.get(task_type)?.get(action_id)
    }

    pub fn active_patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(|p| !p.superseded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Learned,
    ColdStart,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub locator: String,
    pub kind: LocatorKind,
    pub confidence: f64,
    pub source: SuggestionSource,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySuggestion {
    pub strategy: Strategy,
    pub confidence: f64,
    pub source: SuggestionSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(locator: &str, success: bool) -> Experience {
        Experience {
            id: format!("{locator}-{success}"),
            locator: locator.to_string(),
            locator_kind: LocatorKind::infer(locator),
            success,
            website: "shop.test".to_string(),
            task_type: "login".to_string(),
            action_id: Some("submit".to_string()),
            url: None,
            strategy: Some(Strategy::Direct),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn recent_outcomes_weigh_more() {
        let mut r = WeightedRate::default();
        for _ in 0..10 {
            r.observe(false, 0.9, Utc::now());
        }
        r.observe(true, 0.9, Utc::now());
        r.observe(true, 0.9, Utc::now());
        // Unweighted this would be 2/12.
        assert!(r.rate() > 2.0 / 12.0);
    }

    #[test]
    fn contradicted_pattern_is_superseded_not_deleted() {
        let cfg = LearningConfig::default();
        let mut m = LearningModel::new("shop.test");
        for _ in 0..3 {
            m.observe(&exp("#login", true), &cfg);
        }
        assert_eq!(m.patterns.len(), 1);
        assert_eq!(m.patterns[0].baseline, Some(1.0));

        for _ in 0..5 {
            m.observe(&exp("#signin", false), &cfg);
        }
        assert!(m.patterns.len() >= 2);
        assert!(m.patterns[0].superseded);
        assert_eq!(m.patterns[0].revision, 1);
        let active: Vec<_> = m.active_patterns().collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].revision >= 2);
        assert_eq!(active[0].shape, "#*");
    }

    #[test]
    fn locators_are_also_kept_per_action() {
        let cfg = LearningConfig::default();
        let mut m = LearningModel::new("shop.test");
        m.observe(&exp("#signin", true), &cfg);
        let mut other = exp("#password", true);
        other.action_id = Some("password".to_string());
        m.observe(&other, &cfg);
        let mut anonymous = exp("#legacy", true);
        anonymous.action_id = None;
        m.observe(&anonymous, &cfg);

        let submit = m.element("login", "submit").expect("submit stats");
        assert_eq!(submit.keys().collect::<Vec<_>>(), ["#signin"]);
        let password = m.element("login", "password").expect("password stats");
        assert_eq!(password.keys().collect::<Vec<_>>(), ["#password"]);
        assert_eq!(m.locators["login"].len(), 3);
    }

    #[test]
    fn page_locators_do_not_touch_kind_stats() {
        let cfg = LearningConfig::default();
        let mut m = LearningModel::new("shop.test");
        let mut e = exp("https://shop.test/", true);
        e.locator_kind = LocatorKind::Page;
        m.observe(&e, &cfg);
        assert!(m.kinds.is_empty());
        assert!(m.patterns.is_empty());
        assert_eq!(m.observations, 1);
    }
}
