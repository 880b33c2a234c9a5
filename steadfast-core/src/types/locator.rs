use std::cmp::Ordering;
use std::fmt;

/// Family a locator string belongs to.
///
/// The declaration order is also the tie-break priority used when two candidates
/// carry the same score: attribute-based locators outrank structural ones, which
/// outrank positional/text ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    /// `#id`, `[data-testid=..]`, `[name=..]`
    Attribute,
    /// `[aria-label=..]`, `[role=..]`, `[placeholder=..]`
    Accessibility,
    /// tag, class and type combinations
    Structural,
    /// absolute or relative XPath
    Path,
    /// `text=..` matches
    Text,
    /// no element: navigation, screenshots and fixed waits
    Page,
}

impl LocatorKind {
    pub const ALL: [LocatorKind; 6] = [
        LocatorKind::Attribute,
        LocatorKind::Accessibility,
        LocatorKind::Structural,
        LocatorKind::Path,
        LocatorKind::Text,
        LocatorKind::Page,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorKind::Attribute => "attribute",
            LocatorKind::Accessibility => "accessibility",
            LocatorKind::Structural => "structural",
            LocatorKind::Path => "path",
            LocatorKind::Text => "text",
            LocatorKind::Page => "page",
        }
    }

    /// Higher is preferred.
    pub fn priority(&self) -> u8 {
        match self {
            LocatorKind::Attribute => 5,
            LocatorKind::Accessibility => 4,
            LocatorKind::Structural => 3,
            LocatorKind::Path => 2,
            LocatorKind::Text => 1,
            LocatorKind::Page => 0,
        }
    }

    /// Static prior used by the scorer before any history exists.
    pub fn prior(&self) -> f64 {
        match self {
            LocatorKind::Attribute => 0.9,
            LocatorKind::Accessibility => 0.8,
            LocatorKind::Structural => 0.6,
            LocatorKind::Path => 0.4,
            LocatorKind::Text => 0.35,
            LocatorKind::Page => 0.5,
        }
    }

    /// Infers the kind of an authored locator string.
    pub fn infer(locator: &str) -> LocatorKind {
        let l = locator.trim();
        if l.starts_with('/') || l.starts_with("(/") || l.starts_with("xpath=") {
            return LocatorKind::Path;
        }
        if l.starts_with("text=") || l.contains(":contains(") || l.contains(":has-text(") {
            return LocatorKind::Text;
        }
        if l.contains("[aria-") || l.contains("[role=") || l.contains("[placeholder=") {
            return LocatorKind::Accessibility;
        }
        if l.starts_with('#')
            || l.contains("[data-testid=")
            || l.contains("[data-test=")
            || l.contains("[data-qa=")
            || l.contains("[data-cy=")
            || l.contains("[id=")
            || l.contains("[name=")
        {
            return LocatorKind::Attribute;
        }
        LocatorKind::Structural
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked locator proposal for a target element.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "CandidateRepr")]
pub struct CandidateLocator {
    pub locator: String,
    pub kind: LocatorKind,
    score: f64,
}

impl CandidateLocator {
    /// Builds a candidate; the score is clamped into `[0, 1]` (NaN becomes 0).
    pub fn new(locator: impl Into<String>, kind: LocatorKind, score: f64) -> Self {
        Self {
            locator: locator.into(),
            kind,
            score: clamp_unit(score),
        }
    }

    /// Candidate for an authored locator string, scored with its kind prior.
    pub fn authored(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        let kind = LocatorKind::infer(&locator);
        Self::new(locator, kind, kind.prior())
    }

    /// Pseudo candidate used by page-level actions (navigate, screenshot, fixed wait).
    pub fn page(label: impl Into<String>) -> Self {
        Self::new(label, LocatorKind::Page, 1.0)
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = clamp_unit(score);
        self
    }

    /// Ranking order: score descending, then kind priority, then lexical order.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.kind.priority().cmp(&self.kind.priority()))
            .then_with(|| self.locator.cmp(&other.locator))
    }
}

#[derive(serde::Deserialize)]
struct CandidateRepr {
    locator: String,
    kind: LocatorKind,
    score: f64,
}

impl From<CandidateRepr> for CandidateLocator {
    fn from(r: CandidateRepr) -> Self {
        CandidateLocator::new(r.locator, r.kind, r.score)
    }
}

impl<'de> serde::Deserialize<'de> for LocatorSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Plain(String),
            Scored {
                locator: String,
                #[serde(default)]
                kind: Option<LocatorKind>,
                #[serde(default)]
                score: Option<f64>,
            },
        }

        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<Entry>),
        }

        let entries = match Raw::deserialize(deserializer)? {
            Raw::One(s) => vec![Entry::Plain(s)],
            Raw::Many(v) => v,
        };
        let candidates = entries
            .into_iter()
            .map(|e| match e {
                Entry::Plain(s) => CandidateLocator::authored(s),
                Entry::Scored {
                    locator,
                    kind,
                    score,
                } => {
                    let kind = kind.unwrap_or_else(|| LocatorKind::infer(&locator));
                    CandidateLocator::new(locator, kind, score.unwrap_or(kind.prior()))
                }
            })
            .collect();
        Ok(LocatorSet { candidates })
    }
}

/// A set of alternative locators that all describe the same element.
///
/// Deserializes from a single string, a list of strings, or a list of
/// `{ locator, kind?, score? }` entries.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
#[serde(transparent)]
pub struct LocatorSet {
    pub candidates: Vec<CandidateLocator>,
}

impl LocatorSet {
    pub fn new(candidates: Vec<CandidateLocator>) -> Self {
        Self { candidates }
    }

    pub fn from_strs<I, S>(locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: locators.into_iter().map(CandidateLocator::authored).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Candidates of this set in ranking order.
    pub fn ranked(&self) -> Vec<CandidateLocator> {
        let mut out = self.candidates.clone();
        out.sort_by(|a, b| a.rank_cmp(b));
        out
    }
}

fn clamp_unit(v: f64) -> f64 {
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
    fn infers_kinds_from_authored_strings() {
        assert_eq!(LocatorKind::infer("#login-btn"), LocatorKind::Attribute);
        assert_eq!(LocatorKind::infer("input[name=\"email\"]"), LocatorKind::Attribute);
        assert_eq!(LocatorKind::infer("button[type=submit]"), LocatorKind::Structural);
        assert_eq!(LocatorKind::infer("[aria-label=\"Close\"]"), LocatorKind::Accessibility);
        assert_eq!(LocatorKind::infer("//form/button[2]"), LocatorKind::Path);
        assert_eq!(LocatorKind::infer("text=Sign in"), LocatorKind::Text);
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(CandidateLocator::new("a", LocatorKind::Text, 4.0).score(), 1.0);
        assert_eq!(CandidateLocator::new("a", LocatorKind::Text, -1.0).score(), 0.0);
        assert_eq!(CandidateLocator::new("a", LocatorKind::Text, f64::NAN).score(), 0.0);
    }

    #[test]
    fn ties_break_on_kind_then_lexical() {
        let mut v = vec![
            CandidateLocator::new("text=Go", LocatorKind::Text, 0.5),
            CandidateLocator::new("button.b", LocatorKind::Structural, 0.5),
            CandidateLocator::new("button.a", LocatorKind::Structural, 0.5),
            CandidateLocator::new("#go", LocatorKind::Attribute, 0.5),
        ];
        v.sort_by(|a, b| a.rank_cmp(b));
        let order: Vec<_> = v.iter().map(|c| c.locator.as_str()).collect();
        assert_eq!(order, vec!["#go", "button.a", "button.b", "text=Go"]);
    }
}
