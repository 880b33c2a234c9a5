mod hint;
mod scorer;
mod snapshot;
mod strategies;

use std::collections::HashMap;

use scraper::ElementRef;

use crate::types::CandidateLocator;

pub use hint::ElementHint;
pub use scorer::{KindBias, RankContext, ScoringWeights, SelectorScorer, NEUTRAL};
pub use snapshot::PageSnapshot;
pub use strategies::{
    default_strategies, AccessibilityStrategy, CandidateStrategy, PathStrategy,
    StableAttributeStrategy, StructuralStrategy, TextStrategy,
};

use hint::is_interactive;
use scorer::uniqueness_of;

/// Elements considered per hint; the best matches only.
const MAX_MATCHED_ELEMENTS: usize = 3;

/// Ranked candidate locators for the element described by `hint`, using the
/// default strategies and weights.
pub fn rank(snapshot: &PageSnapshot, hint: &ElementHint, ctx: &RankContext) -> Vec<CandidateLocator> {
    SelectorScorer::default().rank(snapshot, hint, ctx, &default_strategies())
}

impl SelectorScorer {
    /// Runs every strategy over the elements best matching `hint`, scores the
    /// proposals, collapses duplicates to their best score and sorts.
    ///
    /// Deterministic for the same inputs; an empty result means nothing on the
    /// page matched the hint.
    pub fn rank(
        &self,
        snapshot: &PageSnapshot,
        hint: &ElementHint,
        ctx: &RankContext,
        strategies: &[Box<dyn CandidateStrategy>],
    ) -> Vec<CandidateLocator> {
        let elements = matched_elements(snapshot, hint);
        let mut best: HashMap<String, CandidateLocator> = HashMap::new();

        for el in elements {
            for strategy in strategies {
                let kind = strategy.kind();
                for locator in strategy.propose(el) {
                    let uniqueness = snapshot.count(&locator).map(uniqueness_of);
                    let score = self.score(&locator, kind, kind.prior(), uniqueness, ctx);
                    let candidate = CandidateLocator::new(locator.clone(), kind, score);
                    match best.get(&locator) {
                        Some(existing) if existing.rank_cmp(&candidate).is_le() => {}
                        _ => {
                            best.insert(locator, candidate);
                        }
                    }
                }
            }
        }

        let mut out: Vec<CandidateLocator> = best.into_values().collect();
        out.sort_by(|a, b| a.rank_cmp(b));
        out
    }
}

fn matched_elements<'a>(snapshot: &'a PageSnapshot, hint: &ElementHint) -> Vec<ElementRef<'a>> {
    let scored: Vec<(usize, ElementRef<'a>, f64)> = snapshot
        .elements()
        .enumerate()
        .map(|(i, el)| (i, el, hint.match_score(el)))
        .filter(|(_, _, s)| *s > 0.0)
        .collect();

    // A non-interactive container that only matched through a descendant adds nothing.
    let mut kept: Vec<(usize, ElementRef<'a>, f64)> = scored
        .iter()
        .filter(|(_, el, s)| {
            is_interactive(*el)
                || !scored
                    .iter()
                    .any(|(_, other, os)| other.id() != el.id() && *os >= *s && is_ancestor(*el, *other))
        })
        .copied()
        .collect();

    kept.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| is_interactive(b.1).cmp(&is_interactive(a.1)))
            .then_with(|| a.0.cmp(&b.0))
    });
    kept.truncate(MAX_MATCHED_ELEMENTS);
    kept.into_iter().map(|(_, el, _)| el).collect()
}

fn is_ancestor(ancestor: ElementRef<'_>, node: ElementRef<'_>) -> bool {
    node.ancestors().any(|a| a.id() == ancestor.id())
}
