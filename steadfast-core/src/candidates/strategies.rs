use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::hint::role_of;
use super::snapshot::{element_text, PageSnapshot};
use crate::types::LocatorKind;

static CSS_IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("valid"));
/// Class names that look generated (hashes, long digit runs) and will not survive a rebuild.
static VOLATILE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{3,}|^[A-Za-z]{1,4}-[A-Za-z]*[0-9][A-Za-z0-9]{3,}$|__[A-Za-z0-9]{5,}$").expect("valid"));

const TEST_ID_ATTRS: &[&str] = &["data-testid", "data-test", "data-qa", "data-cy"];
const MAX_TEXT_LEN: usize = 80;

/// One independent way of deriving locators for an element.
pub trait CandidateStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> LocatorKind;

    /// Locator strings addressing `el`; empty when this strategy has nothing to offer.
    fn propose(&self, el: ElementRef<'_>) -> Vec<String>;
}

/// `#id`, `[data-testid="…"]` and `tag[name="…"]`.
pub struct StableAttributeStrategy;

impl CandidateStrategy for StableAttributeStrategy {
    fn name(&self) -> &'static str {
        "stable-attribute"
    }

    fn kind(&self) -> LocatorKind {
        LocatorKind::Attribute
    }

    fn propose(&self, el: ElementRef<'_>) -> Vec<String> {
        let value = el.value();
        let mut out = Vec::new();
        if let Some(id) = value.attr("id").map(str::trim).filter(|s| !s.is_empty()) {
            if CSS_IDENT_RE.is_match(id) {
                out.push(format!("#{id}"));
            } else {
                out.push(format!("[id={}]", quote(id)));
            }
        }
        for attr in TEST_ID_ATTRS {
            if let Some(v) = value.attr(attr).filter(|s| !s.trim().is_empty()) {
                out.push(format!("[{attr}={}]", quote(v)));
            }
        }
        if let Some(name) = value.attr("name").filter(|s| !s.trim().is_empty()) {
            out.push(format!("{}[name={}]", value.name(), quote(name)));
        }
        out
    }
}

/// `[aria-label="…"]`, `tag[role="…"][aria-label="…"]` and `tag[placeholder="…"]`.
pub struct AccessibilityStrategy;

impl CandidateStrategy for AccessibilityStrategy {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    fn kind(&self) -> LocatorKind {
        LocatorKind::Accessibility
    }

    fn propose(&self, el: ElementRef<'_>) -> Vec<String> {
        let value = el.value();
        let tag = value.name();
        let mut out = Vec::new();
        if let Some(label) = value.attr("aria-label").filter(|s| !s.trim().is_empty()) {
            out.push(format!("[aria-label={}]", quote(label)));
            if let Some(role) = value.attr("role") {
                out.push(format!("{tag}[role={}][aria-label={}]", quote(role), quote(label)));
            }
        }
        if let Some(ph) = value.attr("placeholder").filter(|s| !s.trim().is_empty()) {
            out.push(format!("{tag}[placeholder={}]", quote(ph)));
        }
        if out.is_empty() {
            if let (Some(role), Some(title)) = (value.attr("role"), value.attr("title")) {
                out.push(format!("{tag}[role={}][title={}]", quote(role), quote(title)));
            }
        }
        out
    }
}

/// `tag.class1.class2` and `tag[type="…"]`.
pub struct StructuralStrategy;

impl CandidateStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn kind(&self) -> LocatorKind {
        LocatorKind::Structural
    }

    fn propose(&self, el: ElementRef<'_>) -> Vec<String> {
        let value = el.value();
        let tag = value.name();
        let mut out = Vec::new();
        let classes: Vec<&str> = value
            .attr("class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| CSS_IDENT_RE.is_match(c) && !VOLATILE_CLASS_RE.is_match(c))
            .collect();
        if !classes.is_empty() {
            out.push(format!("{tag}.{}", classes.join(".")));
        }
        if let Some(ty) = value.attr("type").filter(|s| !s.trim().is_empty()) {
            out.push(format!("{tag}[type={}]", quote(ty)));
        }
        if out.is_empty() && role_of(el).is_some() {
            out.push(tag.to_string());
        }
        out
    }
}

/// `text=…` on the element's visible text.
pub struct TextStrategy;

impl CandidateStrategy for TextStrategy {
    fn name(&self) -> &'static str {
        "text"
    }

    fn kind(&self) -> LocatorKind {
        LocatorKind::Text
    }

    fn propose(&self, el: ElementRef<'_>) -> Vec<String> {
        let text = element_text(el);
        if text.is_empty() || text.chars().count() > MAX_TEXT_LEN {
            return Vec::new();
        }
        vec![format!("text={text}")]
    }
}

/// Absolute XPath with positional indices.
pub struct PathStrategy;

impl CandidateStrategy for PathStrategy {
    fn name(&self) -> &'static str {
        "path"
    }

    fn kind(&self) -> LocatorKind {
        LocatorKind::Path
    }

    fn propose(&self, el: ElementRef<'_>) -> Vec<String> {
        vec![PageSnapshot::xpath_of(el)]
    }
}

pub fn default_strategies() -> Vec<Box<dyn CandidateStrategy>> {
    vec![
        Box::new(StableAttributeStrategy),
        Box::new(AccessibilityStrategy),
        Box::new(StructuralStrategy),
        Box::new(TextStrategy),
        Box::new(PathStrategy),
    ]
}

/// Double-quoted CSS attribute value.
fn quote(v: &str) -> String {
    format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\""))
}
