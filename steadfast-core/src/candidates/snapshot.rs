use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static XPATH_STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9\-]*)(?:\[([1-9][0-9]*)\])?$").expect("valid"));

/// Tags that never hold an addressable element.
const SKIPPED_TAGS: &[&str] = &[
    "html", "head", "body", "script", "style", "meta", "link", "title", "noscript", "template",
];

/// Static, read-only view of a page used to generate and evaluate locators.
///
/// Parsing never touches the live page; the snapshot is whatever HTML the
/// driver returned at the time.
pub struct PageSnapshot {
    html: Html,
}

impl PageSnapshot {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Addressable elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| !SKIPPED_TAGS.contains(&el.value().name()))
    }

    /// Number of elements `locator` matches, or `None` when the locator cannot be
    /// evaluated statically (unsupported XPath, invalid CSS).
    pub fn count(&self, locator: &str) -> Option<usize> {
        let l = locator.trim();
        if let Some(text) = l.strip_prefix("text=") {
            return Some(self.count_text(text));
        }
        if let Some(path) = l.strip_prefix("xpath=") {
            return self.count_xpath(path);
        }
        if l.starts_with('/') {
            return self.count_xpath(l);
        }
        let selector = Selector::parse(l).ok()?;
        Some(self.html.select(&selector).count())
    }

    /// Case-insensitive check against the visible text of the whole document.
    pub fn contains_text(&self, text: &str) -> bool {
        let needle = normalize_text(text).to_lowercase();
        if needle.is_empty() {
            return true;
        }
        normalize_text(&self.html.root_element().text().collect::<String>())
            .to_lowercase()
            .contains(&needle)
    }

    /// Absolute XPath with a 1-based index on every step below `html`.
    pub fn xpath_of(el: ElementRef<'_>) -> String {
        let mut steps = Vec::new();
        let mut current = Some(el);
        while let Some(node) = current {
            let tag = node.value().name();
            let parent = node.parent().and_then(ElementRef::wrap);
            if parent.is_none() {
                steps.push(tag.to_string());
            } else {
                let index = node
                    .prev_siblings()
                    .filter_map(ElementRef::wrap)
                    .filter(|s| s.value().name() == tag)
                    .count()
                    + 1;
                steps.push(format!("{tag}[{index}]"));
            }
            current = parent;
        }
        steps.reverse();
        format!("/{}", steps.join("/"))
    }

    fn count_text(&self, text: &str) -> usize {
        let needle = normalize_text(text).to_lowercase();
        if needle.is_empty() {
            return 0;
        }
        // Deepest elements only: an ancestor repeats its child's text.
        self.elements()
            .filter(|el| element_text(*el).to_lowercase() == needle)
            .filter(|el| {
                !el.children()
                    .filter_map(ElementRef::wrap)
                    .any(|c| element_text(c).to_lowercase() == needle)
            })
            .count()
    }

    fn count_xpath(&self, path: &str) -> Option<usize> {
        let rest = path.strip_prefix('/')?;
        if rest.starts_with('/') {
            return None;
        }
        let mut steps = rest.split('/');
        let root = self.html.root_element();
        let first = XPATH_STEP_RE.captures(steps.next()?)?;
        if first.get(1)?.as_str() != root.value().name() {
            return Some(0);
        }
        let mut current = vec![root];
        for step in steps {
            let caps = XPATH_STEP_RE.captures(step)?;
            let tag = caps.get(1)?.as_str();
            let index = match caps.get(2) {
                Some(m) => Some(m.as_str().parse::<usize>().ok()?),
                None => None,
            };
            let mut next = Vec::new();
            for node in &current {
                let same_tag = node
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|c| c.value().name() == tag);
                match index {
                    Some(i) => next.extend(same_tag.skip(i - 1).take(1)),
                    None => next.extend(same_tag),
                }
            }
            current = next;
        }
        Some(current.len())
    }
}

/// Visible text of an element with whitespace collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<String>())
}

pub(crate) fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <form><input name="email"><button type="submit">Sign in</button></form>
        <div><button>Cancel</button><button class="btn primary">Sign in</button></div>
    </body></html>"#;

    #[test]
    fn counts_css_text_and_path() {
        let snap = PageSnapshot::parse(PAGE);
        assert_eq!(snap.count("button"), Some(3));
        assert_eq!(snap.count("input[name=\"email\"]"), Some(1));
        assert_eq!(snap.count("text=Sign in"), Some(2));
        assert_eq!(snap.count("/html/body[1]/div[1]/button[2]"), Some(1));
        assert_eq!(snap.count("//button[@id='x']"), None);
        assert_eq!(snap.count("button[[["), None);
    }

    #[test]
    fn xpath_round_trips_through_count() {
        let snap = PageSnapshot::parse(PAGE);
        for el in snap.elements() {
            let path = PageSnapshot::xpath_of(el);
            assert_eq!(snap.count(&path), Some(1), "{path}");
        }
    }
}
