use scraper::ElementRef;

use super::snapshot::element_text;

/// Attributes searched for hint tokens, besides the element text.
const SEARCHED_ATTRS: &[&str] = &["id", "name", "aria-label", "placeholder", "value", "title", "type"];

const INTERACTIVE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea", "label", "option", "summary"];

/// Textual/semantic description of the element a locator should address.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ElementHint {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ElementHint {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
            role: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into().to_ascii_lowercase());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into().to_ascii_lowercase());
        self
    }

    pub fn tokens(&self) -> Vec<String> {
        tokenize(&self.text)
    }

    /// Fraction of hint tokens found on the element, `0.0` when the tag or role
    /// filter excludes it.
    pub fn match_score(&self, el: ElementRef<'_>) -> f64 {
        let value = el.value();
        if let Some(tag) = &self.tag {
            if value.name() != tag {
                return 0.0;
            }
        }
        if let Some(role) = &self.role {
            if role_of(el).as_deref() != Some(role.as_str()) {
                return 0.0;
            }
        }

        let tokens = self.tokens();
        if tokens.is_empty() {
            // Only tag/role were given.
            return if self.tag.is_some() || self.role.is_some() { 1.0 } else { 0.0 };
        }

        let mut haystack = element_text(el).to_lowercase();
        for attr in SEARCHED_ATTRS {
            if let Some(v) = value.attr(attr) {
                haystack.push(' ');
                haystack.push_str(&v.to_lowercase());
            }
        }
        let hay_tokens = tokenize(&haystack);

        let matched = tokens
            .iter()
            .filter(|t| {
                hay_tokens
                    .iter()
                    .any(|h| h == *t || (t.len() >= 3 && h.contains(t.as_str())))
            })
            .count();
        matched as f64 / tokens.len() as f64
    }
}

/// Explicit `role` attribute, else the implicit ARIA role of common tags.
pub(crate) fn role_of(el: ElementRef<'_>) -> Option<String> {
    let value = el.value();
    if let Some(role) = value.attr("role") {
        return Some(role.trim().to_ascii_lowercase());
    }
    let implicit = match value.name() {
        "button" => "button",
        "a" if value.attr("href").is_some() => "link",
        "select" => "combobox",
        "textarea" => "textbox",
        "input" => match value.attr("type").map(|t| t.to_ascii_lowercase()).as_deref() {
            Some("button" | "submit" | "reset" | "image") => "button",
            Some("checkbox") => "checkbox",
            Some("radio") => "radio",
            Some("search") => "searchbox",
            Some("hidden") => return None,
            _ => "textbox",
        },
        _ => return None,
    };
    Some(implicit.to_string())
}

pub(crate) fn is_interactive(el: ElementRef<'_>) -> bool {
    let value = el.value();
    INTERACTIVE_TAGS.contains(&value.name())
        || value.attr("role").is_some()
        || value.attr("onclick").is_some()
        || value.attr("tabindex").is_some()
}

fn tokenize(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::PageSnapshot;

    #[test]
    fn matches_on_attributes_and_text() {
        let snap = PageSnapshot::parse(
            r#"<form><input id="userEmail" placeholder="Email address"><button>Log in</button></form>"#,
        );
        let hint = ElementHint::new("email");
        let scores: Vec<(String, f64)> = snap
            .elements()
            .map(|e| (e.value().name().to_string(), hint.match_score(e)))
            .collect();
        assert!(scores.iter().any(|(t, s)| t == "input" && *s == 1.0));
        assert!(scores.iter().any(|(t, s)| t == "button" && *s == 0.0));
    }

    #[test]
    fn role_filter_uses_implicit_roles() {
        let snap = PageSnapshot::parse(r#"<div>Submit</div><input type="submit" value="Submit">"#);
        let hint = ElementHint::new("submit").with_role("button");
        let matched: Vec<&str> = snap
            .elements()
            .filter(|e| hint.match_score(*e) > 0.0)
            .map(|e| e.value().name())
            .collect();
        assert_eq!(matched, vec!["input"]);
    }
}
