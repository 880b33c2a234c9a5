use std::sync::LazyLock;

use regex::Regex;

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"="[^"]*"|='[^']*'|=[^\]\s]+"#).expect("valid"));
static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").expect("valid"));
static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[A-Za-z0-9_\-:\\.]+").expect("valid"));
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[A-Za-z_][A-Za-z0-9_\-]*").expect("valid"));

/// Reduces a locator to its structural shape so that `#login` and `#signin`
/// count as the same pattern (`#*`).
pub fn shape_of(locator: &str) -> String {
    let l = locator.trim();
    if l.starts_with("text=") {
        return "text=*".to_string();
    }
    if l.starts_with('/') || l.starts_with("xpath=") {
        return INDEX_RE.replace_all(l, "[*]").into_owned();
    }
    let s = QUOTED_RE.replace_all(l, "=*");
    let s = ID_RE.replace_all(&s, "#*");
    CLASS_RE.replace_all(&s, ".*").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes() {
        assert_eq!(shape_of("#login-btn"), "#*");
        assert_eq!(shape_of(r#"[data-testid="submit"]"#), "[data-testid=*]");
        assert_eq!(shape_of(r#"input[name="email"]"#), "input[name=*]");
        assert_eq!(shape_of("button.btn.btn-primary"), "button.*.*");
        assert_eq!(shape_of("text=Sign in"), "text=*");
        assert_eq!(shape_of("/html/body[1]/form[2]/button[1]"), "/html/body[*]/form[*]/button[*]");
    }
}
