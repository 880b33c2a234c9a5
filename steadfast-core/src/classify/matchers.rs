use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::ErrorCategory;

/// Ordered matcher table. The first category whose pattern matches wins, so the
/// order encodes precedence: a challenge page that also times out is a captcha.
pub(crate) static MATCHERS: LazyLock<Vec<(ErrorCategory, Regex)>> = LazyLock::new(|| {
    [
        (
            ErrorCategory::Captcha,
            r"(?i)captcha|hcaptcha|turnstile|are you a robot|verify (that )?you are (a )?human|challenge[- ]platform|cf-challenge|unusual traffic",
        ),
        (
            ErrorCategory::Authentication,
            r"(?i)\b401\b|\b403\b|unauthori[sz]ed|forbidden|authentication (failed|required)|login required|not logged in|invalid (credentials|password|username)|session (expired|invalid)|access denied",
        ),
        (
            ErrorCategory::Timeout,
            r"(?i)time[sd]? ?out|deadline (exceeded|elapsed)|took too long",
        ),
        (
            ErrorCategory::Network,
            r"(?i)net::err_|connection (refused|reset|closed|aborted)|econnrefused|econnreset|enotfound|dns|socket hang up|network (error|unreachable|changed)|tls handshake|ssl error|\b50[234]\b",
        ),
        (
            ErrorCategory::ElementNotInteractive,
            r"(?i)not interactable|not clickable|click intercepted|would receive the click|obscured|element is disabled|not (visible|enabled)|stale element|detached from (the )?dom|read-?only",
        ),
        (
            ErrorCategory::SelectorNotFound,
            r"(?i)no such element|element not found|unable to locate|could not (find|locate)|failed to find|no node found|did not match any|invalid selector|no elements? match",
        ),
        (
            ErrorCategory::Navigation,
            r"(?i)navigation (failed|aborted|interrupted)|too many redirects|redirect loop|page crashed|frame (was )?detached|\b404\b|page not found",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, Regex::new(pattern).expect("valid")))
    .collect()
});

/// Quoted fragments. A single quote only opens a fragment when it does not
/// follow a word character, so contractions survive.
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"\n]*"|(^|\W)'[^'\n]*'"#).expect("valid"));

/// A locator-shaped token right after a lookup failure prefix.
static LOOKUP_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(no such element|element not found|unable to locate element|could not (?:find|locate)(?: element)?|failed to find(?: element)?)\s*:\s*(?:[#.\[/(*]|\w+=)\S*",
    )
    .expect("valid")
});

/// Removes page-authored text (the selector being tried, quoted fragments and
/// locator tokens) so that only the driver's own wording is matched.
pub(crate) fn scrub<'a>(raw: &'a str, selector: Option<&str>) -> Cow<'a, str> {
    let mut out = Cow::Borrowed(raw);
    if let Some(sel) = selector.map(str::trim).filter(|s| !s.is_empty()) {
        if out.contains(sel) {
            out = Cow::Owned(out.replace(sel, " "));
        }
    }
    if QUOTED.is_match(&out) {
        out = Cow::Owned(QUOTED.replace_all(&out, "$1 ").into_owned());
    }
    if LOOKUP_SUBJECT.is_match(&out) {
        out = Cow::Owned(LOOKUP_SUBJECT.replace_all(&out, "$1").into_owned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_drops_selector_and_quotes() {
        let s = scrub(r##"no such element: {"selector":"#captcha-submit"}"##, None);
        assert!(!s.contains("captcha"), "{s}");
        let s = scrub("no such element: #captcha-submit", Some("#captcha-submit"));
        assert!(!s.contains("captcha"), "{s}");
        let s = scrub("element not found: .timeout-banner", None);
        assert!(!s.contains("timeout"), "{s}");
        assert!(s.contains("element not found"), "{s}");
    }

    #[test]
    fn scrub_keeps_contractions() {
        let s = scrub("element isn't clickable, it's obscured", None);
        assert_eq!(s, "element isn't clickable, it's obscured");
    }
}
