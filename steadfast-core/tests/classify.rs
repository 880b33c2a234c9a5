use steadfast_core::{
    classify, ActionKind, ErrorCategory, ErrorClassifier, ExecutionContext, FailureClassifier,
    Severity,
};

fn click_ctx() -> ExecutionContext {
    ExecutionContext::new("t1", "submit", ActionKind::Click).with_selector("#login-btn")
}

#[test]
fn categories_follow_the_matcher_table() {
    let cases = [
        ("no such element: Unable to locate element: #login-btn", ErrorCategory::SelectorNotFound),
        ("element not found", ErrorCategory::SelectorNotFound),
        ("element click intercepted: other element would receive the click", ErrorCategory::ElementNotInteractive),
        ("element not interactable", ErrorCategory::ElementNotInteractive),
        ("timeout: waited 5000ms", ErrorCategory::Timeout),
        ("net::ERR_CONNECTION_REFUSED", ErrorCategory::Network),
        ("HTTP 401 Unauthorized", ErrorCategory::Authentication),
        ("please complete the reCAPTCHA", ErrorCategory::Captcha),
        ("something odd happened", ErrorCategory::Unknown),
    ];
    for (raw, expected) in cases {
        assert_eq!(classify(raw, &click_ctx()).category, expected, "{raw}");
    }
}

#[test]
fn earlier_matchers_win() {
    // Captcha outranks timeout, timeout outranks selector lookups.
    let c = classify("timed out waiting for captcha frame", &click_ctx());
    assert_eq!(c.category, ErrorCategory::Captcha);
    let c = classify("timeout while waiting: no such element", &click_ctx());
    assert_eq!(c.category, ErrorCategory::Timeout);
}

#[test]
fn locator_text_does_not_pick_the_category() {
    let cases = [
        ("#captcha-submit", "no such element: #captcha-submit"),
        (".timeout-banner", "no such element: .timeout-banner"),
        ("#err-401", "no such element: #err-401"),
        ("[data-test=network-error]", "could not find [data-test=network-error] on page"),
    ];
    for (selector, raw) in cases {
        let ctx = ExecutionContext::new("t1", "submit", ActionKind::Click).with_selector(selector);
        assert_eq!(classify(raw, &ctx).category, ErrorCategory::SelectorNotFound, "{raw}");
    }

    // Without a selector in the context, quoted and locator-shaped fragments are ignored too.
    let bare = ExecutionContext::new("t1", "submit", ActionKind::Click);
    let webdriver = r##"no such element: Unable to locate element: {"method":"css selector","selector":"#captcha-submit"}"##;
    assert_eq!(classify(webdriver, &bare).category, ErrorCategory::SelectorNotFound);
    assert_eq!(
        classify("element not found: .timeout-banner", &bare).category,
        ErrorCategory::SelectorNotFound
    );

    // The raw message is kept as reported.
    let ctx = ExecutionContext::new("t1", "submit", ActionKind::Click).with_selector("#captcha-submit");
    assert_eq!(classify("no such element: #captcha-submit", &ctx).message, "no such element: #captcha-submit");
}

#[test]
fn driver_wording_still_classifies_around_the_selector() {
    let ctx = ExecutionContext::new("t1", "submit", ActionKind::Click).with_selector("#captcha-submit");
    assert_eq!(
        classify("captcha challenge detected while clicking #captcha-submit", &ctx).category,
        ErrorCategory::Captcha
    );
    assert_eq!(classify("element isn't clickable, it's obscured", &ctx).category, ErrorCategory::ElementNotInteractive);
}

#[test]
fn unmatched_navigation_failures_use_context() {
    let nav = ExecutionContext::new("t1", "open", ActionKind::Navigate).with_url("https://a.test");
    assert_eq!(classify("weird failure", &nav).category, ErrorCategory::Navigation);
    assert_eq!(classify("weird failure", &click_ctx()).category, ErrorCategory::Unknown);
}

#[test]
fn classification_carries_policy_and_severity() {
    let c = classify("no such element", &click_ctx());
    assert_eq!(c.severity, Severity::Medium);
    assert!(c.auto_fixable);
    assert_eq!(c.retry_policy.max_attempts, 3);
    assert_eq!(c.retry_policy.base_delay.as_millis(), 500);
    assert!(!c.remediation.is_empty());

    let auth = classify("403 Forbidden", &click_ctx());
    assert_eq!(auth.severity, Severity::Critical);
    assert!(!auth.auto_fixable);
    assert!(!auth.retry_policy.allows_retry(1, &auth));

    let net = classify("connection reset by peer", &click_ctx());
    assert_eq!(net.severity, Severity::High);
    assert_eq!(net.retry_policy.max_attempts, 2);
    assert_eq!(net.retry_policy.base_delay.as_millis(), 5000);
}

#[test]
fn classification_is_idempotent() {
    let classifier = ErrorClassifier;
    for raw in ["element not found", "net::ERR_TIMED_OUT", "", "captcha", "???"] {
        let a = classifier.classify(raw, &click_ctx());
        let b = classifier.classify(raw, &click_ctx());
        assert_eq!(a, b);
    }
}
