/// A post-navigation nuisance and the locators that usually dismiss it.
pub(crate) struct Handler {
    pub name: &'static str,
    pub locators: &'static [&'static str],
}

/// Run in this order after every successful navigate.
pub(crate) const HANDLERS: [Handler; 3] = [
    Handler {
        name: "dismiss-overlay",
        locators: &[
            r#"[aria-label="Close"]"#,
            r#"[aria-label="close"]"#,
            r#"[data-dismiss="modal"]"#,
            "button.modal-close",
            "button.close",
        ],
    },
    Handler {
        name: "accept-cookies",
        locators: &[
            "#onetrust-accept-btn-handler",
            "#accept-cookies",
            r#"[data-testid="cookie-accept"]"#,
            r#"button[id*="accept"]"#,
            "text=Accept all",
            "text=Accept",
        ],
    },
    Handler {
        name: "confirm-age-gate",
        locators: &[
            "#age-gate-yes",
            r#"[data-testid="age-gate-confirm"]"#,
            "button.age-confirm",
            "text=I am over 18",
        ],
    },
];
