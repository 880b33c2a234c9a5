use std::time::Duration;

use crate::types::{ActionDef, ActionSpec, LocatorKind, LocatorSet, Precondition, Target};
use crate::validate::rules::policy::validate_error_policy;
use crate::validate::validator::{Validator, ID_RE};

const MAX_WAIT: Duration = Duration::from_secs(300);

pub(crate) fn validate_action(v: &mut Validator, def: &ActionDef, path: &str) {
    if !ID_RE.is_match(&def.id) {
        v.push(format!("{path}.id"), "must match regex [A-Za-z0-9_\\-]+");
    }

    match &def.spec {
        ActionSpec::Navigate { url } => v.validate_url(&format!("{path}.url"), url),
        ActionSpec::Click { target } => validate_target(v, &format!("{path}.target"), target),
        ActionSpec::Type {
            target,
            text,
            clear,
        } => {
            validate_target(v, &format!("{path}.target"), target);
            if text.is_empty() && !clear {
                v.push(
                    format!("{path}.text"),
                    "must not be empty unless clear is set",
                );
            }
        }
        ActionSpec::Wait { target, duration } => {
            if target.is_none() && duration.is_none() {
                v.push(path, "wait requires a target, a durationMs, or both");
            }
            if let Some(t) = target {
                validate_target(v, &format!("{path}.target"), t);
            }
            if let Some(d) = duration {
                if *d > MAX_WAIT {
                    v.push(
                        format!("{path}.durationMs"),
                        format!("must be at most {}", MAX_WAIT.as_millis()),
                    );
                }
            }
        }
        ActionSpec::Extract { target, attribute } => {
            validate_target(v, &format!("{path}.target"), target);
            if let Some(attr) = attribute {
                v.require_non_blank(&format!("{path}.attribute"), attr);
            }
        }
        ActionSpec::Screenshot => {}
    }

    for (idx, p) in def.preconditions.iter().enumerate() {
        let ppath = format!("{path}.preconditions[{idx}]");
        match p {
            Precondition::ElementPresent { locator } => {
                v.require_non_blank(&format!("{ppath}.locator"), locator)
            }
            Precondition::TextPresent { text } => {
                v.require_non_blank(&format!("{ppath}.text"), text)
            }
        }
    }

    validate_error_policy(v, &format!("{path}.onError"), &def.on_error);
}

fn validate_target(v: &mut Validator, path: &str, target: &Target) {
    validate_locator_set(v, &format!("{path}.primary"), &target.primary);
    for (idx, set) in target.fallbacks.iter().enumerate() {
        validate_locator_set(v, &format!("{path}.fallbacks[{idx}]"), set);
    }
}

fn validate_locator_set(v: &mut Validator, path: &str, set: &LocatorSet) {
    if set.is_empty() {
        v.push(path, "must have at least one locator");
    }
    for (idx, c) in set.candidates.iter().enumerate() {
        let cpath = format!("{path}[{idx}]");
        v.require_non_blank(&cpath, &c.locator);
        if c.kind == LocatorKind::Page {
            v.push(cpath, "page pseudo-locators cannot address an element");
        }
    }
}
