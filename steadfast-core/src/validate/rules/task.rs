use std::collections::HashSet;

use crate::types::TaskDefinition;
use crate::validate::validator::{Validator, DOMAIN_RE, ID_RE};

pub(crate) fn validate_task(v: &mut Validator, task: &TaskDefinition) {
    if !ID_RE.is_match(&task.task_id) {
        v.push("$.taskId", "must match regex [A-Za-z0-9_\\-]+");
    }
    v.require_non_blank("$.taskType", &task.task_type);

    if !DOMAIN_RE.is_match(&task.website) {
        v.push(
            "$.website",
            "must be a bare domain such as shop.example.com (no scheme or path)",
        );
    }

    if let Some(start_url) = &task.start_url {
        v.validate_url("$.startUrl", start_url);
    }

    if task.deadline_ms == Some(0) {
        v.push("$.deadlineMs", "must be greater than zero");
    }

    if task.actions.is_empty() {
        v.push("$.actions", "must have at least one entry");
    }

    let mut ids = HashSet::new();
    for (idx, action) in task.actions.iter().enumerate() {
        if !ids.insert(action.id()) {
            v.push(
                format!("$.actions[{idx}].id"),
                "must be unique within the task",
            );
        }
    }
}
