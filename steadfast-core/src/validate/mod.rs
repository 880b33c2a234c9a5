mod rules;
pub(crate) mod validator;

use crate::error::ValidationError;
use crate::types::TaskDefinition;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for TaskDefinition {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_task(self)
    }
}

/// Task-level checks. Individual actions are already valid by construction.
pub fn validate_task(task: &TaskDefinition) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_task(task);
    v.finish()
}
