pub(crate) mod action;
pub(crate) mod policy;
pub(crate) mod task;
