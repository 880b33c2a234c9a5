use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::driver::DriverError;

#[derive(Debug)]
pub(crate) enum CallError {
    Driver(DriverError),
    TimedOut(Duration),
    Deadline,
}

impl CallError {
    /// Raw message handed to the classifier.
    pub(crate) fn message(&self) -> String {
        match self {
            CallError::Driver(e) => e.message.clone(),
            CallError::TimedOut(after) => {
                format!("timeout: driver call exceeded {}ms", after.as_millis())
            }
            CallError::Deadline => "timeout: task deadline elapsed".to_string(),
        }
    }

    pub(crate) fn is_deadline(&self) -> bool {
        matches!(self, CallError::Deadline)
    }
}

/// Runs a driver call bounded by `timeout` and the task deadline, whichever
/// comes first. An elapsed call is dropped, which cancels it.
pub(crate) async fn bounded<T, F>(fut: F, timeout: Duration, deadline: Option<Instant>) -> Result<T, CallError>
where
    F: Future<Output = Result<T, DriverError>>,
{
    let call_limit = Instant::now() + timeout;
    let (limit, by_deadline) = match deadline {
        Some(d) if d <= call_limit => (d, true),
        _ => (call_limit, false),
    };
    match tokio::time::timeout_at(limit, fut).await {
        Ok(r) => r.map_err(CallError::Driver),
        Err(_) if by_deadline => Err(CallError::Deadline),
        Err(_) => Err(CallError::TimedOut(timeout)),
    }
}
