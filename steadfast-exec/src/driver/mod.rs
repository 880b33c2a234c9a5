mod scripted;
mod webdriver;

use std::time::Duration;

use async_trait::async_trait;

pub use scripted::{DriverCall, Op, Reply, ScriptedDriver, ScriptedDriverFactory};
pub use webdriver::{WebDriverClient, WebDriverConfig, WebDriverFactory};

/// The only error a driver reports. Interpretation is left to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitTarget {
    /// Wait until `locator` resolves, failing after `timeout`.
    Element { locator: String, timeout: Duration },
    /// Fixed pause.
    Duration(Duration),
}

/// Live browser session. One handle per task instance; never shared.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn click(&self, locator: &str) -> Result<(), DriverError>;

    async fn type_text(&self, locator: &str, text: &str, clear: bool) -> Result<(), DriverError>;

    async fn wait_for(&self, target: WaitTarget) -> Result<(), DriverError>;

    /// Text content, or the named attribute when `attribute` is set.
    async fn extract(&self, locator: &str, attribute: Option<&str>) -> Result<String, DriverError>;

    /// Base64-encoded PNG.
    async fn screenshot(&self) -> Result<String, DriverError>;

    /// Current page HTML.
    async fn get_content(&self) -> Result<String, DriverError>;

    async fn close(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

/// Opens a fresh driver per task instance.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserDriver>, DriverError>;
}
