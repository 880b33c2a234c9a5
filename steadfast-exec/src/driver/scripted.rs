use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{BrowserDriver, DriverError, DriverFactory, WaitTarget};

const BLANK_PAGE: &str = "<html><head></head><body></body></html>";
const PLACEHOLDER_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Navigate,
    Click,
    Type,
    WaitFor,
    Extract,
    Screenshot,
    Content,
}

/// Canned response for one driver call.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok,
    Value(String),
    Err(String),
    /// Never completes; only a timeout or deadline ends the call.
    Hang,
    /// Sleeps, then answers with the inner reply.
    Delay(Duration, Box<Reply>),
}

impl Reply {
    pub fn err(message: impl Into<String>) -> Self {
        Reply::Err(message.into())
    }

    pub fn value(v: impl Into<String>) -> Self {
        Reply::Value(v.into())
    }

    pub fn delayed(d: Duration, reply: Reply) -> Self {
        Reply::Delay(d, Box::new(reply))
    }
}

/// A recorded driver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCall {
    pub op: Op,
    /// Locator, URL or empty for page-level calls.
    pub target: String,
}

#[derive(Default)]
struct Script {
    queued: HashMap<(Op, String), VecDeque<Reply>>,
    sticky: HashMap<(Op, String), Reply>,
    content: Option<String>,
    calls: Vec<DriverCall>,
}

/// In-process driver answering from a script. Queued replies are consumed in
/// order; once a queue is empty the sticky reply (if any) applies, then the
/// default: page-level calls succeed and element calls fail with
/// `no such element`.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot reply.
    pub fn on(self, op: Op, target: &str, reply: Reply) -> Self {
        if let Ok(mut s) = self.script.try_lock() {
            s.queued
                .entry((op, target.to_string()))
                .or_default()
                .push_back(reply);
        }
        self
    }

    /// Reply used whenever no queued reply is left.
    pub fn always(self, op: Op, target: &str, reply: Reply) -> Self {
        if let Ok(mut s) = self.script.try_lock() {
            s.sticky.insert((op, target.to_string()), reply);
        }
        self
    }

    pub fn fail(self, op: Op, target: &str, message: &str) -> Self {
        self.on(op, target, Reply::err(message))
    }

    pub fn succeed(self, op: Op, target: &str) -> Self {
        self.always(op, target, Reply::Ok)
    }

    pub fn with_content(self, html: &str) -> Self {
        if let Ok(mut s) = self.script.try_lock() {
            s.content = Some(html.to_string());
        }
        self
    }

    pub async fn calls(&self) -> Vec<DriverCall> {
        self.script.lock().await.calls.clone()
    }

    /// Calls of one kind, in order.
    pub async fn targets(&self, op: Op) -> Vec<String> {
        self.script
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.op == op)
            .map(|c| c.target.clone())
            .collect()
    }

    async fn answer(&self, op: Op, target: &str) -> Result<Option<String>, DriverError> {
        let reply = {
            let mut s = self.script.lock().await;
            s.calls.push(DriverCall {
                op,
                target: target.to_string(),
            });
            let key = (op, target.to_string());
            let queued = s.queued.get_mut(&key).and_then(VecDeque::pop_front);
            match queued.or_else(|| s.sticky.get(&key).cloned()) {
                Some(r) => r,
                None => default_reply(op, target, s.content.as_deref()),
            }
        };
        play(reply).await
    }
}

fn default_reply(op: Op, target: &str, content: Option<&str>) -> Reply {
    match op {
        Op::Navigate | Op::WaitFor => Reply::Ok,
        Op::Screenshot => Reply::value(PLACEHOLDER_PNG),
        Op::Content => Reply::value(content.unwrap_or(BLANK_PAGE)),
        Op::Click | Op::Type | Op::Extract => Reply::err(format!("no such element: {target}")),
    }
}

async fn play(mut reply: Reply) -> Result<Option<String>, DriverError> {
    loop {
        match reply {
            Reply::Ok => return Ok(None),
            Reply::Value(v) => return Ok(Some(v)),
            Reply::Err(m) => return Err(DriverError::new(m)),
            Reply::Hang => std::future::pending::<()>().await,
            Reply::Delay(d, inner) => {
                tokio::time::sleep(d).await;
                reply = *inner;
            }
        }
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.answer(Op::Navigate, url).await.map(|_| ())
    }

    async fn click(&self, locator: &str) -> Result<(), DriverError> {
        self.answer(Op::Click, locator).await.map(|_| ())
    }

    async fn type_text(&self, locator: &str, _text: &str, _clear: bool) -> Result<(), DriverError> {
        self.answer(Op::Type, locator).await.map(|_| ())
    }

    async fn wait_for(&self, target: WaitTarget) -> Result<(), DriverError> {
        match target {
            WaitTarget::Element { locator, .. } => {
                self.answer(Op::WaitFor, &locator).await.map(|_| ())
            }
            WaitTarget::Duration(d) => {
                self.answer(Op::WaitFor, "").await?;
                tokio::time::sleep(d).await;
                Ok(())
            }
        }
    }

    async fn extract(&self, locator: &str, _attribute: Option<&str>) -> Result<String, DriverError> {
        self.answer(Op::Extract, locator)
            .await
            .map(Option::unwrap_or_default)
    }

    async fn screenshot(&self) -> Result<String, DriverError> {
        self.answer(Op::Screenshot, "")
            .await
            .map(Option::unwrap_or_default)
    }

    async fn get_content(&self) -> Result<String, DriverError> {
        self.answer(Op::Content, "")
            .await
            .map(Option::unwrap_or_default)
    }
}

/// Hands out clones of one scripted driver; clones share the script and call log.
#[derive(Clone, Default)]
pub struct ScriptedDriverFactory {
    driver: ScriptedDriver,
}

impl ScriptedDriverFactory {
    pub fn new(driver: ScriptedDriver) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &ScriptedDriver {
        &self.driver
    }
}

#[async_trait]
impl DriverFactory for ScriptedDriverFactory {
    async fn open(&self) -> Result<Box<dyn BrowserDriver>, DriverError> {
        Ok(Box::new(self.driver.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_then_sticky_then_default() {
        let d = ScriptedDriver::new()
            .fail(Op::Click, "#a", "element not found")
            .succeed(Op::Click, "#a");
        assert!(d.click("#a").await.is_err());
        assert!(d.click("#a").await.is_ok());
        assert!(d.click("#a").await.is_ok());
        let err = d.click("#b").await.unwrap_err();
        assert_eq!(err.message, "no such element: #b");
        assert_eq!(d.targets(Op::Click).await, vec!["#a", "#a", "#a", "#b"]);
    }

    #[tokio::test]
    async fn content_defaults_to_blank_page() {
        let d = ScriptedDriver::new();
        assert!(d.get_content().await.unwrap().contains("<body>"));
        let d = d.with_content("<p>hi</p>");
        assert_eq!(d.get_content().await.unwrap(), "<p>hi</p>");
    }
}
