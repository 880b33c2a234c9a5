use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use super::{BrowserDriver, DriverError, DriverFactory, WaitTarget};

/// W3C element reference key.
const ELEMENT_KEY: &str = "element-6066-11e4-a5af-00c0f42c7f5d";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Base URL of the WebDriver endpoint, e.g. `http://localhost:4444`.
    pub endpoint: String,
    pub browser: String,
    pub headless: bool,
    /// Transport-level timeout for a single WebDriver command.
    pub request_timeout: Duration,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4444".to_string(),
            browser: "firefox".to_string(),
            headless: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl WebDriverConfig {
    fn capabilities(&self) -> JsonValue {
        let mut always = json!({ "browserName": self.browser });
        if self.headless {
            match self.browser.as_str() {
                "chrome" | "chromium" => {
                    always["goog:chromeOptions"] = json!({ "args": ["--headless=new", "--no-sandbox"] });
                }
                "firefox" => {
                    always["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
                }
                _ => {}
            }
        }
        json!({ "capabilities": { "alwaysMatch": always } })
    }
}

/// Browser session speaking the W3C WebDriver protocol over HTTP.
pub struct WebDriverClient {
    http: reqwest::Client,
    endpoint: String,
    session_id: String,
}

impl WebDriverClient {
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, DriverError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("steadfast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest_error)?;
        let parsed = url::Url::parse(&config.endpoint)
            .map_err(|e| DriverError::new(format!("invalid webdriver endpoint {}: {e}", config.endpoint)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DriverError::new(format!(
                "invalid webdriver endpoint {}: expected http or https",
                config.endpoint
            )));
        }
        let endpoint = config.endpoint.trim_end_matches('/').to_string();

        info!(endpoint = %endpoint, browser = %config.browser, "opening webdriver session");
        let resp = http
            .post(format!("{endpoint}/session"))
            .json(&config.capabilities())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let value = unwrap_value(resp).await?;
        let session_id = value
            .get("sessionId")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| DriverError::new("session not created: response carried no sessionId"))?
            .to_string();
        debug!(session_id = %session_id, "webdriver session ready");

        Ok(Self {
            http,
            endpoint,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.endpoint, self.session_id, path)
    }

    async fn get(&self, path: &str) -> Result<JsonValue, DriverError> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        unwrap_value(resp).await
    }

    async fn post(&self, path: &str, body: JsonValue) -> Result<JsonValue, DriverError> {
        let resp = self
            .http
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        unwrap_value(resp).await
    }

    async fn find(&self, locator: &str) -> Result<String, DriverError> {
        let (using, value) = locator_strategy(locator);
        debug!(using, value = %value, "find element");
        let found = self
            .post("/element", json!({ "using": using, "value": value }))
            .await?;
        found
            .get(ELEMENT_KEY)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| DriverError::new(format!("no such element: {locator}")))
    }
}

#[async_trait]
impl BrowserDriver for WebDriverClient {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.post("/url", json!({ "url": url })).await.map(|_| ())
    }

    async fn click(&self, locator: &str) -> Result<(), DriverError> {
        let el = self.find(locator).await?;
        self.post(&format!("/element/{el}/click"), json!({}))
            .await
            .map(|_| ())
    }

    async fn type_text(&self, locator: &str, text: &str, clear: bool) -> Result<(), DriverError> {
        let el = self.find(locator).await?;
        if clear {
            self.post(&format!("/element/{el}/clear"), json!({})).await?;
        }
        if text.is_empty() {
            return Ok(());
        }
        self.post(&format!("/element/{el}/value"), json!({ "text": text }))
            .await
            .map(|_| ())
    }

    async fn wait_for(&self, target: WaitTarget) -> Result<(), DriverError> {
        match target {
            WaitTarget::Duration(d) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
            WaitTarget::Element { locator, timeout } => {
                let until = tokio::time::Instant::now() + timeout;
                loop {
                    match self.find(&locator).await {
                        Ok(_) => return Ok(()),
                        Err(e) if !e.message.starts_with("no such element") => return Err(e),
                        Err(_) => {}
                    }
                    if tokio::time::Instant::now() + POLL_INTERVAL > until {
                        return Err(DriverError::new(format!(
                            "timeout: element {locator} did not appear within {}ms",
                            timeout.as_millis()
                        )));
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn extract(&self, locator: &str, attribute: Option<&str>) -> Result<String, DriverError> {
        let el = self.find(locator).await?;
        let value = match attribute {
            Some(name) => self.get(&format!("/element/{el}/attribute/{name}")).await?,
            None => self.get(&format!("/element/{el}/text")).await?,
        };
        Ok(match value {
            JsonValue::String(s) => s,
            JsonValue::Null => String::new(),
            other => other.to_string(),
        })
    }

    async fn screenshot(&self) -> Result<String, DriverError> {
        let value = self.get("/screenshot").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::new("screenshot response was not a string"))
    }

    async fn get_content(&self) -> Result<String, DriverError> {
        let value = self.get("/source").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DriverError::new("page source response was not a string"))
    }

    async fn close(&self) -> Result<(), DriverError> {
        info!(session_id = %self.session_id, "closing webdriver session");
        let resp = self
            .http
            .delete(format!("{}/session/{}", self.endpoint, self.session_id))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        unwrap_value(resp).await.map(|_| ())
    }
}

/// Opens one WebDriver session per call.
#[derive(Debug, Clone, Default)]
pub struct WebDriverFactory {
    pub config: WebDriverConfig,
}

impl WebDriverFactory {
    pub fn new(config: WebDriverConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for WebDriverFactory {
    async fn open(&self) -> Result<Box<dyn BrowserDriver>, DriverError> {
        let client = WebDriverClient::connect(&self.config).await?;
        Ok(Box::new(client))
    }
}

/// Maps a locator string onto a W3C location strategy.
fn locator_strategy(locator: &str) -> (&'static str, String) {
    if let Some(text) = locator.strip_prefix("text=") {
        let text = text.trim();
        return ("xpath", format!("//*[normalize-space(.)={}]", xpath_literal(text)));
    }
    if let Some(xpath) = locator.strip_prefix("xpath=") {
        return ("xpath", xpath.to_string());
    }
    if locator.starts_with('/') || locator.starts_with("(/") {
        return ("xpath", locator.to_string());
    }
    ("css selector", locator.to_string())
}

fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

async fn unwrap_value(resp: reqwest::Response) -> Result<JsonValue, DriverError> {
    let status = resp.status();
    let body: JsonValue = resp.json().await.map_err(map_reqwest_error)?;
    let value = body.get("value").cloned().unwrap_or(JsonValue::Null);
    if status.is_success() {
        return Ok(value);
    }
    let error = value
        .get("error")
        .and_then(JsonValue::as_str)
        .unwrap_or("unknown error");
    let message = value.get("message").and_then(JsonValue::as_str).unwrap_or("");
    Err(DriverError::new(format!("{error}: {message} (http {})", status.as_u16())))
}

fn map_reqwest_error(e: reqwest::Error) -> DriverError {
    if e.is_timeout() {
        return DriverError::new(format!("timeout: webdriver request timed out: {e}"));
    }
    if e.is_connect() || e.is_request() {
        return DriverError::new(format!("network error: {e}"));
    }
    DriverError::new(format!("webdriver error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_locators_become_xpath() {
        let (using, value) = locator_strategy("text=Sign in");
        assert_eq!(using, "xpath");
        assert_eq!(value, "//*[normalize-space(.)='Sign in']");

        let (using, value) = locator_strategy("text=Don't \"go\"");
        assert_eq!(using, "xpath");
        assert!(value.contains("concat("));
    }

    #[test]
    fn css_and_xpath_pass_through() {
        assert_eq!(locator_strategy("#login").0, "css selector");
        assert_eq!(locator_strategy("/html/body[1]/form[1]").0, "xpath");
        assert_eq!(locator_strategy("xpath=//button").1, "//button");
    }

    #[test]
    fn headless_capabilities_follow_browser() {
        let cfg = WebDriverConfig {
            browser: "chrome".to_string(),
            ..WebDriverConfig::default()
        };
        let caps = cfg.capabilities();
        assert_eq!(caps["capabilities"]["alwaysMatch"]["browserName"], "chrome");
        assert!(caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"].is_object());
    }
}
