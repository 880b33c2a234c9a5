use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use steadfast_exec::driver::WebDriverConfig;
use steadfast_exec::executor::{AutoFixConfig, PoolConfig};
use steadfast_exec::retry::Jitter;
use steadfast_exec::{EngineConfig, RetryConfig};
use steadfast_store::{ModelStore, PostgresStore};

use crate::output::print_error;
use crate::utils::{parse_limits, redact_url_password};
use crate::{ConcurrencyArgs, EngineArgs, OutputArgs, RetryArgs, StoreArgs, WebDriverArgs};

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

pub fn get_database_url(store_arg: Option<String>) -> Option<String> {
    store_arg
        .or_else(|| std::env::var("STEADFAST_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .filter(|s| !s.trim().is_empty())
}

/// Like [`get_database_url`] but reports the missing URL to the user.
pub fn require_database_url(store_arg: Option<String>, output: &OutputArgs) -> Option<String> {
    let url = get_database_url(store_arg);
    if url.is_none() {
        print_error(
            output.format,
            output.quiet,
            "missing database URL. Set --store <url>, STEADFAST_DATABASE_URL, or DATABASE_URL environment variable",
        );
    }
    url
}

pub async fn connect_store(url: &str, store: &StoreArgs, output: &OutputArgs) -> Option<PostgresStore> {
    match PostgresStore::connect(url, store.max_connections).await {
        Ok(s) => {
            tracing::info!(url = %redact_url_password(url), "connected to store");
            Some(s)
        }
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to connect to {}: {e}", redact_url_password(url)),
            );
            None
        }
    }
}

/// Store for commands that work without one. `Ok(None)` when no URL is
/// configured; `Err(())` after a connection failure was reported.
pub async fn optional_store(
    store: &StoreArgs,
    output: &OutputArgs,
) -> Result<Option<Arc<dyn ModelStore>>, ()> {
    let Some(url) = get_database_url(store.store.clone()) else {
        return Ok(None);
    };
    match connect_store(&url, store, output).await {
        Some(pg) => Ok(Some(Arc::new(pg))),
        None => Err(()),
    }
}

pub fn build_webdriver_config(args: &WebDriverArgs) -> WebDriverConfig {
    let endpoint = args
        .webdriver
        .clone()
        .or_else(|| std::env::var("STEADFAST_WEBDRIVER_URL").ok())
        .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string());
    WebDriverConfig {
        endpoint,
        browser: args.browser.clone(),
        headless: !args.headed,
        request_timeout: Duration::from_millis(args.request_timeout),
    }
}

pub fn build_engine_config(engine: &EngineArgs, retry: &RetryArgs) -> Result<EngineConfig, String> {
    let jitter = match retry.retry_jitter.as_str() {
        "none" => Jitter::None,
        "full" => Jitter::Full,
        other => return Err(format!("unknown jitter mode {other:?} (expected none or full)")),
    };
    let defaults = EngineConfig::default();
    let call_timeout = Duration::from_millis(engine.call_timeout.max(1));
    Ok(EngineConfig {
        call_timeout,
        max_call_timeout: defaults.max_call_timeout.max(call_timeout),
        side_effects: !engine.no_side_effects,
        snapshot_scoring: engine.snapshot_scoring,
        retry: RetryConfig {
            max_delay: retry
                .retry_max_delay
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.max_delay),
            jitter,
        },
        auto_fix: AutoFixConfig {
            enabled: !engine.no_auto_fix,
            ..AutoFixConfig::default()
        },
        ..defaults
    })
}

pub fn build_pool_config(concurrency: &ConcurrencyArgs, persist: bool) -> Result<PoolConfig, String> {
    let per_website: BTreeMap<String, usize> = parse_limits(&concurrency.max_concurrency_site)?
        .into_iter()
        .collect();
    Ok(PoolConfig {
        global_concurrency: concurrency.max_concurrency,
        per_website_concurrency: per_website,
        persist,
    })
}
