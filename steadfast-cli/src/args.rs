use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    /// Postgres URL; falls back to STEADFAST_DATABASE_URL, then DATABASE_URL.
    #[arg(long)]
    pub store: Option<String>,
    #[arg(long, default_value_t = 5)]
    pub max_connections: u32,
}

#[derive(Debug, Args, Clone)]
pub struct WebDriverArgs {
    /// WebDriver endpoint; falls back to STEADFAST_WEBDRIVER_URL.
    #[arg(long)]
    pub webdriver: Option<String>,
    #[arg(long, default_value = "firefox")]
    pub browser: String,
    #[arg(long)]
    pub headed: bool,
    #[arg(long, default_value_t = 30000)]
    pub request_timeout: u64,
}

#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Per driver call, in milliseconds.
    #[arg(long, default_value_t = 10000)]
    pub call_timeout: u64,
    #[arg(long)]
    pub no_side_effects: bool,
    #[arg(long)]
    pub no_auto_fix: bool,
    /// Re-rank candidates against the live page before every pass.
    #[arg(long)]
    pub snapshot_scoring: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ConcurrencyArgs {
    #[arg(long, default_value_t = 4)]
    pub max_concurrency: usize,
    #[arg(long = "max-concurrency-site", value_name = "SITE=N")]
    pub max_concurrency_site: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RetryArgs {
    /// Cap on any single backoff delay, in milliseconds.
    #[arg(long)]
    pub retry_max_delay: Option<u64>,
    #[arg(long, default_value = "none")]
    pub retry_jitter: String,
}
