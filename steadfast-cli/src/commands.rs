use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;
use crate::cmd::classify::ActionKindArg;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check task documents without running them.
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Generate and rank candidate locators for an element on a saved page.
    Rank {
        /// HTML file to rank against.
        page: PathBuf,
        /// Visible text, label or name of the element.
        #[arg(long)]
        text: String,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long, default_value = "local")]
        website: String,
        #[arg(long, default_value = "default")]
        task_type: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Blend in learned kind rates and tracker history from the store.
        #[arg(long)]
        learned: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Classify a raw driver error message.
    Classify {
        message: String,
        #[arg(long, value_enum, default_value_t = ActionKindArg::Click)]
        action: ActionKindArg,
        #[arg(long)]
        selector: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run task documents against a WebDriver endpoint.
    Run {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Stream engine events to stdout as JSON lines.
        #[arg(long)]
        events: bool,
        /// Do not save learning models or metric snapshots after each task.
        #[arg(long)]
        no_persist: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        webdriver: WebDriverArgs,
        #[command(flatten)]
        engine: EngineArgs,
        #[command(flatten)]
        concurrency: ConcurrencyArgs,
        #[command(flatten)]
        retry: RetryArgs,
    },
    /// Show persisted selector metrics.
    Metrics {
        #[arg(long)]
        website: Option<String>,
        /// Only locators that are not reliable.
        #[arg(long)]
        unreliable: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Show what has been learned about a website.
    Learn {
        website: String,
        #[arg(long, default_value = "default")]
        task_type: String,
        #[arg(long)]
        hint: Option<String>,
        /// Include superseded pattern revisions.
        #[arg(long)]
        all_patterns: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Apply database migrations.
    Migrate {
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
}
