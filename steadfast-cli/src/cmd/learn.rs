use serde::Serialize;
use steadfast_exec::learning::{LoadOutcome, Pattern, StrategySuggestion, Suggestion};
use steadfast_exec::{LearningContext, LearningEngine};

use crate::cmd::config::{connect_store, require_database_url};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LearnResult {
    website: String,
    task_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<i64>,
    observations: u64,
    best_candidate: Suggestion,
    best_strategy: StrategySuggestion,
    patterns: Vec<Pattern>,
}

pub async fn learn_cmd(
    website: &str,
    task_type: &str,
    hint: Option<&str>,
    all_patterns: bool,
    output: OutputArgs,
    store: StoreArgs,
) -> i32 {
    let Some(url) = require_database_url(store.store.clone(), &output) else {
        return exit_codes::RUNTIME_ERROR;
    };
    let Some(pg) = connect_store(&url, &store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };

    let learning = LearningEngine::default();
    let version = match learning.load(website, &pg).await {
        LoadOutcome::Loaded { version } => Some(version),
        LoadOutcome::Missing => None,
        LoadOutcome::Corrupt { reason } => {
            tracing::warn!(website, %reason, "stored model is unreadable; showing cold-start defaults");
            None
        }
        LoadOutcome::Unavailable { reason } => {
            print_error(output.format, output.quiet, &format!("failed to load model: {reason}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let mut ctx = LearningContext::new();
    if let Some(h) = hint {
        ctx = ctx.with_hint(h);
    }
    let best_candidate = learning.best_candidate(task_type, website, &ctx).await;
    let best_strategy = learning.best_strategy(task_type, website).await;
    let mut patterns = learning.patterns(website).await;
    if !all_patterns {
        patterns.retain(|p| !p.superseded);
    }
    patterns.retain(|p| p.task_type == task_type);
    let observations = learning.model(website).await.map_or(0, |m| m.observations);

    let result = LearnResult {
        website: website.to_string(),
        task_type: task_type.to_string(),
        version,
        observations,
        best_candidate,
        best_strategy,
        patterns,
    };

    if output.format == OutputFormat::Text && !output.quiet {
        match result.version {
            Some(v) => println!("{} (model v{v}, {} observations)", result.website, result.observations),
            None => println!("{} (no stored model)", result.website),
        }
        let c = &result.best_candidate;
        println!(
            "  locator:  {} [{}] confidence {:.2} ({:?})",
            c.locator,
            c.kind.as_str(),
            c.confidence,
            c.source
        );
        let s = &result.best_strategy;
        println!(
            "  strategy: {} confidence {:.2} ({:?})",
            s.strategy, s.confidence, s.source
        );
        for p in &result.patterns {
            println!(
                "  pattern {} r{}{}: {}/{} ({:.2})",
                p.shape,
                p.revision,
                if p.superseded { " superseded" } else { "" },
                p.successes,
                p.occurrences,
                p.success_rate()
            );
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}
