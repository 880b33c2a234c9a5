use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use steadfast_core::{rank, CandidateLocator, ElementHint, KindBias, PageSnapshot, RankContext};
use steadfast_exec::LearningEngine;
use steadfast_store::ModelStore;

use crate::cmd::config::{connect_store, require_database_url};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

pub struct RankRequest {
    pub page: PathBuf,
    pub text: String,
    pub tag: Option<String>,
    pub role: Option<String>,
    pub website: String,
    pub task_type: String,
    pub limit: usize,
    pub learned: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankResult {
    website: String,
    task_type: String,
    learned: bool,
    candidates: Vec<CandidateLocator>,
}

/// Success rates from the latest persisted snapshot of each locator; the
/// store already returns one snapshot per key.
async fn stored_history(
    store: &dyn ModelStore,
    website: &str,
    task_type: &str,
) -> Result<HashMap<String, f64>, String> {
    let snapshots = store
        .load_metric_snapshots(Some(website))
        .await
        .map_err(|e| format!("failed to load metrics: {e}"))?;
    let mut history = HashMap::new();
    for s in snapshots.into_iter().filter(|s| s.task_type == task_type) {
        if let Some(rate) = s.metric.get("successRate").and_then(|v| v.as_f64()) {
            history.insert(s.locator, rate);
        }
    }
    Ok(history)
}

async fn learned_context(
    req: &RankRequest,
    store_args: &StoreArgs,
    output: &OutputArgs,
) -> Option<(HashMap<String, f64>, KindBias)> {
    let url = require_database_url(store_args.store.clone(), output)?;
    let store = connect_store(&url, store_args, output).await?;

    let learning = LearningEngine::default();
    let outcome = learning.load(&req.website, &store).await;
    tracing::debug!(website = %req.website, ?outcome, "loaded learning model");

    match stored_history(&store, &req.website, &req.task_type).await {
        Ok(history) => Some((history, learning.kind_bias(&req.website).await)),
        Err(msg) => {
            print_error(output.format, output.quiet, &msg);
            None
        }
    }
}

pub async fn rank_cmd(req: RankRequest, output: OutputArgs, store: StoreArgs) -> i32 {
    let html = match std::fs::read_to_string(&req.page) {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", req.page.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let mut ctx = RankContext::new(req.website.clone(), req.task_type.clone());
    if req.learned {
        let Some((history, bias)) = learned_context(&req, &store, &output).await else {
            return exit_codes::RUNTIME_ERROR;
        };
        ctx = ctx.with_history(history).with_kind_bias(bias);
    }

    let mut hint = ElementHint::new(req.text.clone());
    if let Some(tag) = &req.tag {
        hint = hint.with_tag(tag.clone());
    }
    if let Some(role) = &req.role {
        hint = hint.with_role(role.clone());
    }

    let mut candidates = {
        let snapshot = PageSnapshot::parse(&html);
        rank(&snapshot, &hint, &ctx)
    };
    candidates.truncate(req.limit);

    if output.format == OutputFormat::Text && !output.quiet {
        if candidates.is_empty() {
            println!("no candidates for {:?}", req.text);
        }
        for (i, c) in candidates.iter().enumerate() {
            println!("{:>2}. {:.3}  {:<9} {}", i + 1, c.score(), c.kind.as_str(), c.locator);
        }
    } else {
        let result = RankResult {
            website: req.website,
            task_type: req.task_type,
            learned: req.learned,
            candidates,
        };
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}
