use serde::Serialize;
use steadfast_exec::SelectorMetric;
use steadfast_store::ModelStore;

use crate::cmd::config::{connect_store, require_database_url};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricRow {
    captured_at: String,
    #[serde(flatten)]
    metric: SelectorMetric,
}

pub async fn metrics_cmd(
    website: Option<&str>,
    unreliable: bool,
    output: OutputArgs,
    store: StoreArgs,
) -> i32 {
    let Some(url) = require_database_url(store.store.clone(), &output) else {
        return exit_codes::RUNTIME_ERROR;
    };
    let Some(pg) = connect_store(&url, &store, &output).await else {
        return exit_codes::RUNTIME_ERROR;
    };

    let snapshots = match pg.load_metric_snapshots(website).await {
        Ok(s) => s,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to load metrics: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let mut rows = Vec::with_capacity(snapshots.len());
    for s in snapshots {
        match serde_json::from_value::<SelectorMetric>(s.metric) {
            Ok(metric) => rows.push(MetricRow {
                captured_at: s.captured_at.to_rfc3339(),
                metric,
            }),
            Err(e) => tracing::warn!(id = s.id, locator = %s.locator, error = %e, "skipping unreadable metric snapshot"),
        }
    }
    if unreliable {
        rows.retain(|r| !r.metric.is_reliable());
    }

    if output.format == OutputFormat::Text && !output.quiet {
        if rows.is_empty() {
            println!("no metrics recorded");
        }
        for r in &rows {
            let m = &r.metric;
            println!(
                "{:<24} {:<12} {:.2} ({}/{}) {:?} {:?}  {}",
                m.website,
                m.task_type,
                m.success_rate,
                m.success_count,
                m.total_attempts,
                m.trend,
                m.reliability,
                m.locator
            );
            if !m.recommendation.is_empty() {
                println!("    {}", m.recommendation);
            }
        }
    } else {
        print_result(output.format, output.quiet, &rows);
    }
    exit_codes::SUCCESS
}
