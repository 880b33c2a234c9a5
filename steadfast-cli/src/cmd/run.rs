use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use steadfast_core::TaskDefinition;
use steadfast_exec::driver::WebDriverFactory;
use steadfast_exec::executor::{StdoutEventSink, TracingEventSink};
use steadfast_exec::{ExecutionEngine, Services, TaskPool, TaskReport, TaskRunner};
use steadfast_store::InMemoryStore;

use crate::cmd::config::{build_engine_config, build_pool_config, build_webdriver_config, optional_store};
use crate::cmd::validate::{load_task, LoadError};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{ConcurrencyArgs, EngineArgs, OutputArgs, RetryArgs, StoreArgs, WebDriverArgs};

pub struct RunOptions {
    pub events: bool,
    pub persist: bool,
    pub store: StoreArgs,
    pub webdriver: WebDriverArgs,
    pub engine: EngineArgs,
    pub concurrency: ConcurrencyArgs,
    pub retry: RetryArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutcome {
    task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<TaskReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct RunSummary {
    success: bool,
    tasks: Vec<RunOutcome>,
}

fn load_all(paths: &[PathBuf], output: &OutputArgs) -> Result<Vec<TaskDefinition>, i32> {
    let mut tasks = Vec::with_capacity(paths.len());
    let mut invalid = false;
    for path in paths {
        match load_task(path) {
            Ok((task, _)) => tasks.push(task),
            Err(LoadError::Io(msg)) => {
                print_error(output.format, output.quiet, &msg);
                return Err(exit_codes::RUNTIME_ERROR);
            }
            Err(LoadError::Invalid(errors)) => {
                invalid = true;
                print_error(
                    output.format,
                    output.quiet,
                    &format!("{}: {}", path.display(), errors.join("; ")),
                );
            }
        }
    }
    if invalid {
        return Err(exit_codes::VALIDATION_FAILED);
    }
    Ok(tasks)
}

pub async fn run_cmd(paths: &[PathBuf], opts: RunOptions, output: OutputArgs) -> i32 {
    let tasks = match load_all(paths, &output) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let (engine_cfg, pool_cfg) = match build_engine_config(&opts.engine, &opts.retry)
        .and_then(|e| Ok((e, build_pool_config(&opts.concurrency, opts.persist)?)))
    {
        Ok(v) => v,
        Err(msg) => {
            print_error(output.format, output.quiet, &msg);
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let mut services = Services::default();
    match optional_store(&opts.store, &output).await {
        Ok(Some(store)) => services = services.with_store(store),
        Ok(None) => {
            tracing::info!("no store configured; learning and metrics stay in memory");
            services = services.with_store(Arc::new(InMemoryStore::new()));
        }
        Err(()) => return exit_codes::RUNTIME_ERROR,
    }
    let services = Arc::new(services);

    let _tracing = services.events.subscribe(Arc::new(TracingEventSink)).await;
    let _stdout = if opts.events {
        Some(services.events.subscribe(Arc::new(StdoutEventSink)).await)
    } else {
        None
    };

    let engine = Arc::new(ExecutionEngine::new(services.clone(), engine_cfg));
    let runner = Arc::new(TaskRunner::new(engine).with_persist(pool_cfg.persist));
    let factory = Arc::new(WebDriverFactory::new(build_webdriver_config(&opts.webdriver)));
    let pool = TaskPool::new(runner, &pool_cfg, factory);

    let ids: Vec<String> = tasks.iter().map(|t| t.task_id.clone()).collect();
    let results = pool.run_all(tasks).await;

    let mut code = exit_codes::SUCCESS;
    let mut outcomes = Vec::with_capacity(results.len());
    for (task_id, result) in ids.into_iter().zip(results) {
        match result {
            Ok(report) => {
                if !report.success && code == exit_codes::SUCCESS {
                    code = exit_codes::RUN_FAILED;
                }
                outcomes.push(RunOutcome {
                    task_id,
                    report: Some(report),
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!(task = %task_id, error = %e, "task did not run");
                code = exit_codes::RUNTIME_ERROR;
                outcomes.push(RunOutcome {
                    task_id,
                    report: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if output.format == OutputFormat::Text && !output.quiet {
        for o in &outcomes {
            print_text_outcome(o);
        }
    } else {
        let summary = RunSummary {
            success: code == exit_codes::SUCCESS,
            tasks: outcomes,
        };
        print_result(output.format, output.quiet, &summary);
    }
    code
}

fn print_text_outcome(o: &RunOutcome) {
    let Some(report) = &o.report else {
        println!("error: {} ({})", o.task_id, o.error.as_deref().unwrap_or_default());
        return;
    };
    let status = if report.success { "ok" } else { "failed" };
    println!(
        "{status}: {} on {} [{}] in {}ms",
        report.task_id, report.website, report.strategy, report.duration_ms
    );
    for r in &report.results {
        let mark = if r.skipped {
            "skip"
        } else if r.ignored {
            "ignored"
        } else if r.success {
            "ok"
        } else {
            "FAIL"
        };
        let via = r
            .winning_locator
            .as_ref()
            .map(|c| format!(" via {}", c.locator))
            .unwrap_or_default();
        println!(
            "  {mark:<7} {} ({}, {} attempts){via}",
            r.action_id, r.kind, r.attempts_used
        );
        for note in &r.learnings {
            println!("          {note}");
        }
    }
    if let Some(f) = &report.failure {
        println!("  stopped at {}: {} ({})", f.action_id, f.message, f.reason);
        for step in &f.classification.remediation {
            println!("    - {step}");
        }
    }
}
