use serde::Serialize;
use steadfast_core::{classify, ActionKind, ErrorClassification, ExecutionContext};

use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ActionKindArg {
    Navigate,
    Click,
    Type,
    Wait,
    Extract,
    Screenshot,
}

impl From<ActionKindArg> for ActionKind {
    fn from(arg: ActionKindArg) -> Self {
        match arg {
            ActionKindArg::Navigate => ActionKind::Navigate,
            ActionKindArg::Click => ActionKind::Click,
            ActionKindArg::Type => ActionKind::Type,
            ActionKindArg::Wait => ActionKind::Wait,
            ActionKindArg::Extract => ActionKind::Extract,
            ActionKindArg::Screenshot => ActionKind::Screenshot,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyResult<'a> {
    action: ActionKind,
    recoverable: bool,
    #[serde(flatten)]
    classification: &'a ErrorClassification,
}

pub async fn classify_cmd(
    message: &str,
    action: ActionKindArg,
    selector: Option<String>,
    url: Option<String>,
    output: OutputArgs,
) -> i32 {
    let kind = ActionKind::from(action);
    let mut ctx = ExecutionContext::new("cli", "classify", kind);
    if let Some(s) = selector {
        ctx = ctx.with_selector(s);
    }
    if let Some(u) = url {
        ctx = ctx.with_url(u);
    }
    let classification = classify(message, &ctx);

    if output.format == OutputFormat::Text && !output.quiet {
        println!(
            "{} ({}){}",
            classification.category,
            classification.severity.as_str(),
            if classification.is_recoverable() { "" } else { ", not recoverable" }
        );
        println!("  {}", classification.message);
        let p = &classification.retry_policy;
        println!(
            "  retry: up to {} attempts, {}ms base delay, x{} backoff",
            p.max_attempts,
            p.base_delay.as_millis(),
            p.backoff_multiplier
        );
        for r in &classification.remediation {
            println!("  - {r}");
        }
    } else {
        let result = ClassifyResult {
            action: kind,
            recoverable: classification.is_recoverable(),
            classification: &classification,
        };
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}
