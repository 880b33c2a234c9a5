use std::path::{Path, PathBuf};

use serde::Serialize;
use steadfast_core::{parse_task_str, DocumentFormat, ParseError, TaskDefinition, Validate};

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResult {
    path: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub enum LoadError {
    Io(String),
    Invalid(Vec<String>),
}

/// Reads, parses and validates one task document.
pub fn load_task(path: &Path) -> Result<(TaskDefinition, DocumentFormat), LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("failed to read {}: {e}", path.display())))?;

    let parsed = parse_task_str(&content, DocumentFormat::Auto).map_err(|e| {
        let msg = match e {
            ParseError::Json(e) => format!("JSON parse failed: {e}"),
            ParseError::Yaml(e) => format!("YAML parse failed: {e}"),
            ParseError::UnknownFormat => "input is neither valid JSON nor valid YAML".to_string(),
        };
        LoadError::Invalid(vec![msg])
    })?;

    parsed.task.validate().map_err(|err| {
        LoadError::Invalid(
            err.violations
                .iter()
                .map(|v| format!("{}: {}", v.path, v.message))
                .collect(),
        )
    })?;
    Ok((parsed.task, parsed.format))
}

pub async fn validate_cmd(paths: &[PathBuf], output: OutputArgs) -> i32 {
    let mut code = exit_codes::SUCCESS;
    for path in paths {
        let display = path.display().to_string();
        let result = match load_task(path) {
            Ok((task, format)) => ValidateResult {
                path: display,
                valid: true,
                format: Some(format!("{format:?}")),
                task_id: Some(task.task_id),
                errors: vec![],
            },
            Err(LoadError::Io(msg)) => {
                print_error(output.format, output.quiet, &msg);
                return exit_codes::RUNTIME_ERROR;
            }
            Err(LoadError::Invalid(errors)) => {
                code = exit_codes::VALIDATION_FAILED;
                ValidateResult {
                    path: display,
                    valid: false,
                    format: None,
                    task_id: None,
                    errors,
                }
            }
        };

        if output.format == OutputFormat::Text && !output.quiet {
            if result.valid {
                println!(
                    "ok: valid task {} ({}, {})",
                    result.task_id.as_deref().unwrap_or_default(),
                    result.format.as_deref().unwrap_or_default(),
                    result.path
                );
            } else {
                eprintln!("invalid: {}", result.path);
                for e in &result.errors {
                    eprintln!("  - {e}");
                }
            }
        } else {
            print_result(output.format, output.quiet, &result);
        }
    }
    code
}
