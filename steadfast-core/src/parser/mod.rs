use serde::de::DeserializeOwned;

use crate::error::ParseError;
use crate::types::TaskDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedTask {
    pub task: TaskDefinition,
    pub format: DocumentFormat,
}

pub fn parse_task_str(input: &str, format: DocumentFormat) -> Result<ParsedTask, ParseError> {
    let (task, format) = parse_str::<TaskDefinition>(input, format)?;
    Ok(ParsedTask { task, format })
}

/// Parses any document type with the same JSON/YAML detection as task documents.
/// Returns the format that actually parsed.
pub fn parse_str<T: DeserializeOwned>(
    input: &str,
    format: DocumentFormat,
) -> Result<(T, DocumentFormat), ParseError> {
    match format {
        DocumentFormat::Json => Ok((serde_json::from_str(input)?, format)),
        DocumentFormat::Yaml => Ok((serde_yaml::from_str(input)?, format)),
        DocumentFormat::Auto => parse_auto(input),
    }
}

fn parse_auto<T: DeserializeOwned>(input: &str) -> Result<(T, DocumentFormat), ParseError> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return Err(ParseError::UnknownFormat);
    }

    // JSON always starts with `{` or `[`; YAML is a superset, so it is the fallback.
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<T>(input) {
            Ok(v) => Ok((v, DocumentFormat::Json)),
            Err(e) => match serde_yaml::from_str::<T>(input) {
                Ok(v) => Ok((v, DocumentFormat::Yaml)),
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    match serde_yaml::from_str::<T>(input) {
        Ok(v) => Ok((v, DocumentFormat::Yaml)),
        Err(e) => match serde_json::from_str::<T>(input) {
            Ok(v) => Ok((v, DocumentFormat::Json)),
            Err(_) => Err(ParseError::Yaml(e)),
        },
    }
}
