use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use product_insight_core::config::{AnalysisConfig, AppConfig, ConfigOverrides, LoadOptions};
use product_insight_core::{execute_with, AnalysisResponse};
use serde::Serialize;
use serde_json::Value;

use crate::commands::{CommandResult, ErrorClass};

const COMMAND: &str = "analyze";
/// Exit code when the pipeline answered with an error envelope.
const EXIT_ERROR_ENVELOPE: u8 = 3;

#[derive(Clone, Debug, Default)]
pub struct AnalyzeOptions {
    pub input: Option<PathBuf>,
    pub pretty: bool,
    pub envelope: bool,
    pub config_path: Option<PathBuf>,
    /// Flag values; they win over the file and the environment.
    pub overrides: ConfigOverrides,
}

/// Function-host response shape; errors travel in `body` with status 200.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HostResponse {
    status_code: u16,
    body: String,
}

pub fn run(options: &AnalyzeOptions) -> CommandResult {
    let load_options = LoadOptions {
        require_file: options.config_path.is_some(),
        config_path: options.config_path.clone(),
        overrides: options.overrides.clone(),
    };
    let config = match AppConfig::load(load_options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                ErrorClass::ConfigValidation,
                format!("configuration issue: {error}"),
            );
        }
    };
    crate::logging::init(&config.logging);

    let raw = match read_input(options.input.as_deref()) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(COMMAND, ErrorClass::Input, format!("{error:#}"))
        }
    };

    run_source(&raw, &config.analysis, options)
}

/// Parses `raw`, runs the pipeline and renders the response.
pub fn run_source(raw: &str, config: &AnalysisConfig, options: &AnalyzeOptions) -> CommandResult {
    let payload = match serde_json::from_str::<Value>(raw) {
        Ok(payload) => unwrap_prompt_envelope(payload),
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                ErrorClass::Input,
                format!("input is not valid JSON: {error}"),
            );
        }
    };

    let response = execute_with(config, &payload);
    let exit_code = if response.is_success() { 0 } else { EXIT_ERROR_ENVELOPE };

    match render(&response, options) {
        Ok(output) => CommandResult::output(exit_code, output),
        Err(error) => CommandResult::failure(
            COMMAND,
            ErrorClass::Serialization,
            format!("could not render response: {error}"),
        ),
    }
}

/// Replaces a lone `{"prompt": "<text>"}` wrapper with the JSON object
/// embedded in the text, when that object carries a `tenantId`. The whole
/// text is tried first; only if it is not JSON at all does the outermost
/// `{...}` span get a second chance.
pub fn unwrap_prompt_envelope(payload: Value) -> Value {
    let embedded = prompt_text(&payload).and_then(embedded_payload);
    embedded.unwrap_or(payload)
}

fn prompt_text(payload: &Value) -> Option<&str> {
    let object = payload.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get("prompt")?.as_str()
}

fn embedded_payload(prompt: &str) -> Option<Value> {
    let parsed = match serde_json::from_str::<Value>(prompt) {
        Ok(parsed) => parsed,
        Err(_) => {
            let start = prompt.find('{')?;
            let end = prompt.rfind('}')?;
            if end < start {
                return None;
            }
            serde_json::from_str::<Value>(&prompt[start..=end]).ok()?
        }
    };

    parsed.get("tenantId").is_some().then_some(parsed)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("could not read input file `{}`", path.display())),
        _ => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw).context("could not read input from stdin")?;
            Ok(raw)
        }
    }
}

fn render(response: &AnalysisResponse, options: &AnalyzeOptions) -> serde_json::Result<String> {
    if options.envelope {
        let wrapped = HostResponse { status_code: 200, body: serde_json::to_string(response)? };
        return to_json(&wrapped, options.pretty);
    }
    to_json(response, options.pretty)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
