pub mod analyze;
pub mod config;

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// Why a command stopped before it could print its normal output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    ConfigValidation,
    Input,
    Serialization,
}

impl ErrorClass {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigValidation => 2,
            Self::Serialization => 3,
            Self::Input => 4,
        }
    }
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'static str,
    error_class: ErrorClass,
    message: String,
}

impl CommandResult {
    /// Payload produced by the command itself, printed verbatim.
    pub fn output(exit_code: u8, output: String) -> Self {
        Self { exit_code, output }
    }

    pub fn failure(command: &str, error_class: ErrorClass, message: impl Into<String>) -> Self {
        let payload =
            CommandOutcome { command, status: "error", error_class, message: message.into() };
        Self { exit_code: error_class.exit_code(), output: serialize_payload(&payload) }
    }
}

fn serialize_payload(payload: &CommandOutcome<'_>) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
