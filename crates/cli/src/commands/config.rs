use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use product_insight_core::config::{resolve_config_path, AppConfig, LoadOptions, LogFormat};

use crate::commands::{CommandResult, ErrorClass};

/// Where an effective value came from, highest precedence first.
enum Source<'a> {
    Env(&'static str),
    File(&'a Path),
    Default,
}

impl fmt::Display for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(key) => write!(f, "env ({key})"),
            Self::File(path) => write!(f, "file ({})", path.display()),
            Self::Default => f.write_str("default"),
        }
    }
}

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                ErrorClass::ConfigValidation,
                format!("config validation failed: {error}"),
            )
        }
    };
    let file = resolve_config_path(None).and_then(|path| {
        let table = fs::read_to_string(&path).ok()?.parse::<toml::Table>().ok()?;
        Some((path, table))
    });

    let mut report = String::from("effective config (source precedence: env > file > default):");
    for field in fields(&config) {
        let source = source_of(&field, file.as_ref());
        report.push_str(&format!("\n- {} = {} (source: {source})", field.key, field.value));
    }
    CommandResult::output(0, report)
}

fn fields(config: &AppConfig) -> [Field; 6] {
    let analysis = &config.analysis;
    let format = match config.logging.format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    };

    [
        Field {
            key: "analysis.sales_window_days",
            value: analysis.sales_window_days.to_string(),
            env_keys: &["PRODUCT_INSIGHT_SALES_WINDOW_DAYS"],
        },
        Field {
            key: "analysis.hero_limit",
            value: analysis.hero_limit.to_string(),
            env_keys: &["PRODUCT_INSIGHT_HERO_LIMIT"],
        },
        Field {
            key: "analysis.slow_mover_limit",
            value: analysis.slow_mover_limit.to_string(),
            env_keys: &["PRODUCT_INSIGHT_SLOW_MOVER_LIMIT"],
        },
        Field {
            key: "analysis.seasonal_limit",
            value: analysis.seasonal_limit.to_string(),
            env_keys: &["PRODUCT_INSIGHT_SEASONAL_LIMIT"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["PRODUCT_INSIGHT_LOGGING_LEVEL", "PRODUCT_INSIGHT_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format.to_owned(),
            env_keys: &["PRODUCT_INSIGHT_LOGGING_FORMAT", "PRODUCT_INSIGHT_LOG_FORMAT"],
        },
    ]
}

fn source_of<'a>(field: &Field, file: Option<&'a (PathBuf, toml::Table)>) -> Source<'a> {
    let from_env = field
        .env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(key) = from_env {
        return Source::Env(*key);
    }

    match file {
        Some((path, table)) if sets_key(table, field.key) => Source::File(path),
        _ => Source::Default,
    }
}

fn sets_key(table: &toml::Table, dotted: &str) -> bool {
    let Some((section, key)) = dotted.split_once('.') else {
        return table.contains_key(dotted);
    };
    table
        .get(section)
        .and_then(toml::Value::as_table)
        .is_some_and(|section| section.contains_key(key))
}
