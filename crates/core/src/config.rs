//! Runtime tunables for the analysis pipeline and the host's logging.
//!
//! Sources are layered lowest to highest: built-in defaults, an optional TOML
//! file (with `${VAR}` placeholders), `PRODUCT_INSIGHT_*` environment
//! variables, then programmatic overrides. Every source is read into the same
//! [`ConfigLayer`] shape and merged in that order before validation.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::stock::{StockAnalyzer, DEFAULT_SALES_WINDOW_DAYS};
use crate::report::{
    OutputFormatter, DEFAULT_HERO_LIMIT, DEFAULT_SEASONAL_LIMIT, DEFAULT_SLOW_MOVER_LIMIT,
};

pub const DEFAULT_CONFIG_FILE: &str = "product-insight.toml";
pub const NESTED_CONFIG_FILE: &str = "config/product-insight.toml";

const MAX_SALES_WINDOW_DAYS: u32 = 3650;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub sales_window_days: u32,
    pub hero_limit: usize,
    pub slow_mover_limit: usize,
    pub seasonal_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sales_window_days: DEFAULT_SALES_WINDOW_DAYS,
            hero_limit: DEFAULT_HERO_LIMIT,
            slow_mover_limit: DEFAULT_SLOW_MOVER_LIMIT,
            seasonal_limit: DEFAULT_SEASONAL_LIMIT,
        }
    }
}

impl AnalysisConfig {
    pub fn stock_analyzer(&self) -> StockAnalyzer {
        StockAnalyzer::new(self.sales_window_days)
    }

    pub fn formatter(&self) -> OutputFormatter {
        OutputFormatter::new(self.hero_limit, self.slow_mover_limit, self.seasonal_limit)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let format = match raw.trim().to_ascii_lowercase().as_str() {
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            "json" => Self::Json,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "logging.format `{raw}` is not one of compact, pretty, json"
                )))
            }
        };
        Ok(format)
    }
}

/// Highest-precedence values, typically from command-line flags.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub sales_window_days: Option<u32>,
    pub hero_limit: Option<usize>,
    pub slow_mover_limit: Option<usize>,
    pub seasonal_limit: Option<usize>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Explicit file; when unset the default locations are checked.
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("`{path}` is not valid TOML: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },
    #[error("config file `{0}` does not exist")]
    FileNotFound(PathBuf),
    #[error("placeholder `${{{name}}}` refers to an unset environment variable")]
    UnsetVariable { name: String },
    #[error("placeholder starting at byte {offset} is missing its closing brace")]
    UnclosedPlaceholder { offset: usize },
    #[error("{key}=`{value}` is not a valid {expected}")]
    BadEnvValue { key: &'static str, value: String, expected: &'static str },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// One source's partial view of the configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub analysis: AnalysisLayer,
    pub logging: LoggingLayer,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisLayer {
    pub sales_window_days: Option<u32>,
    pub hero_limit: Option<usize>,
    pub slow_mover_limit: Option<usize>,
    pub seasonal_limit: Option<usize>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingLayer {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

impl From<ConfigOverrides> for ConfigLayer {
    fn from(overrides: ConfigOverrides) -> Self {
        Self {
            analysis: AnalysisLayer {
                sales_window_days: overrides.sales_window_days,
                hero_limit: overrides.hero_limit,
                slow_mover_limit: overrides.slow_mover_limit,
                seasonal_limit: overrides.seasonal_limit,
            },
            logging: LoggingLayer { level: overrides.log_level, format: overrides.log_format },
        }
    }
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let expanded = expand_placeholders(&raw)?;
        toml::from_str(&expanded)
            .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let format = match env_value(&["PRODUCT_INSIGHT_LOGGING_FORMAT", "PRODUCT_INSIGHT_LOG_FORMAT"])
        {
            Some((_, raw)) => Some(raw.parse()?),
            None => None,
        };

        Ok(Self {
            analysis: AnalysisLayer {
                sales_window_days: env_number(&["PRODUCT_INSIGHT_SALES_WINDOW_DAYS"])?,
                hero_limit: env_number(&["PRODUCT_INSIGHT_HERO_LIMIT"])?,
                slow_mover_limit: env_number(&["PRODUCT_INSIGHT_SLOW_MOVER_LIMIT"])?,
                seasonal_limit: env_number(&["PRODUCT_INSIGHT_SEASONAL_LIMIT"])?,
            },
            logging: LoggingLayer {
                level: env_value(&["PRODUCT_INSIGHT_LOGGING_LEVEL", "PRODUCT_INSIGHT_LOG_LEVEL"])
                    .map(|(_, raw)| raw),
                format,
            },
        })
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => config.merge(ConfigLayer::from_file(&path)?),
            None if options.require_file => {
                let wanted =
                    options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
                return Err(ConfigError::FileNotFound(wanted));
            }
            None => {}
        }
        config.merge(ConfigLayer::from_env()?);
        config.merge(options.overrides.into());

        config.validate()?;
        Ok(config)
    }

    /// Copies every value the layer sets; unset values keep what is there.
    pub fn merge(&mut self, layer: ConfigLayer) {
        let ConfigLayer { analysis: patch, logging } = layer;
        let analysis = &mut self.analysis;
        analysis.sales_window_days = patch.sales_window_days.unwrap_or(analysis.sales_window_days);
        analysis.hero_limit = patch.hero_limit.unwrap_or(analysis.hero_limit);
        analysis.slow_mover_limit = patch.slow_mover_limit.unwrap_or(analysis.slow_mover_limit);
        analysis.seasonal_limit = patch.seasonal_limit.unwrap_or(analysis.seasonal_limit);

        if let Some(level) = logging.level {
            self.logging.level = level;
        }
        self.logging.format = logging.format.unwrap_or(self.logging.format);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;
        if !(1..=MAX_SALES_WINDOW_DAYS).contains(&analysis.sales_window_days) {
            return Err(ConfigError::Invalid(format!(
                "analysis.sales_window_days must be within 1..={MAX_SALES_WINDOW_DAYS}, got {}",
                analysis.sales_window_days
            )));
        }

        let limits = [
            ("analysis.hero_limit", analysis.hero_limit),
            ("analysis.slow_mover_limit", analysis.slow_mover_limit),
            ("analysis.seasonal_limit", analysis.seasonal_limit),
        ];
        if let Some((key, _)) = limits.into_iter().find(|(_, limit)| *limit == 0) {
            return Err(ConfigError::Invalid(format!("{key} must be at least 1")));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level `{}` is not one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

/// The explicit path if it exists, otherwise the first default location found.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    match explicit_path {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => [DEFAULT_CONFIG_FILE, NESTED_CONFIG_FILE]
            .into_iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists()),
    }
}

/// Substitutes every `${NAME}` with the value of environment variable NAME.
fn expand_placeholders(raw: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut consumed = 0;

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let close = after_open
            .find('}')
            .ok_or(ConfigError::UnclosedPlaceholder { offset: consumed + start })?;
        let name = &after_open[..close];
        let value =
            env::var(name).map_err(|_| ConfigError::UnsetVariable { name: name.to_owned() })?;
        expanded.push_str(&value);

        let advance = start + 2 + close + 1;
        consumed += advance;
        rest = &rest[advance..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

/// First non-blank value among `keys`, with the key it came from.
fn env_value(keys: &[&'static str]) -> Option<(&'static str, String)> {
    keys.iter().find_map(|key| {
        env::var(key).ok().filter(|value| !value.trim().is_empty()).map(|value| (*key, value))
    })
}

fn env_number<T: std::str::FromStr>(keys: &[&'static str]) -> Result<Option<T>, ConfigError> {
    let Some((key, raw)) = env_value(keys) else {
        return Ok(None);
    };
    raw.trim().parse::<T>().map(Some).map_err(|_| ConfigError::BadEnvValue {
        key,
        value: raw,
        expected: "non-negative integer",
    })
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    const MANAGED_VARS: [&str; 9] = [
        "PRODUCT_INSIGHT_SALES_WINDOW_DAYS",
        "PRODUCT_INSIGHT_HERO_LIMIT",
        "PRODUCT_INSIGHT_SLOW_MOVER_LIMIT",
        "PRODUCT_INSIGHT_SEASONAL_LIMIT",
        "PRODUCT_INSIGHT_LOGGING_LEVEL",
        "PRODUCT_INSIGHT_LOGGING_FORMAT",
        "PRODUCT_INSIGHT_LOG_LEVEL",
        "PRODUCT_INSIGHT_LOG_FORMAT",
        "INSIGHT_TEST_WINDOW",
    ];

    /// Serializes env-mutating tests; the managed variables are wiped on
    /// entry and again on drop.
    struct EnvGuard {
        _lock: MutexGuard<'static, ()>,
    }

    impl EnvGuard {
        fn with(vars: &[(&str, &str)]) -> Self {
            static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
            let lock = LOCK
                .get_or_init(|| Mutex::new(()))
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            clear_managed();
            for (key, value) in vars {
                env::set_var(key, value);
            }
            Self { _lock: lock }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            clear_managed();
        }
    }

    fn clear_managed() {
        for key in MANAGED_VARS {
            env::remove_var(key);
        }
    }

    fn write_config(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("product-insight.toml");
        fs::write(&path, contents).expect("config written");
        (dir, path)
    }

    fn load_from(path: PathBuf) -> Result<AppConfig, ConfigError> {
        AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
    }

    #[test]
    fn defaults_match_the_fixed_pipeline_constants() {
        let _env = EnvGuard::with(&[]);

        let config = load_from("no-such-file.toml".into()).expect("defaults load");

        assert_eq!(config.analysis.sales_window_days, 90);
        assert_eq!(config.analysis.hero_limit, 10);
        assert_eq!(config.analysis.slow_mover_limit, 15);
        assert_eq!(config.analysis.seasonal_limit, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn file_placeholders_expand_from_env() {
        let _env = EnvGuard::with(&[("INSIGHT_TEST_WINDOW", "30")]);
        let (_dir, path) = write_config(
            "[analysis]\nsales_window_days = ${INSIGHT_TEST_WINDOW}\nhero_limit = 5\n",
        );

        let config = load_from(path).expect("config loads");

        assert_eq!(config.analysis.sales_window_days, 30);
        assert_eq!(config.analysis.hero_limit, 5);
        assert_eq!(config.analysis.seasonal_limit, 10);
    }

    #[test]
    fn unset_placeholder_names_the_variable() {
        let _env = EnvGuard::with(&[]);
        let (_dir, path) = write_config("[logging]\nlevel = \"${INSIGHT_TEST_WINDOW}\"\n");

        let error = load_from(path).expect_err("unset variable fails");

        assert!(
            matches!(error, ConfigError::UnsetVariable { ref name } if name == "INSIGHT_TEST_WINDOW")
        );
    }

    #[test]
    fn unclosed_placeholder_is_rejected() {
        let _env = EnvGuard::with(&[]);
        let (_dir, path) = write_config("[logging]\nlevel = \"${OOPS\"\n");

        let error = load_from(path).expect_err("unclosed placeholder fails");

        assert!(matches!(error, ConfigError::UnclosedPlaceholder { offset: 19 }));
    }

    #[test]
    fn short_logging_aliases_apply() {
        let _env = EnvGuard::with(&[
            ("PRODUCT_INSIGHT_LOG_LEVEL", "warn"),
            ("PRODUCT_INSIGHT_LOG_FORMAT", "json"),
        ]);

        let config = AppConfig::load(LoadOptions::default()).expect("config loads");

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn long_logging_key_wins_over_alias() {
        let _env = EnvGuard::with(&[
            ("PRODUCT_INSIGHT_LOGGING_LEVEL", "debug"),
            ("PRODUCT_INSIGHT_LOG_LEVEL", "warn"),
        ]);

        let config = AppConfig::load(LoadOptions::default()).expect("config loads");

        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn layers_apply_default_file_env_override_in_order() {
        let _env = EnvGuard::with(&[
            ("PRODUCT_INSIGHT_SLOW_MOVER_LIMIT", "25"),
            ("PRODUCT_INSIGHT_SEASONAL_LIMIT", "3"),
        ]);
        let (_dir, path) = write_config(
            "[analysis]\nhero_limit = 4\nslow_mover_limit = 20\nseasonal_limit = 7\n\n[logging]\nlevel = \"warn\"\n",
        );

        let config = AppConfig::load(LoadOptions {
            config_path: Some(path),
            overrides: ConfigOverrides {
                seasonal_limit: Some(2),
                log_level: Some("debug".to_owned()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config loads");

        assert_eq!(config.analysis.sales_window_days, 90, "default survives");
        assert_eq!(config.analysis.hero_limit, 4, "file beats default");
        assert_eq!(config.analysis.slow_mover_limit, 25, "env beats file");
        assert_eq!(config.analysis.seasonal_limit, 2, "override beats env");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn zero_limit_fails_validation_with_its_key() {
        let _env = EnvGuard::with(&[("PRODUCT_INSIGHT_HERO_LIMIT", "0")]);

        let error = AppConfig::load(LoadOptions::default()).expect_err("zero limit fails");

        assert!(
            matches!(error, ConfigError::Invalid(ref message) if message.contains("analysis.hero_limit")),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn oversized_window_fails_validation() {
        let _env = EnvGuard::with(&[("PRODUCT_INSIGHT_SALES_WINDOW_DAYS", "4000")]);

        let error = AppConfig::load(LoadOptions::default()).expect_err("window too large");

        assert!(error.to_string().contains("analysis.sales_window_days"));
    }

    #[test]
    fn non_numeric_env_value_names_the_key() {
        let _env = EnvGuard::with(&[("PRODUCT_INSIGHT_SALES_WINDOW_DAYS", "ninety")]);

        let error = AppConfig::load(LoadOptions::default()).expect_err("bad env value");

        assert!(matches!(
            error,
            ConfigError::BadEnvValue { key: "PRODUCT_INSIGHT_SALES_WINDOW_DAYS", .. }
        ));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let _env = EnvGuard::with(&[("PRODUCT_INSIGHT_LOGGING_FORMAT", "xml")]);

        let error = AppConfig::load(LoadOptions::default()).expect_err("bad format");

        assert!(error.to_string().contains("xml"));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let _env = EnvGuard::with(&[]);
        let (_dir, path) = write_config("[analysis]\nhero_limt = 3\n");

        let error = load_from(path).expect_err("typo in key fails");

        assert!(matches!(error, ConfigError::Toml { .. }));
    }

    #[test]
    fn required_file_must_exist() {
        let _env = EnvGuard::with(&[]);

        let error = AppConfig::load(LoadOptions {
            config_path: Some("missing/product-insight.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        })
        .expect_err("missing required file fails");

        assert!(matches!(error, ConfigError::FileNotFound(_)));
    }
}
