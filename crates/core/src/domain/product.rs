use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Catalog entry as supplied by the tenant. Absent numeric fields read as zero.
///
/// Text fields distinguish absent from an explicit `null`: an absent name,
/// brand or season code takes its default, while `null` is kept as `None`
/// and echoed back. A `null` season code never matches a season.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: ProductId,
    #[serde(default = "empty_text")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "empty_text")]
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: u64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub base_price: f64,
    #[serde(default)]
    pub lifecycle_stage: Option<LifecycleStage>,
    #[serde(default)]
    pub trend_score: f64,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub is_seasonal: bool,
    #[serde(default = "all_seasons")]
    pub season_code: Option<String>,
    #[serde(default)]
    pub seasonality_rules: Vec<SeasonalityRule>,
}

impl Product {
    pub const UNKNOWN_CATEGORY: &'static str = "Unknown";
    pub const ALL_SEASONS: &'static str = "all";

    pub fn category_or_unknown(&self) -> &str {
        self.category.as_deref().unwrap_or(Self::UNKNOWN_CATEGORY)
    }

    pub fn is_lifecycle(&self, stage: &LifecycleStage) -> bool {
        self.lifecycle_stage.as_ref() == Some(stage)
    }
}

fn empty_text() -> Option<String> {
    Some(String::new())
}

fn all_seasons() -> Option<String> {
    Some(Product::ALL_SEASONS.to_owned())
}

/// Reads any JSON value as a flag: `null`, `false`, zero, and empty strings,
/// arrays or objects are false; everything else is true.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let truthy = match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    };
    Ok(truthy)
}

/// Externally supplied maturity tag. Unrecognized tags are kept verbatim so they
/// can be echoed back, but never satisfy a NEW/MATURE/DECLINING check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleStage {
    New,
    Mature,
    Declining,
    Other(String),
}

impl From<String> for LifecycleStage {
    fn from(value: String) -> Self {
        match value.as_str() {
            "NEW" => Self::New,
            "MATURE" => Self::Mature,
            "DECLINING" => Self::Declining,
            _ => Self::Other(value),
        }
    }
}

impl From<LifecycleStage> for String {
    fn from(value: LifecycleStage) -> Self {
        match value {
            LifecycleStage::New => "NEW".to_owned(),
            LifecycleStage::Mature => "MATURE".to_owned(),
            LifecycleStage::Declining => "DECLINING".to_owned(),
            LifecycleStage::Other(raw) => raw,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalityRule {
    #[serde(default)]
    pub rule_type: Option<RuleType>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub threshold_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleType {
    HighHumidity,
    LowTemp,
    HighRainfall,
    SeasonTag,
    Unrecognized(String),
}

impl RuleType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::HighHumidity => "HIGH_HUMIDITY",
            Self::LowTemp => "LOW_TEMP",
            Self::HighRainfall => "HIGH_RAINFALL",
            Self::SeasonTag => "SEASON_TAG",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for RuleType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "HIGH_HUMIDITY" => Self::HighHumidity,
            "LOW_TEMP" => Self::LowTemp,
            "HIGH_RAINFALL" => Self::HighRainfall,
            "SEASON_TAG" => Self::SeasonTag,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<RuleType> for String {
    fn from(value: RuleType) -> Self {
        value.as_str().to_owned()
    }
}
