//! Seasonal fit and climate-rule matching.
//!
//! A product is relevant this season when its season code allows the current
//! season, and highly relevant when at least one of its seasonality rules also
//! fires for at least one city in the supplied climate data.

use serde::{Deserialize, Serialize};

use super::ProductMetrics;
use crate::domain::climate::{ClimateData, ClimateRecord, Season};
use crate::domain::product::{Product, RuleType, SeasonalityRule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonalRelevance {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalMetric {
    pub season_match: bool,
    /// Rule types that fired for at least one city, first-seen order.
    pub climate_match: Vec<RuleType>,
    /// Cities where at least one rule fired, first-seen order.
    pub matching_cities: Vec<String>,
    pub seasonal_relevance: SeasonalRelevance,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SeasonalAnalyzer;

impl SeasonalAnalyzer {
    pub fn season_match(&self, product: &Product, current_season: Season) -> bool {
        if !product.is_seasonal {
            return true;
        }

        product
            .season_code
            .as_deref()
            .is_some_and(|code| code == Product::ALL_SEASONS || code == current_season.as_str())
    }

    pub fn rule_fires(&self, rule: &SeasonalityRule, climate: &ClimateRecord) -> bool {
        match &rule.rule_type {
            Some(RuleType::HighHumidity) => climate.humidity_pct >= rule.threshold,
            Some(RuleType::LowTemp) => climate.avg_temp_c <= rule.threshold,
            Some(RuleType::HighRainfall) => climate.rainfall_mm >= rule.threshold,
            Some(RuleType::SeasonTag) => climate.season_tag == rule.threshold_text,
            Some(RuleType::Unrecognized(_)) | None => false,
        }
    }

    /// Evaluates every rule against every city, returning the distinct rule
    /// types and cities that matched.
    pub fn match_climate(
        &self,
        rules: &[SeasonalityRule],
        climate_data: &ClimateData,
    ) -> (Vec<RuleType>, Vec<String>) {
        let mut rule_types: Vec<RuleType> = Vec::new();
        let mut cities: Vec<String> = Vec::new();

        for rule in rules {
            for (city, climate) in climate_data {
                if !self.rule_fires(rule, climate) {
                    continue;
                }
                if let Some(rule_type) = &rule.rule_type {
                    if !rule_types.contains(rule_type) {
                        rule_types.push(rule_type.clone());
                    }
                }
                if !cities.contains(city) {
                    cities.push(city.clone());
                }
            }
        }

        (rule_types, cities)
    }

    pub fn analyze(
        &self,
        products: &[Product],
        current_season: Season,
        climate_data: &ClimateData,
    ) -> ProductMetrics<SeasonalMetric> {
        products
            .iter()
            .map(|product| {
                let season_match = self.season_match(product, current_season);
                let (climate_match, matching_cities) =
                    self.match_climate(&product.seasonality_rules, climate_data);

                let seasonal_relevance = match (season_match, climate_match.is_empty()) {
                    (true, false) => SeasonalRelevance::High,
                    (true, true) => SeasonalRelevance::Medium,
                    (false, _) => SeasonalRelevance::Low,
                };

                let metric =
                    SeasonalMetric { season_match, climate_match, matching_cities, seasonal_relevance };
                (product.product_id.clone(), metric)
            })
            .collect()
    }
}
