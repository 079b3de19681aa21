use serde::{Deserialize, Serialize};

use super::{
    MarginHealth, PerformanceMetric, PerformanceSegment, SeasonalMetric, SeasonalRelevance,
    StockMetric, StockSegment,
};
use crate::domain::product::{LifecycleStage, Product};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    Restock,
    Feature,
    Promote,
    SeasonalPush,
    Clearance,
    Bundle,
    Discount,
    Maintain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetric {
    pub recommended_action: RecommendedAction,
    pub urgency_level: UrgencyLevel,
}

impl RecommendationMetric {
    const fn new(recommended_action: RecommendedAction, urgency_level: UrgencyLevel) -> Self {
        Self { recommended_action, urgency_level }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Decision table over one product's metrics; the first matching row wins.
    /// Any metric the caller could not supply simply fails the rows that need it.
    pub fn recommend(
        &self,
        product: &Product,
        performance: Option<&PerformanceMetric>,
        stock: Option<&StockMetric>,
        seasonal: Option<&SeasonalMetric>,
    ) -> RecommendationMetric {
        use RecommendedAction::*;

        let segment = performance.map(|metric| metric.performance_segment);
        let margin_health = performance.map(|metric| metric.margin_health);
        let stock_segment = stock.map(|metric| metric.stock_segment);
        let relevance = seasonal.map(|metric| metric.seasonal_relevance);

        let is_star = segment == Some(PerformanceSegment::Star);
        let is_critical = stock_segment == Some(StockSegment::Critical);
        let is_excess = stock_segment == Some(StockSegment::Excess);

        if is_star && is_critical {
            RecommendationMetric::new(Restock, UrgencyLevel::Critical)
        } else if segment == Some(PerformanceSegment::Rising) {
            RecommendationMetric::new(Feature, UrgencyLevel::High)
        } else if is_star && stock_segment == Some(StockSegment::Healthy) {
            RecommendationMetric::new(Promote, UrgencyLevel::High)
        } else if relevance == Some(SeasonalRelevance::High) && !is_critical {
            RecommendationMetric::new(SeasonalPush, UrgencyLevel::Medium)
        } else if is_excess && product.is_lifecycle(&LifecycleStage::Declining) {
            RecommendationMetric::new(Clearance, UrgencyLevel::Critical)
        } else if is_excess && margin_health == Some(MarginHealth::Moderate) {
            RecommendationMetric::new(Bundle, UrgencyLevel::High)
        } else if segment == Some(PerformanceSegment::Underperformer) {
            RecommendationMetric::new(Discount, UrgencyLevel::Medium)
        } else {
            RecommendationMetric::new(Maintain, UrgencyLevel::Low)
        }
    }
}
