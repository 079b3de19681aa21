//! Final report assembly.
//!
//! All per-product fallbacks live in [`OutputFormatter::enrich`]; analyzers
//! never substitute defaults for each other's missing metrics.

use std::cmp::Ordering;

use serde::Serialize;

use crate::analysis::{
    round2, CategoryInsights, MarginHealth, PerformanceMetric, PerformanceSegment,
    PriceSegment, PriceSegmentAnalysis, ProductMetrics, RecommendationMetric, RecommendedAction,
    SeasonalMetric, SeasonalRelevance, StockMetric, StockSegment, UrgencyLevel,
    NO_SALES_STOCK_DAYS,
};
use crate::domain::product::{LifecycleStage, Product, ProductId, RuleType};

pub const DEFAULT_HERO_LIMIT: usize = 10;
pub const DEFAULT_SLOW_MOVER_LIMIT: usize = 15;
pub const DEFAULT_SEASONAL_LIMIT: usize = 10;

/// One product merged with every metric computed for it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProduct {
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub category: String,
    pub brand: Option<String>,
    pub performance_segment: PerformanceSegment,
    pub stock_segment: StockSegment,
    pub lifecycle_stage: LifecycleStage,
    pub trend_score: f64,
    pub stock_days: f64,
    pub daily_sales_rate: f64,
    pub inventory_pressure: bool,
    pub seasonal_relevance: SeasonalRelevance,
    pub season_match: bool,
    pub price_segment: PriceSegment,
    pub margin_health: MarginHealth,
    pub recommended_action: RecommendedAction,
    pub urgency_level: UrgencyLevel,
    pub climate_match: Vec<RuleType>,
    pub matching_cities: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalProduct {
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub seasonal_relevance: SeasonalRelevance,
    pub climate_match: Vec<RuleType>,
    pub matching_cities: Vec<String>,
    pub recommended_action: RecommendedAction,
}

impl From<EnrichedProduct> for SeasonalProduct {
    fn from(value: EnrichedProduct) -> Self {
        Self {
            product_id: value.product_id,
            product_name: value.product_name,
            seasonal_relevance: value.seasonal_relevance,
            climate_match: value.climate_match,
            matching_cities: value.matching_cities,
            recommended_action: value.recommended_action,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_stock_value: f64,
    pub critical_stock_products: usize,
    pub excess_stock_products: usize,
    pub healthy_stock_products: usize,
    pub avg_stock_days: f64,
    pub inventory_turnover_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub hero_products: Vec<EnrichedProduct>,
    pub slow_movers: Vec<EnrichedProduct>,
    pub new_products: Vec<EnrichedProduct>,
    pub seasonal_products: Vec<SeasonalProduct>,
    pub category_insights: CategoryInsights,
    pub price_segment_analysis: PriceSegmentAnalysis,
    pub inventory_summary: InventorySummary,
}

/// Everything the analyzers produced for one run.
#[derive(Clone, Debug)]
pub struct AnalysisResults {
    pub stock: ProductMetrics<StockMetric>,
    pub performance: ProductMetrics<PerformanceMetric>,
    pub seasonal: ProductMetrics<SeasonalMetric>,
    pub recommendations: ProductMetrics<RecommendationMetric>,
    pub category_insights: CategoryInsights,
    pub price_segment_analysis: PriceSegmentAnalysis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputFormatter {
    hero_limit: usize,
    slow_mover_limit: usize,
    seasonal_limit: usize,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_HERO_LIMIT, DEFAULT_SLOW_MOVER_LIMIT, DEFAULT_SEASONAL_LIMIT)
    }
}

impl OutputFormatter {
    pub fn new(hero_limit: usize, slow_mover_limit: usize, seasonal_limit: usize) -> Self {
        Self { hero_limit, slow_mover_limit, seasonal_limit }
    }

    pub fn format(&self, products: &[Product], results: AnalysisResults) -> InsightReport {
        let enriched: Vec<EnrichedProduct> =
            products.iter().map(|product| self.enrich(product, &results)).collect();

        let hero_products = ranked(
            &enriched,
            |p| p.performance_segment.is_top_performer(),
            |p| p.trend_score,
            Some(self.hero_limit),
        );
        let slow_movers = ranked(
            &enriched,
            |p| {
                p.stock_segment == StockSegment::Excess
                    || p.performance_segment == PerformanceSegment::Underperformer
            },
            |p| p.stock_days,
            Some(self.slow_mover_limit),
        );
        let new_products =
            ranked(&enriched, |p| p.lifecycle_stage == LifecycleStage::New, |p| p.trend_score, None);
        let seasonal_products = ranked(
            &enriched,
            |p| p.seasonal_relevance == SeasonalRelevance::High,
            |p| p.trend_score,
            Some(self.seasonal_limit),
        )
        .into_iter()
        .map(SeasonalProduct::from)
        .collect();

        InsightReport {
            hero_products,
            slow_movers,
            new_products,
            seasonal_products,
            category_insights: results.category_insights,
            price_segment_analysis: results.price_segment_analysis,
            inventory_summary: inventory_summary(products, &results.stock),
        }
    }

    pub fn enrich(&self, product: &Product, results: &AnalysisResults) -> EnrichedProduct {
        let id = &product.product_id;
        let stock = results.stock.get(id);
        let performance = results.performance.get(id);
        let seasonal = results.seasonal.get(id);
        let recommendation = results.recommendations.get(id);

        EnrichedProduct {
            product_id: id.clone(),
            product_name: product.product_name.clone(),
            category: product.category_or_unknown().to_owned(),
            brand: product.brand.clone(),
            performance_segment: performance
                .map_or(PerformanceSegment::Underperformer, |m| m.performance_segment),
            stock_segment: stock.map_or(StockSegment::Healthy, |m| m.stock_segment),
            lifecycle_stage: product.lifecycle_stage.clone().unwrap_or(LifecycleStage::Mature),
            trend_score: product.trend_score,
            stock_days: stock.map_or(NO_SALES_STOCK_DAYS, |m| m.stock_days),
            daily_sales_rate: stock.map_or(0.0, |m| m.daily_sales_rate),
            inventory_pressure: stock.is_some_and(|m| m.inventory_pressure),
            seasonal_relevance: seasonal.map_or(SeasonalRelevance::Low, |m| m.seasonal_relevance),
            season_match: seasonal.is_some_and(|m| m.season_match),
            price_segment: performance.map_or(PriceSegment::Budget, |m| m.price_segment),
            margin_health: performance.map_or(MarginHealth::Poor, |m| m.margin_health),
            recommended_action: recommendation
                .map_or(RecommendedAction::Maintain, |m| m.recommended_action),
            urgency_level: recommendation.map_or(UrgencyLevel::Low, |m| m.urgency_level),
            climate_match: seasonal.map(|m| m.climate_match.clone()).unwrap_or_default(),
            matching_cities: seasonal.map(|m| m.matching_cities.clone()).unwrap_or_default(),
        }
    }
}

/// Filters, then stable-sorts descending by `key`; ties keep catalog order.
fn ranked(
    enriched: &[EnrichedProduct],
    include: impl Fn(&EnrichedProduct) -> bool,
    key: impl Fn(&EnrichedProduct) -> f64,
    limit: Option<usize>,
) -> Vec<EnrichedProduct> {
    let mut selected: Vec<EnrichedProduct> =
        enriched.iter().filter(|product| include(product)).cloned().collect();
    selected.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    selected
}

/// Portfolio-wide stock position over every product, enriched or not.
pub fn inventory_summary(
    products: &[Product],
    stock_metrics: &ProductMetrics<StockMetric>,
) -> InventorySummary {
    if products.is_empty() {
        return InventorySummary::default();
    }

    let mut summary =
        InventorySummary { total_products: products.len(), ..InventorySummary::default() };
    let mut total_stock_value = 0.0;
    let mut total_stock_days = 0.0;

    for product in products {
        total_stock_value += product.stock as f64 * product.cost;

        let metric = stock_metrics.get(&product.product_id);
        match metric.map_or(StockSegment::Healthy, |m| m.stock_segment) {
            StockSegment::Critical => summary.critical_stock_products += 1,
            StockSegment::Excess => summary.excess_stock_products += 1,
            StockSegment::Healthy => summary.healthy_stock_products += 1,
        }
        total_stock_days += metric.map_or(NO_SALES_STOCK_DAYS, |m| m.stock_days);
    }

    let avg_stock_days = total_stock_days / products.len() as f64;
    let turnover = if avg_stock_days > 0.0 { 365.0 / avg_stock_days } else { 0.0 };

    summary.total_stock_value = round2(total_stock_value);
    summary.avg_stock_days = round2(avg_stock_days);
    summary.inventory_turnover_rate = round2(turnover);
    summary
}
