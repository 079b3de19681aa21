//! Per-product classifiers and portfolio aggregations.
//!
//! Every per-product analyzer is stateless and returns a fresh map keyed by
//! [`ProductId`] with exactly one entry per input product. Aggregators read
//! those maps and never mutate them.

pub mod category;
pub mod performance;
pub mod price_segment;
pub mod recommendation;
pub mod seasonal;
pub mod stock;

use std::collections::HashMap;

use crate::domain::product::ProductId;

pub use category::{CategoryAnalyzer, CategoryInsight, CategoryInsights, PerformanceRating};
pub use performance::{
    MarginHealth, PerformanceMetric, PerformanceSegment, PerformanceSegmenter, PriceSegment,
};
pub use price_segment::{PriceSegmentAnalysis, PriceSegmentAnalyzer, PriceSegmentInsight, StockHealth};
pub use recommendation::{RecommendationEngine, RecommendationMetric, RecommendedAction, UrgencyLevel};
pub use seasonal::{SeasonalAnalyzer, SeasonalMetric, SeasonalRelevance};
pub use stock::{StockAnalyzer, StockMetric, StockSegment};

/// Derived records for one run, keyed by product.
pub type ProductMetrics<T> = HashMap<ProductId, T>;

/// Stock-days value reported when a product has no sales signal.
pub const NO_SALES_STOCK_DAYS: f64 = 999.0;

/// Rounds to two decimals from the exact binary value, ties to even.
///
/// `{:.2}` formats from the exact value, so `1.115` (stored just below the
/// tie) becomes `1.11` and an exact tie like `70.125` becomes `70.12`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

pub(crate) fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
