use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{mean, round2, PerformanceMetric, PerformanceSegment, ProductMetrics, StockMetric};
use crate::domain::product::Product;

/// Insights keyed by category, in the order each category first appears.
pub type CategoryInsights = IndexMap<String, CategoryInsight>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceRating {
    Strong,
    Moderate,
    Weak,
}

impl PerformanceRating {
    pub fn from_avg_trend(avg_trend_score: f64) -> Self {
        if avg_trend_score > 80.0 {
            Self::Strong
        } else if avg_trend_score > 65.0 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInsight {
    pub total_products: usize,
    pub avg_trend_score: f64,
    pub total_stock: u128,
    pub avg_stock_days: f64,
    pub performance_rating: PerformanceRating,
    pub top_performers: usize,
    pub underperformers: usize,
}

#[derive(Default)]
struct CategoryTally {
    products: usize,
    trend_total: f64,
    stock_total: u128,
    stock_days_total: f64,
    top_performers: usize,
    underperformers: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryAnalyzer;

impl CategoryAnalyzer {
    /// Groups products by category ("Unknown" when absent), keeping
    /// first-seen category order.
    ///
    /// A product without a stock metric contributes 0 stock-days here, unlike
    /// the 999 no-sales reading used by every other stage.
    pub fn analyze(
        &self,
        products: &[Product],
        performance_metrics: &ProductMetrics<PerformanceMetric>,
        stock_metrics: &ProductMetrics<StockMetric>,
    ) -> CategoryInsights {
        let mut tallies: IndexMap<String, CategoryTally> = IndexMap::new();

        for product in products {
            let tally = tallies.entry(product.category_or_unknown().to_owned()).or_default();
            tally.products += 1;
            tally.trend_total += product.trend_score;
            tally.stock_total += u128::from(product.stock);
            tally.stock_days_total +=
                stock_metrics.get(&product.product_id).map_or(0.0, |metric| metric.stock_days);

            match performance_metrics.get(&product.product_id).map(|m| m.performance_segment) {
                Some(segment) if segment.is_top_performer() => tally.top_performers += 1,
                Some(PerformanceSegment::Underperformer) => tally.underperformers += 1,
                _ => {}
            }
        }

        tallies
            .into_iter()
            .map(|(category, tally)| {
                let avg_trend_score = mean(tally.trend_total, tally.products);
                let insight = CategoryInsight {
                    total_products: tally.products,
                    avg_trend_score: round2(avg_trend_score),
                    total_stock: tally.stock_total,
                    avg_stock_days: round2(mean(tally.stock_days_total, tally.products)),
                    performance_rating: PerformanceRating::from_avg_trend(avg_trend_score),
                    top_performers: tally.top_performers,
                    underperformers: tally.underperformers,
                };
                (category, insight)
            })
            .collect()
    }
}
