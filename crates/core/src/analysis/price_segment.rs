//! Aggregation over the three fixed price tiers.
//!
//! The tier table is fixed-size: every tier is reported on every run, empty
//! or not, so the output shape never depends on the catalog.

use serde::{Deserialize, Serialize};

use super::{
    mean, round2, PerformanceMetric, PriceSegment, ProductMetrics, StockMetric, StockSegment,
};
use crate::domain::product::Product;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockHealth {
    Good,
    Moderate,
    Poor,
}

impl StockHealth {
    pub fn from_healthy_share(share: f64) -> Self {
        if share > 0.70 {
            Self::Good
        } else if share >= 0.40 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSegmentInsight {
    pub price_range: String,
    pub product_count: usize,
    pub avg_trend_score: f64,
    pub stock_health: StockHealth,
}

impl PriceSegmentInsight {
    fn empty(segment: PriceSegment) -> Self {
        Self {
            price_range: segment.price_range().to_owned(),
            product_count: 0,
            avg_trend_score: 0.0,
            stock_health: StockHealth::Good,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSegmentAnalysis {
    #[serde(rename = "BUDGET")]
    pub budget: PriceSegmentInsight,
    #[serde(rename = "MID")]
    pub mid: PriceSegmentInsight,
    #[serde(rename = "PREMIUM")]
    pub premium: PriceSegmentInsight,
}

impl PriceSegmentAnalysis {
    pub fn get(&self, segment: PriceSegment) -> &PriceSegmentInsight {
        match segment {
            PriceSegment::Budget => &self.budget,
            PriceSegment::Mid => &self.mid,
            PriceSegment::Premium => &self.premium,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PriceSegment, &PriceSegmentInsight)> {
        PriceSegment::ALL.into_iter().map(move |segment| (segment, self.get(segment)))
    }

    pub fn total_products(&self) -> usize {
        self.iter().map(|(_, insight)| insight.product_count).sum()
    }
}

#[derive(Clone, Copy, Default)]
struct TierTally {
    products: usize,
    trend_total: f64,
    healthy: usize,
}

impl TierTally {
    fn into_insight(self, segment: PriceSegment) -> PriceSegmentInsight {
        if self.products == 0 {
            return PriceSegmentInsight::empty(segment);
        }

        PriceSegmentInsight {
            price_range: segment.price_range().to_owned(),
            product_count: self.products,
            avg_trend_score: round2(mean(self.trend_total, self.products)),
            stock_health: StockHealth::from_healthy_share(self.healthy as f64 / self.products as f64),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PriceSegmentAnalyzer;

impl PriceSegmentAnalyzer {
    /// Products without a performance metric carry no tier and are left out.
    pub fn analyze(
        &self,
        products: &[Product],
        performance_metrics: &ProductMetrics<PerformanceMetric>,
        stock_metrics: &ProductMetrics<StockMetric>,
    ) -> PriceSegmentAnalysis {
        let mut tallies = [TierTally::default(); 3];

        for product in products {
            let Some(performance) = performance_metrics.get(&product.product_id) else {
                continue;
            };
            let tally = &mut tallies[performance.price_segment as usize];
            tally.products += 1;
            tally.trend_total += product.trend_score;
            let healthy = stock_metrics
                .get(&product.product_id)
                .is_some_and(|metric| metric.stock_segment == StockSegment::Healthy);
            if healthy {
                tally.healthy += 1;
            }
        }

        let [budget, mid, premium] = tallies;
        PriceSegmentAnalysis {
            budget: budget.into_insight(PriceSegment::Budget),
            mid: mid.into_insight(PriceSegment::Mid),
            premium: premium.into_insight(PriceSegment::Premium),
        }
    }
}
