//! Performance tiering, margin health and price banding.

use serde::{Deserialize, Serialize};

use super::{ProductMetrics, StockMetric, NO_SALES_STOCK_DAYS};
use crate::domain::product::{LifecycleStage, Product};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceSegment {
    Star,
    Rising,
    Steady,
    Underperformer,
}

impl PerformanceSegment {
    pub fn is_top_performer(&self) -> bool {
        matches!(self, Self::Star | Self::Rising)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarginHealth {
    Excellent,
    Good,
    Moderate,
    Poor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceSegment {
    Budget,
    Mid,
    Premium,
}

impl PriceSegment {
    pub const ALL: [Self; 3] = [Self::Budget, Self::Mid, Self::Premium];

    pub fn classify(base_price: f64) -> Self {
        if base_price <= 200.0 {
            Self::Budget
        } else if base_price <= 500.0 {
            Self::Mid
        } else {
            Self::Premium
        }
    }

    pub fn price_range(&self) -> &'static str {
        match self {
            Self::Budget => "0-200 TL",
            Self::Mid => "200-500 TL",
            Self::Premium => "500+ TL",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    pub performance_segment: PerformanceSegment,
    pub margin_health: MarginHealth,
    pub price_segment: PriceSegment,
    /// Gross margin in percent of base price; negative when sold below cost.
    pub margin: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PerformanceSegmenter;

impl PerformanceSegmenter {
    /// First matching tier wins: Rising, Star, Steady, then Underperformer.
    pub fn classify_performance(&self, product: &Product, stock_days: f64) -> PerformanceSegment {
        let trend = product.trend_score;

        if product.is_lifecycle(&LifecycleStage::New) && trend > 85.0 {
            PerformanceSegment::Rising
        } else if trend > 80.0 && stock_days < 30.0 {
            PerformanceSegment::Star
        } else if (60.0..=80.0).contains(&trend) && stock_days < 60.0 {
            PerformanceSegment::Steady
        } else {
            PerformanceSegment::Underperformer
        }
    }

    pub fn margin_health(&self, cost: f64, base_price: f64) -> (f64, MarginHealth) {
        if base_price == 0.0 {
            return (0.0, MarginHealth::Poor);
        }

        let margin = (base_price - cost) / base_price * 100.0;
        let health = if margin > 60.0 {
            MarginHealth::Excellent
        } else if margin > 40.0 {
            MarginHealth::Good
        } else if margin > 25.0 {
            MarginHealth::Moderate
        } else {
            MarginHealth::Poor
        };
        (margin, health)
    }

    pub fn segment(
        &self,
        products: &[Product],
        stock_metrics: &ProductMetrics<StockMetric>,
    ) -> ProductMetrics<PerformanceMetric> {
        products
            .iter()
            .map(|product| {
                let stock_days = stock_metrics
                    .get(&product.product_id)
                    .map_or(NO_SALES_STOCK_DAYS, |metric| metric.stock_days);
                let (margin, margin_health) = self.margin_health(product.cost, product.base_price);

                let metric = PerformanceMetric {
                    performance_segment: self.classify_performance(product, stock_days),
                    margin_health,
                    price_segment: PriceSegment::classify(product.base_price),
                    margin,
                };
                (product.product_id.clone(), metric)
            })
            .collect()
    }
}
