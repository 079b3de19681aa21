//! Sales velocity and inventory-days classification.

use serde::{Deserialize, Serialize};

use super::{ProductMetrics, NO_SALES_STOCK_DAYS};
use crate::domain::order::Order;
use crate::domain::product::{Product, ProductId};

/// Days of order history the supplied sales total is normalized against.
pub const DEFAULT_SALES_WINDOW_DAYS: u32 = 90;

const CRITICAL_BELOW_DAYS: f64 = 15.0;
const EXCESS_ABOVE_DAYS: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockSegment {
    Critical,
    Healthy,
    Excess,
}

impl StockSegment {
    pub fn classify(stock_days: f64) -> Self {
        if stock_days < CRITICAL_BELOW_DAYS {
            Self::Critical
        } else if stock_days <= EXCESS_ABOVE_DAYS {
            Self::Healthy
        } else {
            Self::Excess
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMetric {
    pub daily_sales_rate: f64,
    pub stock_days: f64,
    pub stock_segment: StockSegment,
    pub inventory_pressure: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct StockAnalyzer {
    sales_window_days: u32,
}

impl Default for StockAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_SALES_WINDOW_DAYS)
    }
}

impl StockAnalyzer {
    pub fn new(sales_window_days: u32) -> Self {
        Self { sales_window_days }
    }

    /// Units sold per day across the whole supplied history, over a fixed
    /// window regardless of the history's real span. Quantities are totalled
    /// in `u128` so no realistic history can overflow.
    pub fn daily_sales_rate(&self, product_id: &ProductId, order_history: &[Order]) -> f64 {
        let total_units: u128 = order_history
            .iter()
            .flat_map(|order| order.items.iter())
            .filter(|item| item.is_for(product_id))
            .map(|item| u128::from(item.quantity))
            .sum();

        total_units as f64 / f64::from(self.sales_window_days)
    }

    pub fn stock_days(&self, stock: u64, daily_sales_rate: f64) -> f64 {
        if daily_sales_rate == 0.0 {
            return NO_SALES_STOCK_DAYS;
        }
        stock as f64 / daily_sales_rate
    }

    pub fn analyze(&self, products: &[Product], order_history: &[Order]) -> ProductMetrics<StockMetric> {
        products
            .iter()
            .map(|product| {
                let daily_sales_rate = self.daily_sales_rate(&product.product_id, order_history);
                let stock_days = self.stock_days(product.stock, daily_sales_rate);

                let metric = StockMetric {
                    daily_sales_rate,
                    stock_days,
                    stock_segment: StockSegment::classify(stock_days),
                    inventory_pressure: stock_days > EXCESS_ABOVE_DAYS,
                };
                (product.product_id.clone(), metric)
            })
            .collect()
    }
}
