use serde::Deserialize;
use serde_json::Value;

use super::climate::{ClimateData, Season};
use super::order::Order;
use super::product::Product;
use crate::errors::AnalysisError;
use crate::validation::ValidatedPayload;

/// Fully typed view of one request, built once per invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisInput {
    pub tenant_id: String,
    pub products: Vec<Product>,
    pub order_history: Vec<Order>,
    pub current_month: u8,
    pub climate_data: ClimateData,
}

impl AnalysisInput {
    /// Reads every record behind a validated payload. A product without
    /// `productId` is reported as a missing field; any other shape mismatch is
    /// a malformed record.
    pub fn from_payload(payload: ValidatedPayload<'_>) -> Result<Self, AnalysisError> {
        let products = payload
            .products
            .iter()
            .enumerate()
            .map(|(index, value)| {
                if value.is_object() && value.get("productId").is_none() {
                    return Err(AnalysisError::missing_field("productId"));
                }
                read_record(value, || format!("products[{index}]"))
            })
            .collect::<Result<Vec<Product>, _>>()?;

        let order_history = payload
            .order_history
            .iter()
            .enumerate()
            .map(|(index, value)| read_record(value, || format!("orderHistory[{index}]")))
            .collect::<Result<Vec<Order>, _>>()?;

        let climate_data = payload
            .climate_data
            .iter()
            .map(|(city, value)| {
                read_record(value, || format!("climateData.{city}"))
                    .map(|record| (city.clone(), record))
            })
            .collect::<Result<ClimateData, _>>()?;

        Ok(Self {
            tenant_id: payload.tenant_id.to_owned(),
            products,
            order_history,
            current_month: payload.current_month,
            climate_data,
        })
    }

    pub fn current_season(&self) -> Season {
        Season::from_month(self.current_month)
    }
}

fn read_record<'a, T>(value: &'a Value, path: impl FnOnce() -> String) -> Result<T, AnalysisError>
where
    T: Deserialize<'a>,
{
    T::deserialize(value).map_err(|error| AnalysisError::malformed(format!("{}: {error}", path())))
}
