//! Structural validation of the raw request payload.
//!
//! Checks run in a fixed order and the first failure wins; nothing is
//! accumulated. A successful check hands back borrowed views of the five
//! top-level fields so later stages never re-inspect their JSON types.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::domain::product::Product;
use crate::errors::AnalysisError;

/// Top-level payload fields that passed [`InputValidator::validate`].
#[derive(Clone, Copy, Debug)]
pub struct ValidatedPayload<'a> {
    pub tenant_id: &'a str,
    pub products: &'a [Value],
    pub order_history: &'a [Value],
    pub current_month: u8,
    pub climate_data: &'a Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InputValidator;

impl InputValidator {
    pub fn validate<'a>(&self, payload: &'a Value) -> Result<ValidatedPayload<'a>, AnalysisError> {
        let tenant_id = require(payload, "tenantId")?
            .as_str()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| invalid("Invalid data type for tenantId: expected non-empty string"))?;

        let products = require(payload, "products")?
            .as_array()
            .ok_or_else(|| invalid("Invalid data type for products: expected list"))?;
        if products.is_empty() {
            return Err(invalid("Products array cannot be empty"));
        }

        let order_history = require(payload, "orderHistory")?
            .as_array()
            .ok_or_else(|| invalid("Invalid data type for orderHistory: expected list"))?;

        let current_month = month(require(payload, "currentMonth")?)?;

        let climate_data = require(payload, "climateData")?
            .as_object()
            .ok_or_else(|| invalid("Invalid data type for climateData: expected dict"))?;

        Ok(ValidatedPayload {
            tenant_id,
            products: products.as_slice(),
            order_history: order_history.as_slice(),
            current_month,
            climate_data,
        })
    }

    /// Rejects catalogs that list the same product twice; per-product metrics
    /// are keyed by id and would otherwise silently overwrite each other.
    pub fn check_unique_product_ids(&self, products: &[Product]) -> Result<(), AnalysisError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in products {
            if !seen.insert(&product.product_id) {
                return Err(invalid(format!("Duplicate productId: {}", product.product_id)));
            }
        }
        Ok(())
    }
}

fn require<'a>(payload: &'a Value, field: &str) -> Result<&'a Value, AnalysisError> {
    payload.get(field).ok_or_else(|| invalid(format!("Missing required field: {field}")))
}

fn month(value: &Value) -> Result<u8, AnalysisError> {
    let Value::Number(number) = value else {
        return Err(invalid("Invalid data type for currentMonth: expected int"));
    };
    if !(number.is_i64() || number.is_u64()) {
        return Err(invalid("Invalid data type for currentMonth: expected int"));
    }

    number
        .as_i64()
        .filter(|month| (1..=12).contains(month))
        .and_then(|month| u8::try_from(month).ok())
        .ok_or_else(|| {
            invalid(format!("Invalid currentMonth: must be between 1 and 12, got {number}"))
        })
}

fn invalid(message: impl Into<String>) -> AnalysisError {
    AnalysisError::Validation(message.into())
}
