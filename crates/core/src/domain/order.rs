use serde::{Deserialize, Serialize};

use super::product::ProductId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub quantity: u64,
}

impl OrderItem {
    pub fn is_for(&self, product_id: &ProductId) -> bool {
        self.product_id.as_ref() == Some(product_id)
    }
}
