use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// Product fields a cart line carries with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LineProduct {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
}

impl From<Product> for LineProduct {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            images: product.images,
            material: product.material,
            sku: product.sku,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: LineProduct,
    pub quantity: u32,
}

impl CartLine {
    pub fn product_id(&self) -> Uuid {
        self.product.product_id
    }

    pub fn line_total(&self) -> i64 {
        self.product.unit_price.saturating_mul(i64::from(self.quantity))
    }
}
