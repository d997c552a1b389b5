use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub material: Option<String>,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub price: i64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
    FreeShipping,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
            DiscountType::FreeShipping => "free_shipping",
        }
    }

    /// Accepts the stored column value; the legacy camel-case spelling of
    /// free shipping is still found in older rows.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "percentage" => Some(DiscountType::Percentage),
            "fixed" => Some(DiscountType::Fixed),
            "free_shipping" | "freeShipping" => Some(DiscountType::FreeShipping),
            _ => None,
        }
    }
}

/// A validated discount rule as the cart keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent points for `percentage`, minor currency units for `fixed`.
    pub discount_value: i64,
    pub max_discount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub notes: Option<String>,
    pub coupon_code: Option<String>,
    pub subtotal: i64,
    pub discount: i64,
    pub shipping_fee: i64,
    pub total_amount: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub quantity: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}
