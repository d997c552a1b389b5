use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cart::{CartLine, CartState},
    models::Coupon,
    pricing::Totals,
};

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    /// Values below 1 remove the line.
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyCouponRequest {
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DrawerRequest {
    pub open: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub session_id: Uuid,
    pub lines: Vec<CartLine>,
    pub applied_coupon: Option<Coupon>,
    pub totals: Totals,
    pub shipping_fee: i64,
    pub grand_total: i64,
    pub free_shipping_threshold: i64,
    pub is_drawer_open: bool,
    pub is_applying_coupon: bool,
    pub is_checking_out: bool,
}

impl CartView {
    pub fn new(
        session_id: Uuid,
        state: &CartState,
        totals: Totals,
        shipping_fee: i64,
        free_shipping_threshold: i64,
    ) -> Self {
        Self {
            session_id,
            lines: state.lines.clone(),
            applied_coupon: state.applied_coupon.clone(),
            totals,
            shipping_fee,
            grand_total: totals.total.saturating_add(shipping_fee),
            free_shipping_threshold,
            is_drawer_open: state.is_drawer_open,
            is_applying_coupon: state.is_applying_coupon,
            is_checking_out: state.is_checking_out,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyCouponResponse {
    pub success: bool,
    pub discount: i64,
    pub cart: CartView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderMessagePreview {
    pub message: String,
    pub whatsapp_url: String,
}
