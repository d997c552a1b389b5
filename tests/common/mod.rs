#![allow(dead_code)]

use jewel_cart::{
    cart::{CouponError, CouponValidator, LineProduct, ValidatedCoupon},
    models::{Coupon, DiscountType},
    pricing::discount_for,
};
use uuid::Uuid;

pub fn product(name: &str, unit_price: i64) -> LineProduct {
    LineProduct {
        product_id: Uuid::new_v4(),
        name: name.to_string(),
        unit_price,
        images: vec![format!("https://images.example.com/{}.jpg", name.to_lowercase())],
        material: Some("925 sterling silver".into()),
        sku: Some(format!("SKU-{}", name.to_uppercase())),
    }
}

pub fn percentage(code: &str, value: i64, max_discount: Option<i64>) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount_type: DiscountType::Percentage,
        discount_value: value,
        max_discount,
    }
}

pub fn fixed(code: &str, value: i64) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount_type: DiscountType::Fixed,
        discount_value: value,
        max_discount: None,
    }
}

pub fn free_shipping(code: &str) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount_type: DiscountType::FreeShipping,
        discount_value: 0,
        max_discount: None,
    }
}

/// Accepts only the coupons it was built with, keyed by upper-case code.
pub struct FakeValidator {
    pub coupons: Vec<Coupon>,
    pub min_subtotal: i64,
}

impl FakeValidator {
    pub fn with(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons,
            min_subtotal: 0,
        }
    }
}

impl CouponValidator for FakeValidator {
    async fn validate(&self, code: &str, subtotal: i64) -> Result<ValidatedCoupon, CouponError> {
        let coupon = self
            .coupons
            .iter()
            .find(|c| c.code == code)
            .cloned()
            .ok_or_else(|| CouponError::Invalid("Invalid coupon code".into()))?;
        if subtotal < self.min_subtotal {
            return Err(CouponError::Invalid("Minimum order not met".into()));
        }
        let discount = discount_for(&coupon, subtotal);
        Ok(ValidatedCoupon { coupon, discount })
    }
}
