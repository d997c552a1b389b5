//! Discount and totals arithmetic.
//!
//! Every amount is an integer in the smallest currency unit. Nothing in
//! here is cached: totals are recomputed from the lines and the coupon
//! parameters each time they are asked for.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    cart::CartLine,
    models::{Coupon, DiscountType},
};

pub const DEFAULT_FREE_SHIPPING_THRESHOLD: i64 = 1499;
pub const DEFAULT_SHIPPING_FEE: i64 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Totals {
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub item_count: u64,
    pub amount_to_free_shipping: i64,
    pub has_free_shipping: bool,
}

impl Totals {
    pub fn compute(lines: &[CartLine], coupon: Option<&Coupon>, threshold: i64) -> Self {
        let subtotal = subtotal(lines);
        let discount = coupon.map_or(0, |c| discount_for(c, subtotal));
        let total = subtotal.saturating_sub(discount).max(0);
        Self {
            subtotal,
            discount,
            total,
            item_count: lines.iter().map(|l| u64::from(l.quantity)).sum(),
            amount_to_free_shipping: threshold.saturating_sub(total).max(0),
            has_free_shipping: total >= threshold,
        }
    }
}

/// Sum of line totals, saturating at `i64::MAX`.
pub fn subtotal(lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .map(CartLine::line_total)
        .fold(0, i64::saturating_add)
}

/// Discount a coupon grants against `subtotal`, never more than `subtotal`.
pub fn discount_for(coupon: &Coupon, subtotal: i64) -> i64 {
    if subtotal <= 0 {
        return 0;
    }
    let value = coupon.discount_value.max(0);
    let discount = match coupon.discount_type {
        DiscountType::Percentage => {
            let raw = round_half_up(i128::from(subtotal) * i128::from(value), 100);
            let raw = i64::try_from(raw).unwrap_or(i64::MAX);
            match coupon.max_discount {
                Some(cap) => raw.min(cap.max(0)),
                None => raw,
            }
        }
        DiscountType::Fixed => value,
        // Shipping is waived at checkout, the cart total is untouched.
        DiscountType::FreeShipping => 0,
    };
    discount.min(subtotal)
}

/// Flat shipping fee unless the order qualifies for free delivery.
pub fn shipping_fee_for(totals: &Totals, coupon: Option<&Coupon>, flat_fee: i64) -> i64 {
    let waived = coupon.is_some_and(|c| c.discount_type == DiscountType::FreeShipping);
    if totals.item_count == 0 || totals.has_free_shipping || waived {
        0
    } else {
        flat_fee.max(0)
    }
}

fn round_half_up(numerator: i128, denominator: i128) -> i128 {
    (numerator + denominator / 2) / denominator
}

/// Renders an amount with Indian digit grouping, e.g. `₹1,25,000`.
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (front, back) = rest.split_at(rest.len() - 2);
            parts.push(back);
            rest = front;
        }
        parts.push(rest);
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };
    if amount < 0 {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}
