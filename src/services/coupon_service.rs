//! Coupon validation backed by the `coupons` table.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{EntityTrait, QueryFilter, Select};

use crate::{
    cart::{CouponError, CouponValidator, ValidatedCoupon, normalize_code},
    db::OrmConn,
    entity::coupons::{Column, Entity as Coupons, Model as CouponModel},
    models::{Coupon, DiscountType},
    pricing::{discount_for, format_inr},
};

#[derive(Clone)]
pub struct DbCouponValidator {
    orm: OrmConn,
}

impl DbCouponValidator {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }
}

impl CouponValidator for DbCouponValidator {
    async fn validate(&self, code: &str, subtotal: i64) -> Result<ValidatedCoupon, CouponError> {
        let model = find_by_code(code)
            .one(&self.orm)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, code, "coupon lookup failed");
                CouponError::Unavailable("could not reach coupon store".into())
            })?;

        let model = model.ok_or_else(invalid_code)?;
        let coupon = check_eligibility(&model, subtotal, Utc::now())?;
        let discount = discount_for(&coupon, subtotal);
        tracing::debug!(code, subtotal, discount, "coupon accepted");
        Ok(ValidatedCoupon { coupon, discount })
    }
}

/// Looks a coupon up by code, ignoring the case it was stored in.
pub fn find_by_code(code: &str) -> Select<Coupons> {
    Coupons::find()
        .filter(Expr::expr(Func::upper(Expr::col(Column::Code))).eq(normalize_code(code)))
}

/// Applies the coupon's activity window, usage cap and minimum order rules.
pub fn check_eligibility(
    model: &CouponModel,
    subtotal: i64,
    now: DateTime<Utc>,
) -> Result<Coupon, CouponError> {
    if !model.is_active {
        return Err(invalid_code());
    }
    let discount_type = DiscountType::parse(&model.discount_type).ok_or_else(|| {
        tracing::warn!(code = %model.code, discount_type = %model.discount_type, "unknown coupon type");
        invalid_code()
    })?;

    if model.starts_at.is_some_and(|starts| starts.with_timezone(&Utc) > now) {
        return Err(CouponError::Invalid("This coupon is not active yet".into()));
    }
    if model.expires_at.is_some_and(|expires| expires.with_timezone(&Utc) < now) {
        return Err(CouponError::Invalid("This coupon has expired".into()));
    }
    if model.usage_limit.is_some_and(|limit| model.used_count >= limit) {
        return Err(CouponError::Invalid(
            "This coupon has reached its usage limit".into(),
        ));
    }
    if let Some(min) = model.min_order_amount.filter(|min| subtotal < *min) {
        return Err(CouponError::Invalid(format!(
            "Minimum order amount of {} required",
            format_inr(min)
        )));
    }

    Ok(Coupon {
        code: model.code.to_uppercase(),
        discount_type,
        discount_value: model.discount_value,
        max_discount: model.max_discount,
    })
}

pub fn invalid_code() -> CouponError {
    CouponError::Invalid("Invalid coupon code".into())
}
