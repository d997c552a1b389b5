use chrono::{Duration, Utc};
use jewel_cart::{
    cart::CouponError,
    entity::coupons::Model as CouponModel,
    models::DiscountType,
    services::coupon_service::check_eligibility,
};
use uuid::Uuid;

fn coupon(code: &str, discount_type: &str, value: i64) -> CouponModel {
    CouponModel {
        id: Uuid::new_v4(),
        code: code.to_string(),
        discount_type: discount_type.to_string(),
        discount_value: value,
        max_discount: None,
        min_order_amount: None,
        usage_limit: None,
        used_count: 0,
        is_active: true,
        starts_at: None,
        expires_at: None,
        created_at: Utc::now().fixed_offset(),
    }
}

fn rejection(result: Result<jewel_cart::models::Coupon, CouponError>) -> String {
    match result {
        Err(CouponError::Invalid(msg)) => msg,
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn active_coupon_is_converted() {
    let mut model = coupon("welcome10", "percentage", 10);
    model.max_discount = Some(150);

    let coupon = check_eligibility(&model, 2000, Utc::now()).expect("eligible");

    assert_eq!(coupon.code, "WELCOME10");
    assert_eq!(coupon.discount_type, DiscountType::Percentage);
    assert_eq!(coupon.discount_value, 10);
    assert_eq!(coupon.max_discount, Some(150));
}

#[test]
fn legacy_free_shipping_spelling_is_accepted() {
    let model = coupon("FREESHIP", "freeShipping", 0);
    let coupon = check_eligibility(&model, 100, Utc::now()).expect("eligible");
    assert_eq!(coupon.discount_type, DiscountType::FreeShipping);
}

#[test]
fn inactive_or_unknown_type_is_invalid() {
    let mut inactive = coupon("OLD", "fixed", 100);
    inactive.is_active = false;
    assert_eq!(rejection(check_eligibility(&inactive, 1000, Utc::now())), "Invalid coupon code");

    let weird = coupon("WEIRD", "bogo", 1);
    assert_eq!(rejection(check_eligibility(&weird, 1000, Utc::now())), "Invalid coupon code");
}

#[test]
fn activity_window_is_enforced() {
    let now = Utc::now();

    let mut future = coupon("SOON", "fixed", 100);
    future.starts_at = Some((now + Duration::days(1)).fixed_offset());
    assert_eq!(rejection(check_eligibility(&future, 1000, now)), "This coupon is not active yet");

    let mut expired = coupon("GONE", "fixed", 100);
    expired.expires_at = Some((now - Duration::hours(1)).fixed_offset());
    assert_eq!(rejection(check_eligibility(&expired, 1000, now)), "This coupon has expired");

    let mut live = coupon("LIVE", "fixed", 100);
    live.starts_at = Some((now - Duration::days(1)).fixed_offset());
    live.expires_at = Some((now + Duration::days(1)).fixed_offset());
    assert!(check_eligibility(&live, 1000, now).is_ok());
}

#[test]
fn usage_limit_is_enforced() {
    let mut model = coupon("LIMITED", "fixed", 100);
    model.usage_limit = Some(5);
    model.used_count = 4;
    assert!(check_eligibility(&model, 1000, Utc::now()).is_ok());

    model.used_count = 5;
    assert_eq!(
        rejection(check_eligibility(&model, 1000, Utc::now())),
        "This coupon has reached its usage limit"
    );
}

#[test]
fn minimum_order_amount_is_enforced() {
    let mut model = coupon("FLAT200", "fixed", 200);
    model.min_order_amount = Some(999);

    assert_eq!(
        rejection(check_eligibility(&model, 998, Utc::now())),
        "Minimum order amount of ₹999 required"
    );
    assert!(check_eligibility(&model, 999, Utc::now()).is_ok());
}
