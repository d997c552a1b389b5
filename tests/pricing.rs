mod common;

use common::{fixed, free_shipping, percentage, product};
use jewel_cart::{
    cart::CartLine,
    pricing::{Totals, discount_for, format_inr, shipping_fee_for},
};

fn line(unit_price: i64, quantity: u32) -> CartLine {
    CartLine {
        product: product("Ring", unit_price),
        quantity,
    }
}

#[test]
fn percentage_discount_is_capped() {
    let lines = vec![line(1000, 2)];
    let totals = Totals::compute(&lines, Some(&percentage("WELCOME10", 10, Some(150))), 1499);

    assert_eq!(totals.subtotal, 2000);
    assert_eq!(totals.discount, 150);
    assert_eq!(totals.total, 1850);
    assert!(totals.has_free_shipping);
    assert_eq!(totals.amount_to_free_shipping, 0);
}

#[test]
fn percentage_discount_rounds_half_up() {
    // 15% of 1099 = 164.85
    assert_eq!(discount_for(&percentage("P15", 15, None), 1099), 165);
    // 10% of 1005 = 100.5
    assert_eq!(discount_for(&percentage("P10", 10, None), 1005), 101);
    // 10% of 1004 = 100.4
    assert_eq!(discount_for(&percentage("P10", 10, None), 1004), 100);
}

#[test]
fn fixed_discount_never_exceeds_subtotal() {
    let lines = vec![line(500, 1)];
    let totals = Totals::compute(&lines, Some(&fixed("FLAT800", 800)), 1499);

    assert_eq!(totals.discount, 500);
    assert_eq!(totals.total, 0);
}

#[test]
fn free_shipping_coupon_leaves_total_untouched() {
    let lines = vec![line(700, 1)];
    let coupon = free_shipping("FREESHIP");
    let totals = Totals::compute(&lines, Some(&coupon), 1499);

    assert_eq!(totals.discount, 0);
    assert_eq!(totals.total, 700);
    assert!(!totals.has_free_shipping);
    assert_eq!(shipping_fee_for(&totals, Some(&coupon), 99), 0);
}

#[test]
fn free_shipping_threshold_progress() {
    let totals = Totals::compute(&[line(1000, 1)], None, 1499);
    assert_eq!(totals.amount_to_free_shipping, 499);
    assert!(!totals.has_free_shipping);
    assert_eq!(shipping_fee_for(&totals, None, 99), 99);

    let exact = Totals::compute(&[line(1499, 1)], None, 1499);
    assert!(exact.has_free_shipping);
    assert_eq!(shipping_fee_for(&exact, None, 99), 0);
}

#[test]
fn item_count_sums_quantities() {
    let totals = Totals::compute(&[line(100, 3), line(250, 2)], None, 1499);
    assert_eq!(totals.item_count, 5);
    assert_eq!(totals.subtotal, 800);
}

#[test]
fn empty_cart_has_no_shipping_fee() {
    let totals = Totals::compute(&[], None, 1499);
    assert_eq!(totals.total, 0);
    assert_eq!(totals.amount_to_free_shipping, 1499);
    assert_eq!(shipping_fee_for(&totals, None, 99), 0);
}

#[test]
fn amounts_use_indian_grouping() {
    assert_eq!(format_inr(0), "₹0");
    assert_eq!(format_inr(999), "₹999");
    assert_eq!(format_inr(1850), "₹1,850");
    assert_eq!(format_inr(125000), "₹1,25,000");
    assert_eq!(format_inr(12345678), "₹1,23,45,678");
    assert_eq!(format_inr(-150), "-₹150");
}
