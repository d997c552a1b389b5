mod common;

use common::{fixed, free_shipping, percentage, product};
use jewel_cart::{
    cart::{CartLine, DeliveryDetails, OrderMessage, whatsapp_link},
    pricing::{Totals, shipping_fee_for},
};

fn lines() -> Vec<CartLine> {
    let mut choker = product("Choker", 1000);
    choker.sku = Some("JB-NK-001".into());
    let mut anklet = product("Anklet", 499);
    anklet.sku = None;
    vec![
        CartLine {
            product: choker,
            quantity: 2,
        },
        CartLine {
            product: anklet,
            quantity: 1,
        },
    ]
}

fn delivery() -> DeliveryDetails {
    DeliveryDetails {
        customer_name: "Asha Rao".into(),
        phone: "+91 98765 43210".into(),
        address: "12 MG Road".into(),
        city: "Pune".into(),
        pincode: "411001".into(),
        notes: Some("Gift wrap please".into()),
    }
}

#[test]
fn message_lists_items_summary_and_delivery() {
    let lines = lines();
    let coupon = percentage("WELCOME10", 10, Some(150));
    let totals = Totals::compute(&lines, Some(&coupon), 1499);
    let delivery = delivery();

    let text = OrderMessage {
        store_name: "Jewel Box",
        lines: &lines,
        coupon: Some(&coupon),
        totals,
        shipping_fee: shipping_fee_for(&totals, Some(&coupon), 99),
        delivery: Some(&delivery),
        invoice_number: Some("INV-20260101-abcd1234"),
    }
    .render();

    assert!(text.starts_with("*New Order - Jewel Box*\n"));
    assert!(text.contains("Order ref: INV-20260101-abcd1234"));
    assert!(text.contains("1. Choker (SKU: JB-NK-001)\n   Qty: 2 x ₹1,000 = ₹2,000"));
    assert!(text.contains("2. Anklet\n   Qty: 1 x ₹499 = ₹499"));
    assert!(text.contains("Subtotal: ₹2,499"));
    assert!(text.contains("Coupon (WELCOME10): -₹150"));
    assert!(text.contains("Shipping: FREE"));
    assert!(text.contains("*Total: ₹2,349*"));
    assert!(text.contains("Name: Asha Rao"));
    assert!(text.contains("City: Pune - 411001"));
    assert!(text.contains("Notes: Gift wrap please"));
}

#[test]
fn message_without_coupon_charges_shipping() {
    let lines = vec![CartLine {
        product: product("Studs", 899),
        quantity: 1,
    }];
    let totals = Totals::compute(&lines, None, 1499);
    let message = OrderMessage {
        store_name: "Jewel Box",
        lines: &lines,
        coupon: None,
        totals,
        shipping_fee: shipping_fee_for(&totals, None, 99),
        delivery: None,
        invoice_number: None,
    };
    let text = message.render();

    assert_eq!(message.grand_total(), 998);
    assert!(!text.contains("Coupon"));
    assert!(!text.contains("Delivery Details"));
    assert!(text.contains("Shipping: ₹99"));
    assert!(text.contains("*Total: ₹998*"));
}

#[test]
fn free_shipping_and_fixed_coupons_render_differently() {
    let lines = vec![CartLine {
        product: product("Ring", 799),
        quantity: 1,
    }];

    let ship = free_shipping("FREESHIP");
    let totals = Totals::compute(&lines, Some(&ship), 1499);
    let text = OrderMessage {
        store_name: "Jewel Box",
        lines: &lines,
        coupon: Some(&ship),
        totals,
        shipping_fee: shipping_fee_for(&totals, Some(&ship), 99),
        delivery: None,
        invoice_number: None,
    }
    .render();
    assert!(text.contains("Coupon (FREESHIP): Free shipping"));
    assert!(text.contains("Shipping: FREE"));
    assert!(text.contains("*Total: ₹799*"));

    let flat = fixed("FLAT200", 200);
    let totals = Totals::compute(&lines, Some(&flat), 1499);
    let text = OrderMessage {
        store_name: "Jewel Box",
        lines: &lines,
        coupon: Some(&flat),
        totals,
        shipping_fee: shipping_fee_for(&totals, Some(&flat), 99),
        delivery: None,
        invoice_number: None,
    }
    .render();
    assert!(text.contains("Coupon (FLAT200): -₹200"));
    assert!(text.contains("*Total: ₹698*"));
}

#[test]
fn whatsapp_link_encodes_message_and_strips_number() {
    let url = whatsapp_link("+91 98765-43210", "*Total: ₹1,850*\nThanks & bye");

    assert!(url.starts_with("https://wa.me/919876543210?text="));
    let query = url.split("?text=").nth(1).unwrap();
    assert!(!query.contains(' '));
    assert!(!query.contains('\n'));
    assert!(query.contains("%0A"));
    assert!(query.contains("%26"));
    assert_eq!(
        urlencoding::decode(query).unwrap(),
        "*Total: ₹1,850*\nThanks & bye"
    );
}
