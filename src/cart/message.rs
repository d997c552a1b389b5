//! Order message sent through a pre-filled WhatsApp link.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::line::CartLine;
use crate::{
    models::{Coupon, DiscountType},
    pricing::{Totals, format_inr},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryDetails {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub notes: Option<String>,
}

/// Everything the order message is rendered from.
pub struct OrderMessage<'a> {
    pub store_name: &'a str,
    pub lines: &'a [CartLine],
    pub coupon: Option<&'a Coupon>,
    pub totals: Totals,
    pub shipping_fee: i64,
    pub delivery: Option<&'a DeliveryDetails>,
    pub invoice_number: Option<&'a str>,
}

impl OrderMessage<'_> {
    pub fn grand_total(&self) -> i64 {
        self.totals.total.saturating_add(self.shipping_fee)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "*New Order - {}*", self.store_name)?;
        if let Some(invoice) = self.invoice_number {
            writeln!(out, "Order ref: {invoice}")?;
        }

        writeln!(out)?;
        writeln!(out, "*Items:*")?;
        for (index, line) in self.lines.iter().enumerate() {
            write!(out, "{}. {}", index + 1, line.product.name)?;
            if let Some(sku) = line.product.sku.as_deref().filter(|s| !s.is_empty()) {
                write!(out, " (SKU: {sku})")?;
            }
            writeln!(out)?;
            writeln!(
                out,
                "   Qty: {} x {} = {}",
                line.quantity,
                format_inr(line.product.unit_price),
                format_inr(line.line_total())
            )?;
        }

        writeln!(out)?;
        writeln!(out, "*Order Summary:*")?;
        writeln!(out, "Subtotal: {}", format_inr(self.totals.subtotal))?;
        if let Some(coupon) = self.coupon {
            match coupon.discount_type {
                DiscountType::FreeShipping => {
                    writeln!(out, "Coupon ({}): Free shipping", coupon.code)?
                }
                _ => writeln!(
                    out,
                    "Coupon ({}): -{}",
                    coupon.code,
                    format_inr(self.totals.discount)
                )?,
            }
        }
        if self.shipping_fee == 0 {
            writeln!(out, "Shipping: FREE")?;
        } else {
            writeln!(out, "Shipping: {}", format_inr(self.shipping_fee))?;
        }
        writeln!(out, "*Total: {}*", format_inr(self.grand_total()))?;

        if let Some(delivery) = self.delivery {
            writeln!(out)?;
            writeln!(out, "*Delivery Details:*")?;
            writeln!(out, "Name: {}", delivery.customer_name)?;
            writeln!(out, "Phone: {}", delivery.phone)?;
            writeln!(out, "Address: {}", delivery.address)?;
            writeln!(out, "City: {} - {}", delivery.city, delivery.pincode)?;
            if let Some(notes) = delivery.notes.as_deref().filter(|n| !n.trim().is_empty()) {
                writeln!(out, "Notes: {}", notes.trim())?;
            }
        }

        Ok(())
    }
}

/// `https://wa.me/<number>?text=<message>`; non-digits are stripped from the number.
pub fn whatsapp_link(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!(
        "https://wa.me/{}?text={}",
        digits,
        urlencoding::encode(message)
    )
}
