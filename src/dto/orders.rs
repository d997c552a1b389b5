use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::DeliveryDetails,
    models::{Order, OrderItem},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Trims every field and rejects missing or malformed values.
    pub fn into_delivery(self) -> Result<DeliveryDetails, String> {
        let required = |value: String, field: &str| -> Result<String, String> {
            let value = value.trim().to_string();
            if value.is_empty() {
                Err(format!("{field} is required"))
            } else {
                Ok(value)
            }
        };

        let customer_name = required(self.customer_name, "customer_name")?;
        let phone = required(self.phone, "phone")?;
        let address = required(self.address, "address")?;
        let city = required(self.city, "city")?;
        let pincode = required(self.pincode, "pincode")?;

        let digits = phone.chars().filter(char::is_ascii_digit).count();
        let allowed = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'));
        if !allowed || !(10..=15).contains(&digits) {
            return Err("phone must contain 10 to 15 digits".to_string());
        }
        if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
            return Err("pincode must be 6 digits".to_string());
        }

        Ok(DeliveryDetails {
            customer_name,
            phone,
            address,
            city,
            pincode,
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub message: String,
    pub whatsapp_url: String,
}
