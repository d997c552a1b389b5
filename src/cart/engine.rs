//! The cart and pricing engine.
//!
//! [`CartEngine`] owns the lines and the applied coupon, persists both
//! through a [`CartStorage`] after every mutation and derives [`Totals`]
//! on demand. Coupon application talks to an external
//! [`CouponValidator`] and is split into `begin_coupon` / `finish_coupon`
//! so a caller can run the validation without holding the engine.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    line::{CartLine, LineProduct},
    storage::CartStorage,
};
use crate::{
    models::Coupon,
    pricing::{self, Totals},
};

pub const LINES_KEY: &str = "cart_items";
pub const COUPON_KEY: &str = "cart_coupon";

/// Largest quantity a single line holds; order rows store it as `i32`.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX as u32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("{0}")]
    Invalid(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("A coupon is already being applied")]
    InProgress,

    #[error("Coupon service unavailable: {0}")]
    Unavailable(String),
}

/// What the validation service hands back for an accepted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCoupon {
    pub coupon: Coupon,
    pub discount: i64,
}

pub trait CouponValidator {
    fn validate(
        &self,
        code: &str,
        subtotal: i64,
    ) -> impl Future<Output = Result<ValidatedCoupon, CouponError>> + Send;
}

/// Snapshot taken by [`CartEngine::begin_coupon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponRequest {
    pub code: String,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CartState {
    pub lines: Vec<CartLine>,
    pub applied_coupon: Option<Coupon>,
    pub is_drawer_open: bool,
    pub is_applying_coupon: bool,
    pub is_checking_out: bool,
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub struct CartEngine<S: CartStorage> {
    state: CartState,
    storage: S,
    free_shipping_threshold: i64,
}

impl<S: CartStorage> CartEngine<S> {
    /// Rehydrates from `storage`; anything missing or unreadable starts empty.
    pub fn load(storage: S, free_shipping_threshold: i64) -> Self {
        let mut lines: Vec<CartLine> = read_record(&storage, LINES_KEY).unwrap_or_default();
        lines.retain(|line| line.quantity >= 1);
        dedupe_lines(&mut lines);
        for line in &mut lines {
            line.quantity = line.quantity.min(MAX_LINE_QUANTITY);
        }

        let applied_coupon = if lines.is_empty() {
            None
        } else {
            read_record::<Option<Coupon>>(&storage, COUPON_KEY).flatten()
        };

        let mut engine = Self {
            state: CartState {
                lines,
                applied_coupon,
                ..CartState::default()
            },
            storage,
            free_shipping_threshold,
        };
        engine.drop_coupon_if_empty();
        engine
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.state.lines
    }

    pub fn applied_coupon(&self) -> Option<&Coupon> {
        self.state.applied_coupon.as_ref()
    }

    pub fn quantity_of(&self, product_id: Uuid) -> u32 {
        self.state
            .lines
            .iter()
            .find(|line| line.product_id() == product_id)
            .map_or(0, |line| line.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.state.lines.is_empty()
    }

    pub fn is_applying_coupon(&self) -> bool {
        self.state.is_applying_coupon
    }

    pub fn is_checking_out(&self) -> bool {
        self.state.is_checking_out
    }

    /// A coupon validation or a checkout is in flight.
    pub fn is_busy(&self) -> bool {
        self.state.is_applying_coupon || self.state.is_checking_out
    }

    /// True when dropping the engine loses nothing that a reload from
    /// storage would not bring back.
    pub fn is_idle(&self) -> bool {
        self.is_empty() && !self.is_busy() && !self.state.is_drawer_open
    }

    pub fn free_shipping_threshold(&self) -> i64 {
        self.free_shipping_threshold
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn totals(&self) -> Totals {
        Totals::compute(
            &self.state.lines,
            self.state.applied_coupon.as_ref(),
            self.free_shipping_threshold,
        )
    }

    pub fn add_line(&mut self, product: LineProduct, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let quantity = quantity.min(MAX_LINE_QUANTITY);
        match self
            .state
            .lines
            .iter_mut()
            .find(|line| line.product_id() == product.product_id)
        {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY)
            }
            None => self.state.lines.push(CartLine { product, quantity }),
        }
        self.state.is_drawer_open = true;
        self.after_mutation();
    }

    pub fn remove_line(&mut self, product_id: Uuid) {
        let before = self.state.lines.len();
        self.state.lines.retain(|line| line.product_id() != product_id);
        if self.state.lines.len() != before {
            self.after_mutation();
        }
    }

    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i64) {
        if quantity < 1 {
            self.remove_line(product_id);
            return;
        }
        let quantity =
            u32::try_from(quantity).map_or(MAX_LINE_QUANTITY, |q| q.min(MAX_LINE_QUANTITY));
        if let Some(line) = self
            .state
            .lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
        {
            line.quantity = quantity;
            self.after_mutation();
        }
    }

    pub fn clear(&mut self) {
        self.state.lines.clear();
        self.state.applied_coupon = None;
        self.after_mutation();
    }

    /// Starts a coupon application and raises the pending flag.
    pub fn begin_coupon(&mut self, code: &str) -> Result<CouponRequest, CouponError> {
        if self.state.is_applying_coupon {
            return Err(CouponError::InProgress);
        }
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(CouponError::Invalid("Please enter a coupon code".into()));
        }
        if self.is_empty() {
            return Err(CouponError::EmptyCart);
        }
        self.state.is_applying_coupon = true;
        Ok(CouponRequest {
            code,
            subtotal: self.totals().subtotal,
        })
    }

    /// Commits a validator outcome. On success returns the discount the
    /// coupon grants against the current subtotal.
    pub fn finish_coupon(
        &mut self,
        outcome: Result<ValidatedCoupon, CouponError>,
    ) -> Result<i64, CouponError> {
        self.state.is_applying_coupon = false;
        let validated = outcome?;
        if self.is_empty() {
            return Err(CouponError::EmptyCart);
        }
        self.state.applied_coupon = Some(validated.coupon);
        self.after_mutation();
        Ok(self.totals().discount)
    }

    /// Lowers the pending flag without touching lines or coupon.
    pub fn abort_coupon(&mut self) {
        self.state.is_applying_coupon = false;
    }

    pub async fn apply_coupon<V: CouponValidator>(
        &mut self,
        code: &str,
        validator: &V,
    ) -> Result<i64, CouponError> {
        let request = self.begin_coupon(code)?;
        let outcome = validator.validate(&request.code, request.subtotal).await;
        self.finish_coupon(outcome)
    }

    pub fn remove_coupon(&mut self) {
        if self.state.applied_coupon.take().is_some() {
            self.after_mutation();
        }
    }

    /// Marks the cart as being ordered. Returns `false` when another
    /// checkout already holds it.
    pub fn begin_checkout(&mut self) -> bool {
        if self.state.is_checking_out {
            return false;
        }
        self.state.is_checking_out = true;
        true
    }

    pub fn abort_checkout(&mut self) {
        self.state.is_checking_out = false;
    }

    /// Takes the ordered quantities out of the cart and drops the coupon
    /// the order used. Lines added while the order was placed are kept.
    pub fn complete_checkout(&mut self, ordered: &[CartLine], coupon_code: Option<&str>) {
        self.state.is_checking_out = false;
        for ordered_line in ordered {
            if let Some(line) = self
                .state
                .lines
                .iter_mut()
                .find(|line| line.product_id() == ordered_line.product_id())
            {
                line.quantity = line.quantity.saturating_sub(ordered_line.quantity);
            }
        }
        self.state.lines.retain(|line| line.quantity >= 1);
        let coupon_used = self
            .state
            .applied_coupon
            .as_ref()
            .is_some_and(|applied| coupon_code == Some(applied.code.as_str()));
        if coupon_used {
            self.state.applied_coupon = None;
        }
        self.after_mutation();
    }

    pub fn open_drawer(&mut self) {
        self.state.is_drawer_open = true;
    }

    pub fn close_drawer(&mut self) {
        self.state.is_drawer_open = false;
    }

    pub fn toggle_drawer(&mut self) {
        self.state.is_drawer_open = !self.state.is_drawer_open;
    }

    fn after_mutation(&mut self) {
        self.drop_coupon_if_empty();
        self.persist();
    }

    fn drop_coupon_if_empty(&mut self) {
        if self.state.applied_coupon.is_some() && pricing::subtotal(&self.state.lines) == 0 {
            tracing::debug!("cart subtotal is zero, dropping applied coupon");
            self.state.applied_coupon = None;
        }
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.state.lines) {
            Ok(raw) => {
                if let Err(err) = self.storage.save(LINES_KEY, &raw) {
                    tracing::warn!(error = %err, key = LINES_KEY, "failed to persist cart");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize cart lines"),
        }

        let result = match &self.state.applied_coupon {
            Some(coupon) => match serde_json::to_string(coupon) {
                Ok(raw) => self.storage.save(COUPON_KEY, &raw),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to serialize coupon");
                    return;
                }
            },
            None => self.storage.remove(COUPON_KEY),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, key = COUPON_KEY, "failed to persist coupon");
        }
    }
}

fn read_record<T: serde::de::DeserializeOwned>(storage: &impl CartStorage, key: &str) -> Option<T> {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(error = %err, key, "failed to read stored cart record");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, key, "discarding corrupt cart record");
            None
        }
    }
}

fn dedupe_lines(lines: &mut Vec<CartLine>) {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines.drain(..) {
        match merged
            .iter_mut()
            .find(|existing| existing.product_id() == line.product_id())
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    *lines = merged;
}
