use axum::{extract::FromRequestParts, http::HeaderName};
use uuid::Uuid;

use crate::error::AppError;

pub static CART_SESSION_HEADER: HeaderName = HeaderName::from_static("x-cart-session");

/// Anonymous cart session taken from `x-cart-session`. A request without
/// the header gets a fresh session id, echoed back in the cart view.
#[derive(Debug, Clone, Copy)]
pub struct CartSession(pub Uuid);

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(&CART_SESSION_HEADER) else {
            let session = Uuid::new_v4();
            tracing::debug!(%session, "issued new cart session");
            return Ok(CartSession(session));
        };

        let raw = value
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid cart session header".into()))?;
        let session = Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::BadRequest("Cart session must be a UUID".into()))?;
        Ok(CartSession(session))
    }
}
