use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::orders::{CheckoutRequest, CheckoutResponse},
    error::AppResult,
    middleware::session::CartSession,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order recorded, cart cleared", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Empty cart, invalid delivery details, insufficient stock or coupon no longer valid"),
        (status = 409, description = "A checkout for this cart is already running"),
    ),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    Ok(Json(order_service::checkout(&state, session, payload).await?))
}
