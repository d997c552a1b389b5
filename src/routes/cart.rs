use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{
        AddToCartRequest, ApplyCouponRequest, ApplyCouponResponse, CartView, DrawerRequest,
        OrderMessagePreview, UpdateQuantityRequest,
    },
    error::AppResult,
    middleware::session::CartSession,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart).delete(clear_cart))
        .route("/items", post(add_to_cart))
        .route(
            "/items/{product_id}",
            put(update_quantity).delete(remove_from_cart),
        )
        .route("/coupon", post(apply_coupon).delete(remove_coupon))
        .route("/drawer", put(set_drawer))
        .route("/message", get(order_message))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("x-cart-session" = Option<Uuid>, Header, description = "Cart session id")
    ),
    responses(
        (status = 200, description = "Current cart with totals", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::view_cart(&state, session)?))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add product or increase its quantity", body = ApiResponse<CartView>),
        (status = 400, description = "Bad request"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::add_to_cart(&state, session, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Set line quantity, below 1 removes it", body = ApiResponse<CartView>),
        (status = 400, description = "Unknown product or not enough stock"),
    ),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(
        cart_service::update_quantity(&state, session, product_id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<CartView>),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::remove_from_cart(
        &state, session, product_id,
    )?))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Empty the cart and drop the coupon", body = ApiResponse<CartView>),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::clear_cart(&state, session)?))
}

#[utoipa::path(
    post,
    path = "/api/cart/coupon",
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Coupon applied", body = ApiResponse<ApplyCouponResponse>),
        (status = 400, description = "Coupon rejected"),
        (status = 409, description = "Another coupon application is pending"),
    ),
    tag = "Cart"
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<Json<ApiResponse<ApplyCouponResponse>>> {
    Ok(Json(cart_service::apply_coupon(&state, session, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/cart/coupon",
    responses(
        (status = 200, description = "Coupon removed", body = ApiResponse<CartView>),
    ),
    tag = "Cart"
)]
pub async fn remove_coupon(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::remove_coupon(&state, session)?))
}

#[utoipa::path(
    put,
    path = "/api/cart/drawer",
    request_body = DrawerRequest,
    responses(
        (status = 200, description = "Drawer state updated", body = ApiResponse<CartView>),
    ),
    tag = "Cart"
)]
pub async fn set_drawer(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Json(payload): Json<DrawerRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    Ok(Json(cart_service::set_drawer(&state, session, payload.open)?))
}

#[utoipa::path(
    get,
    path = "/api/cart/message",
    responses(
        (status = 200, description = "Order message preview and WhatsApp link", body = ApiResponse<OrderMessagePreview>),
        (status = 400, description = "Cart is empty"),
    ),
    tag = "Cart"
)]
pub async fn order_message(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> AppResult<Json<ApiResponse<OrderMessagePreview>>> {
    Ok(Json(cart_service::preview_message(&state, session)?))
}
