use uuid::Uuid;

use crate::{
    audit,
    cart::{CartEngine, CouponValidator, FileStorage, OrderMessage, whatsapp_link},
    dto::cart::{
        AddToCartRequest, ApplyCouponRequest, ApplyCouponResponse, CartView, OrderMessagePreview,
        UpdateQuantityRequest,
    },
    error::{AppError, AppResult},
    models::Product,
    pricing::shipping_fee_for,
    response::{ApiResponse, Meta},
    services::{coupon_service::DbCouponValidator, product_service},
    state::AppState,
};

pub fn view_cart(state: &AppState, session: Uuid) -> AppResult<ApiResponse<CartView>> {
    let view = state
        .carts
        .with_cart(session, |cart| cart_view(state, session, cart));
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn add_to_cart(
    state: &AppState,
    session: Uuid,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = product_service::find_product(state, payload.product_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;
    let in_cart = state
        .carts
        .with_cart(session, |cart| cart.quantity_of(product.id));
    if i64::from(in_cart) + i64::from(payload.quantity) > i64::from(product.stock) {
        return Err(stock_error(&product));
    }

    let quantity = payload.quantity as u32;
    tracing::debug!(%session, product_id = %product.id, quantity, "adding to cart");
    let view = state.carts.with_cart(session, |cart| {
        cart.add_line(product.into(), quantity);
        cart_view(state, session, cart)
    });
    Ok(ApiResponse::success("Added to cart", view, Some(Meta::empty())))
}

pub async fn update_quantity(
    state: &AppState,
    session: Uuid,
    product_id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity >= 1 {
        let product = product_service::find_product(state, product_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;
        if payload.quantity > i64::from(product.stock) {
            return Err(stock_error(&product));
        }
    }

    let view = state.carts.with_cart(session, |cart| {
        cart.update_quantity(product_id, payload.quantity);
        cart_view(state, session, cart)
    });
    Ok(ApiResponse::success("Cart updated", view, Some(Meta::empty())))
}

pub fn remove_from_cart(
    state: &AppState,
    session: Uuid,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let view = state.carts.with_cart(session, |cart| {
        cart.remove_line(product_id);
        cart_view(state, session, cart)
    });
    Ok(ApiResponse::success("Removed from cart", view, Some(Meta::empty())))
}

pub fn clear_cart(state: &AppState, session: Uuid) -> AppResult<ApiResponse<CartView>> {
    let view = state.carts.with_cart(session, |cart| {
        cart.clear();
        cart_view(state, session, cart)
    });
    Ok(ApiResponse::success("Cart cleared", view, Some(Meta::empty())))
}

pub fn set_drawer(state: &AppState, session: Uuid, open: bool) -> AppResult<ApiResponse<CartView>> {
    let view = state.carts.with_cart(session, |cart| {
        if open {
            cart.open_drawer();
        } else {
            cart.close_drawer();
        }
        cart_view(state, session, cart)
    });
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

/// Validates outside the registry lock; the cart stays usable meanwhile
/// and a second application for the same session is refused.
pub async fn apply_coupon(
    state: &AppState,
    session: Uuid,
    payload: ApplyCouponRequest,
) -> AppResult<ApiResponse<ApplyCouponResponse>> {
    let pending = state.carts.begin_coupon(session, &payload.code)?;
    let request = pending.request().clone();

    let validator = DbCouponValidator::new(state.orm.clone());
    let outcome = validator.validate(&request.code, request.subtotal).await;

    if let Err(err) = &outcome {
        tracing::info!(%session, code = %request.code, error = %err, "coupon rejected");
    }
    let discount = pending.finish(outcome)?;

    audit::record(
        &state.pool,
        "coupon_applied",
        "cart",
        serde_json::json!({ "session": session, "code": request.code, "discount": discount }),
    )
    .await;

    let cart = state
        .carts
        .with_cart(session, |cart| cart_view(state, session, cart));
    Ok(ApiResponse::success(
        "Coupon applied",
        ApplyCouponResponse {
            success: true,
            discount,
            cart,
        },
        Some(Meta::empty()),
    ))
}

pub fn remove_coupon(state: &AppState, session: Uuid) -> AppResult<ApiResponse<CartView>> {
    let view = state.carts.with_cart(session, |cart| {
        cart.remove_coupon();
        cart_view(state, session, cart)
    });
    Ok(ApiResponse::success("Coupon removed", view, Some(Meta::empty())))
}

pub fn preview_message(state: &AppState, session: Uuid) -> AppResult<ApiResponse<OrderMessagePreview>> {
    let message = state.carts.with_cart(session, |cart| {
        if cart.is_empty() {
            return None;
        }
        let totals = cart.totals();
        let shipping_fee = shipping_fee_for(&totals, cart.applied_coupon(), state.config.shipping_fee);
        let message = OrderMessage {
            store_name: &state.config.store_name,
            lines: cart.lines(),
            coupon: cart.applied_coupon(),
            totals,
            shipping_fee,
            delivery: None,
            invoice_number: None,
        };
        Some(message.render())
    });
    let message = message.ok_or_else(|| AppError::BadRequest("Cart is empty".into()))?;
    let whatsapp_url = whatsapp_link(&state.config.whatsapp_number, &message);
    Ok(ApiResponse::success(
        "OK",
        OrderMessagePreview {
            message,
            whatsapp_url,
        },
        Some(Meta::empty()),
    ))
}

fn stock_error(product: &Product) -> AppError {
    if product.stock <= 0 {
        AppError::BadRequest(format!("{} is out of stock", product.name))
    } else {
        AppError::BadRequest(format!(
            "Only {} of {} left in stock",
            product.stock, product.name
        ))
    }
}

pub fn cart_view(state: &AppState, session: Uuid, cart: &CartEngine<FileStorage>) -> CartView {
    let totals = cart.totals();
    let shipping_fee = shipping_fee_for(&totals, cart.applied_coupon(), state.config.shipping_fee);
    CartView::new(
        session,
        cart.state(),
        totals,
        shipping_fee,
        cart.free_shipping_threshold(),
    )
}
