use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    cart::{CartLine, CouponError, OrderMessage, whatsapp_link},
    dto::orders::{CheckoutRequest, CheckoutResponse},
    entity::{
        coupons::{Column as CouponCol, Entity as Coupons},
        order_items::{ActiveModel as OrderItemActive, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::{Coupon, Order, OrderItem},
    pricing::{self, Totals, shipping_fee_for},
    response::{ApiResponse, Meta},
    services::coupon_service::{check_eligibility, find_by_code, invalid_code},
    state::AppState,
};

/// Places the session's cart as an order. Lines are charged at the locked
/// product price and the coupon is checked again inside the transaction.
/// Only what was ordered leaves the cart.
pub async fn checkout(
    state: &AppState,
    session: Uuid,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let delivery = payload.into_delivery().map_err(AppError::BadRequest)?;

    let pending = state
        .carts
        .begin_checkout(session)
        .ok_or_else(|| AppError::Conflict("Checkout already in progress".into()))?;
    if pending.lines().is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    let applied_code = pending.coupon().map(|coupon| coupon.code.clone());

    let txn = state.orm.begin().await?;

    let mut lines: Vec<CartLine> = Vec::with_capacity(pending.lines().len());
    for line in pending.lines() {
        let product = Products::find_by_id(line.product_id())
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let product = match product {
            Some(p) => p,
            None => {
                return Err(AppError::BadRequest(format!(
                    "{} is no longer available",
                    line.product.name
                )));
            }
        };
        if i64::from(product.stock) < i64::from(line.quantity) {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        if product.price != line.product.unit_price {
            tracing::info!(
                %session,
                product_id = %product.id,
                cart_price = line.product.unit_price,
                price = product.price,
                "charging current product price"
            );
        }
        let mut priced = line.clone();
        priced.product.name = product.name;
        priced.product.sku = product.sku;
        priced.product.unit_price = product.price;
        lines.push(priced);
    }

    let coupon = match &applied_code {
        Some(code) => match lock_coupon(&txn, code, pricing::subtotal(&lines)).await? {
            Ok(found) => Some(found),
            Err(err) => {
                drop(txn);
                drop(pending);
                tracing::info!(%session, code = %code, error = %err, "coupon no longer valid at checkout");
                state.carts.with_cart(session, |cart| {
                    if cart.applied_coupon().is_some_and(|c| &c.code == code) {
                        cart.remove_coupon();
                    }
                });
                return Err(err.into());
            }
        },
        None => None,
    };
    let (coupon_id, coupon) = coupon.unzip();

    let totals = Totals::compute(&lines, coupon.as_ref(), state.config.free_shipping_threshold);
    let shipping_fee = shipping_fee_for(&totals, coupon.as_ref(), state.config.shipping_fee);
    let grand_total = totals.total.saturating_add(shipping_fee);

    let order_id = Uuid::new_v4();
    let invoice_number = build_invoice_number(order_id);

    let order = OrderActive {
        id: Set(order_id),
        invoice_number: Set(invoice_number.clone()),
        customer_name: Set(delivery.customer_name.clone()),
        phone: Set(delivery.phone.clone()),
        address: Set(delivery.address.clone()),
        city: Set(delivery.city.clone()),
        pincode: Set(delivery.pincode.clone()),
        notes: Set(delivery.notes.clone()),
        coupon_code: Set(coupon.as_ref().map(|c| c.code.clone())),
        subtotal: Set(totals.subtotal),
        discount: Set(totals.discount),
        shipping_fee: Set(shipping_fee),
        total_amount: Set(grand_total),
        status: Set("pending".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for line in &lines {
        let quantity = i32::try_from(line.quantity)
            .map_err(|_| AppError::BadRequest("Cart has invalid quantity".into()))?;
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id()),
            name: Set(line.product.name.clone()),
            sku: Set(line.product.sku.clone()),
            quantity: Set(quantity),
            price: Set(line.product.unit_price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(order_item_from_entity(item));

        // reduce stock
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(quantity))
            .filter(ProdCol::Id.eq(line.product_id()))
            .exec(&txn)
            .await?;
    }

    if let Some(coupon_id) = coupon_id {
        Coupons::update_many()
            .col_expr(CouponCol::UsedCount, Expr::col(CouponCol::UsedCount).add(1))
            .filter(CouponCol::Id.eq(coupon_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    let message = OrderMessage {
        store_name: &state.config.store_name,
        lines: &lines,
        coupon: coupon.as_ref(),
        totals,
        shipping_fee,
        delivery: Some(&delivery),
        invoice_number: Some(&invoice_number),
    }
    .render();
    let whatsapp_url = whatsapp_link(&state.config.whatsapp_number, &message);

    pending.complete(applied_code.as_deref());
    tracing::info!(%session, order_id = %order.id, total = grand_total, "checkout completed");

    audit::record(
        &state.pool,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "coupon": order.coupon_code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse {
            order: order_from_entity(order),
            items: order_items,
            message,
            whatsapp_url,
        },
        Some(Meta::empty()),
    ))
}

/// Locks the coupon row and re-runs the eligibility rules against the
/// subtotal being charged.
async fn lock_coupon(
    txn: &DatabaseTransaction,
    code: &str,
    subtotal: i64,
) -> AppResult<Result<(Uuid, Coupon), CouponError>> {
    let model = find_by_code(code).lock(LockType::Update).one(txn).await?;
    Ok(match model {
        Some(model) => check_eligibility(&model, subtotal, Utc::now()).map(|coupon| (model.id, coupon)),
        None => Err(invalid_code()),
    })
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        invoice_number: model.invoice_number,
        customer_name: model.customer_name,
        phone: model.phone,
        address: model.address,
        city: model.city,
        pincode: model.pincode,
        notes: model.notes,
        coupon_code: model.coupon_code,
        subtotal: model.subtotal,
        discount: model.discount,
        shipping_fee: model.shipping_fee,
        total_amount: model.total_amount,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        sku: model.sku,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn build_invoice_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("INV-{}-{}", date, short)
}
