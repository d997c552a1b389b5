use std::time::Duration;

use jewel_cart::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::{
        cart::{AddToCartRequest, ApplyCouponRequest, UpdateQuantityRequest},
        orders::CheckoutRequest,
    },
    entity::{
        coupons::{ActiveModel as CouponActive, Entity as Coupons, Model as CouponModel},
        products::{ActiveModel as ProductActive, Entity as Products, Model as ProductModel},
    },
    error::AppError,
    services::{cart_service, order_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set, Statement,
};
use tempfile::TempDir;
use uuid::Uuid;

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        customer_name: "  Asha Rao ".into(),
        phone: "+91 98765 43210".into(),
        address: "12 MG Road".into(),
        city: "Pune".into(),
        pincode: "411001".into(),
        notes: Some("   ".into()),
    }
}

#[test]
fn delivery_details_are_trimmed_and_validated() {
    let delivery = checkout_request().into_delivery().expect("valid");
    assert_eq!(delivery.customer_name, "Asha Rao");
    assert_eq!(delivery.notes, None);

    let mut missing = checkout_request();
    missing.city = "  ".into();
    assert_eq!(missing.into_delivery().unwrap_err(), "city is required");

    let mut short_phone = checkout_request();
    short_phone.phone = "12345".into();
    assert_eq!(
        short_phone.into_delivery().unwrap_err(),
        "phone must contain 10 to 15 digits"
    );

    let mut bad_pin = checkout_request();
    bad_pin.pincode = "41100A".into();
    assert_eq!(bad_pin.into_delivery().unwrap_err(), "pincode must be 6 digits");
}

// Integration flows against Postgres, run in sequence on one schema.
#[tokio::test]
async fn checkout_flows_against_database() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run checkout flow tests."
            );
            return Ok(());
        }
    };

    let carts_dir = TempDir::new()?;
    let state = setup_state(&database_url, &carts_dir).await?;

    add_apply_coupon_and_checkout(&state).await?;
    checkout_charges_current_price(&state).await?;
    exhausted_coupon_is_refused_at_checkout(&state).await?;
    quantities_are_held_to_stock(&state).await?;
    running_checkout_blocks_a_second_one(&state).await?;

    Ok(())
}

// add to cart -> apply coupon -> checkout records the order and clears the cart.
async fn add_apply_coupon_and_checkout(state: &AppState) -> anyhow::Result<()> {
    let session = Uuid::new_v4();
    let product = insert_product(state, "Kundan Choker Set", 1000, 10).await?;
    // Stored lower-case; lookups ignore case.
    let coupon = insert_coupon(state, "welcome10", Some(150), Some(100)).await?;

    add(state, session, &product, 2).await?;

    let rejected = cart_service::apply_coupon(
        state,
        session,
        ApplyCouponRequest {
            code: "nope".into(),
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    let applied = cart_service::apply_coupon(
        state,
        session,
        ApplyCouponRequest {
            code: " Welcome10 ".into(),
        },
    )
    .await?;
    let applied = applied.data.unwrap();
    assert_eq!(applied.discount, 150);
    assert_eq!(applied.cart.totals.total, 1850);
    assert_eq!(applied.cart.shipping_fee, 0);

    let checkout = order_service::checkout(state, session, checkout_request()).await?;
    let checkout = checkout.data.unwrap();
    assert_eq!(checkout.order.subtotal, 2000);
    assert_eq!(checkout.order.discount, 150);
    assert_eq!(checkout.order.total_amount, 1850);
    assert_eq!(checkout.order.coupon_code.as_deref(), Some("WELCOME10"));
    assert_eq!(checkout.items.len(), 1);
    assert!(checkout.message.contains("Coupon (WELCOME10): -₹150"));
    assert!(checkout.whatsapp_url.starts_with("https://wa.me/919876543210?text="));

    let cart = cart_service::view_cart(state, session)?.data.unwrap();
    assert!(cart.lines.is_empty());
    assert!(cart.applied_coupon.is_none());
    assert!(!cart.is_checking_out);

    let product = Products::find_by_id(product.id).one(&state.orm).await?.unwrap();
    assert_eq!(product.stock, 8);
    let coupon = Coupons::find_by_id(coupon.id).one(&state.orm).await?.unwrap();
    assert_eq!(coupon.used_count, 1);

    let empty = order_service::checkout(state, session, checkout_request()).await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));
    Ok(())
}

async fn checkout_charges_current_price(state: &AppState) -> anyhow::Result<()> {
    let session = Uuid::new_v4();
    let product = insert_product(state, "Temple Jhumkas", 1000, 5).await?;
    add(state, session, &product, 2).await?;

    let mut repriced = product.clone().into_active_model();
    repriced.price = Set(1200);
    repriced.update(&state.orm).await?;

    let checkout = order_service::checkout(state, session, checkout_request())
        .await?
        .data
        .unwrap();
    assert_eq!(checkout.order.subtotal, 2400);
    assert_eq!(checkout.order.total_amount, 2400);
    assert_eq!(checkout.items[0].price, 1200);
    assert!(checkout.message.contains("Qty: 2 x ₹1,200 = ₹2,400"));
    Ok(())
}

async fn exhausted_coupon_is_refused_at_checkout(state: &AppState) -> anyhow::Result<()> {
    let product = insert_product(state, "Polki Bangle", 2000, 10).await?;
    let coupon = insert_coupon(state, "ONCE100", None, Some(1)).await?;
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    for session in [first, second] {
        add(state, session, &product, 1).await?;
        cart_service::apply_coupon(
            state,
            session,
            ApplyCouponRequest {
                code: "once100".into(),
            },
        )
        .await?;
    }

    order_service::checkout(state, first, checkout_request()).await?;

    let refused = order_service::checkout(state, second, checkout_request()).await;
    match refused {
        Err(AppError::BadRequest(msg)) => {
            assert_eq!(msg, "This coupon has reached its usage limit")
        }
        Err(other) => panic!("expected usage limit rejection, got {other}"),
        Ok(_) => panic!("checkout with an exhausted coupon succeeded"),
    }

    let coupon = Coupons::find_by_id(coupon.id).one(&state.orm).await?.unwrap();
    assert_eq!(coupon.used_count, 1);
    let cart = cart_service::view_cart(state, second)?.data.unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert!(cart.applied_coupon.is_none());
    let product = Products::find_by_id(product.id).one(&state.orm).await?.unwrap();
    assert_eq!(product.stock, 9);
    Ok(())
}

async fn quantities_are_held_to_stock(state: &AppState) -> anyhow::Result<()> {
    let session = Uuid::new_v4();
    let product = insert_product(state, "Pearl Drop Studs", 500, 3).await?;

    let too_many = cart_service::add_to_cart(
        state,
        session,
        AddToCartRequest {
            product_id: product.id,
            quantity: 4,
        },
    )
    .await;
    assert!(matches!(too_many, Err(AppError::BadRequest(_))));

    add(state, session, &product, 2).await?;
    let merged = cart_service::add_to_cart(
        state,
        session,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await;
    assert!(matches!(merged, Err(AppError::BadRequest(_))));

    let huge = cart_service::update_quantity(
        state,
        session,
        product.id,
        UpdateQuantityRequest { quantity: i64::MAX },
    )
    .await;
    assert!(matches!(huge, Err(AppError::BadRequest(_))));

    let updated = cart_service::update_quantity(
        state,
        session,
        product.id,
        UpdateQuantityRequest { quantity: 3 },
    )
    .await?;
    assert_eq!(updated.data.unwrap().totals.item_count, 3);
    Ok(())
}

async fn running_checkout_blocks_a_second_one(state: &AppState) -> anyhow::Result<()> {
    let session = Uuid::new_v4();
    let product = insert_product(state, "Oxidised Anklet", 700, 5).await?;
    add(state, session, &product, 1).await?;

    let running = state.carts.begin_checkout(session).expect("first checkout");
    let second = order_service::checkout(state, session, checkout_request()).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
    drop(running);

    let placed = order_service::checkout(state, session, checkout_request()).await?;
    assert_eq!(placed.data.unwrap().order.subtotal, 700);
    Ok(())
}

async fn add(
    state: &AppState,
    session: Uuid,
    product: &ProductModel,
    quantity: i32,
) -> anyhow::Result<()> {
    cart_service::add_to_cart(
        state,
        session,
        AddToCartRequest {
            product_id: product.id,
            quantity,
        },
    )
    .await?;
    Ok(())
}

async fn insert_product(
    state: &AppState,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<ProductModel> {
    let id = Uuid::new_v4();
    let product = ProductActive {
        id: Set(id),
        name: Set(name.to_string()),
        description: Set(Some("For testing".into())),
        sku: Set(Some(format!("JB-TEST-{}", &id.to_string()[..8]))),
        material: Set(Some("Gold plated brass".into())),
        category: Set(Some("testing".into())),
        images: Set(serde_json::json!(["https://images.example.com/test.jpg"])),
        price: Set(price),
        stock: Set(stock),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

async fn insert_coupon(
    state: &AppState,
    code: &str,
    max_discount: Option<i64>,
    usage_limit: Option<i32>,
) -> anyhow::Result<CouponModel> {
    let coupon = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        discount_type: Set("percentage".into()),
        discount_value: Set(10),
        max_discount: Set(max_discount),
        min_order_amount: Set(None),
        usage_limit: Set(usage_limit),
        used_count: Set(0),
        is_active: Set(true),
        starts_at: Set(None),
        expires_at: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(coupon)
}

async fn setup_state(database_url: &str, carts_dir: &TempDir) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = orm_from_pool(pool.clone());
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, coupons, audit_logs, products RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        cart_storage_dir: carts_dir.path().to_path_buf(),
        cart_max_sessions: 100,
        cart_idle_ttl: Duration::from_secs(60),
        free_shipping_threshold: 1499,
        shipping_fee: 99,
        whatsapp_number: "919876543210".into(),
        store_name: "Jewel Box".into(),
    };
    Ok(AppState::new(pool, orm, config))
}
