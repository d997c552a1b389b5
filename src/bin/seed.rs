use jewel_cart::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed_products(&pool).await?;
    seed_coupons(&pool).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        ("Kundan Choker Set", "Gold-plated kundan choker with matching earrings", "JB-NK-001", "Gold plated brass", "necklaces", 2499, 15),
        ("Oxidised Jhumkas", "Handcrafted oxidised silver jhumkas", "JB-ER-014", "Oxidised silver", "earrings", 649, 40),
        ("Pearl Drop Studs", "Freshwater pearl studs on sterling posts", "JB-ER-022", "925 sterling silver", "earrings", 899, 30),
        ("Temple Bangle Pair", "Pair of temple-motif bangles", "JB-BG-007", "Gold plated copper", "bangles", 1299, 20),
        ("Minimal Chain Anklet", "Dainty anklet with adjustable length", "JB-AN-003", "Rose gold plated silver", "anklets", 499, 60),
        ("American Diamond Ring", "Solitaire-style ring with AD stones", "JB-RG-011", "Rhodium plated brass", "rings", 799, 25),
    ];

    for (name, desc, sku, material, category, price, stock) in products {
        let images = serde_json::json!([format!("https://images.example.com/products/{}.jpg", sku.to_lowercase())]);
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, sku, material, category, images, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(sku)
        .bind(material)
        .bind(category)
        .bind(images)
        .bind(price as i64)
        .bind(stock as i32)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_coupons(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (code, type, value, max discount, min order)
    let coupons: Vec<(&str, &str, i64, Option<i64>, Option<i64>)> = vec![
        ("WELCOME10", "percentage", 10, Some(150), None),
        ("FLAT200", "fixed", 200, None, Some(999)),
        ("FREESHIP", "free_shipping", 0, None, None),
    ];

    for (code, discount_type, value, max_discount, min_order) in coupons {
        sqlx::query(
            r#"
            INSERT INTO coupons (id, code, discount_type, discount_value, max_discount, min_order_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(discount_type)
        .bind(value)
        .bind(max_discount)
        .bind(min_order)
        .execute(pool)
        .await?;
        println!("Ensured coupon {code} ({discount_type})");
    }

    Ok(())
}
