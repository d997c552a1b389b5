use std::sync::Arc;

use crate::{
    cart::CartRegistry,
    config::AppConfig,
    db::{DbPool, OrmConn},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub carts: Arc<CartRegistry>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> Self {
        let carts = CartRegistry::new(&config.cart_storage_dir, config.free_shipping_threshold)
            .with_limits(config.cart_max_sessions, config.cart_idle_ttl);
        Self {
            pool,
            orm,
            carts: Arc::new(carts),
            config: Arc::new(config),
        }
    }
}
