use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;

use crate::{
    cart::registry::{DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS},
    pricing::{DEFAULT_FREE_SHIPPING_THRESHOLD, DEFAULT_SHIPPING_FEE},
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cart_storage_dir: PathBuf,
    pub cart_max_sessions: usize,
    pub cart_idle_ttl: Duration,
    pub free_shipping_threshold: i64,
    pub shipping_fee: i64,
    pub whatsapp_number: String,
    pub store_name: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let cart_storage_dir = env::var("CART_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/carts"));
        let cart_max_sessions = env::var("CART_MAX_SESSIONS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_SESSIONS);
        let cart_idle_ttl = env::var("CART_IDLE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(DEFAULT_IDLE_TTL, Duration::from_secs);
        let free_shipping_threshold = env::var("FREE_SHIPPING_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_FREE_SHIPPING_THRESHOLD);
        let shipping_fee = env::var("SHIPPING_FEE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_SHIPPING_FEE);
        let whatsapp_number = env::var("WHATSAPP_NUMBER").context("WHATSAPP_NUMBER is not set")?;
        if !whatsapp_number.chars().any(|c| c.is_ascii_digit()) {
            anyhow::bail!("WHATSAPP_NUMBER must contain digits");
        }
        let store_name = env::var("STORE_NAME").unwrap_or_else(|_| "Jewel Box".to_string());

        Ok(Self {
            port,
            database_url,
            host,
            cart_storage_dir,
            cart_max_sessions,
            cart_idle_ttl,
            free_shipping_threshold,
            shipping_fee,
            whatsapp_number,
            store_name,
        })
    }
}
