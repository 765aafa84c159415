use std::env;

/// The one user id that is always treated as approved and administrative,
/// whether or not a row for it exists.
pub const PRINCIPAL_ADMIN_ID: i64 = 7873867301;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Public URL registered with the transport at startup, if any.
    pub webhook_url: Option<String>,
    pub low_stock_threshold: i32,
    pub shift_starting_cash: f64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bot_token =
            env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN is not set"))?;
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://shiftstock.db?mode=rwc".to_string());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let webhook_url = env::var("WEBHOOK_URL").ok();
        let low_stock_threshold = env::var("LOW_STOCK_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(10);
        let shift_starting_cash = env::var("SHIFT_STARTING_CASH")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(4000.0);
        Ok(Self {
            bot_token,
            database_url,
            host,
            port,
            webhook_url,
            low_stock_threshold,
            shift_starting_cash,
        })
    }

    /// Config for tests: in-memory store, no real transport credential.
    pub fn for_tests() -> Self {
        Self {
            bot_token: "test-token".to_string(),
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            webhook_url: None,
            low_stock_threshold: 10,
            shift_starting_cash: 4000.0,
        }
    }
}
