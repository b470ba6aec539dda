use once_cell::sync::Lazy;
use std::env;

pub struct Config {
    pub database_path: String,
}

impl Config {
    pub fn init() -> Self {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "tailor_shop.db".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::init);
