// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Category every personalized paper draws from, regardless of specialization.
pub const CORE_CATEGORY: &str = "Data Structures & Algorithms";

/// Questions drawn from each category pool in personalized mode.
pub const PERSONALIZED_PER_CATEGORY: usize = 10;

/// Below this many remaining seconds the timer is displayed as urgent.
pub const URGENT_THRESHOLD_SECS: u64 = 300;

/// Time allowed for a personalized paper.
pub const PERSONALIZED_DURATION_MINUTES: u32 = 30;

/// How long an expired session with an unsaved attempt stays open for a manual retry.
pub const EXPIRED_RETRY_GRACE_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. The in-memory store is used when absent.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: String,
    /// Share of the available points needed to pass a personalized paper.
    pub personalized_pass_percentage: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let personalized_pass_percentage = env::var("PERSONALIZED_PASS_PERCENTAGE")
            .ok()
            .and_then(|p| p.parse().ok())
            .filter(|p| *p <= 100)
            .unwrap_or(60);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            personalized_pass_percentage,
        }
    }
}
