// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr};

const DEFAULT_DATABASE_URL: &str = "sqlite://attendance.db";
const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: SocketAddr,
    /// bcrypt cost used when hashing teacher passwords.
    pub password_cost: u32,
}

impl Config {
    /// Reads the process environment; `main` loads `.env` beforehand.
    pub fn from_env() -> AppResult<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let server_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("SERVER_ADDR: {}", e)))?;

        let password_cost = match env::var("PASSWORD_HASH_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|e| AppError::Config(format!("PASSWORD_HASH_COST: {}", e)))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url,
            server_addr,
            password_cost,
        })
    }
}
