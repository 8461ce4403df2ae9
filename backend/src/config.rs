//! Server configuration, read once at startup from the environment (and `.env`).

use crate::services::ingest::DEFAULT_CHUNK_ROWS;
use anyhow::bail;
use log::warn;
use std::env;
use std::str::FromStr;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "audit.sqlite";

/// 10 MB, the JSON body limit the server has always used.
pub const DEFAULT_JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Upper bound on rows accepted by a single save-chunk call.
pub const DEFAULT_MAX_CHUNK_ROWS: usize = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite database file. `:memory:` keeps everything in RAM.
    pub database_path: String,
    pub json_limit_bytes: usize,
    pub upload_limit_bytes: usize,
    pub max_chunk_rows: usize,
    /// When set, 5xx responses carry the underlying error text in `details`.
    pub expose_error_details: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            json_limit_bytes: DEFAULT_JSON_LIMIT_BYTES,
            upload_limit_bytes: DEFAULT_UPLOAD_LIMIT_BYTES,
            max_chunk_rows: DEFAULT_MAX_CHUNK_ROWS,
            expose_error_details: true,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads `.env` if present, then reads the `AUDIT_*` variables over the defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let environment = env::var("AUDIT_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config {
            host: env::var("AUDIT_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env_or("AUDIT_PORT", DEFAULT_PORT),
            database_path: env::var("AUDIT_DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            json_limit_bytes: env_or("AUDIT_JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT_BYTES),
            upload_limit_bytes: env_or("AUDIT_UPLOAD_LIMIT_BYTES", DEFAULT_UPLOAD_LIMIT_BYTES),
            max_chunk_rows: env_or("AUDIT_MAX_CHUNK_ROWS", DEFAULT_MAX_CHUNK_ROWS),
            expose_error_details: !environment.eq_ignore_ascii_case("production"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            bail!("AUDIT_PORT must be greater than 0");
        }
        if self.database_path.trim().is_empty() {
            bail!("AUDIT_DATABASE_PATH cannot be empty");
        }
        if self.json_limit_bytes == 0 || self.upload_limit_bytes == 0 {
            bail!("request size limits must be greater than 0");
        }
        if self.max_chunk_rows == 0 {
            bail!("AUDIT_MAX_CHUNK_ROWS must be greater than 0");
        }
        if self.max_chunk_rows < DEFAULT_CHUNK_ROWS {
            warn!(
                "AUDIT_MAX_CHUNK_ROWS={} is below the {} rows clients send per chunk",
                self.max_chunk_rows, DEFAULT_CHUNK_ROWS
            );
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
