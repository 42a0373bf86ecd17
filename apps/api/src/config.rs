use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3000;
/// The generation backend's own default port; must differ from `DEFAULT_PORT`.
const DEFAULT_GENERATION_API_URL: &str = "http://localhost:8080";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the remote resume-generation service.
    pub generation_api_url: String,
    pub generation_timeout: Duration,
    pub export_timeout: Duration,
    pub photo_read_timeout: Duration,
    pub max_photo_bytes: usize,
    /// Extra fonts for the rasterizer, on top of the system fonts.
    pub font_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", DEFAULT_PORT)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            generation_api_url: std::env::var("GENERATION_API_URL")
                .unwrap_or_else(|_| DEFAULT_GENERATION_API_URL.to_string()),
            generation_timeout: Duration::from_secs(parse_env("GENERATION_TIMEOUT_SECS", 120)?),
            export_timeout: Duration::from_secs(parse_env("EXPORT_TIMEOUT_SECS", 60)?),
            photo_read_timeout: Duration::from_secs(parse_env("PHOTO_READ_TIMEOUT_SECS", 30)?),
            max_photo_bytes: parse_env("MAX_PHOTO_BYTES", 5 * 1024 * 1024)?,
            font_dir: std::env::var_os("FONT_DIR").map(PathBuf::from),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            generation_api_url: DEFAULT_GENERATION_API_URL.to_string(),
            generation_timeout: Duration::from_secs(120),
            export_timeout: Duration::from_secs(60),
            photo_read_timeout: Duration::from_secs(30),
            max_photo_bytes: 5 * 1024 * 1024,
            font_dir: None,
        }
    }
}

/// Reads `key`, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
