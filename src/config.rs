use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_ABOUT_PATH: &str = "src/app/about/list.json";
pub const DEFAULT_SCHEDULE_PATH: &str = "src/app/schedule/tasks.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub app_id: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub api_url: String,
    pub bind_addr: String,
    pub private_key_path: Option<PathBuf>,
    pub max_retries: u32,
    /// Zero disables the installation cache.
    pub installation_cache_ttl: Duration,
    /// Zero keeps an imported key until logout.
    pub session_ttl: Duration,
    pub about_path: String,
    pub schedule_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Missing {} environment variable", key))
        };
        let or_default = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Config {
            app_id: required("APP_ID")?,
            owner: required("GITHUB_OWNER")?,
            repo: required("GITHUB_REPO")?,
            branch: or_default("GITHUB_BRANCH", "main"),
            api_url: or_default("GITHUB_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:3000"),
            private_key_path: lookup("PRIVATE_KEY_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            max_retries: parse_number(&lookup, "HTTP_MAX_RETRIES", 2)?,
            installation_cache_ttl: Duration::from_secs(parse_number(
                &lookup,
                "INSTALLATION_CACHE_TTL_SECS",
                0,
            )?),
            session_ttl: Duration::from_secs(parse_number(&lookup, "SESSION_TTL_SECS", 43_200)?),
            about_path: or_default("ABOUT_PATH", DEFAULT_ABOUT_PATH),
            schedule_path: or_default("SCHEDULE_PATH", DEFAULT_SCHEDULE_PATH),
        })
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {:?}", key, raw)),
        None => Ok(default),
    }
}
