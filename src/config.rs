// src/config.rs
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Listing-data provider settings (RapidAPI style host).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_host: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Knobs for the analysis pipeline and the background refresher.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub search_radius_km: f64,
    pub max_competitors: usize,
    /// Pause between successive outbound calls.
    pub request_delay: Duration,
    pub scheduler_enabled: bool,
    pub schedule_hour_utc: u32,
    /// Pause between listings during a scheduled run.
    pub listing_delay: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            search_radius_km: 5.0,
            max_competitors: 20,
            request_delay: Duration::from_millis(1000),
            scheduler_enabled: true,
            schedule_hour_utc: 6,
            listing_delay: Duration::from_secs(5),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    pub provider: ProviderConfig,
    pub gemini: GeminiConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Load configuration from environment variables (and `.env` when present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let timeout = Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", 30u64)?);
        let api_host = var_or("LISTING_API_HOST", "airbnb13.p.rapidapi.com");
        let base_url = var_or("LISTING_API_BASE_URL", &format!("https://{api_host}"));

        let defaults = AnalysisConfig::default();
        let schedule_hour_utc: u32 = parse_or("SCHEDULE_HOUR_UTC", defaults.schedule_hour_utc)?;
        if schedule_hour_utc > 23 {
            return Err(ConfigError::Invalid {
                var: "SCHEDULE_HOUR_UTC",
                value: schedule_hour_utc.to_string(),
            });
        }

        Ok(Self {
            database_path: var_or("DATABASE_PATH", "listing_radar.sqlite3"),
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            max_workers: parse_or("MAX_WORKERS", 8usize)?,
            provider: ProviderConfig {
                api_key: env::var("LISTING_API_KEY").ok().filter(|k| !k.is_empty()),
                api_host,
                base_url,
                timeout,
            },
            gemini: GeminiConfig {
                api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
                model: var_or("GEMINI_MODEL", "gemini-1.5-flash"),
                base_url: var_or(
                    "GEMINI_BASE_URL",
                    "https://generativelanguage.googleapis.com/v1beta",
                ),
                timeout,
            },
            analysis: AnalysisConfig {
                search_radius_km: parse_or("SEARCH_RADIUS_KM", defaults.search_radius_km)?,
                max_competitors: parse_or("MAX_COMPETITORS", defaults.max_competitors)?,
                request_delay: Duration::from_millis(parse_or("REQUEST_DELAY_MS", 1000u64)?),
                scheduler_enabled: parse_or("SCHEDULER_ENABLED", defaults.scheduler_enabled)?,
                schedule_hour_utc,
                listing_delay: Duration::from_secs(parse_or("LISTING_DELAY_SECS", 5u64)?),
            },
        })
    }
}

fn var_or(var: &'static str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_when_unset() {
        let v: u64 = parse_or("LISTING_RADAR_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn parse_or_rejects_garbage() {
        std::env::set_var("LISTING_RADAR_TEST_BAD_NUMBER", "twelve");
        let err = parse_or::<u64>("LISTING_RADAR_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("LISTING_RADAR_TEST_BAD_NUMBER"));
    }
}
