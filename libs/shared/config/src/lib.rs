use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_BOOKING_WINDOW_DAYS: u32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// How many days ahead (today included) patients may book.
    pub booking_window_days: u32,
    /// Refuse a booking when the provider already holds an active appointment at that time.
    pub prevent_double_booking: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            booking_window_days: DEFAULT_BOOKING_WINDOW_DAYS,
            prevent_double_booking: true,
        }
    }
}

impl AppConfig {
    /// Load a `.env` file if present, then read the environment.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            booking_window_days: parse_var("BOOKING_WINDOW_DAYS", DEFAULT_BOOKING_WINDOW_DAYS),
            prevent_double_booking: parse_var("PREVENT_DOUBLE_BOOKING", true),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_not_configured() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.booking_window_days, 60);
        assert!(config.prevent_double_booking);
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("SHARED_CONFIG_TEST_WINDOW", "not-a-number");
        assert_eq!(parse_var("SHARED_CONFIG_TEST_WINDOW", 60u32), 60);

        env::set_var("SHARED_CONFIG_TEST_WINDOW", " 14 ");
        assert_eq!(parse_var("SHARED_CONFIG_TEST_WINDOW", 60u32), 14);

        env::remove_var("SHARED_CONFIG_TEST_WINDOW");
        assert_eq!(parse_var("SHARED_CONFIG_TEST_WINDOW", 60u32), 60);
    }
}
