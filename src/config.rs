use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.example.com/claude";
pub const DEFAULT_MAX_TOKENS: u32 = 200_000;

/// Display language for rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "zh" | "cn" | "chinese" => Ok(Locale::Zh),
            other => Err(format!("unsupported language '{other}' (expected en or zh)")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub locale: Locale,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs: u64 = var("LANDSLIDE_TIMEOUT_SECS")
            .unwrap_or_else(|| "60".into())
            .parse()
            .context("LANDSLIDE_TIMEOUT_SECS must be a number")?;

        Ok(Self {
            api_endpoint: var("LANDSLIDE_API_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.into()),
            api_key: var("LANDSLIDE_API_KEY").filter(|k| !k.trim().is_empty()),
            max_tokens: var("LANDSLIDE_MAX_TOKENS")
                .unwrap_or_else(|| DEFAULT_MAX_TOKENS.to_string())
                .parse()
                .context("LANDSLIDE_MAX_TOKENS must be a number")?,
            request_timeout: Duration::from_secs(timeout_secs),
            locale: var("LANDSLIDE_LANG")
                .unwrap_or_else(|| "en".into())
                .parse::<Locale>()
                .map_err(anyhow::Error::msg)
                .context("LANDSLIDE_LANG is invalid")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api_key, None);
        assert_eq!(config.max_tokens, 200_000);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("LANDSLIDE_API_ENDPOINT", "http://localhost:9000/q"),
            ("LANDSLIDE_API_KEY", "secret"),
            ("LANDSLIDE_TIMEOUT_SECS", "5"),
            ("LANDSLIDE_LANG", "zh"),
        ]))
        .unwrap();
        assert_eq!(config.api_endpoint, "http://localhost:9000/q");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.locale, Locale::Zh);
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = Config::from_lookup(lookup(&[("LANDSLIDE_API_KEY", "  ")])).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_bad_number_is_error() {
        let err = Config::from_lookup(lookup(&[("LANDSLIDE_MAX_TOKENS", "many")])).unwrap_err();
        assert!(err.to_string().contains("LANDSLIDE_MAX_TOKENS"));
    }

    #[test]
    fn test_bad_locale_is_error() {
        assert!(Config::from_lookup(lookup(&[("LANDSLIDE_LANG", "fr")])).is_err());
    }
}
