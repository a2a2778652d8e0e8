use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Runtime configuration for the completion client, loaded from environment
/// variables (and `.env`, which `main` loads before anything else).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = match non_empty(&lookup, "SCHEMAGEN_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("SCHEMAGEN_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("SCHEMAGEN_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            api_key: require(&lookup, "OPENAI_API_KEY")?,
            base_url: non_empty(&lookup, "OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_empty(&lookup, "SCHEMAGEN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    non_empty(lookup, key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Required environment variable 'OPENAI_API_KEY' is not set"
        );
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert!(Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8000/v1"),
            ("SCHEMAGEN_MODEL", "gpt-4o-mini"),
            ("SCHEMAGEN_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SCHEMAGEN_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SCHEMAGEN_TIMEOUT_SECS"));

        assert!(Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SCHEMAGEN_TIMEOUT_SECS", "0"),
        ]))
        .is_err());
    }
}
