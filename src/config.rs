use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const ENV_FILE: &str = ".env";
const API_KEY_VAR: &str = "MEALDB_API_KEY";
/// Public test key accepted by TheMealDB.
const DEFAULT_API_KEY: &str = "1";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Only the first N categories are scanned. 0 in TOML means no limit.
    #[serde(default = "default_partition_limit")]
    pub partition_limit: Option<usize>,
}

fn default_api_base() -> String {
    "https://www.themealdb.com/api/json/v1".to_string()
}
fn default_request_timeout() -> u64 { 5000 }
fn default_partition_limit() -> Option<usize> { Some(14) }

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_ms: default_request_timeout(),
            partition_limit: default_partition_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeedConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_hydrate_delay")]
    pub hydrate_delay_ms: u64,
    #[serde(default)]
    pub hydrate_jitter_ms: u64,
    /// Multiplier for the item cap (`partitions * page_size * n`).
    /// `None` (0 in TOML) turns the cap off and leaves only the under-fill rule.
    #[serde(default = "default_cap_pages")]
    pub cap_pages_per_partition: Option<usize>,
}

fn default_page_size() -> usize { 10 }
fn default_hydrate_delay() -> u64 { 100 }
fn default_cap_pages() -> Option<usize> { Some(1) }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            hydrate_delay_ms: default_hydrate_delay(),
            hydrate_jitter_ms: 0,
            cap_pages_per_partition: default_cap_pages(),
        }
    }
}

impl FeedConfig {
    /// Upper bound on accumulated items for `partition_count` partitions, if capped.
    pub fn item_cap(&self, partition_count: usize) -> Option<usize> {
        self.cap_pages_per_partition
            .map(|pages| partition_count.saturating_mul(self.page_size).saturating_mul(pages))
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        if config.feed.page_size == 0 {
            anyhow::bail!("feed.page_size must be > 0");
        }
        // TOML has no null: 0 switches these limits off.
        if config.feed.cap_pages_per_partition == Some(0) {
            config.feed.cap_pages_per_partition = None;
        }
        if config.catalog.partition_limit == Some(0) {
            config.catalog.partition_limit = None;
        }
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let content = match std::fs::read_to_string(Path::new(ENV_FILE)) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for (key, value) in parse_env_lines(content) {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// TheMealDB key from the environment, falling back to the public test key.
    pub fn api_key() -> String {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => DEFAULT_API_KEY.to_string(),
        }
    }
}

fn parse_env_lines(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"').trim_matches('\'')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.feed.page_size, 10);
        assert_eq!(config.feed.hydrate_delay_ms, 100);
        assert_eq!(config.catalog.partition_limit, Some(14));
        assert!(config.catalog.api_base.contains("themealdb"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.feed, FeedConfig::default());
        assert_eq!(config.catalog.request_timeout_ms, 5000);
    }

    #[test]
    fn test_partial_feed_section() {
        let config = Config::parse("[feed]\npage_size = 4\n").unwrap();
        assert_eq!(config.feed.page_size, 4);
        assert_eq!(config.feed.hydrate_delay_ms, 100);
        assert_eq!(config.feed.cap_pages_per_partition, Some(1));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(Config::parse("[feed]\npage_size = 0\n").is_err());
    }

    #[test]
    fn test_zero_limits_disable() {
        let config = Config::parse("[catalog]\npartition_limit = 0\n[feed]\ncap_pages_per_partition = 0\n").unwrap();
        assert_eq!(config.catalog.partition_limit, None);
        assert_eq!(config.feed.cap_pages_per_partition, None);
    }

    #[test]
    fn test_item_cap() {
        let feed = FeedConfig::default();
        assert_eq!(feed.item_cap(14), Some(140));
        let uncapped = FeedConfig { cap_pages_per_partition: None, ..FeedConfig::default() };
        assert_eq!(uncapped.item_cap(14), None);
    }

    #[test]
    fn test_parse_env_lines() {
        let parsed = parse_env_lines("# comment\nMEALDB_API_KEY=\"abc\"\r\n\nBROKEN\n");
        assert_eq!(parsed, vec![("MEALDB_API_KEY", "abc")]);
    }
}
