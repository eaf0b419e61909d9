// src/config.rs

use anyhow::{Context, Result};
use std::{path::PathBuf, time::Duration};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.fantasypros.com";
/// Seed page for link discovery, relative to the base URL.
pub const SEED_PATH: &str = "nfl/stats/qb.php?scoring=PPR";
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const USER_AGENT: &str = concat!("ffstats/", env!("CARGO_PKG_VERSION"));

/// Runtime settings for one scrape.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Site root; the stats pages live under `<base>/nfl/stats/`.
    pub base_url: Url,
    pub output_dir: PathBuf,
    /// Pause after every position fetch.
    pub delay: Duration,
    /// Bound on a single HTTP request.
    pub timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ScrapeConfig {
    pub fn seed_url(&self) -> Result<Url> {
        self.base_url
            .join(SEED_PATH)
            .with_context(|| format!("joining seed path onto {}", self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ScrapeConfig::default();
        assert_eq!(cfg.delay, Duration::from_secs(5));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.output_dir, PathBuf::from("data"));
        assert_eq!(
            cfg.seed_url().unwrap().as_str(),
            "https://www.fantasypros.com/nfl/stats/qb.php?scoring=PPR"
        );
    }

    #[test]
    fn test_seed_url_follows_base() {
        let cfg = ScrapeConfig {
            base_url: Url::parse("http://127.0.0.1:8080/").unwrap(),
            ..ScrapeConfig::default()
        };
        assert_eq!(
            cfg.seed_url().unwrap().as_str(),
            "http://127.0.0.1:8080/nfl/stats/qb.php?scoring=PPR"
        );
    }
}
