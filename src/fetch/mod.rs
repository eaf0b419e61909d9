// src/fetch/mod.rs

use anyhow::Context;
use reqwest::Client;
use scraper::{ElementRef, Selector};
use tracing::debug;
use url::Url;

use crate::config::{ScrapeConfig, USER_AGENT};
use crate::error::{Result, ScrapeError};

pub mod links;
pub mod table;

pub use links::{check_template_links, discover_position_links, parse_position_links};
pub use table::{fetch_position_table, parse_first_table, stats_url};

/// Shared client for every request in a run.
pub fn build_client(cfg: &ScrapeConfig) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(cfg.timeout)
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .gzip(true)
        .build()
        .context("building HTTP client")
}

/// GET `url` and return the body, failing on transport errors and non-2xx status.
pub async fn get_text(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    let fetch_err = |source| ScrapeError::Fetch {
        url: url.to_string(),
        source,
    };
    client
        .get(url.clone())
        .send()
        .await
        .map_err(fetch_err)?
        .error_for_status()
        .map_err(fetch_err)?
        .text()
        .await
        .map_err(fetch_err)
}

pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static CSS selector should parse")
}

/// Visible text of an element with runs of whitespace collapsed.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
