// src/fetch/links.rs

use reqwest::Client;
use scraper::Html;
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use super::{element_text, get_text, selector, stats_url};
use crate::error::Result;
use crate::position::PositionCode;

/// The position pill bar on the stats pages.
const NAV_SELECTOR: &str = "ul.pills.pills--horizontal.desktop-pills";

/// Fetch the seed page and map each known position label to its link.
#[instrument(level = "info", skip(client))]
pub async fn discover_position_links(
    client: &Client,
    seed: &Url,
) -> Result<BTreeMap<PositionCode, String>> {
    let html = get_text(client, seed).await?;
    Ok(parse_position_links(&html, seed))
}

/// Links inside the navigation list whose text is one of the six position codes.
/// Relative hrefs are resolved against `base`. A page without the navigation
/// list yields an empty map.
pub fn parse_position_links(html: &str, base: &Url) -> BTreeMap<PositionCode, String> {
    let doc = Html::parse_document(html);
    let nav_sel = selector(NAV_SELECTOR);
    let link_sel = selector("a[href]");
    let mut out = BTreeMap::new();

    let Some(nav) = doc.select(&nav_sel).next() else {
        warn!(%base, "position navigation not found");
        return out;
    };

    for a in nav.select(&link_sel) {
        let label = element_text(&a);
        let Some(position) = PositionCode::from_label(&label) else {
            trace!(%label, "skipping non-position link");
            continue;
        };
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        match base.join(href) {
            Ok(full) => {
                out.insert(position, full.to_string());
            }
            Err(e) => debug!(%href, error = %e, "unresolvable link"),
        }
    }

    out
}

/// Positions whose discovered link does not point at the same page as the
/// URL template (query strings ignored). Undiscovered positions are skipped.
pub fn check_template_links(
    base: &Url,
    discovered: &BTreeMap<PositionCode, String>,
) -> Vec<(PositionCode, Url, String)> {
    let mut mismatches = Vec::new();
    for (&position, link) in discovered {
        let Ok(expected) = stats_url(base, position) else {
            continue;
        };
        let same_page = Url::parse(link)
            .map(|found| {
                found.host_str() == expected.host_str() && found.path() == expected.path()
            })
            .unwrap_or(false);
        if !same_page {
            mismatches.push((position, expected, link.clone()));
        }
    }
    mismatches
}
