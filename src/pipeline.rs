// src/pipeline.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::{collections::BTreeMap, fs, path::PathBuf};
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::fetch::{check_template_links, discover_position_links, fetch_position_table};
use crate::position::PositionCode;
use crate::process::normalize_all;
use crate::write::write_dataset;

pub const SUMMARY_FILE: &str = "run_summary.json";

/// Where in the fetch → normalize → write chain a position stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Normalize,
    Write,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionStatus {
    Written { rows: usize, path: PathBuf },
    Failed { stage: Stage, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionReport {
    pub position: PositionCode,
    #[serde(flatten)]
    pub status: PositionStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    /// Informational only; the stats URLs come from the template.
    pub discovered_links: BTreeMap<PositionCode, String>,
    pub positions: Vec<PositionReport>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &PositionReport> {
        self.positions
            .iter()
            .filter(|r| matches!(r.status, PositionStatus::Failed { .. }))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

fn failed(position: PositionCode, stage: Stage, err: ScrapeError) -> PositionStatus {
    error!(%position, ?stage, kind = err.kind(), error = %err, "position failed");
    PositionStatus::Failed {
        stage,
        error: err.to_string(),
    }
}

/// Seed-page link discovery. Never fails the run.
async fn discover(cfg: &ScrapeConfig, client: &Client) -> BTreeMap<PositionCode, String> {
    let seed = match cfg.seed_url() {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "no seed URL; skipping link discovery");
            return BTreeMap::new();
        }
    };

    match discover_position_links(client, &seed).await {
        Ok(links) => {
            info!(count = links.len(), "discovered position links");
            for (position, expected, found) in check_template_links(&cfg.base_url, &links) {
                warn!(%position, %expected, %found, "navigation link differs from URL template");
            }
            links
        }
        Err(e) => {
            warn!(error = %e, "link discovery failed; continuing");
            BTreeMap::new()
        }
    }
}

/// Fetch, pause, then normalize and write one position.
async fn run_position(cfg: &ScrapeConfig, client: &Client, position: PositionCode) -> PositionStatus {
    let start = Instant::now();
    let fetched = fetch_position_table(client, &cfg.base_url, position).await;
    info!(%position, elapsed = ?start.elapsed(), "fetch finished; pausing {:?}", cfg.delay);
    sleep(cfg.delay).await;

    let table = match fetched {
        Ok(t) => t,
        Err(e) => return failed(position, Stage::Fetch, e),
    };
    let dataset = match normalize_all(position, std::slice::from_ref(&table)) {
        Ok(ds) => ds,
        Err(e) => return failed(position, Stage::Normalize, e),
    };
    match write_dataset(&dataset, &cfg.output_dir) {
        Ok(path) => PositionStatus::Written {
            rows: dataset.len(),
            path,
        },
        Err(e) => failed(position, Stage::Write, e),
    }
}

/// One full scrape: link discovery, then every position in order.
///
/// A failing position is recorded and the rest still run. The summary is also
/// written to `<output_dir>/run_summary.json`.
pub async fn run(cfg: &ScrapeConfig, client: &Client) -> Result<RunSummary> {
    let started = Utc::now();
    let discovered_links = discover(cfg, client).await;

    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating {}", cfg.output_dir.display()))?;

    let mut positions = Vec::with_capacity(PositionCode::ALL.len());
    for position in PositionCode::ALL {
        let status = run_position(cfg, client, position).await;
        positions.push(PositionReport { position, status });
    }

    let summary = RunSummary {
        started,
        finished: Utc::now(),
        discovered_links,
        positions,
    };

    let summary_path = cfg.output_dir.join(SUMMARY_FILE);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            if let Err(e) = fs::write(&summary_path, json) {
                warn!(path = %summary_path.display(), error = %e, "could not write run summary");
            }
        }
        Err(e) => warn!(error = %e, "could not serialize run summary"),
    }

    let failed_count = summary.failures().count();
    info!(
        written = summary.positions.len() - failed_count,
        failed = failed_count,
        "run complete"
    );
    Ok(summary)
}
