use anyhow::{bail, Result};
use ffstats::{fetch, pipeline, ScrapeConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ffstats=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configure ────────────────────────────────────────────────
    let cfg = ScrapeConfig::default();
    info!(
        base = %cfg.base_url,
        out = %cfg.output_dir.display(),
        delay = ?cfg.delay,
        timeout = ?cfg.timeout,
        "configured"
    );
    let client = fetch::build_client(&cfg)?;

    // ─── 3) scrape every position ────────────────────────────────────
    let summary = pipeline::run(&cfg, &client).await?;

    let failed: Vec<String> = summary
        .failures()
        .map(|r| r.position.to_string())
        .collect();
    if !failed.is_empty() {
        bail!(
            "{} of {} positions failed: {}",
            failed.len(),
            summary.positions.len(),
            failed.join(", ")
        );
    }

    info!("all done");
    Ok(())
}
