use anyhow::{Context, Result};
use fatality_geo::{config::Config, geocode::GoogleGeocoder, pipeline};
use reqwest::Client;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(?config, "configured");

    // ─── 3) geocoder ─────────────────────────────────────────────────
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("building HTTP client")?;
    let geocoder = GoogleGeocoder::new(client, config.endpoint.clone(), config.api_key.clone());

    // ─── 4) run ──────────────────────────────────────────────────────
    let start = Instant::now();
    let summary = pipeline::run(&config.input, &config.output, &geocoder).await?;

    info!(
        kept = summary.dropped.after,
        dropped = summary.dropped.dropped,
        lookups = summary.enrich.lookups,
        elapsed = ?start.elapsed(),
        "all done"
    );
    Ok(())
}
