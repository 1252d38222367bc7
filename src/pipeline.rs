// src/pipeline.rs
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

use crate::{
    enrich::{enrich_with_coordinates, EnrichStats},
    geocode::Geocoder,
    process::{
        filter::{drop_unresolved, DropReport},
        impute::{impute, ImputeReport},
        load_fatalities,
    },
    report::{log_summary, summarize_coordinates},
    write::write_csv,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub impute: ImputeReport,
    pub enrich: EnrichStats,
    pub dropped: DropReport,
}

/// load → impute → geocode → summarize → drop unresolved → write.
#[instrument(level = "info", skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub async fn run<G, P, Q>(input: P, output: Q, geocoder: &G) -> Result<RunSummary>
where
    G: Geocoder,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let start = Instant::now();

    let mut table = load_fatalities(&input)
        .with_context(|| format!("loading {:?}", input.as_ref()))?;
    info!(rows = table.len(), elapsed = ?start.elapsed(), "loaded");

    let impute = impute(&mut table)?;

    let enrich = enrich_with_coordinates(&mut table, geocoder).await?;
    info!(elapsed = ?start.elapsed(), "geocoded");

    log_summary(&summarize_coordinates(&table)?);

    let dropped = drop_unresolved(&mut table)?;

    write_csv(&table, &output).with_context(|| format!("writing {:?}", output.as_ref()))?;
    info!(
        rows = dropped.after,
        dropped = dropped.dropped,
        elapsed = ?start.elapsed(),
        "pipeline complete"
    );

    Ok(RunSummary {
        impute,
        enrich,
        dropped,
    })
}
