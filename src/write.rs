// src/write.rs
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::{fs, io::Write, path::Path};
use tracing::{info, instrument};

use crate::process::RawTable;

/// Write headers then rows to `writer`. No index column.
pub fn write_csv_to<W: Write>(table: &RawTable, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(&table.headers)
        .context("writing CSV header")?;
    for (idx, row) in table.rows.iter().enumerate() {
        wtr.write_record(row)
            .with_context(|| format!("writing CSV record {}", idx))?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

/// Write `table` to `path`, creating its parent directory if needed.
#[instrument(level = "info", skip(table, path), fields(path = %path.as_ref().display()))]
pub fn write_csv<P: AsRef<Path>>(table: &RawTable, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let file = fs::File::create(path).with_context(|| format!("creating {:?}", path))?;
    write_csv_to(table, file).with_context(|| format!("writing {:?}", path))?;
    info!(rows = table.len(), "wrote CSV");
    Ok(())
}
