// src/process/mod.rs
use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;

use std::{
    fs::File,
    io::{BufReader, Cursor, Read},
    path::Path,
};
use tracing::{debug, info};
use zip::ZipArchive;

pub mod filter;
pub mod impute;
pub mod utils;

/// In-memory fatality table. Every cell stays a string so untouched values
/// are written back exactly as they were read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names, from the header row of the CSV.
    pub headers: Vec<String>,
    /// One entry per record, one String per field.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like `column_index`, but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| anyhow!("column `{}` not found in table", name))
    }

    /// Append a column, filling every row from `values` (one per row).
    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            bail!(
                "column `{}` has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            );
        }
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load the fatality table from `path`. Plain `.csv` files are read
/// directly; anything else is opened as a zip archive.
pub fn load_fatalities<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let file =
            File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
        load_fatalities_csv(BufReader::new(file))
            .with_context(|| format!("Failed to parse CSV file: {:?}", path))
    } else {
        load_fatalities_zip(path)
    }
}

/// Open `zip_path`, find its single `.csv` entry and parse it into a
/// `RawTable`. An archive with no CSV, or with more than one, is an error.
#[tracing::instrument(level = "info", skip(zip_path), fields(path = %zip_path.as_ref().display()))]
pub fn load_fatalities_zip<P: AsRef<Path>>(zip_path: P) -> Result<RawTable> {
    let file = File::open(&zip_path)
        .with_context(|| format!("Failed to open ZIP file: {:?}", zip_path.as_ref()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path.as_ref()))?;

    let mut found: Option<(String, Vec<u8>)> = None;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).with_context(|| {
            format!(
                "Failed to access ZIP entry #{} in {:?}",
                i,
                zip_path.as_ref()
            )
        })?;
        let name = entry.name().to_string();

        if !(entry.is_file() && name.to_lowercase().ends_with(".csv")) {
            debug!(entry = %name, "skipping non-CSV entry");
            continue;
        }
        if let Some((first, _)) = &found {
            bail!(
                "Multiple CSV files found in ZIP archive {:?}: {} and {}",
                zip_path.as_ref(),
                first,
                name
            );
        }

        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .with_context(|| format!("Failed to read {} into memory", name))?;
        found = Some((name, buf));
    }
    drop(archive);

    let (name, data) = found
        .ok_or_else(|| anyhow!("No CSV file found in ZIP archive {:?}", zip_path.as_ref()))?;

    let table = load_fatalities_csv(Cursor::new(data))
        .with_context(|| format!("Failed to parse {} from {:?}", name, zip_path.as_ref()))?;
    info!(entry = %name, rows = table.len(), columns = table.headers.len(), "loaded");
    Ok(table)
}

/// Parse a headed CSV from any reader. Every record must have as many
/// fields as the header.
pub fn load_fatalities_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("CSV header row could not be read")?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}
