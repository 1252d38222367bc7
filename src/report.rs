// src/report.rs
use anyhow::Result;
use tracing::info;

use crate::enrich::{LATITUDE_COLUMN, LONGITUDE_COLUMN, NOT_FOUND};
use crate::process::{utils::quantile, RawTable};

/// Descriptive statistics for one coordinate column, over resolved values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub not_found: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

fn summarize_column(table: &RawTable, column: &str) -> Result<ColumnSummary> {
    let col = table.require_column(column)?;
    let mut values = Vec::with_capacity(table.len());
    let mut not_found = 0;
    for row in &table.rows {
        if row[col] == NOT_FOUND {
            not_found += 1;
        } else if let Ok(v) = row[col].parse::<f64>() {
            values.push(v);
        }
    }

    let count = values.len();
    let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
    let std = mean.filter(|_| count > 1).map(|m| {
        let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    });

    Ok(ColumnSummary {
        column: column.to_string(),
        count,
        not_found,
        mean,
        std,
        min: quantile(&values, 0.0),
        p25: quantile(&values, 0.25),
        p50: quantile(&values, 0.5),
        p75: quantile(&values, 0.75),
        max: quantile(&values, 1.0),
    })
}

/// Summaries of the latitude and longitude columns, in that order.
pub fn summarize_coordinates(table: &RawTable) -> Result<[ColumnSummary; 2]> {
    Ok([
        summarize_column(table, LATITUDE_COLUMN)?,
        summarize_column(table, LONGITUDE_COLUMN)?,
    ])
}

pub fn log_summary(summaries: &[ColumnSummary]) {
    for s in summaries {
        info!(
            column = %s.column,
            count = s.count,
            not_found = s.not_found,
            mean = ?s.mean,
            std = ?s.std,
            min = ?s.min,
            p25 = ?s.p25,
            p50 = ?s.p50,
            p75 = ?s.p75,
            max = ?s.max,
            "coordinate summary"
        );
    }
}
