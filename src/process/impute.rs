// src/process/impute.rs
use anyhow::{anyhow, bail, Result};
use tracing::{debug, info, instrument, warn};

use crate::process::{
    utils::{format_float, is_missing, median},
    RawTable,
};

pub const AGE_COLUMN: &str = "age";

/// Free-text columns whose stringified NaN is rewritten to `UNKNOWN`.
pub const TEXT_COLUMNS: &[&str] = &[
    "name",
    "citizenship",
    "event_location",
    "event_location_district",
    "event_location_region",
    "gender",
    "place_of_residence",
    "place_of_residence_district",
    "type_of_injury",
    "ammunition",
    "killed_by",
    "notes",
    "took_part_in_the_hostilities",
];

pub const NAN_LITERAL: &str = "nan";
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImputeReport {
    /// Median written into the missing ages, if any age was present.
    pub age_median: Option<f64>,
    pub ages_filled: usize,
    pub text_cells_replaced: usize,
}

/// Run both imputation steps over `table`.
#[instrument(level = "info", skip(table), fields(rows = table.len()))]
pub fn impute(table: &mut RawTable) -> Result<ImputeReport> {
    let (age_median, ages_filled) = impute_age(table)?;
    let text_cells_replaced = replace_nan_text(table);
    Ok(ImputeReport {
        age_median,
        ages_filled,
        text_cells_replaced,
    })
}

/// Fill missing `age` cells with the median of the present ones.
/// Returns the median (if one exists) and the number of cells filled.
pub fn impute_age(table: &mut RawTable) -> Result<(Option<f64>, usize)> {
    let Some(col) = table.column_index(AGE_COLUMN) else {
        warn!("no `{}` column; skipping age imputation", AGE_COLUMN);
        return Ok((None, 0));
    };

    let mut present = Vec::with_capacity(table.rows.len());
    let mut missing = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let raw = &row[col];
        if is_missing(raw) {
            missing.push(idx);
            continue;
        }
        // line 1 is the header
        let line = idx + 2;
        let age = raw.trim().parse::<f64>().map_err(|e| {
            anyhow!(
                "record {} (line {}): age {:?} is not numeric: {}",
                idx,
                line,
                raw,
                e
            )
        })?;
        if age.is_nan() {
            missing.push(idx);
        } else if age.is_infinite() {
            bail!("record {} (line {}): age {:?} is not finite", idx, line, raw);
        } else {
            present.push(age);
        }
    }

    let Some(m) = median(&present) else {
        warn!(
            missing = missing.len(),
            "no ages present; leaving missing ages untouched"
        );
        return Ok((None, 0));
    };

    let fill = format_float(m);
    for &idx in &missing {
        table.rows[idx][col] = fill.clone();
    }
    info!(median = m, filled = missing.len(), "imputed age");
    Ok((Some(m), missing.len()))
}

/// Replace cells that are exactly `"nan"` with `"Unknown"` in the listed
/// text columns that exist. Empty cells and other spellings are left alone.
pub fn replace_nan_text(table: &mut RawTable) -> usize {
    let cols: Vec<(usize, &str)> = TEXT_COLUMNS
        .iter()
        .filter_map(|&name| table.column_index(name).map(|i| (i, name)))
        .collect();

    let mut replaced = 0;
    for &(col, name) in &cols {
        let mut in_column = 0;
        for row in table.rows.iter_mut() {
            if row[col] == NAN_LITERAL {
                row[col] = UNKNOWN.to_string();
                in_column += 1;
            }
        }
        if in_column > 0 {
            debug!(column = name, replaced = in_column, "replaced literal nan");
        }
        replaced += in_column;
    }

    // Only stringified NaNs are caught; blank text cells pass through as-is.
    info!(
        columns = cols.len(),
        replaced, "replaced literal \"{}\" with \"{}\"", NAN_LITERAL, UNKNOWN
    );
    replaced
}
