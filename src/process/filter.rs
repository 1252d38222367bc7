// src/process/filter.rs
use anyhow::Result;
use tracing::{info, instrument};

use crate::enrich::{LATITUDE_COLUMN, LONGITUDE_COLUMN, NOT_FOUND};
use crate::process::RawTable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropReport {
    pub before: usize,
    pub dropped: usize,
    pub after: usize,
    /// `dropped / before`, or 0.0 for an empty table.
    pub fraction: f64,
}

fn coordinate_columns(table: &RawTable) -> Result<(usize, usize)> {
    Ok((
        table.require_column(LATITUDE_COLUMN)?,
        table.require_column(LONGITUDE_COLUMN)?,
    ))
}

fn is_unresolved(row: &[String], lat: usize, lng: usize) -> bool {
    row[lat] == NOT_FOUND || row[lng] == NOT_FOUND
}

/// Fraction of rows whose latitude or longitude is the `"Not Found"` sentinel.
pub fn unresolved_fraction(table: &RawTable) -> Result<f64> {
    let (lat, lng) = coordinate_columns(table)?;
    if table.is_empty() {
        return Ok(0.0);
    }
    let unresolved = table
        .rows
        .iter()
        .filter(|row| is_unresolved(row, lat, lng))
        .count();
    Ok(unresolved as f64 / table.len() as f64)
}

/// Report the unresolved fraction, then drop those rows in place.
#[instrument(level = "info", skip(table), fields(rows = table.len()))]
pub fn drop_unresolved(table: &mut RawTable) -> Result<DropReport> {
    let (lat, lng) = coordinate_columns(table)?;
    let fraction = unresolved_fraction(table)?;
    let before = table.len();
    let percent = format!("{:.2}", fraction * 100.0);

    info!(
        fraction,
        percent = %percent,
        "rows to be dropped because event_location returned no geocode"
    );

    table.rows.retain(|row| !is_unresolved(row, lat, lng));
    let after = table.len();

    Ok(DropReport {
        before,
        dropped: before - after,
        after,
        fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::load_fatalities_csv;
    use anyhow::Result;

    fn table() -> Result<RawTable> {
        let data = "\
name,event_location,event_location_latitude,event_location_longitude
a,Gaza,31.5,34.45
b,,Not Found,Not Found
c,Hebron,31.53,35.09
d,Somewhere,31.0,Not Found
";
        load_fatalities_csv(data.as_bytes())
    }

    #[test]
    fn test_unresolved_fraction() -> Result<()> {
        assert_eq!(unresolved_fraction(&table()?)?, 0.5);
        Ok(())
    }

    #[test]
    fn test_drop_unresolved_keeps_only_resolved_rows() -> Result<()> {
        let mut t = table()?;
        let input_rows = t.len();

        let report = drop_unresolved(&mut t)?;

        assert_eq!(report.dropped, 2);
        assert_eq!(report.after, input_rows - report.dropped);
        assert_eq!(t.len(), report.after);
        for row in &t.rows {
            assert_ne!(row[2], NOT_FOUND);
            assert_ne!(row[3], NOT_FOUND);
        }
        let names: Vec<&str> = t.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        Ok(())
    }

    #[test]
    fn test_empty_table_reports_zero() -> Result<()> {
        let mut t = RawTable::new(
            vec![LATITUDE_COLUMN.into(), LONGITUDE_COLUMN.into()],
            Vec::new(),
        );
        let report = drop_unresolved(&mut t)?;
        assert_eq!(report.fraction, 0.0);
        assert_eq!(report.dropped, 0);
        Ok(())
    }

    #[test]
    fn test_missing_coordinate_columns_is_an_error() -> Result<()> {
        let mut t = load_fatalities_csv("name\na\n".as_bytes())?;
        assert!(drop_unresolved(&mut t).is_err());
        Ok(())
    }
}
