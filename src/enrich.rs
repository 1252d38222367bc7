// src/enrich.rs
use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::geocode::{Coordinates, Geocoder};
use crate::process::{utils::format_float, RawTable};

pub const LOCATION_COLUMN: &str = "event_location";
pub const LATITUDE_COLUMN: &str = "event_location_latitude";
pub const LONGITUDE_COLUMN: &str = "event_location_longitude";
pub const NOT_FOUND: &str = "Not Found";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Geocoder calls issued, one per distinct location.
    pub lookups: usize,
    pub cache_hits: usize,
    pub resolved: usize,
    pub not_found: usize,
}

/// Append latitude/longitude columns derived from `event_location`.
///
/// Each distinct location is geocoded once, in first-seen order, and the
/// result is reused for both coordinates of every row that shares it.
/// Unresolved rows get `"Not Found"` in both columns.
#[instrument(level = "info", skip(table, geocoder), fields(rows = table.len()))]
pub async fn enrich_with_coordinates<G: Geocoder>(
    table: &mut RawTable,
    geocoder: &G,
) -> Result<EnrichStats> {
    let col = table.require_column(LOCATION_COLUMN)?;
    let mut cache: HashMap<String, Option<Coordinates>> = HashMap::new();
    let mut stats = EnrichStats::default();

    let mut latitudes = Vec::with_capacity(table.len());
    let mut longitudes = Vec::with_capacity(table.len());

    for (idx, row) in table.rows.iter().enumerate() {
        let location = row[col].as_str();
        let found = match cache.get(location) {
            Some(hit) => {
                stats.cache_hits += 1;
                *hit
            }
            None => {
                stats.lookups += 1;
                let found = geocoder
                    .geocode(location)
                    .await
                    .with_context(|| format!("row {}: geocoding event_location", idx))?;
                debug!(location, resolved = found.is_some(), "looked up");
                cache.insert(location.to_string(), found);
                found
            }
        };

        match found {
            Some(c) => {
                stats.resolved += 1;
                latitudes.push(format_float(c.latitude));
                longitudes.push(format_float(c.longitude));
            }
            None => {
                stats.not_found += 1;
                latitudes.push(NOT_FOUND.to_string());
                longitudes.push(NOT_FOUND.to_string());
            }
        }

        if (idx + 1) % 500 == 0 {
            info!(done = idx + 1, lookups = stats.lookups, "geocoding progress");
        }
    }

    table.push_column(LATITUDE_COLUMN, latitudes)?;
    table.push_column(LONGITUDE_COLUMN, longitudes)?;

    info!(
        lookups = stats.lookups,
        cache_hits = stats.cache_hits,
        resolved = stats.resolved,
        not_found = stats.not_found,
        "enriched with coordinates"
    );
    Ok(stats)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::process::load_fatalities_csv;
    use anyhow::{bail, Result};
    use std::sync::Mutex;

    /// In-memory geocoder that records every query it is asked.
    #[derive(Default)]
    pub(crate) struct FakeGeocoder {
        pub known: HashMap<String, Coordinates>,
        pub calls: Mutex<Vec<String>>,
        pub fail_on: Option<String>,
    }

    impl FakeGeocoder {
        pub(crate) fn with(places: &[(&str, f64, f64)]) -> Self {
            Self {
                known: places
                    .iter()
                    .map(|&(name, latitude, longitude)| {
                        (
                            name.to_string(),
                            Coordinates {
                                latitude,
                                longitude,
                            },
                        )
                    })
                    .collect(),
                ..Default::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(query.to_string());
            }
            if self.fail_on.as_deref() == Some(query) {
                bail!("OVER_QUERY_LIMIT");
            }
            Ok(self.known.get(query).copied())
        }
    }

    const ROWS: &str = "\
name,event_location
a,Gaza
b,
c,Gaza
d,Jenin
e,Atlantis
";

    #[tokio::test]
    async fn test_resolved_and_sentinel_columns() -> Result<()> {
        let mut table = load_fatalities_csv(ROWS.as_bytes())?;
        let geocoder = FakeGeocoder::with(&[("Gaza", 31.5, 34.45), ("Jenin", 32.46, 35.3)]);

        let stats = enrich_with_coordinates(&mut table, &geocoder).await?;

        assert_eq!(
            table.headers,
            vec!["name", "event_location", LATITUDE_COLUMN, LONGITUDE_COLUMN]
        );
        assert_eq!(table.rows[0], vec!["a", "Gaza", "31.5", "34.45"]);
        assert_eq!(table.rows[1], vec!["b", "", NOT_FOUND, NOT_FOUND]);
        assert_eq!(table.rows[4], vec!["e", "Atlantis", NOT_FOUND, NOT_FOUND]);
        assert_eq!(stats.resolved, 3);
        assert_eq!(stats.not_found, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_integral_coordinates_keep_a_decimal() -> Result<()> {
        let mut table = load_fatalities_csv("name,event_location\na,Rafah\n".as_bytes())?;
        let geocoder = FakeGeocoder::with(&[("Rafah", 31.0, 34.0)]);

        enrich_with_coordinates(&mut table, &geocoder).await?;

        assert_eq!(table.rows[0], vec!["a", "Rafah", "31.0", "34.0"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_location_is_looked_up_once() -> Result<()> {
        let mut table = load_fatalities_csv(ROWS.as_bytes())?;
        let geocoder = FakeGeocoder::with(&[("Gaza", 31.5, 34.45)]);

        let stats = enrich_with_coordinates(&mut table, &geocoder).await?;

        assert_eq!(geocoder.calls(), vec!["Gaza", "", "Jenin", "Atlantis"]);
        assert_eq!(stats.lookups, 4);
        assert_eq!(stats.cache_hits, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_geocoder_error_halts() -> Result<()> {
        let mut table = load_fatalities_csv(ROWS.as_bytes())?;
        let geocoder = FakeGeocoder {
            fail_on: Some("Jenin".into()),
            ..FakeGeocoder::with(&[("Gaza", 31.5, 34.45)])
        };

        let err = enrich_with_coordinates(&mut table, &geocoder)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("OVER_QUERY_LIMIT"));
        // table is untouched when enrichment fails
        assert_eq!(table.headers.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_location_column_is_an_error() -> Result<()> {
        let mut table = load_fatalities_csv("name\na\n".as_bytes())?;
        let geocoder = FakeGeocoder::default();
        assert!(enrich_with_coordinates(&mut table, &geocoder).await.is_err());
        assert!(geocoder.calls().is_empty());
        Ok(())
    }
}
