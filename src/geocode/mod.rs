// src/geocode/mod.rs
use anyhow::Result;
use std::future::Future;

pub mod google;

pub use google::GoogleGeocoder;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves a free-text place description to coordinates.
///
/// `Ok(None)` means the provider had no match for the query. `Err` is a
/// provider failure (network, quota, rejected key) and should halt the run.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> impl Future<Output = Result<Option<Coordinates>>> + Send;
}
