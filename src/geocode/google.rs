// src/geocode/google.rs
use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use super::{Coordinates, Geocoder};

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Geocoding API client. One GET per query, no retries.
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, endpoint: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key: api_key.into(),
        }
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", query)
            .append_pair("key", &self.api_key);
        url
    }
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        if query.trim().is_empty() {
            trace!("blank query; no lookup");
            return Ok(None);
        }

        debug!(query, "geocoding");
        let body = self
            .client
            .get(self.request_url(query))
            .send()
            .await
            .with_context(|| format!("GET {} for {:?} failed", self.endpoint, query))?
            .error_for_status()
            .with_context(|| format!("Non-success status from {}", self.endpoint))?
            .text()
            .await
            .with_context(|| format!("Reading geocode body for {:?}", query))?;

        parse_response(&body).with_context(|| format!("geocoding {:?}", query))
    }
}

/// Interpret a Geocoding API JSON body. `OK` yields the first result,
/// `ZERO_RESULTS` yields `None`, any other status is an error.
pub fn parse_response(body: &str) -> Result<Option<Coordinates>> {
    let resp: GeocodeResponse =
        serde_json::from_str(body).context("decoding geocode response JSON")?;

    match resp.status.as_str() {
        "OK" => {
            let first = resp
                .results
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("status OK but no results"))?;
            Ok(Some(Coordinates {
                latitude: first.geometry.location.lat,
                longitude: first.geometry.location.lng,
            }))
        }
        "ZERO_RESULTS" => Ok(None),
        other => bail!(
            "geocoder returned {}: {}",
            other,
            resp.error_message.as_deref().unwrap_or("no error message")
        ),
    }
}
