// src/config.rs
use anyhow::{anyhow, Context, Result};
use std::{env, path::PathBuf, time::Duration};
use url::Url;

use crate::geocode::google::DEFAULT_ENDPOINT;

pub const DEFAULT_INPUT: &str = "Fatalities_Israel-Palestine.zip";
pub const DEFAULT_OUTPUT: &str = "Fatalities_Israel-Palestine_with_GEO.csv";

pub const INPUT_VAR: &str = "FATALITIES_INPUT";
pub const OUTPUT_VAR: &str = "FATALITIES_OUTPUT";
pub const API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";
pub const ENDPOINT_VAR: &str = "GEOCODE_ENDPOINT";
pub const TIMEOUT_VAR: &str = "GEOCODE_TIMEOUT_SECS";

/// Run settings, read from the environment.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub api_key: String,
    pub endpoint: Url,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values are treated alike.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR)
            .ok_or_else(|| anyhow!("{} must be set to a Google Geocoding API key", API_KEY_VAR))?;

        let endpoint_raw = get(ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(&endpoint_raw)
            .with_context(|| format!("parsing {} {:?}", ENDPOINT_VAR, endpoint_raw))?;

        let timeout = get(TIMEOUT_VAR)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("parsing {} {:?}", TIMEOUT_VAR, raw))
            })
            .transpose()?;

        Ok(Self {
            input: get(INPUT_VAR)
                .unwrap_or_else(|| DEFAULT_INPUT.to_string())
                .into(),
            output: get(OUTPUT_VAR)
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
                .into(),
            api_key,
            endpoint,
            timeout,
        })
    }
}
