//! Wind-speed sources.
//!
//! Defines an enum-based dispatch for wind samplers, avoiding the
//! dyn-compatibility issues with async trait methods. The synthetic source
//! draws whole meters per second from a shared generator; the remote source
//! fetches JSON over HTTP via `reqwest` and extracts the reading according to
//! the configured [`WindSchema`].
//!
//! The engine does not care where a reading came from. It asks for one
//! sample per coarse tick and keeps the previous RPM when this module
//! returns an error.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::{SourceConfig, WindSchema};

/// Lower bound (inclusive) of synthetic readings, in m/s.
pub const SYNTHETIC_MIN_MPS: u32 = 5;

/// Upper bound (exclusive) of synthetic readings, in m/s.
pub const SYNTHETIC_MAX_MPS: u32 = 20;

/// Errors that can occur while obtaining a wind-speed reading.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// The request failed in transport (DNS, connect, timeout, body read).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The endpoint answered with a non-success status.
    #[error("source returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The body was not JSON of the configured schema.
    #[error("malformed payload: {0}")]
    Decode(String),

    /// The wind-speed field was present but not numeric.
    #[error("unparseable wind speed {0}")]
    Parse(String),

    /// The payload carried no wind-speed value.
    #[error("wind speed missing: {0}")]
    Missing(&'static str),

    /// The reading parsed but is negative or not finite.
    #[error("wind speed out of range: {0}")]
    Invalid(f64),
}

// ---------------------------------------------------------------------------
// Unified sampler enum
// ---------------------------------------------------------------------------

/// A source of wind-speed readings in meters per second.
pub enum WindSampler {
    /// Uniform whole-number readings in `[5, 20)`.
    Synthetic(SyntheticSource),
    /// JSON fetched from an HTTP endpoint.
    Remote(RemoteSource),
}

impl WindSampler {
    /// Create a sampler from configuration.
    ///
    /// Chooses [`RemoteSource`] when [`SourceConfig::endpoint`] resolves to a
    /// URL and [`SyntheticSource`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &SourceConfig) -> Result<Self, SampleError> {
        match config.endpoint() {
            Some(url) => Ok(Self::Remote(RemoteSource::new(
                url,
                config.schema,
                config.request_timeout(),
            )?)),
            None => Ok(Self::Synthetic(SyntheticSource::new(config.seed))),
        }
    }

    /// Obtain one reading.
    ///
    /// # Errors
    ///
    /// The synthetic source never fails. The remote source returns
    /// [`SampleError`] on transport, status, decode, or parse failures.
    pub async fn sample(&self) -> Result<f64, SampleError> {
        match self {
            Self::Synthetic(source) => Ok(source.sample().await),
            Self::Remote(source) => source.sample().await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Synthetic(_) => "synthetic",
            Self::Remote(_) => "remote",
        }
    }
}

// ---------------------------------------------------------------------------
// Synthetic source
// ---------------------------------------------------------------------------

/// Synthetic fallback used when no endpoint is configured.
///
/// One generator is shared by every caller of this source.
pub struct SyntheticSource {
    rng: Mutex<StdRng>,
}

impl SyntheticSource {
    /// Create a source seeded from `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Draw a whole-number reading in `[5, 20)` m/s.
    pub async fn sample(&self) -> f64 {
        let mut rng = self.rng.lock().await;
        f64::from(rng.random_range(SYNTHETIC_MIN_MPS..SYNTHETIC_MAX_MPS))
    }
}

// ---------------------------------------------------------------------------
// Remote source
// ---------------------------------------------------------------------------

/// HTTP wind-data source.
pub struct RemoteSource {
    client: reqwest::Client,
    url: String,
    schema: WindSchema,
}

impl RemoteSource {
    /// Create a remote source with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::Client`] if the HTTP client cannot be built.
    pub fn new(url: String, schema: WindSchema, timeout: Duration) -> Result<Self, SampleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SampleError::Client(format!("{e}")))?;
        Ok(Self {
            client,
            url,
            schema,
        })
    }

    /// The configured schema.
    pub const fn schema(&self) -> WindSchema {
        self.schema
    }

    /// Fetch the endpoint and extract the latest wind speed.
    async fn sample(&self) -> Result<f64, SampleError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SampleError::Fetch(format!("{e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SampleError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SampleError::Fetch(format!("reading body failed: {e}")))?;

        extract_wind_speed(self.schema, &body)
    }
}

// ---------------------------------------------------------------------------
// Payload extraction
// ---------------------------------------------------------------------------

/// `{ "wind": { "speed": 4.1 } }`
#[derive(Debug, Deserialize)]
struct WindPayload {
    #[serde(default)]
    wind: Option<WindBlock>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: Option<f64>,
}

/// `{ "entries": [ { "wind_speed": "4.1", ... } ] }`
#[derive(Debug, Deserialize)]
struct EntriesPayload {
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    wind_speed: Option<String>,
}

/// Extract a wind speed from a JSON body laid out as `schema`.
///
/// For [`WindSchema::Entries`] the last listed entry wins, even when earlier
/// entries carry values.
pub fn extract_wind_speed(schema: WindSchema, body: &[u8]) -> Result<f64, SampleError> {
    let speed = match schema {
        WindSchema::Wind => {
            let payload: WindPayload =
                serde_json::from_slice(body).map_err(|e| SampleError::Decode(format!("{e}")))?;
            payload
                .wind
                .and_then(|w| w.speed)
                .ok_or(SampleError::Missing("wind.speed"))?
        }
        WindSchema::Entries => {
            let payload: EntriesPayload =
                serde_json::from_slice(body).map_err(|e| SampleError::Decode(format!("{e}")))?;
            let mut entries = payload.entries;
            let raw = entries
                .pop()
                .and_then(|entry| entry.wind_speed)
                .filter(|s| !s.trim().is_empty())
                .ok_or(SampleError::Missing("entries[-1].wind_speed"))?;
            raw.trim()
                .parse::<f64>()
                .map_err(|e| SampleError::Parse(format!("{raw:?}: {e}")))?
        }
    };

    if !speed.is_finite() || speed < 0.0 {
        return Err(SampleError::Invalid(speed));
    }
    Ok(speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn entries_last_wins() {
        let body = br#"{"entries":[{"wind_speed":"3.0"},{"wind_speed":"5.5"}]}"#;
        let speed = extract_wind_speed(WindSchema::Entries, body);
        assert!(matches!(speed, Ok(s) if approx_eq(s, 5.5)));
    }

    #[test]
    fn entries_ignores_other_fields() {
        let body = br#"{"command":"get","result":"ok","found":1,"entries":[
            {"name":"GW2066","temp":"11.2","wind_direction":"270","wind_speed":"7.25"}
        ]}"#;
        let speed = extract_wind_speed(WindSchema::Entries, body);
        assert!(matches!(speed, Ok(s) if approx_eq(s, 7.25)));
    }

    #[test]
    fn entries_empty_is_missing() {
        let body = br#"{"entries":[]}"#;
        let result = extract_wind_speed(WindSchema::Entries, body);
        assert!(matches!(result, Err(SampleError::Missing(_))));
    }

    #[test]
    fn entries_last_without_value_is_missing() {
        let body = br#"{"entries":[{"wind_speed":"3.0"},{"temp":"4"}]}"#;
        let result = extract_wind_speed(WindSchema::Entries, body);
        assert!(matches!(result, Err(SampleError::Missing(_))));
    }

    #[test]
    fn entries_non_numeric_is_parse_error() {
        let body = br#"{"entries":[{"wind_speed":"calm"}]}"#;
        let result = extract_wind_speed(WindSchema::Entries, body);
        assert!(matches!(result, Err(SampleError::Parse(ref s)) if s.contains("calm")));
    }

    #[test]
    fn negative_reading_is_invalid() {
        let body = br#"{"entries":[{"wind_speed":"-2"}]}"#;
        let result = extract_wind_speed(WindSchema::Entries, body);
        assert!(matches!(result, Err(SampleError::Invalid(_))));
    }

    #[test]
    fn wind_schema_reads_speed() {
        let body = br#"{"name":"Chicago","wind":{"speed":4.12,"deg":250,"gust":6.1}}"#;
        let speed = extract_wind_speed(WindSchema::Wind, body);
        assert!(matches!(speed, Ok(s) if approx_eq(s, 4.12)));
    }

    #[test]
    fn wind_schema_missing_block() {
        let body = br#"{"name":"Chicago"}"#;
        let result = extract_wind_speed(WindSchema::Wind, body);
        assert!(matches!(result, Err(SampleError::Missing("wind.speed"))));
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let result = extract_wind_speed(WindSchema::Entries, b"<html>nope</html>");
        assert!(matches!(result, Err(SampleError::Decode(_))));
        let result = extract_wind_speed(WindSchema::Wind, br#"{"wind":{"speed":"fast"}}"#);
        assert!(matches!(result, Err(SampleError::Decode(_))));
    }

    #[tokio::test]
    async fn synthetic_readings_are_whole_numbers_in_range() {
        let source = SyntheticSource::new(None);
        for _ in 0..500 {
            let speed = source.sample().await;
            assert!((5.0..20.0).contains(&speed), "got {speed}");
            assert!(approx_eq(speed.fract(), 0.0));
        }
    }

    #[tokio::test]
    async fn seeded_synthetic_is_reproducible() {
        let a = SyntheticSource::new(Some(42));
        let b = SyntheticSource::new(Some(42));
        for _ in 0..20 {
            assert!(approx_eq(a.sample().await, b.sample().await));
        }
    }

    #[test]
    fn from_config_picks_source() {
        let sampler = WindSampler::from_config(&SourceConfig::default());
        assert!(matches!(sampler, Ok(ref s) if s.name() == "synthetic"));

        let config = SourceConfig {
            url: Some("http://127.0.0.1:9/weather".to_owned()),
            ..SourceConfig::default()
        };
        let sampler = WindSampler::from_config(&config);
        assert!(matches!(sampler, Ok(ref s) if s.name() == "remote"));
    }
}
