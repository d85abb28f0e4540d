//! Configuration loading and typed config structures for Windspin.
//!
//! The canonical configuration lives in `windspin-config.yaml` in the working
//! directory. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file. Every
//! section is optional; a missing file or an empty document yields defaults
//! that run the synthetic sampler with the tip-speed-ratio model.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Weather-station URL used when only an API key is configured.
///
/// `{api_key}` is replaced with the configured key.
pub const DEFAULT_APRS_URL: &str = "https://api.aprs.fi/api/get?name=GW2066&what=wx&apikey={api_key}";

/// Placeholder substituted with the API key inside a source URL.
const API_KEY_PLACEHOLDER: &str = "{api_key}";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Windspin configuration.
///
/// Mirrors the structure of `windspin-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WindspinConfig {
    /// Where wind-speed readings come from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Wind-speed to RPM conversion policy.
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Sampling and accumulation cadences.
    #[serde(default)]
    pub timing: TimingConfig,

    /// HTTP observer settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WindspinConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `WIND_API_KEY` (or `OPENWEATHER_API_KEY`) overrides `source.api_key`
    /// - `WIND_SOURCE_URL` overrides `source.url`
    /// - `WINDSPIN_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects a document with no content at all.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of the parsed values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `WINDSPIN_PORT` is not a port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides resolved by `lookup`, one variable name at a time.
    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("WIND_API_KEY").or_else(|| lookup("OPENWEATHER_API_KEY")) {
            self.source.api_key = Some(val);
        }
        if let Some(val) = lookup("WIND_SOURCE_URL") {
            self.source.url = Some(val);
        }
        if let Some(val) = lookup("WINDSPIN_PORT") {
            self.observer.port = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("WINDSPIN_PORT={val}: {e}")))?;
        }
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.sample_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "timing.sample_interval_ms must be greater than 0".to_owned(),
            ));
        }
        if self.timing.accumulate_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "timing.accumulate_interval_ms must be greater than 0".to_owned(),
            ));
        }
        if self.observer.stream_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "observer.stream_interval_ms must be greater than 0".to_owned(),
            ));
        }
        if !(self.rotation.diameter_m.is_finite() && self.rotation.diameter_m > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "rotation.diameter_m must be a positive number, got {}",
                self.rotation.diameter_m
            )));
        }
        if !(self.rotation.tip_speed_ratio.is_finite() && self.rotation.tip_speed_ratio > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "rotation.tip_speed_ratio must be a positive number, got {}",
                self.rotation.tip_speed_ratio
            )));
        }
        Ok(())
    }
}

/// JSON layout served by the remote wind-data endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSchema {
    /// `{ "entries": [ { "wind_speed": "<string>" }, ... ] }`, last entry wins.
    #[default]
    Entries,
    /// `{ "wind": { "speed": <number> } }`.
    Wind,
}

/// Wind-data source configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    /// Remote endpoint URL. May contain an `{api_key}` placeholder.
    #[serde(default)]
    pub url: Option<String>,

    /// API key for the remote endpoint.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Payload schema the endpoint serves.
    #[serde(default)]
    pub schema: WindSchema,

    /// Seed for the synthetic generator. Unset means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Timeout for one remote request in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl SourceConfig {
    /// Resolve the remote endpoint, if any.
    ///
    /// An explicit `url` wins, with `{api_key}` substituted when a key is
    /// set. A key without a URL selects [`DEFAULT_APRS_URL`]. Neither means
    /// the synthetic sampler is used and `None` is returned. Blank strings
    /// count as unset.
    pub fn endpoint(&self) -> Option<String> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty());
        let url = self.url.as_deref().filter(|u| !u.trim().is_empty());

        match (url, key) {
            (Some(url), Some(key)) => Some(url.replace(API_KEY_PLACEHOLDER, key)),
            (Some(url), None) => Some(url.to_owned()),
            (None, Some(key)) => Some(DEFAULT_APRS_URL.replace(API_KEY_PLACEHOLDER, key)),
            (None, None) => None,
        }
    }

    /// The remote request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            schema: WindSchema::default(),
            seed: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Which wind-to-RPM formula to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationKind {
    /// `rpm = (tsr * wind) / (pi * diameter) * 60`.
    #[default]
    TipSpeedRatio,
    /// `rpm = wind / (pi * diameter) * 60`.
    Simplified,
}

/// Rotation model configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RotationConfig {
    /// Formula selector.
    #[serde(default)]
    pub model: RotationKind,

    /// Tip-speed ratio; ignored by the simplified model.
    #[serde(default = "default_tip_speed_ratio")]
    pub tip_speed_ratio: f64,

    /// Rotor diameter in meters.
    #[serde(default = "default_diameter_m")]
    pub diameter_m: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            model: RotationKind::default(),
            tip_speed_ratio: default_tip_speed_ratio(),
            diameter_m: default_diameter_m(),
        }
    }
}

/// Cadences of the background task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Coarse period: how often the wind is sampled.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Fine period: how often `rpm / 60` is added to the running total.
    #[serde(default = "default_accumulate_interval_ms")]
    pub accumulate_interval_ms: u64,

    /// Start spinning as soon as the daemon comes up.
    #[serde(default)]
    pub autostart: bool,
}

impl TimingConfig {
    /// Sampling period as a [`Duration`].
    pub const fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Accumulation period as a [`Duration`].
    pub const fn accumulate_interval(&self) -> Duration {
        Duration::from_millis(self.accumulate_interval_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            accumulate_interval_ms: default_accumulate_interval_ms(),
            autostart: false,
        }
    }
}

/// Observer HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,

    /// Whether `GET /rpm` is routed.
    #[serde(default = "default_true")]
    pub expose_rpm: bool,

    /// How often the `WebSocket` stream pushes readings, in milliseconds.
    #[serde(default = "default_stream_interval_ms")]
    pub stream_interval_ms: u64,
}

impl ObserverConfig {
    /// Stream period as a [`Duration`].
    pub const fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_observer_port(),
            expose_rpm: true,
            stream_interval_ms: default_stream_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const fn default_tip_speed_ratio() -> f64 {
    8.0
}

const fn default_diameter_m() -> f64 {
    1.0
}

const fn default_sample_interval_ms() -> u64 {
    180_000
}

const fn default_accumulate_interval_ms() -> u64 {
    1_000
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

const fn default_stream_interval_ms() -> u64 {
    3_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = WindspinConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing.sample_interval(), Duration::from_secs(180));
        assert_eq!(config.timing.accumulate_interval(), Duration::from_secs(1));
        assert_eq!(config.rotation.model, RotationKind::TipSpeedRatio);
        assert_eq!(config.source.schema, WindSchema::Entries);
        assert_eq!(config.observer.port, 8080);
        assert!(config.observer.expose_rpm);
        assert!(!config.timing.autostart);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
source:
  url: "http://localhost:9000/weather?key={api_key}"
  api_key: "secret"
  schema: wind
  seed: 7
  request_timeout_ms: 2500

rotation:
  model: simplified
  tip_speed_ratio: 6.5
  diameter_m: 2.0

timing:
  sample_interval_ms: 500
  accumulate_interval_ms: 50
  autostart: true

observer:
  host: "127.0.0.1"
  port: 9090
  expose_rpm: false
  stream_interval_ms: 250

logging:
  level: "debug"
  json: true
"#;

        let config = WindspinConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.source.schema, WindSchema::Wind);
        assert_eq!(config.source.seed, Some(7));
        assert_eq!(config.source.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.rotation.model, RotationKind::Simplified);
        assert_eq!(config.timing.accumulate_interval_ms, 50);
        assert!(config.timing.autostart);
        assert!(!config.observer.expose_rpm);
        assert_eq!(config.observer.stream_interval(), Duration::from_millis(250));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "timing:\n  accumulate_interval_ms: 100\n";
        let config = WindspinConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.timing.accumulate_interval_ms, 100);
        // Everything else uses defaults
        assert_eq!(config.timing.sample_interval_ms, 180_000);
        assert_eq!(config.rotation, RotationConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = WindspinConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let yaml = "timing:\n  accumulate_interval_ms: 0\n";
        let result = WindspinConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn negative_diameter_is_rejected() {
        let yaml = "rotation:\n  diameter_m: -1.0\n";
        let result = WindspinConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_schema_is_a_yaml_error() {
        let yaml = "source:\n  schema: xml\n";
        let result = WindspinConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn endpoint_resolution() {
        let mut source = SourceConfig::default();
        assert_eq!(source.endpoint(), None);

        source.api_key = Some("abc".to_owned());
        assert_eq!(
            source.endpoint().as_deref(),
            Some("https://api.aprs.fi/api/get?name=GW2066&what=wx&apikey=abc")
        );

        source.url = Some("http://example.test/w?k={api_key}".to_owned());
        assert_eq!(source.endpoint().as_deref(), Some("http://example.test/w?k=abc"));

        source.api_key = None;
        assert_eq!(
            source.endpoint().as_deref(),
            Some("http://example.test/w?k={api_key}")
        );

        source.url = Some("   ".to_owned());
        assert_eq!(source.endpoint(), None);
    }

    fn lookup_from(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars.to_vec();
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, val)| (*val).to_owned())
        }
    }

    #[test]
    fn openweather_key_is_accepted() {
        let mut config = WindspinConfig::default();
        config
            .apply_overrides(lookup_from(&[("OPENWEATHER_API_KEY", "ow-key")]))
            .unwrap();
        assert_eq!(config.source.api_key.as_deref(), Some("ow-key"));
    }

    #[test]
    fn wind_key_wins_over_openweather_key() {
        let mut config = WindspinConfig::default();
        config
            .apply_overrides(lookup_from(&[
                ("OPENWEATHER_API_KEY", "ow-key"),
                ("WIND_API_KEY", "wind-key"),
            ]))
            .unwrap();
        assert_eq!(config.source.api_key.as_deref(), Some("wind-key"));
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = WindspinConfig::default();
        let result = config.apply_overrides(lookup_from(&[("WINDSPIN_PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert_eq!(config.observer.port, 8080);
    }
}
