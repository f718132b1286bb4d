//! Server configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{Duration, UtcOffset};

use ecowatch_core::{Band, GeneratorSet, ThresholdConfig};
use ecowatch_store::{Retention, StoreOptions};

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Simulation timing and pipeline.
    pub simulation: SimulationConfig,
    /// Capacities of the bounded lists.
    pub retention: Retention,
    /// Alert cutoffs per metric.
    pub thresholds: ThresholdConfig,
    /// Prometheus text endpoint.
    pub prometheus: PrometheusConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format)
    /// - Tick interval, backfill spacing and every capacity are non-zero
    /// - The backfill window spans at most a year
    /// - The exposed alert window fits in the global list
    /// - The UTC offset is within 18 hours
    /// - Every warning cutoff is below its critical cutoff
    ///
    /// # Example
    ///
    /// ```
    /// use ecowatch_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.simulation.validate());
        errors.extend(validate_retention(&self.retention));
        errors.extend(validate_thresholds(&self.thresholds));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Store settings derived from this configuration.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            retention: self.retention.clone(),
            backfill_count: self.simulation.backfill_count,
            backfill_spacing: Duration::seconds(
                i64::try_from(self.simulation.backfill_spacing_secs).unwrap_or(i64::MAX),
            ),
            utc_offset: self.simulation.utc_offset().unwrap_or(UtcOffset::UTC),
            thresholds: self.thresholds.clone(),
        }
    }

    /// Generators registered for each tick.
    pub fn generator_set(&self) -> GeneratorSet {
        if self.simulation.mobility {
            GeneratorSet::with_mobility()
        } else {
            GeneratorSet::standard()
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind: String,
    /// Buffer size of the tick event channel used by WebSocket clients.
    /// Slow subscribers lose the oldest events once it fills.
    pub broadcast_buffer: usize,
}

/// Default broadcast buffer size.
pub const DEFAULT_BROADCAST_BUFFER: usize = 100;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            broadcast_buffer: DEFAULT_BROADCAST_BUFFER,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError::new(
                "server.bind",
                "bind address cannot be empty",
            ));
        } else {
            match self.bind.rsplit_once(':') {
                None => errors.push(ValidationError::new(
                    "server.bind",
                    format!(
                        "invalid bind address '{}': expected format 'host:port'",
                        self.bind
                    ),
                )),
                Some((_, port)) => match port.parse::<u16>() {
                    Ok(0) => errors.push(ValidationError::new("server.bind", "port cannot be 0")),
                    Err(_) => errors.push(ValidationError::new(
                        "server.bind",
                        format!("invalid port '{}': must be a number 1-65535", port),
                    )),
                    Ok(_) => {}
                },
            }
        }

        if self.broadcast_buffer == 0 {
            errors.push(ValidationError::new(
                "server.broadcast_buffer",
                "broadcast buffer must be at least 1",
            ));
        }

        errors
    }
}

/// Simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds between ticks of the background collector.
    pub tick_interval_secs: u64,
    /// Readings backfilled per sensor at startup.
    pub backfill_count: u32,
    /// Seconds between backfilled readings.
    pub backfill_spacing_secs: u64,
    /// Local offset of the monitored site in minutes (330 is UTC+05:30).
    pub utc_offset_minutes: i32,
    /// Register the crowd and traffic generators.
    pub mobility: bool,
    /// Seed for a deterministic random source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Largest accepted UTC offset, in minutes.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Longest accepted backfill window (count times spacing), in seconds.
pub const MAX_BACKFILL_WINDOW_SECS: u64 = 366 * 24 * 60 * 60;

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 5,
            backfill_count: 20,
            backfill_spacing_secs: 300,
            utc_offset_minutes: 330,
            mobility: false,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Tick period.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_interval_secs)
    }

    /// The configured offset, if representable.
    pub fn utc_offset(&self) -> Option<UtcOffset> {
        UtcOffset::from_whole_seconds(self.utc_offset_minutes.checked_mul(60)?).ok()
    }

    /// Validate simulation settings.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.tick_interval_secs == 0 {
            errors.push(ValidationError::new(
                "simulation.tick_interval_secs",
                "tick interval must be at least 1 second",
            ));
        }
        if self.backfill_spacing_secs == 0 {
            errors.push(ValidationError::new(
                "simulation.backfill_spacing_secs",
                "backfill spacing must be at least 1 second",
            ));
        }
        let window = self
            .backfill_spacing_secs
            .checked_mul(u64::from(self.backfill_count));
        if window.is_none_or(|secs| secs > MAX_BACKFILL_WINDOW_SECS) {
            errors.push(ValidationError::new(
                "simulation.backfill_spacing_secs",
                format!(
                    "{} readings spaced {}s exceed the {}s backfill window",
                    self.backfill_count, self.backfill_spacing_secs, MAX_BACKFILL_WINDOW_SECS
                ),
            ));
        }
        if self.utc_offset_minutes.unsigned_abs() > MAX_UTC_OFFSET_MINUTES.unsigned_abs() {
            errors.push(ValidationError::new(
                "simulation.utc_offset_minutes",
                format!(
                    "offset {} is out of range (maximum {} minutes either side of UTC)",
                    self.utc_offset_minutes, MAX_UTC_OFFSET_MINUTES
                ),
            ));
        }

        errors
    }
}

/// Prometheus text endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrometheusConfig {
    /// Serve `/metrics`.
    pub enabled: bool,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn validate_retention(retention: &Retention) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let fields = [
        ("retention.readings_per_sensor", retention.readings_per_sensor),
        ("retention.alerts_per_sensor", retention.alerts_per_sensor),
        ("retention.global_alerts", retention.global_alerts),
        ("retention.exposed_alerts", retention.exposed_alerts),
    ];
    for (field, value) in fields {
        if value == 0 {
            errors.push(ValidationError::new(field, "capacity must be at least 1"));
        }
    }
    if retention.exposed_alerts > retention.global_alerts {
        errors.push(ValidationError::new(
            "retention.exposed_alerts",
            format!(
                "exposed alerts ({}) cannot exceed global alerts ({})",
                retention.exposed_alerts, retention.global_alerts
            ),
        ));
    }
    errors
}

fn validate_band(field: &str, band: &Band, errors: &mut Vec<ValidationError>) {
    if band.warning.is_nan() || band.critical.is_nan() || band.warning >= band.critical {
        errors.push(ValidationError::new(
            field,
            format!(
                "warning ({}) must be below critical ({})",
                band.warning, band.critical
            ),
        ));
    }
}

fn validate_thresholds(thresholds: &ThresholdConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_band("thresholds.aqi", &thresholds.aqi, &mut errors);
    validate_band("thresholds.temperature", &thresholds.temperature, &mut errors);
    validate_band("thresholds.co2", &thresholds.co2, &mut errors);
    validate_band("thresholds.crowd", &thresholds.crowd, &mut errors);
    validate_band("thresholds.traffic", &thresholds.traffic, &mut errors);

    let h = &thresholds.humidity;
    let ordered = h.critical_low < h.warning_low
        && h.warning_low < h.warning_high
        && h.warning_high < h.critical_high;
    if !ordered {
        errors.push(ValidationError::new(
            "thresholds.humidity",
            "expected critical_low < warning_low < warning_high < critical_high",
        ));
    }
    errors
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind` or `thresholds.aqi`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ecowatch")
        .join("server.toml")
}
