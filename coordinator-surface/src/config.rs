//! Coordinator configuration: TOML file, lowest-priority layer under
//! environment variables, under built-in defaults matching `spec.md` §6.

use std::path::Path;
use std::time::Duration;

use coordinator_registry::RegistryConfig;
use coordinator_scheduler::ScoringWeights;
use serde::Deserialize;
use tracing::{error, warn};

const DEFAULT_COORDINATOR_PORT: u16 = 50051;
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_TOKEN_TTL_SECS: u64 = 120;

/// Fully resolved coordinator configuration.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
    /// Listen port for the control-plane RPC surface.
    pub coordinator_port: u16,
    /// Listen port for the client HTTP surface.
    pub http_port: u16,
    /// Lifetime of minted session tokens.
    pub token_ttl: Duration,
    /// Registry liveness/circuit-breaker thresholds.
    pub registry: RegistryConfig,
    /// MCDA scoring weights.
    pub scoring: ScoringWeights,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            coordinator_port: DEFAULT_COORDINATOR_PORT,
            http_port: DEFAULT_HTTP_PORT,
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            registry: RegistryConfig::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

/// `config.toml` shape. Every field is optional; absent fields fall back to
/// the built-in default. Unknown keys are rejected so a typo in the file
/// surfaces as a startup error instead of being silently ignored.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    coordinator_port: Option<u16>,
    http_port: Option<u16>,
    #[serde(default, with = "humantime_serde::option")]
    heartbeat_timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    token_ttl: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    cleanup_interval: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    recovery_timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde::option")]
    half_open_timeout: Option<Duration>,
    failure_threshold: Option<i32>,
    success_threshold: Option<i32>,
    scoring_weights: Option<TomlScoringWeights>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlScoringWeights {
    vram: f64,
    load: f64,
    rtt: f64,
    perf: f64,
}

impl CoordinatorConfig {
    /// Loads configuration from `path`, falling back to defaults for any
    /// field the file omits and for the file as a whole if it is missing.
    ///
    /// A present-but-unparseable file is a startup error: unlike a missing
    /// file (which just means "use defaults"), a malformed one means the
    /// operator's intent can't be honored.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the file exists but is not valid TOML, or
    /// contains unknown keys.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "no config file found, using defaults");
                return Ok(Self::default());
            }
        };

        let parsed: TomlConfig = toml::from_str(&contents).map_err(|err| {
            error!(path = %path.display(), error = %err, "failed to parse config file");
            err
        })?;

        Ok(Self::from_toml(parsed))
    }

    fn from_toml(toml: TomlConfig) -> Self {
        let defaults = Self::default();
        let mut registry = defaults.registry;
        registry.heartbeat_timeout = toml.heartbeat_timeout.unwrap_or(registry.heartbeat_timeout);
        registry.cleanup_interval = toml.cleanup_interval.unwrap_or(registry.cleanup_interval);
        registry.recovery_timeout = toml.recovery_timeout.unwrap_or(registry.recovery_timeout);
        registry.half_open_timeout = toml.half_open_timeout.unwrap_or(registry.half_open_timeout);
        registry.failure_threshold = toml.failure_threshold.unwrap_or(registry.failure_threshold);
        registry.success_threshold = toml.success_threshold.unwrap_or(registry.success_threshold);

        let scoring = toml.scoring_weights.map_or(defaults.scoring, |weights| ScoringWeights {
            vram: weights.vram,
            load: weights.load,
            rtt: weights.rtt,
            perf: weights.perf,
        });

        Self {
            coordinator_port: toml.coordinator_port.unwrap_or(defaults.coordinator_port),
            http_port: toml.http_port.unwrap_or(defaults.http_port),
            token_ttl: toml.token_ttl.unwrap_or(defaults.token_ttl),
            registry,
            scoring,
        }
    }
}
