//! Configuration management with validation and defaults
//!
//! `CasinoConfig` is read from TOML, then `DICE_CASINO_*` environment
//! variables override individual fields, then the result is validated.
//! Defaults match the standard deployment: min bet 0.01, max bet 1, 5% house
//! edge and a treasury funded with 1 unit.

use crate::errors::{CasinoResult, ConfigurationError};
use crate::games::types::{Amount, GameParameters};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Operator used when none is configured
pub const DEFAULT_OPERATOR: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "DICE_CASINO_";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoConfig {
    pub game: GameConfig,
    pub treasury: TreasuryConfig,
    pub randomness: RandomnessConfig,
    pub api: ApiConfig,
    pub monitoring: MonitoringConfig,
}

/// Operator identity and the initial game parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub operator: String,
    pub min_bet: Amount,
    pub max_bet: Amount,
    pub house_edge_bps: u16,
}

impl GameConfig {
    pub fn parameters(&self) -> GameParameters {
        GameParameters {
            min_bet: self.min_bet,
            max_bet: self.max_bet,
            house_edge_bps: self.house_edge_bps,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let standard = GameParameters::standard();
        Self {
            operator: DEFAULT_OPERATOR.to_string(),
            min_bet: standard.min_bet,
            max_bet: standard.max_bet,
            house_edge_bps: standard.house_edge_bps,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasuryConfig {
    /// Funded by the operator at startup
    pub initial_balance: Amount,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            initial_balance: Amount::from_units(1),
        }
    }
}

/// Which randomness source settles bets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomnessMode {
    /// Verifiable schnorrkel VRF
    #[default]
    Vrf,
    /// Operating-system entropy
    Os,
    /// Fixed sequence, for demos and tests
    Scripted,
}

impl std::str::FromStr for RandomnessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vrf" => Ok(Self::Vrf),
            "os" => Ok(Self::Os),
            "scripted" => Ok(Self::Scripted),
            other => Err(format!("unknown randomness mode '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomnessConfig {
    pub mode: RandomnessMode,
    /// 32-byte hex seed; a fresh key is generated on every start when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vrf_seed: Option<String>,
    pub scripted_rolls: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Capacity of the event channel feeding WebSocket clients
    pub event_buffer: usize,
    /// Hex SHA-256 of the operator's bearer token; `serve` refuses to start without it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_token_hash: Option<String>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
            event_buffer: 1024,
            operator_token_hash: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl CasinoConfig {
    /// Check every constraint the casino relies on at startup
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.game.operator.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("game.operator".to_string()));
        }

        self.game
            .parameters()
            .validate()
            .map_err(|e| ConfigurationError::ValidationFailed(format!("game: {}", e)))?;

        match self.randomness.mode {
            RandomnessMode::Scripted if self.randomness.scripted_rolls.is_empty() => {
                return Err(ConfigurationError::MissingRequired(
                    "randomness.scripted_rolls".to_string(),
                ));
            }
            _ => {}
        }
        if let Some(bad) = self
            .randomness
            .scripted_rolls
            .iter()
            .find(|n| !(1..=6).contains(*n))
        {
            return Err(ConfigurationError::InvalidValue {
                field: "randomness.scripted_rolls".to_string(),
                value: bad.to_string(),
                reason: "Rolls must be between 1 and 6".to_string(),
            });
        }
        if let Some(seed) = &self.randomness.vrf_seed {
            let valid = hex::decode(seed.trim()).map(|b| b.len() == 32).unwrap_or(false);
            if !valid {
                return Err(ConfigurationError::InvalidValue {
                    field: "randomness.vrf_seed".to_string(),
                    value: "<redacted>".to_string(),
                    reason: "Seed must be 32 bytes of hex".to_string(),
                });
            }
        }

        if self.api.port == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "api.port".to_string(),
                value: "0".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "api.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout cannot be zero".to_string(),
            });
        }
        if let Some(hash) = &self.api.operator_token_hash {
            if !crate::api::security::is_token_hash(hash.trim()) {
                return Err(ConfigurationError::InvalidValue {
                    field: "api.operator_token_hash".to_string(),
                    value: "<redacted>".to_string(),
                    reason: "Expected the 64-character hex SHA-256 of the token".to_string(),
                });
            }
        }
        if self.api.event_buffer == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "api.event_buffer".to_string(),
                value: "0".to_string(),
                reason: "Event buffer cannot be zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> CasinoResult<CasinoConfig> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as `load`, reading overrides through `lookup` instead of the process environment
    pub fn load_with<F>(&self, lookup: F) -> CasinoResult<CasinoConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config_path {
            Some(path) => self.load_from_file(path)?,
            None => CasinoConfig::default(),
        };

        apply_overrides(&mut config, lookup)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> Result<CasinoConfig, ConfigurationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self, config: &CasinoConfig, path: &str) -> CasinoResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into()
        })
    }
}

fn parse_override<T: std::str::FromStr>(
    key: &str,
    raw: String,
    reason: &str,
) -> Result<T, ConfigurationError> {
    raw.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: format!("{}{}", ENV_PREFIX, key),
        value: raw,
        reason: reason.to_string(),
    })
}

fn apply_overrides<F>(config: &mut CasinoConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));

    // Game overrides
    if let Some(operator) = var("OPERATOR") {
        config.game.operator = operator;
    }
    if let Some(raw) = var("MIN_BET") {
        config.game.min_bet = parse_override("MIN_BET", raw, "Invalid amount")?;
    }
    if let Some(raw) = var("MAX_BET") {
        config.game.max_bet = parse_override("MAX_BET", raw, "Invalid amount")?;
    }
    if let Some(raw) = var("HOUSE_EDGE_BPS") {
        config.game.house_edge_bps = parse_override("HOUSE_EDGE_BPS", raw, "Invalid basis points")?;
    }

    if let Some(raw) = var("INITIAL_BALANCE") {
        config.treasury.initial_balance = parse_override("INITIAL_BALANCE", raw, "Invalid amount")?;
    }

    // Randomness overrides
    if let Some(raw) = var("RANDOMNESS") {
        config.randomness.mode = parse_override("RANDOMNESS", raw, "Expected vrf, os or scripted")?;
    }
    if let Some(seed) = var("VRF_SEED") {
        config.randomness.vrf_seed = Some(seed);
    }

    // API overrides
    if let Some(host) = var("API_HOST") {
        config.api.host = host;
    }
    if let Some(raw) = var("API_PORT") {
        config.api.port = parse_override("API_PORT", raw, "Invalid port number")?;
    }
    if let Some(hash) = var("OPERATOR_TOKEN_HASH") {
        config.api.operator_token_hash = Some(hash);
    }

    if let Some(raw) = var("LOG_LEVEL") {
        config.monitoring.log_level = parse_override("LOG_LEVEL", raw, "Invalid log level")?;
    }

    Ok(())
}

/// Builder pattern for creating configurations
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: CasinoConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.config.game.operator = operator.into();
        self
    }

    pub fn parameters(mut self, parameters: GameParameters) -> Self {
        self.config.game.min_bet = parameters.min_bet;
        self.config.game.max_bet = parameters.max_bet;
        self.config.game.house_edge_bps = parameters.house_edge_bps;
        self
    }

    pub fn initial_balance(mut self, amount: Amount) -> Self {
        self.config.treasury.initial_balance = amount;
        self
    }

    pub fn randomness(mut self, randomness: RandomnessConfig) -> Self {
        self.config.randomness = randomness;
        self
    }

    /// Scripted randomness replaying `rolls`
    pub fn scripted_rolls(mut self, rolls: Vec<u8>) -> Self {
        self.config.randomness = RandomnessConfig {
            mode: RandomnessMode::Scripted,
            vrf_seed: None,
            scripted_rolls: rolls,
        };
        self
    }

    /// Store the hash of the operator's bearer token
    pub fn operator_token(mut self, raw_token: &str) -> Self {
        self.config.api.operator_token_hash = Some(crate::api::security::hash_api_key(raw_token));
        self
    }

    pub fn api(mut self, api: ApiConfig) -> Self {
        self.config.api = api;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.monitoring.log_level = level;
        self
    }

    pub fn build(self) -> CasinoConfig {
        self.config
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> CasinoResult<()> {
    ConfigLoader::new().save(&CasinoConfig::default(), path)
}
