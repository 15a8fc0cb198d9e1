use base64::{engine::general_purpose, Engine as _};
use common::config::{ObservabilityConfig, DEFAULT_LOG_LEVEL};
use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Minimum HMAC-SHA256 signing key length in bytes.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Default token issuer identifier.
pub const DEFAULT_JWT_ISSUER: &str = "PathFinder";

/// Default token audience identifier.
pub const DEFAULT_JWT_AUDIENCE: &str = "PathFinderUsers";

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_EXPIRY_MINUTES: i64 = 120;

/// Default clock skew tolerance in seconds.
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: u64 = DEFAULT_CLOCK_SKEW.as_secs();

/// Bcrypt cost bounds. Below 10 is too cheap to resist offline guessing;
/// above 14 pushes a single login past ~800ms.
pub const MIN_BCRYPT_COST: u32 = 10;
pub const MAX_BCRYPT_COST: u32 = 14;
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Default interval between background revocation sweeps in seconds.
pub const DEFAULT_REVOCATION_SWEEP_SECONDS: u64 = 60;

#[derive(Debug)]
pub struct Config {
    /// HS256 key shared by the issuer and the verification gateway.
    pub signing_key: SecretBox<Vec<u8>>,
    pub issuer: String,
    pub audience: String,
    /// Lifetime applied to every issued token. Never caller-supplied.
    pub token_ttl: chrono::Duration,
    pub clock_skew: Duration,
    pub bcrypt_cost: u32,
    pub revocation_sweep_interval: Duration,
    pub observability: ObservabilityConfig,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            signing_key: SecretBox::new(Box::new(self.signing_key.expose_secret().clone())),
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            token_ttl: self.token_ttl,
            clock_skew: self.clock_skew,
            bcrypt_cost: self.bcrypt_cost,
            revocation_sweep_interval: self.revocation_sweep_interval,
            observability: self.observability.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Invalid JWT clock skew: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid bcrypt cost: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let signing_key_base64 = vars
            .get("AUTH_JWT_SIGNING_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_JWT_SIGNING_KEY".to_string()))?;

        let signing_key = general_purpose::STANDARD
            .decode(signing_key_base64.trim())
            .map_err(ConfigError::Base64Error)?;

        let mut config = Self::for_signing_key(signing_key)?;

        if let Some(issuer) = vars.get("AUTH_JWT_ISSUER") {
            config.issuer = non_empty("AUTH_JWT_ISSUER", issuer)?;
        }

        if let Some(audience) = vars.get("AUTH_JWT_AUDIENCE") {
            config.audience = non_empty("AUTH_JWT_AUDIENCE", audience)?;
        }

        if let Some(minutes) = vars.get("AUTH_TOKEN_EXPIRY_MINUTES") {
            let minutes: i64 = parse_var("AUTH_TOKEN_EXPIRY_MINUTES", minutes)?;
            if minutes <= 0 {
                return Err(ConfigError::InvalidValue {
                    name: "AUTH_TOKEN_EXPIRY_MINUTES".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }
            config.token_ttl = chrono::Duration::try_minutes(minutes).ok_or_else(|| {
                ConfigError::InvalidValue {
                    name: "AUTH_TOKEN_EXPIRY_MINUTES".to_string(),
                    reason: format!("{minutes} minutes is out of range"),
                }
            })?;
        }

        if let Some(skew) = vars.get("AUTH_JWT_CLOCK_SKEW_SECONDS") {
            let seconds: u64 = skew.trim().parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!("not a positive integer: {e}"))
            })?;
            if seconds == 0 || seconds > MAX_CLOCK_SKEW.as_secs() {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "{} seconds (must be 1-{})",
                    seconds,
                    MAX_CLOCK_SKEW.as_secs()
                )));
            }
            config.clock_skew = Duration::from_secs(seconds);
        }

        if let Some(cost) = vars.get("AUTH_BCRYPT_COST") {
            let cost: u32 = cost
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidBcryptCost(format!("not an integer: {e}")))?;
            if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                return Err(ConfigError::InvalidBcryptCost(format!(
                    "{} (must be {}-{})",
                    cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
                )));
            }
            config.bcrypt_cost = cost;
        }

        if let Some(sweep) = vars.get("AUTH_REVOCATION_SWEEP_SECONDS") {
            let seconds: u64 = parse_var("AUTH_REVOCATION_SWEEP_SECONDS", sweep)?;
            if seconds == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "AUTH_REVOCATION_SWEEP_SECONDS".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }
            config.revocation_sweep_interval = Duration::from_secs(seconds);
        }

        if let Some(level) = vars.get("AUTH_LOG_LEVEL") {
            config.observability.log_level = non_empty("AUTH_LOG_LEVEL", level)?;
        }

        if let Some(json) = vars.get("AUTH_LOG_JSON") {
            config.observability.json_logs = parse_var("AUTH_LOG_JSON", json)?;
        }

        Ok(config)
    }

    /// Build a configuration with every default applied around the given key.
    pub fn for_signing_key(signing_key: Vec<u8>) -> Result<Self, ConfigError> {
        if signing_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ConfigError::InvalidSigningKey(format!(
                "Expected at least {} bytes, got {}",
                MIN_SIGNING_KEY_BYTES,
                signing_key.len()
            )));
        }

        Ok(Config {
            signing_key: SecretBox::new(Box::new(signing_key)),
            issuer: DEFAULT_JWT_ISSUER.to_string(),
            audience: DEFAULT_JWT_AUDIENCE.to_string(),
            token_ttl: chrono::Duration::minutes(DEFAULT_TOKEN_EXPIRY_MINUTES),
            clock_skew: Duration::from_secs(DEFAULT_JWT_CLOCK_SKEW_SECONDS),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            revocation_sweep_interval: Duration::from_secs(DEFAULT_REVOCATION_SWEEP_SECONDS),
            observability: ObservabilityConfig {
                log_level: DEFAULT_LOG_LEVEL.to_string(),
                json_logs: false,
            },
        })
    }
}

fn non_empty(name: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        })
}
