//! Configuration module
//!
//! Host configuration read from the environment at startup: the listening port, the
//! log format and the parameters of the shared admission gate.

use std::env;
use std::time::Duration;

use ldlmt_core::GateConfig;

// Common constants
const SERVER_PORT: u16 = 4000;

/// Host configuration (server and gate).
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    /// `json` for structured log lines, anything else for human-readable output.
    pub log_format: String,
    pub gate: GateConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = GateConfig::default();

        Ok(Self {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "text".to_string())
                .to_lowercase(),
            gate: GateConfig {
                capacity: parse_var("LDLMT_CAPACITY", defaults.capacity)?,
                max_waiters: parse_var("LDLMT_MAX_WAITERS", defaults.max_waiters)?,
                max_wait: Duration::from_millis(parse_var(
                    "LDLMT_MAX_WAIT_MS",
                    defaults.max_wait.as_millis() as u64,
                )?),
            },
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.gate.validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn gate(&self) -> &GateConfig {
        &self.gate
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}

/// Read `key`, falling back to `default` when unset. A value that is set but does not
/// parse is an error rather than a silent fallback.
fn parse_var<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer, got {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
