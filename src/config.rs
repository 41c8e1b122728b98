use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_MAX_LINE_ITEMS: usize = 100;
const DEFAULT_ROLLBACK_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_ROLLBACK_RETRY_DELAY_MS: u64 = 50;
const MAX_ROLLBACK_RETRY_ATTEMPTS: u32 = 20;

const ENV_MAX_LINE_ITEMS: &str = "STOCKROOM_MAX_LINE_ITEMS";
const ENV_ROLLBACK_RETRY_ATTEMPTS: &str = "STOCKROOM_ROLLBACK_RETRY_ATTEMPTS";
const ENV_ROLLBACK_RETRY_DELAY_MS: &str = "STOCKROOM_ROLLBACK_RETRY_DELAY_MS";

/// Runtime knobs for the order placement service. Resolution order is
/// environment variable, then config file, then default.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on line items accepted in a single order request.
    pub max_line_items: usize,
    /// How many times a failed compensating increment is retried before
    /// the operation reports a rollback failure.
    pub rollback_retry_attempts: u32,
    /// Pause between compensating-increment retries.
    pub rollback_retry_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_line_items: DEFAULT_MAX_LINE_ITEMS,
            rollback_retry_attempts: DEFAULT_ROLLBACK_RETRY_ATTEMPTS,
            rollback_retry_delay_ms: DEFAULT_ROLLBACK_RETRY_DELAY_MS,
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from an optional YAML or JSON file plus
    /// `STOCKROOM_*` environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file_config = match config_file {
            Some(path) => load_config_file(path)?,
            None => PartialConfig::default(),
        };
        let env_config = env_overrides()?;
        let defaults = Self::default();

        let config = Self {
            max_line_items: env_config
                .max_line_items
                .or(file_config.max_line_items)
                .unwrap_or(defaults.max_line_items),
            rollback_retry_attempts: env_config
                .rollback_retry_attempts
                .or(file_config.rollback_retry_attempts)
                .unwrap_or(defaults.rollback_retry_attempts),
            rollback_retry_delay_ms: env_config
                .rollback_retry_delay_ms
                .or(file_config.rollback_retry_delay_ms)
                .unwrap_or(defaults.rollback_retry_delay_ms),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn rollback_retry_delay(&self) -> Duration {
        Duration::from_millis(self.rollback_retry_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.max_line_items >= 1,
            "max_line_items must be at least 1"
        );
        anyhow::ensure!(
            self.rollback_retry_attempts <= MAX_ROLLBACK_RETRY_ATTEMPTS,
            "rollback_retry_attempts must be at most {MAX_ROLLBACK_RETRY_ATTEMPTS}"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    max_line_items: Option<usize>,
    rollback_retry_attempts: Option<u32>,
    rollback_retry_delay_ms: Option<u64>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

fn env_overrides() -> Result<PartialConfig> {
    Ok(PartialConfig {
        max_line_items: env_parse(ENV_MAX_LINE_ITEMS)?,
        rollback_retry_attempts: env_parse(ENV_ROLLBACK_RETRY_ATTEMPTS)?,
        rollback_retry_delay_ms: env_parse(ENV_ROLLBACK_RETRY_DELAY_MS)?,
    })
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .map_err(|err| anyhow::anyhow!("invalid value for {name}: {err}"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
