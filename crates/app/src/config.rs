//! Environment-driven configuration.

use anyhow::{Context, bail};

use freshguard_digest::DigestSettings;
use freshguard_inventory::FreshnessThresholds;
use freshguard_observability::LogFormat;

pub const ENV_URGENT_MAX_DAYS: &str = "FRESHGUARD_URGENT_MAX_DAYS";
pub const ENV_SOON_MAX_DAYS: &str = "FRESHGUARD_SOON_MAX_DAYS";
pub const ENV_PUSH_ENABLED: &str = "FRESHGUARD_PUSH_ENABLED";
pub const ENV_DIGEST_ENABLED: &str = "FRESHGUARD_DIGEST_ENABLED";
pub const ENV_DIGEST_HOUR: &str = "FRESHGUARD_DIGEST_HOUR";
pub const ENV_DIGEST_MINUTE: &str = "FRESHGUARD_DIGEST_MINUTE";
pub const ENV_LOG_FORMAT: &str = "FRESHGUARD_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub thresholds: FreshnessThresholds,
    /// Used for keys the settings store does not hold yet.
    pub default_settings: DigestSettings,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds: FreshnessThresholds::DEFAULT,
            default_settings: DigestSettings::default(),
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let urgent = parse_or(&lookup, ENV_URGENT_MAX_DAYS, defaults.thresholds.urgent_max_days)?;
        let soon = parse_or(&lookup, ENV_SOON_MAX_DAYS, defaults.thresholds.soon_max_days)?;
        let thresholds = FreshnessThresholds::new(urgent, soon)
            .with_context(|| format!("invalid {ENV_URGENT_MAX_DAYS}/{ENV_SOON_MAX_DAYS}"))?;

        let base = defaults.default_settings;
        let default_settings = DigestSettings::new(
            parse_bool_or(&lookup, ENV_PUSH_ENABLED, base.push_enabled())?,
            parse_bool_or(&lookup, ENV_DIGEST_ENABLED, base.digest_enabled())?,
            parse_or(&lookup, ENV_DIGEST_HOUR, base.hour())?,
            parse_or(&lookup, ENV_DIGEST_MINUTE, base.minute())?,
        );

        let log_format = match lookup(ENV_LOG_FORMAT) {
            None => defaults.log_format,
            Some(raw) => raw.parse::<LogFormat>().map_err(anyhow::Error::msg).with_context(|| format!("invalid {ENV_LOG_FORMAT}"))?,
        };

        Ok(Self {
            thresholds,
            default_settings,
            log_format,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: T) -> anyhow::Result<T>
where
    T: core::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        None => Ok(fallback),
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
    }
}

fn parse_bool_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: bool) -> anyhow::Result<bool> {
    let Some(raw) = lookup(key) else {
        return Ok(fallback);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("invalid {key}: {raw:?}"),
    }
}
