//! Configuration module for the cycling-calendar application.
//!
//! Values come from the environment (a `.env` file is loaded first by
//! `main`). Durations accept bare seconds or unit-suffixed values such as
//! `30s`, `15m`, `24h`.

use anyhow::Context;
use figment::{Figment, providers::Env};
use fundu::{DurationParser, TimeUnit};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

pub const DEFAULT_TIZ_URL: &str = "https://cyclingtiz.live/sys-parse.php?file=db/races.txt";
pub const DEFAULT_SCHEDULE_URL: &str =
    "https://www.procyclingstats.com/races.php?filter=Filter&p=uci&s=start-finish-schedule";

/// Main application configuration containing all sub-configurations
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Log level for the application
    ///
    /// This value is used to set the log level for this application's target specifically.
    /// e.g. "debug" would be similar to "warn,cycling_calendar=debug"
    ///
    /// Defaults to "info" if not specified
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Port for the web server
    #[serde(default = "default_port")]
    pub port: u16,
    /// Graceful shutdown timeout duration
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,
    /// How long parsed races are served before the upstream is fetched again
    #[serde(default = "default_cache_ttl", deserialize_with = "deserialize_duration")]
    pub cache_ttl: Duration,
    /// How often expired cache entries are dropped
    #[serde(
        default = "default_cache_eviction_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub cache_eviction_interval: Duration,
    /// Per-request timeout for upstream fetches
    #[serde(
        default = "default_fetch_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub fetch_timeout: Duration,
    #[serde(default = "default_tiz_url")]
    pub tiz_url: String,
    #[serde(default = "default_schedule_url")]
    pub schedule_url: String,
    /// Appended to the schedule URL as a `timezone` query parameter
    #[serde(default)]
    pub timezone: Option<String>,
    /// Title written into every calendar document
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,
}

impl Config {
    /// Extract the configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        figment.extract().context("Failed to load config")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_cache_eviction_interval() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_tiz_url() -> String {
    DEFAULT_TIZ_URL.to_string()
}

fn default_schedule_url() -> String {
    DEFAULT_SCHEDULE_URL.to_string()
}

fn default_calendar_name() -> String {
    "Cycling Calendar".to_string()
}

/// Parse `"30"`, `"30s"`, `"15m"`, `"24h"` or `"1d"`; bare numbers are seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let parser = DurationParser::with_time_units(&[
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
    ]);
    let parsed = parser
        .parse(value.trim())
        .map_err(|e| format!("invalid duration {value:?}: {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("invalid duration {value:?}: {e}"))
}

/// Accepts either an integer number of seconds or a duration string.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct DurationVisitor;

    impl Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a duration string or a number of seconds")
        }

        fn visit_str<E>(self, value: &str) -> Result<Duration, E>
        where
            E: de::Error,
        {
            parse_duration(value).map_err(E::custom)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Duration, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Duration, E>
        where
            E: de::Error,
        {
            u64::try_from(value)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration cannot be negative"))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("30"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("15m"), Ok(Duration::from_secs(15 * 60)));
        assert_eq!(parse_duration("24h"), Ok(Duration::from_secs(24 * 3600)));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn defaults() {
        let config = Config::from_figment(Figment::new()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.shutdown_timeout, Duration::from_secs(8));
        assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(config.cache_eviction_interval, Duration::from_secs(3_600));
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.tiz_url, DEFAULT_TIZ_URL);
        assert_eq!(config.timezone, None);
        assert_eq!(config.calendar_name, "Cycling Calendar");
    }

    #[test]
    fn overrides() {
        let figment = Figment::new()
            .merge(Serialized::default("port", 9000))
            .merge(Serialized::default("cache_ttl", "30m"))
            .merge(Serialized::default("shutdown_timeout", 2))
            .merge(Serialized::default("timezone", "Europe/Paris"));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.cache_ttl, Duration::from_secs(30 * 60));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(2));
        assert_eq!(config.timezone.as_deref(), Some("Europe/Paris"));
    }
}
