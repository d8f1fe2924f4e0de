//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use floodgate_core::domain::DEFAULT_KEY_PREFIX;
use floodgate_core::{AdmissionError, EventIdentity, FailurePolicy, LimiterConfig};
use floodgate_infra::rate_limit::DEFAULT_STORE_TIMEOUT;

#[cfg(feature = "redis")]
use floodgate_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
    pub limits: LimitsConfig,
}

/// Limiter classes and key derivation settings.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Applied to general API routes.
    pub general: LimiterConfig,
    /// Stricter class applied to authentication routes.
    pub auth: LimiterConfig,
    /// Bound on each counter store round-trip.
    pub store_timeout: Duration,
    pub key_prefix: String,
    /// One key for every general-route request instead of one per client.
    pub fixed_key: Option<String>,
    /// Key by `X-Forwarded-For` / `Forwarded` instead of the socket peer.
    pub trust_forwarded: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Invalid limiter values fail here, before the server binds.
    pub fn from_env() -> Result<Self, AdmissionError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AdmissionError> {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&lookup, "PORT", 8080)?,
            #[cfg(feature = "redis")]
            redis: redis_from_lookup(&lookup)?,
            limits: LimitsConfig::from_lookup(&lookup)?,
        })
    }
}

impl LimitsConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, AdmissionError> {
        let policy: FailurePolicy = parse(lookup, "RATE_LIMIT_FAILURE_POLICY", FailurePolicy::Open)?;
        let identity: EventIdentity =
            parse(lookup, "RATE_LIMIT_EVENT_IDENTITY", EventIdentity::Request)?;

        let general = LimiterConfig::new(
            parse(lookup, "RATE_LIMIT_MAX_REQUESTS", 100)?,
            parse(lookup, "RATE_LIMIT_WINDOW_SECS", 60)?,
        )?
        .with_identity(identity)
        .with_failure_policy(policy);

        let auth = LimiterConfig::new(
            parse(lookup, "AUTH_RATE_LIMIT_MAX_REQUESTS", 5)?,
            parse(lookup, "AUTH_RATE_LIMIT_WINDOW_SECS", 60)?,
        )?
        .with_identity(identity)
        .with_failure_policy(policy);

        let timeout_ms: u64 = parse(
            lookup,
            "RATE_LIMIT_STORE_TIMEOUT_MS",
            DEFAULT_STORE_TIMEOUT.as_millis() as u64,
        )?;
        if timeout_ms == 0 {
            return Err(AdmissionError::InvalidConfiguration(
                "RATE_LIMIT_STORE_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            general,
            auth,
            store_timeout: Duration::from_millis(timeout_ms),
            key_prefix: lookup("RATE_LIMIT_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
            fixed_key: lookup("RATE_LIMIT_KEY").filter(|k| !k.trim().is_empty()),
            trust_forwarded: flag(lookup, "RATE_LIMIT_TRUST_FORWARDED", false)?,
        })
    }
}

/// `REDIS_URL` wins; otherwise the URL is built from `REDIS_HOST`,
/// `REDIS_PORT` and `REDIS_DB`.
#[cfg(feature = "redis")]
fn redis_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<RedisConfig, AdmissionError> {
    let defaults = RedisConfig::default();
    let url = match lookup("REDIS_URL") {
        Some(url) => url,
        None => {
            let host = lookup("REDIS_HOST").unwrap_or_else(|| "localhost".to_string());
            let port: u16 = parse(lookup, "REDIS_PORT", 6379)?;
            let db: u32 = parse(lookup, "REDIS_DB", 0)?;
            format!("redis://{host}:{port}/{db}")
        }
    };

    Ok(RedisConfig {
        enabled: flag(lookup, "REDIS_ENABLED", defaults.enabled)?,
        url,
        connect_timeout: Duration::from_secs(parse(
            lookup,
            "REDIS_CONNECT_TIMEOUT_SECS",
            defaults.connect_timeout.as_secs(),
        )?),
        fallback_to_memory: flag(
            lookup,
            "REDIS_FALLBACK_TO_MEMORY",
            defaults.fallback_to_memory,
        )?,
    })
}

/// Boolean switch accepting `true`/`false` or `1`/`0`.
fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: bool,
) -> Result<bool, AdmissionError> {
    match lookup(name).as_deref().map(str::trim) {
        None => Ok(default),
        Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(raw) => Err(AdmissionError::InvalidConfiguration(format!(
            "{name} has invalid value '{raw}'"
        ))),
    }
}

/// Parse `name` if set, otherwise use `default`. A set but malformed value is an error.
fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AdmissionError> {
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AdmissionError::InvalidConfiguration(format!("{name} has invalid value '{raw}'"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AdmissionError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.limits.general.limit(), 100);
        assert_eq!(config.limits.general.window(), 60);
        assert_eq!(config.limits.auth.limit(), 5);
        assert_eq!(config.limits.general.failure_policy(), FailurePolicy::Open);
        assert_eq!(config.limits.store_timeout, DEFAULT_STORE_TIMEOUT);
        assert_eq!(config.limits.key_prefix, "rate_limit");
        assert!(config.limits.fixed_key.is_none());
        assert!(!config.limits.trust_forwarded);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("RATE_LIMIT_MAX_REQUESTS", "10"),
            ("RATE_LIMIT_WINDOW_SECS", "1"),
            ("RATE_LIMIT_FAILURE_POLICY", "closed"),
            ("RATE_LIMIT_EVENT_IDENTITY", "second"),
            ("RATE_LIMIT_KEY", "global"),
        ])
        .unwrap();

        assert_eq!(config.limits.general.limit(), 10);
        assert_eq!(config.limits.general.window(), 1);
        assert_eq!(config.limits.auth.failure_policy(), FailurePolicy::Closed);
        assert_eq!(config.limits.auth.identity(), EventIdentity::Second);
        assert_eq!(config.limits.fixed_key.as_deref(), Some("global"));
    }

    #[test]
    fn test_zero_or_negative_limits_fail_fast() {
        for (name, value) in [
            ("RATE_LIMIT_MAX_REQUESTS", "0"),
            ("RATE_LIMIT_MAX_REQUESTS", "-3"),
            ("AUTH_RATE_LIMIT_WINDOW_SECS", "0"),
            ("RATE_LIMIT_STORE_TIMEOUT_MS", "0"),
            ("RATE_LIMIT_FAILURE_POLICY", "maybe"),
            ("RATE_LIMIT_TRUST_FORWARDED", "yes"),
        ] {
            let err = load(&[(name, value)]).unwrap_err();
            assert!(
                matches!(err, AdmissionError::InvalidConfiguration(_)),
                "{name}={value} should be rejected"
            );
        }
    }

    #[cfg(feature = "redis")]
    #[test]
    fn test_redis_settings_come_from_lookup() {
        let config = load(&[
            ("REDIS_HOST", "cache"),
            ("REDIS_PORT", "6380"),
            ("REDIS_DB", "2"),
            ("REDIS_CONNECT_TIMEOUT_SECS", "9"),
            ("REDIS_ENABLED", "0"),
        ])
        .unwrap();

        assert_eq!(config.redis.url, "redis://cache:6380/2");
        assert_eq!(config.redis.connect_timeout, Duration::from_secs(9));
        assert!(!config.redis.enabled);
        assert!(config.redis.fallback_to_memory);

        let config = load(&[("REDIS_URL", "redis://primary:6379/0"), ("REDIS_PORT", "x")]).unwrap();
        assert_eq!(config.redis.url, "redis://primary:6379/0");
    }

    #[cfg(feature = "redis")]
    #[test]
    fn test_malformed_redis_settings_fail_fast() {
        for (name, value) in [
            ("REDIS_CONNECT_TIMEOUT_SECS", "abc"),
            ("REDIS_PORT", "70000"),
            ("REDIS_ENABLED", "maybe"),
            ("REDIS_FALLBACK_TO_MEMORY", "sometimes"),
        ] {
            let err = load(&[(name, value)]).unwrap_err();
            assert!(
                matches!(err, AdmissionError::InvalidConfiguration(_)),
                "{name}={value} should be rejected"
            );
        }
    }
}
