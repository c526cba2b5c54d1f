//! # Startup configuration.
//!
//! Provides [`SupervisorConfig`], the environment-derived settings for one
//! supervisor run. The environment is read exactly once at startup and turned
//! into an immutable value; nothing else in the crate touches `std::env`.
//!
//! Config is used in two ways:
//! 1. **Dependency list**: [`SupervisorConfig::dependencies`] builds the [`DependencySpec`]s.
//! 2. **Workload environment**: [`SupervisorConfig::workload_env`] exports the
//!    effective values so the workload sees the same defaults the supervisor applied.
//!
//! ## Variables
//! | Variable                   | Default        | Used by                       |
//! |----------------------------|----------------|-------------------------------|
//! | `ENVIRONMENT`              | `DEV`          | workload                      |
//! | `HOST`                     | `localhost`    | workload                      |
//! | `PORT`                     | `8000`         | workload                      |
//! | `REDIS_HOST`               | `localhost`    | readiness probe, workload     |
//! | `REDIS_PORT`               | `6379`         | launch, probe, workload       |
//! | `REDIS_DB`                 | `0`            | workload                      |
//! | `REDIS_SERVER`             | `redis-server` | launch                        |
//! | `REDIS_AUTOSTART`          | `true`         | launch (`false` = wait only)  |
//! | `REDIS_PROBE`              | `tcp`          | probe kind (`tcp` / `ping`)   |
//! | `REDIS_STARTUP_TIMEOUT_MS` | `5000`         | readiness deadline            |
//! | `REDIS_POLL_INTERVAL_MS`   | `500`          | readiness poll interval       |
//!
//! Empty values are treated as unset.

use std::str::FromStr;
use std::time::Duration;

use crate::dependency::{DependencySpec, LaunchCommand, Probe};
use crate::error::ConfigError;

/// Name under which the Redis dependency is reported.
pub const REDIS_DEPENDENCY: &str = "redis";

/// Which readiness probe is used for Redis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeKind {
    /// TCP connect-and-close.
    Tcp,
    /// Inline `PING`, expecting `+PONG`.
    Ping,
}

impl FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(ProbeKind::Tcp),
            "ping" => Ok(ProbeKind::Ping),
            _ => Err("expected `tcp` or `ping`".to_string()),
        }
    }
}

/// Settings for the bundled Redis dependency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedisConfig {
    /// Host the readiness probe connects to.
    pub host: String,
    /// Port the server is launched on and probed at.
    pub port: u16,
    /// Database index, passed through to the workload only.
    pub db: u32,
    /// Executable used to launch the server.
    pub server: String,
    /// Whether the supervisor launches Redis itself or only waits for it.
    pub autostart: bool,
    /// Readiness probe flavour.
    pub probe: ProbeKind,
    /// Maximum time to wait for readiness.
    pub startup_timeout: Duration,
    /// Delay between readiness probes.
    pub poll_interval: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            server: "redis-server".to_string(),
            autostart: true,
            probe: ProbeKind::Tcp,
            startup_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Effective configuration for one supervisor run.
///
/// ## Notes
/// `environment`, `host` and `port` are never interpreted by the supervisor;
/// they are carried only to be exported to the workload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Deployment environment label (`ENVIRONMENT`).
    pub environment: String,
    /// Workload bind host (`HOST`).
    pub host: String,
    /// Workload listening port (`PORT`).
    pub port: u16,
    /// Redis dependency settings.
    pub redis: RedisConfig,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            environment: "DEV".to_string(),
            host: "localhost".to_string(),
            port: 8000,
            redis: RedisConfig::default(),
        }
    }
}

impl SupervisorConfig {
    /// Reads the process environment once.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// # Example
    /// ```
    /// use execvisor::SupervisorConfig;
    ///
    /// let cfg = SupervisorConfig::from_lookup(|var| match var {
    ///     "REDIS_PORT" => Some("6380".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(cfg.redis.port, 6380);
    /// assert_eq!(cfg.port, 8000);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);
        let defaults = Self::default();
        let redis = RedisConfig::default();

        let poll_ms = env.parse("REDIS_POLL_INTERVAL_MS", redis.poll_interval.as_millis() as u64)?;
        if poll_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "REDIS_POLL_INTERVAL_MS",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        let timeout_ms =
            env.parse("REDIS_STARTUP_TIMEOUT_MS", redis.startup_timeout.as_millis() as u64)?;

        Ok(Self {
            environment: env.string("ENVIRONMENT", defaults.environment),
            host: env.string("HOST", defaults.host),
            port: env.parse("PORT", defaults.port)?,
            redis: RedisConfig {
                host: env.string("REDIS_HOST", redis.host),
                port: env.parse("REDIS_PORT", redis.port)?,
                db: env.parse("REDIS_DB", redis.db)?,
                server: env.string("REDIS_SERVER", redis.server),
                autostart: env.flag("REDIS_AUTOSTART", redis.autostart)?,
                probe: env.parse("REDIS_PROBE", redis.probe)?,
                startup_timeout: Duration::from_millis(timeout_ms),
                poll_interval: Duration::from_millis(poll_ms),
            },
        })
    }

    /// Dependencies to bring up before handoff, in start order.
    pub fn dependencies(&self) -> Vec<DependencySpec> {
        let redis = &self.redis;
        let probe = match redis.probe {
            ProbeKind::Tcp => Probe::tcp(&redis.host, redis.port),
            ProbeKind::Ping => Probe::redis_ping(&redis.host, redis.port),
        };

        let mut spec = DependencySpec::new(REDIS_DEPENDENCY, probe)
            .with_max_wait(redis.startup_timeout)
            .with_poll_interval(redis.poll_interval);
        if redis.autostart {
            let port = redis.port.to_string();
            spec = spec.with_launch(LaunchCommand::daemonize(
                &redis.server,
                ["--port", port.as_str(), "--daemonize", "yes"],
            ));
        }
        vec![spec]
    }

    /// Effective values exported into the workload's environment.
    pub fn workload_env(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ENVIRONMENT", self.environment.clone()),
            ("HOST", self.host.clone()),
            ("PORT", self.port.to_string()),
            ("REDIS_HOST", self.redis.host.clone()),
            ("REDIS_PORT", self.redis.port.to_string()),
            ("REDIS_DB", self.redis.db.to_string()),
        ]
    }
}

/// Variable lookup with "empty means unset" semantics.
struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    fn raw(&self, var: &str) -> Option<String> {
        (self.0)(var).filter(|v| !v.trim().is_empty())
    }

    fn string(&self, var: &str, default: String) -> String {
        self.raw(var).unwrap_or(default)
    }

    fn parse<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.raw(var) else {
            return Ok(default);
        };
        let parsed = value.trim().parse::<T>();
        match parsed {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        }
    }

    fn flag(&self, var: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.raw(var) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                value,
                reason: "expected a boolean (true/false)".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::LaunchMode;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<SupervisorConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SupervisorConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = from_pairs(&[]).unwrap();
        assert_eq!(cfg, SupervisorConfig::default());
        assert_eq!(cfg.environment, "DEV");
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.redis.host, "localhost");
        assert_eq!(cfg.redis.port, 6379);
        assert_eq!(cfg.redis.db, 0);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let cfg = from_pairs(&[("REDIS_PORT", ""), ("HOST", "  ")]).unwrap();
        assert_eq!(cfg.redis.port, 6379);
        assert_eq!(cfg.host, "localhost");
    }

    #[test]
    fn test_overrides_are_applied() {
        let cfg = from_pairs(&[
            ("ENVIRONMENT", "PROD"),
            ("REDIS_HOST", "cache"),
            ("REDIS_PORT", "6380"),
            ("REDIS_DB", "3"),
            ("REDIS_AUTOSTART", "false"),
            ("REDIS_PROBE", "PING"),
            ("REDIS_STARTUP_TIMEOUT_MS", "1000"),
            ("REDIS_POLL_INTERVAL_MS", "200"),
        ])
        .unwrap();
        assert_eq!(cfg.environment, "PROD");
        assert_eq!(cfg.redis.host, "cache");
        assert_eq!(cfg.redis.port, 6380);
        assert_eq!(cfg.redis.db, 3);
        assert!(!cfg.redis.autostart);
        assert_eq!(cfg.redis.probe, ProbeKind::Ping);
        assert_eq!(cfg.redis.startup_timeout, Duration::from_secs(1));
        assert_eq!(cfg.redis.poll_interval, Duration::from_millis(200));
    }

    #[test]
    fn test_invalid_port_names_variable() {
        let err = from_pairs(&[("REDIS_PORT", "redis")]).unwrap_err();
        let ConfigError::Invalid { var, value, .. } = err;
        assert_eq!(var, "REDIS_PORT");
        assert_eq!(value, "redis");
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = from_pairs(&[("REDIS_POLL_INTERVAL_MS", "0")]).unwrap_err();
        assert!(err.to_string().contains("REDIS_POLL_INTERVAL_MS"));
    }

    #[test]
    fn test_bad_flag_rejected() {
        let err = from_pairs(&[("REDIS_AUTOSTART", "maybe")]).unwrap_err();
        assert_eq!(err.as_label(), "config_invalid");
    }

    #[test]
    fn test_redis_dependency_launches_daemonized_server() {
        let cfg = from_pairs(&[("REDIS_PORT", "6390")]).unwrap();
        let deps = cfg.dependencies();
        assert_eq!(deps.len(), 1);

        let redis = &deps[0];
        assert_eq!(redis.name(), REDIS_DEPENDENCY);
        assert_eq!(redis.max_wait(), Duration::from_secs(5));
        assert_eq!(redis.poll_interval(), Duration::from_millis(500));
        assert_eq!(redis.probe(), &Probe::tcp("localhost", 6390));

        let launch = redis.launch().unwrap();
        assert_eq!(launch.program(), "redis-server");
        assert_eq!(launch.args(), ["--port", "6390", "--daemonize", "yes"]);
        assert_eq!(launch.mode(), LaunchMode::Daemonize);
    }

    #[test]
    fn test_autostart_disabled_only_waits() {
        let cfg = from_pairs(&[("REDIS_AUTOSTART", "0")]).unwrap();
        assert!(cfg.dependencies()[0].launch().is_none());
    }

    #[test]
    fn test_workload_env_exports_effective_values() {
        let cfg = from_pairs(&[("REDIS_DB", "7")]).unwrap();
        let env: HashMap<_, _> = cfg.workload_env().into_iter().collect();
        assert_eq!(env["REDIS_DB"], "7");
        assert_eq!(env["PORT"], "8000");
        assert_eq!(env["ENVIRONMENT"], "DEV");
    }
}
