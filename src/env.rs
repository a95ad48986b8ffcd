//! Deployment environment snapshot.
//!
//! Environment variables are read once, at the composition root, into a
//! [`DeployEnv`] value that the connect operations take as an explicit
//! parameter. Nothing in the connect path touches process globals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::options::DEFAULT_POOL_SIZE;
use crate::uri::DEFAULT_PORT;

/// Pool-size override variable.
pub const POOL_SIZE_VAR: &str = "MONGO_POOL_SIZE";
/// Single-host target host variable.
pub const HOST_VAR: &str = "MONGO_HOST";
/// Single-host target port variable.
pub const PORT_VAR: &str = "MONGO_PORT";

/// Source for environment variables.
pub trait EnvSource {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Check if a variable exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Default environment source using `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a `HashMap`, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Deployment settings consumed by the connect operations.
///
/// `pool_size` applies to both connection modes. `host` and `port` are used
/// only when rebuilding the single-host target; multi-host URIs are used as
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployEnv {
    /// Connection pool size (`MONGO_POOL_SIZE`, default 5).
    pub pool_size: u32,
    /// Single-host target host (`MONGO_HOST`).
    pub host: Option<String>,
    /// Single-host target port (`MONGO_PORT`, default 27017).
    pub port: u16,
}

impl Default for DeployEnv {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            host: None,
            port: DEFAULT_PORT,
        }
    }
}

impl DeployEnv {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::load(&StdEnvSource)
    }

    /// Snapshot an arbitrary environment source.
    pub fn load<S: EnvSource>(source: &S) -> Self {
        let pool_size = match source.get(POOL_SIZE_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "{POOL_SIZE_VAR} is not an integer, using default");
                DEFAULT_POOL_SIZE
            }),
            None => DEFAULT_POOL_SIZE,
        };

        let host = source.get(HOST_VAR).filter(|h| !h.is_empty());

        let port = match source.get(PORT_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "{PORT_VAR} is not a port number, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            pool_size,
            host,
            port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MapEnvSource {
        MapEnvSource::new()
            .set(POOL_SIZE_VAR, "12")
            .set(HOST_VAR, "dbhost")
            .set(PORT_VAR, "27018")
    }

    #[test]
    fn test_load_full() {
        let env = DeployEnv::load(&source());
        assert_eq!(env.pool_size, 12);
        assert_eq!(env.host.as_deref(), Some("dbhost"));
        assert_eq!(env.port, 27018);
    }

    #[test]
    fn test_load_defaults() {
        let env = DeployEnv::load(&MapEnvSource::new());
        assert_eq!(env, DeployEnv::default());
        assert_eq!(env.pool_size, 5);
        assert_eq!(env.host, None);
        assert_eq!(env.port, 27017);
    }

    #[test]
    fn test_non_numeric_pool_size_falls_back() {
        let env = DeployEnv::load(&MapEnvSource::new().set(POOL_SIZE_VAR, "plenty"));
        assert_eq!(env.pool_size, 5);
    }

    #[test]
    fn test_non_numeric_port_falls_back() {
        let env = DeployEnv::load(&MapEnvSource::new().set(PORT_VAR, "default"));
        assert_eq!(env.port, 27017);
    }

    #[test]
    fn test_empty_host_treated_as_unset() {
        let env = DeployEnv::load(&MapEnvSource::new().set(HOST_VAR, ""));
        assert_eq!(env.host, None);
    }
}
