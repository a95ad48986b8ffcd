//! Driver-facing connection options.
//!
//! These are the fixed operating parameters this crate hands to the driver.
//! The retry cadence and counts are passed through for the driver's own
//! recovery loop; nothing here retries on its own.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::uri::Credentials;

/// Default connection pool size, overridable via `MONGO_POOL_SIZE`.
pub const DEFAULT_POOL_SIZE: u32 = 5;

/// Socket connect timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(20_000);

/// Wait between driver reconnect attempts.
pub const RETRY_WAIT: Duration = Duration::from_millis(5_000);

/// Replica-set high-availability monitoring interval.
pub const HA_INTERVAL: Duration = Duration::from_millis(500);

/// Reconnect attempts budget in single-host mode.
pub const SINGLE_HOST_RETRIES: u32 = 1_000_000;

/// Reconnect attempts budget in replica-set mode.
pub const REPLICA_SET_RETRIES: u32 = 10_000_000;

/// Replica-set name used when the URI does not carry one.
pub const DEFAULT_REPLICA_SET_NAME: &str = "rs0";

/// Read preference policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadPreference {
    /// Read from primary only.
    Primary,
    /// Read from primary preferred, fallback to secondary.
    PrimaryPreferred,
    /// Read from secondary only.
    Secondary,
    /// Read from secondary preferred, fallback to primary.
    #[default]
    SecondaryPreferred,
    /// Read from nearest member.
    Nearest,
}

/// Replica-set sub-options, present only when the URI names multiple hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSetOptions {
    /// Replica-set name.
    pub name: String,
    /// High-availability monitoring interval.
    pub ha_interval: Duration,
    /// Wait before reconnect attempts.
    pub reconnect_wait: Duration,
    /// Pool size for replica-set members.
    pub pool_size: u32,
    /// Reconnect attempts budget.
    pub retries: u32,
    /// Allow reads from secondaries.
    pub secondary_reads: bool,
}

/// Options handed to the driver's open entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Connection pool size.
    pub pool_size: u32,
    /// Socket connect timeout.
    pub connect_timeout: Duration,
    /// TCP keep-alive.
    pub keep_alive: bool,
    /// Let the driver re-establish dropped connections.
    pub auto_reconnect: bool,
    /// Read preference policy.
    pub read_preference: ReadPreference,
    /// Wait between driver reconnect attempts.
    pub retry_wait: Duration,
    /// Reconnect attempts budget.
    pub retries: u32,
    /// Plaintext auth fields, when the URI carried them.
    pub credentials: Option<Credentials>,
    /// Replica-set sub-options; `None` in single-host mode.
    pub replica_set: Option<ReplicaSetOptions>,
}

impl ConnectOptions {
    /// Options for a single-host connection.
    pub fn single_host(pool_size: u32) -> Self {
        Self {
            pool_size,
            connect_timeout: CONNECT_TIMEOUT,
            keep_alive: true,
            auto_reconnect: true,
            read_preference: ReadPreference::SecondaryPreferred,
            retry_wait: RETRY_WAIT,
            retries: SINGLE_HOST_RETRIES,
            credentials: None,
            replica_set: None,
        }
    }

    /// Options for a replica-set connection.
    pub fn replica_set(pool_size: u32, name: impl Into<String>) -> Self {
        Self {
            retries: REPLICA_SET_RETRIES,
            replica_set: Some(ReplicaSetOptions {
                name: name.into(),
                ha_interval: HA_INTERVAL,
                reconnect_wait: RETRY_WAIT,
                pool_size,
                retries: REPLICA_SET_RETRIES,
                secondary_reads: true,
            }),
            ..Self::single_host(pool_size)
        }
    }

    /// Attach credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Whether these options target a replica set.
    #[must_use]
    pub fn is_replica_set(&self) -> bool {
        self.replica_set.is_some()
    }
}
