//! Connect plan assembly.
//!
//! A [`ConnectPlan`] is everything the driver open call needs: the detected
//! mode, the canonical URI, the structured host list, and the option set.
//!
//! The two modes resolve their targets differently, and the asymmetry is
//! load-bearing for existing deployments:
//!
//! - **Single host**: the target is rebuilt from the deployment environment
//!   (`MONGO_HOST`/`MONGO_PORT`); the host parsed from the input URI is
//!   ignored on purpose.
//! - **Replica set**: the parsed host list is used as written, and the
//!   database name is spliced into the first segment of the canonical URI.

use std::fmt;

use tracing::debug;

use crate::env::{DeployEnv, HOST_VAR};
use crate::error::{RigError, RigResult};
use crate::options::{ConnectOptions, DEFAULT_REPLICA_SET_NAME};
use crate::uri::{HostSpec, MongoUri};

/// Connection mode, derived from the parsed host count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// One host specification in the URI.
    SingleHost,
    /// Two or more host specifications in the URI.
    ReplicaSet,
}

impl fmt::Display for ConnectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleHost => f.write_str("single host"),
            Self::ReplicaSet => f.write_str("replica set"),
        }
    }
}

/// A fully-resolved connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPlan {
    /// Detected connection mode.
    pub mode: ConnectMode,
    /// Canonical URI handed to the driver open call.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Hosts the driver will dial.
    pub hosts: Vec<HostSpec>,
    /// Driver option set.
    pub options: ConnectOptions,
}

impl ConnectPlan {
    /// Build a plan from a parsed URI and the deployment environment.
    pub fn build(parsed: &MongoUri, env: &DeployEnv) -> RigResult<Self> {
        let mut plan = if parsed.is_replica_set() {
            debug!(hosts = %parsed.host_list(), "using mongodb hosts");
            Self {
                mode: ConnectMode::ReplicaSet,
                uri: replica_set_uri(parsed.hosts(), parsed.database()),
                database: parsed.database().to_string(),
                hosts: parsed.hosts().to_vec(),
                options: ConnectOptions::replica_set(
                    env.pool_size,
                    parsed
                        .replica_set()
                        .unwrap_or(DEFAULT_REPLICA_SET_NAME),
                ),
            }
        } else {
            let host = env
                .host
                .as_deref()
                .ok_or_else(|| RigError::missing_field(HOST_VAR))?;
            let target = HostSpec::new(host, env.port);
            Self {
                mode: ConnectMode::SingleHost,
                uri: format!("mongodb://{target}/{}", parsed.database()),
                database: parsed.database().to_string(),
                hosts: vec![target],
                options: ConnectOptions::single_host(env.pool_size),
            }
        };

        if let Some(credentials) = parsed.credentials() {
            plan.options = plan.options.with_credentials(credentials.clone());
        }

        debug!(uri = %plan.uri, mode = %plan.mode, "using mongodb URI");
        Ok(plan)
    }
}

/// Comma-joined canonical form with the database spliced after the first
/// segment: `mongodb://h1:p1/db,h2:p2`.
fn replica_set_uri(hosts: &[HostSpec], database: &str) -> String {
    let mut uri = String::from("mongodb://");
    for (index, host) in hosts.iter().enumerate() {
        if index > 0 {
            uri.push(',');
        }
        uri.push_str(&host.to_string());
        if index == 0 {
            uri.push('/');
            uri.push_str(database);
        }
    }
    uri
}
