//! # mongo-rig
//!
//! MongoDB connection bootstrap: turn a connection URI into the option set
//! the `mongodb` driver expects, attach lifecycle logging to the handle, and
//! trigger the asynchronous open.
//!
//! This crate provides:
//! - A driver compatibility gate checked once at initialization
//! - A structured parser for single-host and replica-set connection URIs
//! - Driver option assembly (pool size, timeouts, read preference,
//!   replica-set parameters) from an explicit deployment-environment
//!   snapshot
//! - Lifecycle event observers with a built-in `tracing` logger
//!
//! Pooling, retry, and heartbeat stay inside the driver; this crate only
//! configures them and logs what the driver reports.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mongo_rig::{Connector, DeployEnv, MongoDriver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Environment is read once, at the composition root.
//!     let env = DeployEnv::from_env();
//!
//!     let rig = Connector::new(MongoDriver::new())?;
//!     let conn = rig.connect("mongodb://db1:27017,db2:27017/app?replicaSet=rs0", &env)?;
//!
//!     // The handle is returned immediately; establishment shows up in the
//!     // lifecycle log lines, and `conn.client()` once the open completes.
//!     let _ = conn;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection modes
//!
//! Mode is derived from the parsed host count. A multi-host URI is used as
//! written; a single-host URI keeps only the database name, and the target
//! is rebuilt from `MONGO_HOST`/`MONGO_PORT`. Existing deployments depend on
//! that asymmetry; see [`plan`] for details.

pub mod compat;
pub mod connection;
pub mod connector;
pub mod driver;
pub mod env;
pub mod error;
pub mod events;
pub mod options;
pub mod plan;
pub mod uri;

pub use compat::{DRIVER_REQUIREMENT, VersionGate};
pub use connection::Connection;
pub use connector::Connector;
pub use driver::{DRIVER_VERSION, Driver, MongoDriver};
pub use env::{DeployEnv, EnvSource, MapEnvSource, StdEnvSource};
pub use error::{RigError, RigResult};
pub use events::{EventSink, LifecycleEvent, LifecycleObserver, LogObserver};
pub use options::{ConnectOptions, ReadPreference, ReplicaSetOptions};
pub use plan::{ConnectMode, ConnectPlan};
pub use uri::{Credentials, HostSpec, MongoUri};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::compat::VersionGate;
    pub use crate::connection::Connection;
    pub use crate::connector::Connector;
    pub use crate::driver::{Driver, MongoDriver};
    pub use crate::env::DeployEnv;
    pub use crate::error::{RigError, RigResult};
    pub use crate::events::{LifecycleEvent, LifecycleObserver};
    pub use crate::options::ConnectOptions;
    pub use crate::plan::{ConnectMode, ConnectPlan};
    pub use crate::uri::MongoUri;
}
