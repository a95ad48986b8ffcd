//! Connection configurator.
//!
//! [`Connector`] is the entry point: it validates the driver generation once
//! at construction, then turns connection URIs into driver open calls. It
//! holds no mutable state across calls; every connect is parsed and planned
//! independently, and the only shared thing is the default handle itself.

use semver::Version;
use tracing::{debug, info};

use crate::compat::VersionGate;
use crate::connection::Connection;
use crate::driver::Driver;
use crate::env::DeployEnv;
use crate::error::{RigError, RigResult};
use crate::plan::{ConnectMode, ConnectPlan};
use crate::uri::MongoUri;

/// Validates the driver once, then opens connections from URIs.
///
/// Connect calls return the handle synchronously; establishment is
/// asynchronous and observed only through the handle's lifecycle events.
/// With the production [`MongoDriver`](crate::driver::MongoDriver) they must
/// run inside a Tokio runtime.
pub struct Connector<D: Driver> {
    driver: D,
    driver_version: Version,
    default_conn: Connection,
}

impl<D: Driver> std::fmt::Debug for Connector<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("driver_version", &self.driver_version)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> Connector<D> {
    /// Create a configurator, accepting only the pinned driver generation.
    pub fn new(driver: D) -> RigResult<Self> {
        Self::with_gate(driver, VersionGate::pinned())
    }

    /// Create a configurator with an explicit compatibility gate.
    pub fn with_gate(driver: D, gate: VersionGate) -> RigResult<Self> {
        let driver_version = gate.check(driver.version())?;
        debug!(version = %driver_version, "driver accepted");
        Ok(Self {
            driver,
            driver_version,
            default_conn: Connection::new(),
        })
    }

    /// The validated driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The driver version accepted by the gate.
    #[must_use]
    pub fn driver_version(&self) -> &Version {
        &self.driver_version
    }

    /// The ambient default connection handle. No I/O is triggered.
    #[must_use]
    pub fn default_connection(&self) -> Connection {
        self.default_conn.clone()
    }

    /// Open the default connection.
    ///
    /// Fails with [`RigError::AlreadyOpen`] if the default handle was opened
    /// before; a second open would attach a duplicate listener set.
    pub fn connect(&self, uri: &str, env: &DeployEnv) -> RigResult<Connection> {
        let conn = self.default_conn.clone();
        self.perform(&conn, uri, env)?;
        Ok(conn)
    }

    /// Open a new, independent connection. The default handle is unaffected.
    pub fn create_connection(&self, uri: &str, env: &DeployEnv) -> RigResult<Connection> {
        let conn = Connection::new();
        self.perform(&conn, uri, env)?;
        Ok(conn)
    }

    fn perform(&self, conn: &Connection, uri: &str, env: &DeployEnv) -> RigResult<()> {
        let parsed = MongoUri::parse(uri)?;
        let plan = ConnectPlan::build(&parsed, env)?;

        // Checked after planning so a malformed URI does not poison the
        // handle for a corrected retry.
        if conn.mark_open() {
            return Err(RigError::AlreadyOpen);
        }
        conn.attach_logging();

        info!(mode = %plan.mode, uri = %plan.uri, "opening MongoDB connection");
        match plan.mode {
            ConnectMode::SingleHost => self.driver.open(&plan, conn),
            ConnectMode::ReplicaSet => self.driver.open_replica_set(&plan, conn),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::plan::ConnectMode;

    #[derive(Default)]
    struct StubDriver {
        version: String,
        calls: Mutex<Vec<(ConnectMode, String)>>,
    }

    impl StubDriver {
        fn pinned() -> Self {
            Self {
                version: "2.8.2".to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_version(version: &str) -> Self {
            Self {
                version: version.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Driver for StubDriver {
        fn version(&self) -> &str {
            &self.version
        }

        fn open(&self, plan: &ConnectPlan, _handle: &Connection) {
            self.calls
                .lock()
                .unwrap()
                .push((ConnectMode::SingleHost, plan.uri.clone()));
        }

        fn open_replica_set(&self, plan: &ConnectPlan, _handle: &Connection) {
            self.calls
                .lock()
                .unwrap()
                .push((ConnectMode::ReplicaSet, plan.uri.clone()));
        }
    }

    fn env() -> DeployEnv {
        DeployEnv {
            pool_size: 5,
            host: Some("dbhost".to_string()),
            port: 27018,
        }
    }

    #[test]
    fn test_version_gate_rejects_before_any_open() {
        let err = Connector::new(StubDriver::with_version("3.1.0")).unwrap_err();
        assert!(err.is_version_mismatch());
    }

    #[test]
    fn test_default_connection_triggers_no_io() {
        let rig = Connector::new(StubDriver::pinned()).unwrap();
        let conn = rig.default_connection();
        assert!(!conn.is_open());
        assert!(rig.driver().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_connect_routes_single_host() {
        let rig = Connector::new(StubDriver::pinned()).unwrap();
        let conn = rig.connect("mongodb://u:p@h1:27017/mydb", &env()).unwrap();

        assert!(conn.is_open());
        let calls = rig.driver().calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(
                ConnectMode::SingleHost,
                "mongodb://dbhost:27018/mydb".to_string()
            )]
        );
    }

    #[test]
    fn test_connect_routes_replica_set() {
        let rig = Connector::new(StubDriver::pinned()).unwrap();
        rig.connect("mongodb://h1:27017,h2:27017/mydb", &env())
            .unwrap();

        let calls = rig.driver().calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(
                ConnectMode::ReplicaSet,
                "mongodb://h1:27017/mydb,h2:27017".to_string()
            )]
        );
    }

    #[test]
    fn test_second_connect_on_default_handle_is_rejected() {
        let rig = Connector::new(StubDriver::pinned()).unwrap();
        rig.connect("mongodb://h1/mydb", &env()).unwrap();

        let err = rig.connect("mongodb://h1/mydb", &env()).unwrap_err();
        assert!(err.is_already_open());
        assert_eq!(rig.driver().calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_failure_does_not_poison_default_handle() {
        let rig = Connector::new(StubDriver::pinned()).unwrap();
        assert!(rig.connect("mongodb://h1:27017", &env()).is_err());

        // The failed attempt never opened the handle.
        rig.connect("mongodb://h1/mydb", &env()).unwrap();
    }

    #[test]
    fn test_create_connection_is_independent() {
        let rig = Connector::new(StubDriver::pinned()).unwrap();
        let first = rig.create_connection("mongodb://h1/mydb", &env()).unwrap();
        let second = rig.create_connection("mongodb://h1/mydb", &env()).unwrap();

        assert!(first.is_open());
        assert!(second.is_open());
        assert!(!rig.default_connection().is_open());
        assert_eq!(rig.driver().calls.lock().unwrap().len(), 2);
    }
}
