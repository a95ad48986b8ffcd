//! Driver boundary.
//!
//! The [`Driver`] trait is the seam between plan assembly and the library
//! that actually dials MongoDB: a reported version for the compatibility
//! gate, plus the two open entry points. Opens are fire-and-forget: they
//! kick off the asynchronous connection attempt and return immediately;
//! the outcome is observed through the handle's lifecycle events.
//!
//! [`MongoDriver`] is the production implementation over the `mongodb`
//! crate. Test suites substitute a recording stub.

use std::sync::Arc;

use bson::doc;
use mongodb::Client;
use mongodb::event::sdam::{SdamEventHandler, ServerClosedEvent, ServerHeartbeatFailedEvent};
use mongodb::options::{ClientOptions, Credential, SelectionCriteria, ServerAddress};

use crate::connection::Connection;
use crate::events::{EventSink, LifecycleEvent};
use crate::options::ReadPreference;
use crate::plan::ConnectPlan;

/// Version reported by [`MongoDriver`]. Keep in lockstep with the `mongodb`
/// pin in Cargo.toml.
pub const DRIVER_VERSION: &str = "2.8.2";

/// A database driver capable of opening connections.
pub trait Driver: Send + Sync {
    /// The driver's semantic version string.
    fn version(&self) -> &str;

    /// Open a single-host connection. Must not block on the outcome.
    fn open(&self, plan: &ConnectPlan, handle: &Connection);

    /// Open a replica-set connection. Must not block on the outcome.
    fn open_replica_set(&self, plan: &ConnectPlan, handle: &Connection);
}

/// Production driver backed by the `mongodb` crate.
///
/// Both open entry points share one connect task; the single-host versus
/// replica-set distinction is already encoded in the plan's option set
/// (direct connection versus replica-set name and heartbeat interval).
///
/// Opens spawn onto the ambient Tokio runtime, so they must be called from
/// within one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDriver;

impl MongoDriver {
    /// Create the driver.
    pub fn new() -> Self {
        Self
    }
}

impl Driver for MongoDriver {
    fn version(&self) -> &str {
        DRIVER_VERSION
    }

    fn open(&self, plan: &ConnectPlan, handle: &Connection) {
        spawn_connect(plan.clone(), handle.clone());
    }

    fn open_replica_set(&self, plan: &ConnectPlan, handle: &Connection) {
        spawn_connect(plan.clone(), handle.clone());
    }
}

fn spawn_connect(plan: ConnectPlan, handle: Connection) {
    handle.emit(LifecycleEvent::Connecting {
        database: plan.database.clone(),
    });

    tokio::spawn(async move {
        let options = client_options(&plan, handle.events());

        let client = match Client::with_options(options) {
            Ok(client) => client,
            Err(e) => {
                handle.emit(LifecycleEvent::Error {
                    uri: plan.uri.clone(),
                    message: e.to_string(),
                });
                return;
            }
        };
        handle.attach_client(client.clone());

        // The driver owns retries past this point; the ping only observes
        // whether the deployment is reachable at all.
        match client
            .database(&plan.database)
            .run_command(doc! { "ping": 1 }, None)
            .await
        {
            Ok(_) => {
                handle.emit(LifecycleEvent::Connected {
                    uri: plan.uri.clone(),
                });
                handle.emit(LifecycleEvent::Open {
                    uri: plan.uri.clone(),
                });
            }
            Err(e) => {
                handle.emit(LifecycleEvent::Error {
                    uri: plan.uri.clone(),
                    message: e.to_string(),
                });
            }
        }
    });
}

/// Map a connect plan onto the driver's `ClientOptions`.
fn client_options(plan: &ConnectPlan, events: EventSink) -> ClientOptions {
    let hosts: Vec<ServerAddress> = plan
        .hosts
        .iter()
        .map(|h| ServerAddress::Tcp {
            host: h.host.clone(),
            port: Some(h.port),
        })
        .collect();

    let mut options = ClientOptions::builder().hosts(hosts).build();
    options.max_pool_size = Some(plan.options.pool_size);
    options.connect_timeout = Some(plan.options.connect_timeout);
    options.retry_writes = Some(plan.options.auto_reconnect);
    options.retry_reads = Some(plan.options.auto_reconnect);
    options.selection_criteria = Some(SelectionCriteria::ReadPreference(read_preference(
        plan.options.read_preference,
    )));

    match &plan.options.replica_set {
        Some(rs) => {
            options.repl_set_name = Some(rs.name.clone());
            options.heartbeat_freq = Some(rs.ha_interval);
        }
        None => {
            options.direct_connection = Some(true);
        }
    }

    if let Some(credentials) = &plan.options.credentials {
        options.credential = Some(
            Credential::builder()
                .username(credentials.username.clone())
                .password(credentials.password.clone())
                .build(),
        );
    }

    // Note: keep-alive and the retry cadence have no ClientOptions
    // counterparts in mongodb 2.x; the driver paces both itself.
    let _ = plan.options.keep_alive;
    let _ = plan.options.retry_wait;
    let _ = plan.options.retries;

    options.sdam_event_handler = Some(Arc::new(SdamBridge {
        events,
        uri: plan.uri.clone(),
    }));

    options
}

fn read_preference(pref: ReadPreference) -> mongodb::options::ReadPreference {
    match pref {
        ReadPreference::Primary => mongodb::options::ReadPreference::Primary,
        ReadPreference::PrimaryPreferred => mongodb::options::ReadPreference::PrimaryPreferred {
            options: Default::default(),
        },
        ReadPreference::Secondary => mongodb::options::ReadPreference::Secondary {
            options: Default::default(),
        },
        ReadPreference::SecondaryPreferred => {
            mongodb::options::ReadPreference::SecondaryPreferred {
                options: Default::default(),
            }
        }
        ReadPreference::Nearest => mongodb::options::ReadPreference::Nearest {
            options: Default::default(),
        },
    }
}

/// Translates driver topology events into lifecycle events.
struct SdamBridge {
    events: EventSink,
    uri: String,
}

impl SdamEventHandler for SdamBridge {
    fn handle_server_closed_event(&self, _event: ServerClosedEvent) {
        self.events.emit(LifecycleEvent::Disconnected {
            uri: self.uri.clone(),
            error: None,
        });
    }

    fn handle_server_heartbeat_failed_event(&self, _event: ServerHeartbeatFailedEvent) {
        self.events.emit(LifecycleEvent::Reconnecting {
            uri: self.uri.clone(),
        });
    }
}
