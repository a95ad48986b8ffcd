//! Driver compatibility gate.
//!
//! The option set this crate builds is written against one driver
//! generation. The gate asserts that contract at initialization, before
//! anything touches the network, so an incompatible driver fails loudly
//! instead of misbehaving at runtime.

use semver::{Version, VersionReq};

use crate::error::{RigError, RigResult};

/// The driver generation this crate is built and tested against. Keep in
/// lockstep with the `mongodb` pin in Cargo.toml.
pub const DRIVER_REQUIREMENT: &str = "^2.8";

/// Semantic-version requirement checked against the driver's reported
/// version.
#[derive(Debug, Clone)]
pub struct VersionGate {
    requirement: VersionReq,
}

impl VersionGate {
    /// The pinned gate: accepts the [`DRIVER_REQUIREMENT`] family.
    pub fn pinned() -> Self {
        Self {
            requirement: VersionReq::parse(DRIVER_REQUIREMENT)
                .expect("pinned driver requirement parses"),
        }
    }

    /// Gate with an explicit requirement.
    pub fn new(requirement: VersionReq) -> Self {
        Self { requirement }
    }

    /// Gate parsed from a requirement string, e.g. `">=2.8, <4"`.
    pub fn parse(requirement: &str) -> RigResult<Self> {
        let requirement = VersionReq::parse(requirement)
            .map_err(|e| RigError::config(format!("invalid version requirement: {e}")))?;
        Ok(Self { requirement })
    }

    /// The configured requirement.
    #[must_use]
    pub fn requirement(&self) -> &VersionReq {
        &self.requirement
    }

    /// Check a reported version against the gate.
    ///
    /// Unparseable version strings are rejected the same way as versions
    /// outside the accepted range.
    pub fn check(&self, version: &str) -> RigResult<Version> {
        let mismatch = || RigError::VersionMismatch {
            required: self.requirement.to_string(),
            found: version.to_string(),
        };

        let parsed = Version::parse(version).map_err(|_| mismatch())?;
        if self.requirement.matches(&parsed) {
            Ok(parsed)
        } else {
            Err(mismatch())
        }
    }
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::pinned()
    }
}
