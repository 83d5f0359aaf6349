//! Error types for the serving core.
//!
//! Distinguishes assembly-fatal errors (fail construction, no `Handler` is
//! ever produced) from runtime errors (caught at the worker boundary and
//! turned into a response variant — see [`crate::handler::Response`]).

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while assembling or configuring a [`crate::handler::Handler`].
///
/// Every variant here is assembly-fatal: encountering one means the handler
/// never reaches the `Ready` state.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The named ring group has no ring containing this host.
    #[error("no ring in ring-group {ring_group:?} contains host {host}")]
    MissingRing {
        /// Ring group name that was searched.
        ring_group: String,
        /// Host address that could not be located.
        host: String,
    },

    /// The ring's ring-group has no associated domain-group.
    #[error("ring-group {0:?} has no domain-group")]
    MissingDomainGroup(String),

    /// Neither `updating_to_version` nor `current_version` is set on the ring.
    #[error("ring in ring-group {0:?} has no effective version")]
    NoEffectiveVersion(String),

    /// The domain-group-version named by the ring does not exist.
    #[error("domain-group-version {0} not found")]
    MissingDomainGroupVersion(u64),

    /// The host record could not be located by network identity.
    #[error("host {0} not found in ring")]
    MissingHost(String),

    /// The host has no binding for a domain named in the domain-group-version.
    #[error("host {host} has no binding for domain {domain_id}")]
    MissingHostDomain {
        /// Host address.
        host: String,
        /// Domain id with no binding.
        domain_id: u32,
    },

    /// A partition's current domain-group-version does not resolve to a domain version.
    #[error(
        "partition {domain_id}/{partition_number} has unresolved domain-group-version {domain_group_version}"
    )]
    UnresolvedPartitionVersion {
        /// Domain id owning the partition.
        domain_id: u32,
        /// Partition number within the domain.
        partition_number: u32,
        /// The domain-group-version the partition claims to be at.
        domain_group_version: u64,
    },

    /// A host-domain binding names a partition number outside its domain's
    /// partition count — stale or corrupt metadata.
    #[error(
        "partition {domain_id}/{partition_number} is out of range for domain with {num_partitions} partitions"
    )]
    PartitionOutOfRange {
        /// Domain id owning the partition.
        domain_id: u32,
        /// Partition number named by the host-domain binding.
        partition_number: u32,
        /// The domain's actual partition count.
        num_partitions: u32,
    },

    /// A reader's self-reported version disagrees with the version metadata dictates.
    #[error(
        "partition {domain_id}/{partition_number}: version mismatch, metadata says {expected}, reader reports {actual}"
    )]
    VersionMismatch {
        /// Domain id owning the partition.
        domain_id: u32,
        /// Partition number within the domain.
        partition_number: u32,
        /// Version dictated by metadata.
        expected: u64,
        /// Version self-reported by the opened reader.
        actual: u64,
    },

    /// Opening a reader via the storage engine failed.
    #[error("failed to open reader for partition {domain_id}/{partition_number}: {detail}")]
    ReaderOpen {
        /// Domain id owning the partition.
        domain_id: u32,
        /// Partition number within the domain.
        partition_number: u32,
        /// Underlying failure detail.
        detail: String,
    },

    /// A recognized configuration option was missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Catch-all for unexpected internal failures surfaced during assembly.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Construct a [`CoreError::Config`] from anything string-like.
    pub fn config(msg: impl Into<String>) -> Self {
        CoreError::Config(msg.into())
    }

    /// Construct a [`CoreError::Internal`] from anything string-like.
    pub fn internal(msg: impl Into<String>) -> Self {
        CoreError::Internal(msg.into())
    }
}
