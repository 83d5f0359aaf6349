//! In-process representation of the external coordinator's cluster graph.
//!
//! The coordinator is treated purely as a black box exposing a handful of
//! accessors (`ring_group(name)`, `ring.host_by_address`, …). This module
//! gives that black box a concrete shape: a small, cloneable object model
//! plus a [`Coordinator`] trait over it, and a [`StaticCoordinator`]
//! in-memory implementation that backs both the `server` binary's
//! single-process deployment and the test fixtures in `tests/`.
//!
//! None of this is on the serving hot path — it is consulted exactly once,
//! during [`crate::assembler::HandlerAssembler`] assembly.

use crate::ids::{DomainId, HostAddress, PartitionNumber, Version};
use crate::partitioner::Partitioner;
use crate::reader::PartitionReader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Opens readers for a domain's partitions. Implemented by the actual
/// on-disk storage engine in a real deployment; the serving core only ever
/// calls [`StorageEngine::open_reader`] during assembly.
pub trait StorageEngine: Send + Sync {
    /// Open a reader for `partition_number` of this domain.
    fn open_reader(
        &self,
        partition_number: PartitionNumber,
    ) -> Result<Box<dyn PartitionReader>, String>;
}

/// A domain: a logical key→value namespace, partitioned into
/// `num_partitions` shards and routed by `partitioner`.
pub struct Domain {
    /// Stable domain id.
    pub id: DomainId,
    /// Human-readable name.
    pub name: String,
    /// Fixed partition count for the lifetime of this domain.
    pub num_partitions: u32,
    /// Key routing function.
    pub partitioner: Arc<dyn Partitioner>,
    /// Opens readers for this domain's partitions.
    pub storage_engine: Arc<dyn StorageEngine>,
}

impl Domain {
    /// Number of partitions in this domain.
    pub fn num_parts(&self) -> u32 {
        self.num_partitions
    }
}

/// A single partition's metadata as published by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionMetadata {
    /// Partition number within its domain.
    pub partition_number: PartitionNumber,
    /// The version this partition is currently serving, if any.
    pub current_version: Option<Version>,
    /// The domain-group-version number the partition claims to be pinned to.
    pub current_domain_group_version: Option<u64>,
}

/// A host's binding to one domain: which of that domain's partitions are
/// assigned to this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDomain {
    /// The bound domain's id.
    pub domain_id: DomainId,
    /// Partitions of that domain assigned to this host.
    pub partitions: Vec<PartitionMetadata>,
}

/// A single host (partition server) within a ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// This host's network identity.
    pub address: HostAddress,
    /// Domain bindings for this host.
    pub host_domains: Vec<HostDomain>,
}

impl Host {
    /// Find this host's binding for `domain_id`, if any.
    pub fn host_domain(&self, domain_id: DomainId) -> Option<&HostDomain> {
        self.host_domains
            .iter()
            .find(|hd| hd.domain_id == domain_id)
    }
}

/// A ring: a set of hosts collectively serving one domain-group at one
/// (possibly transitional) version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ring {
    /// Hosts belonging to this ring.
    pub hosts: Vec<Host>,
    /// The domain-group-version this ring is currently serving, if settled.
    pub current_version: Option<u64>,
    /// The domain-group-version this ring is rolling forward to, if a
    /// rollout is in progress. Takes priority over `current_version`.
    pub updating_to_version: Option<u64>,
}

impl Ring {
    /// Find a host by network identity.
    pub fn host_by_address(&self, address: &HostAddress) -> Option<&Host> {
        self.hosts.iter().find(|h| &h.address == address)
    }

    /// The version that should be used for assembly: `updating_to_version`
    /// if present, else `current_version`.
    pub fn effective_version(&self) -> Option<u64> {
        self.updating_to_version.or(self.current_version)
    }
}

/// A pinned version of every domain in a domain-group.
///
/// Not `Serialize`/`Deserialize` itself (its `domain_versions` map is keyed
/// by [`DomainId`], which JSON can't represent as an object key) — a real
/// coordinator client would publish this as a `Vec<(DomainId, Version)>` or
/// similar wire shape and convert on load.
#[derive(Debug, Clone)]
pub struct DomainGroupVersion {
    /// This domain-group-version's own version number.
    pub version_number: u64,
    /// Per-domain pinned versions.
    pub domain_versions: HashMap<DomainId, Version>,
}

/// A named group of domains served together by one or more rings.
pub struct DomainGroup {
    /// Available domain-group-versions, by version number.
    pub versions: HashMap<u64, DomainGroupVersion>,
}

impl DomainGroup {
    /// Look up a domain-group-version by number.
    pub fn version_by_number(&self, version: u64) -> Option<&DomainGroupVersion> {
        self.versions.get(&version)
    }
}

/// A named ring-group: a set of rings sharing one domain-group.
pub struct RingGroup {
    /// Rings in this ring-group.
    pub rings: Vec<Ring>,
    /// The domain-group this ring-group's rings serve, if one has been
    /// attached. A ring-group published without a domain-group is valid
    /// metadata state (e.g. mid-provisioning) but cannot back an assembly.
    pub domain_group: Option<DomainGroup>,
}

/// Read-only accessor over the coordinator's cluster metadata graph.
///
/// This is consulted exactly once per handler, during assembly.
pub trait Coordinator: Send + Sync {
    /// Look up a ring-group by name.
    fn ring_group(&self, name: &str) -> Option<&RingGroup>;

    /// Look up a domain by id, independent of ring-group (domains are
    /// global, ring-groups just pin versions of them).
    fn domain(&self, id: DomainId) -> Option<&Domain>;
}

/// An in-memory [`Coordinator`] implementation, backing both test fixtures
/// and the single-process `server` binary.
#[derive(Default)]
pub struct StaticCoordinator {
    ring_groups: HashMap<String, RingGroup>,
    domains: HashMap<DomainId, Domain>,
}

impl StaticCoordinator {
    /// Create an empty coordinator with no ring-groups or domains.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ring-group under `name`.
    pub fn with_ring_group(mut self, name: impl Into<String>, ring_group: RingGroup) -> Self {
        self.ring_groups.insert(name.into(), ring_group);
        self
    }

    /// Register a domain.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domains.insert(domain.id, domain);
        self
    }
}

impl Coordinator for StaticCoordinator {
    fn ring_group(&self, name: &str) -> Option<&RingGroup> {
        self.ring_groups.get(name)
    }

    fn domain(&self, id: DomainId) -> Option<&Domain> {
        self.domains.get(&id)
    }
}
