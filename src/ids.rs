//! Stable identifiers used throughout the serving core.
//!
//! Newtype wrappers following the same pattern throughout: a thin `pub`
//! tuple struct, a `new`/`as_*` pair, `Display`, and `From` conversions
//! to and from the raw integer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a domain (a logical key→value namespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainId(pub u32);

impl DomainId {
    /// Create a new `DomainId`.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw `u32` value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain({})", self.0)
    }
}

impl From<u32> for DomainId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<DomainId> for u32 {
    fn from(id: DomainId) -> Self {
        id.0
    }
}

/// A partition number within a domain, `0 <= partition_number < domain.num_partitions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionNumber(pub u32);

impl PartitionNumber {
    /// Create a new `PartitionNumber`.
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    /// Get the raw `u32` value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PartitionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl From<u32> for PartitionNumber {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

/// Identity of a single partition: the domain it belongs to plus its number
/// within that domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionIdentity {
    /// Owning domain.
    pub domain_id: DomainId,
    /// Partition number within the domain.
    pub partition_number: PartitionNumber,
}

impl PartitionIdentity {
    /// Create a new `PartitionIdentity`.
    pub fn new(domain_id: DomainId, partition_number: PartitionNumber) -> Self {
        Self {
            domain_id,
            partition_number,
        }
    }
}

impl fmt::Display for PartitionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain_id, self.partition_number)
    }
}

/// A monotonically increasing integer naming an immutable snapshot of a
/// domain's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(pub u64);

impl Version {
    /// Create a new `Version`.
    pub fn new(v: u64) -> Self {
        Self(v)
    }

    /// Get the raw `u64` value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// This host's network identity, as published in cluster metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostAddress(pub String);

impl HostAddress {
    /// Create a new `HostAddress`.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Borrow the address as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HostAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
