//! [`PartitionAccessor`] and [`DomainAccessor`]: the read-only topology that
//! a [`crate::handler::Handler`] dispatches lookups through.
//!
//! Both types are frozen after construction — no method here ever changes
//! which readers exist or which partition a key maps to. The only mutable
//! state is the advisory per-partition counters, which are plain atomics.

use crate::ids::PartitionIdentity;
use crate::partitioner::Partitioner;
use crate::reader::{PartitionReader, ReadOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Advisory, best-effort counters for a single partition. Never consulted
/// for correctness — only for observability.
#[derive(Debug, Default)]
pub struct PartitionCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

impl PartitionCounters {
    /// Current hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Current miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Current error count.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    fn record(&self, outcome: &ReadOutcome) {
        match outcome {
            ReadOutcome::Found(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
            }
            ReadOutcome::NotFound => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
            ReadOutcome::IoFailure(_) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Binds one local partition to its reader.
///
/// Exclusively owns the reader: when the accessor is dropped (at handler
/// shutdown), the reader goes with it.
pub struct PartitionAccessor {
    identity: PartitionIdentity,
    reader: Box<dyn PartitionReader>,
    counters: PartitionCounters,
}

impl PartitionAccessor {
    /// Bind `reader` as the accessor for `identity`.
    pub fn new(identity: PartitionIdentity, reader: Box<dyn PartitionReader>) -> Self {
        Self {
            identity,
            reader,
            counters: PartitionCounters::default(),
        }
    }

    /// This accessor's partition identity.
    pub fn identity(&self) -> PartitionIdentity {
        self.identity
    }

    /// Delegate a lookup to the underlying reader, updating counters.
    pub fn get(&self, key: &[u8], scratch: &mut Vec<u8>) -> ReadOutcome {
        let outcome = self.reader.read(key, scratch);
        self.counters.record(&outcome);
        outcome
    }

    /// Advisory counters for this partition.
    pub fn counters(&self) -> &PartitionCounters {
        &self.counters
    }
}

/// Result of routing a key through a [`DomainAccessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainGetOutcome {
    /// The read completed against an installed reader.
    Read(ReadOutcome),
    /// The partitioner selected a slot with no installed reader (the
    /// partition was skipped at assembly for lacking a current version).
    PartitionUnavailable,
}

/// Owns the dense partition-accessor table for one domain, plus the
/// partitioner used to route keys into it.
///
/// The table length is fixed at construction (`domain.num_partitions()`);
/// slots for partitions skipped during assembly are `None`.
pub struct DomainAccessor {
    name: String,
    slots: Vec<Option<PartitionAccessor>>,
    partitioner: Arc<dyn Partitioner>,
}

impl DomainAccessor {
    /// Construct a `DomainAccessor` from a dense slot table and a partitioner.
    pub fn new(
        name: impl Into<String>,
        slots: Vec<Option<PartitionAccessor>>,
        partitioner: Arc<dyn Partitioner>,
    ) -> Self {
        Self {
            name: name.into(),
            slots,
            partitioner,
        }
    }

    /// The domain's human name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total partition count for this domain (including unavailable slots).
    pub fn num_partitions(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Route `key` to its partition and delegate the read, or report that
    /// the partition selected has no installed reader.
    ///
    /// Returns `Err` only if the partitioner returned an index outside
    /// `[0, num_partitions)` — a defect in the `Partitioner` implementation,
    /// never a normal runtime condition.
    pub fn get(&self, key: &[u8], scratch: &mut Vec<u8>) -> Result<DomainGetOutcome, String> {
        let num_partitions = self.num_partitions();
        let idx = self.partitioner.partition(key, num_partitions);
        let slot = self.slots.get(idx as usize).ok_or_else(|| {
            format!(
                "partitioner returned out-of-range index {idx} for {num_partitions} partitions"
            )
        })?;

        match slot {
            Some(accessor) => Ok(DomainGetOutcome::Read(accessor.get(key, scratch))),
            None => Ok(DomainGetOutcome::PartitionUnavailable),
        }
    }

    /// Shut down every installed reader, domain-ascending... partition-ascending
    /// within this domain (slots are already stored partition-ascending).
    pub fn shut_down(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(accessor) = slot.take() {
                drop(accessor);
            } else {
                continue;
            }
        }
        warn!(domain = %self.name, "domain accessor shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{DomainId, PartitionNumber};
    use crate::partitioner::HashModPartitioner;
    use crate::reader::InMemoryPartitionReader;

    fn identity(p: u32) -> PartitionIdentity {
        PartitionIdentity::new(DomainId(0), PartitionNumber(p))
    }

    #[test]
    fn routes_to_the_partition_the_partitioner_selects() {
        struct FixedPartitioner(u32);
        impl Partitioner for FixedPartitioner {
            fn partition(&self, _key: &[u8], _n: u32) -> u32 {
                self.0
            }
        }

        let slots = vec![
            Some(PartitionAccessor::new(
                identity(0),
                Box::new(InMemoryPartitionReader::with_entries_unversioned([])),
            )),
            Some(PartitionAccessor::new(
                identity(1),
                Box::new(InMemoryPartitionReader::with_entries_unversioned([(
                    b"apple".to_vec(),
                    b"red".to_vec(),
                )])),
            )),
        ];

        let accessor = DomainAccessor::new("fruit", slots, Arc::new(FixedPartitioner(1)));
        let mut scratch = Vec::new();
        let outcome = accessor.get(b"apple", &mut scratch).unwrap();
        assert_eq!(
            outcome,
            DomainGetOutcome::Read(crate::reader::ReadOutcome::Found(b"red".to_vec()))
        );
    }

    #[test]
    fn reports_unavailable_for_empty_slot() {
        let slots = vec![None];
        let accessor = DomainAccessor::new("fruit", slots, Arc::new(HashModPartitioner::new()));
        let mut scratch = Vec::new();
        let outcome = accessor.get(b"anything", &mut scratch).unwrap();
        assert_eq!(outcome, DomainGetOutcome::PartitionUnavailable);
    }

    #[test]
    fn rejects_out_of_range_partitioner_result() {
        struct BrokenPartitioner;
        impl Partitioner for BrokenPartitioner {
            fn partition(&self, _key: &[u8], _n: u32) -> u32 {
                99
            }
        }

        let slots = vec![None];
        let accessor = DomainAccessor::new("fruit", slots, Arc::new(BrokenPartitioner));
        let mut scratch = Vec::new();
        assert!(accessor.get(b"anything", &mut scratch).is_err());
    }

    #[test]
    fn shut_down_clears_every_slot() {
        let slots = vec![Some(PartitionAccessor::new(
            identity(0),
            Box::new(InMemoryPartitionReader::new()),
        ))];
        let mut accessor = DomainAccessor::new("fruit", slots, Arc::new(HashModPartitioner::new()));
        accessor.shut_down();
        let mut scratch = Vec::new();
        let outcome = accessor.get(b"anything", &mut scratch).unwrap();
        assert_eq!(outcome, DomainGetOutcome::PartitionUnavailable);
    }
}
