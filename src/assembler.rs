//! [`HandlerAssembler`]: the single point where metadata inconsistency is
//! detected. Once [`HandlerAssembler::assemble`] returns successfully, the
//! serving path never consults the coordinator again.

use crate::accessor::{DomainAccessor, PartitionAccessor};
use crate::config::Configurator;
use crate::error::{CoreError, CoreResult};
use crate::handler::Handler;
use crate::ids::{DomainId, PartitionIdentity};
use crate::metadata::Coordinator;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Boots the serving core: resolves cluster metadata, validates version
/// consistency, and builds the dense accessor tables a [`Handler`] dispatches
/// through.
pub struct HandlerAssembler;

impl HandlerAssembler {
    /// Assemble a [`Handler`] for this host, given a [`Configurator`] and a
    /// [`Coordinator`] handle.
    ///
    /// Every failure here is fatal: the caller never receives a `Handler` in
    /// anything but the `Ready` state.
    #[instrument(name = "assemble_handler", skip_all, fields(ring_group = %configurator.ring_group_name()))]
    pub fn assemble(
        configurator: &dyn Configurator,
        coordinator: &dyn Coordinator,
    ) -> CoreResult<Handler> {
        let ring_group_name = configurator.ring_group_name();
        let host_address = configurator.host_address();

        // 1-2. Locate the ring-group and the ring containing this host.
        let ring_group = coordinator
            .ring_group(ring_group_name)
            .ok_or_else(|| CoreError::MissingRing {
                ring_group: ring_group_name.to_string(),
                host: host_address.to_string(),
            })?;
        let ring = ring_group
            .rings
            .iter()
            .find(|r| r.host_by_address(host_address).is_some())
            .ok_or_else(|| CoreError::MissingRing {
                ring_group: ring_group_name.to_string(),
                host: host_address.to_string(),
            })?;

        // 2. Locate the domain-group attached to this ring-group.
        let domain_group = ring_group
            .domain_group
            .as_ref()
            .ok_or_else(|| CoreError::MissingDomainGroup(ring_group_name.to_string()))?;

        // 3. Choose the effective version.
        let effective_version = ring
            .effective_version()
            .ok_or_else(|| CoreError::NoEffectiveVersion(ring_group_name.to_string()))?;

        // 4. Fetch the domain-group-version.
        let domain_group_version = domain_group
            .version_by_number(effective_version)
            .ok_or(CoreError::MissingDomainGroupVersion(effective_version))?;

        // 5. Locate the host record.
        let host = ring
            .host_by_address(host_address)
            .ok_or_else(|| CoreError::MissingHost(host_address.to_string()))?;

        // 6. Compute max_domain_id and allocate the domain-accessor table.
        let mut domain_ids: Vec<DomainId> =
            domain_group_version.domain_versions.keys().copied().collect();
        domain_ids.sort();

        let max_domain_id = domain_ids.iter().map(|d| d.as_u32()).max().unwrap_or(0);
        let mut domain_slots: Vec<Option<DomainAccessor>> =
            (0..=max_domain_id).map(|_| None).collect();

        // 7. Build a domain-accessor for every domain in the domain-group-version.
        for domain_id in domain_ids {
            let host_domain = host.host_domain(domain_id).ok_or_else(|| {
                CoreError::MissingHostDomain {
                    host: host_address.to_string(),
                    domain_id: domain_id.as_u32(),
                }
            })?;

            let domain = coordinator
                .domain(domain_id)
                .ok_or_else(|| CoreError::internal(format!("domain {domain_id} not registered")))?;

            let mut partition_slots: Vec<Option<PartitionAccessor>> =
                (0..domain.num_parts()).map(|_| None).collect();

            for partition_meta in &host_domain.partitions {
                let partition_number = partition_meta.partition_number;

                if partition_number.as_u32() >= domain.num_parts() {
                    return Err(CoreError::PartitionOutOfRange {
                        domain_id: domain_id.as_u32(),
                        partition_number: partition_number.as_u32(),
                        num_partitions: domain.num_parts(),
                    });
                }

                if partition_meta.current_version.is_none() {
                    warn!(
                        %domain_id,
                        %partition_number,
                        "partition has no current version, skipping at assembly"
                    );
                    continue;
                }

                // Resolve the domain-version this partition should be at via
                // the domain-group-version it claims to be pinned to — this,
                // not `current_version` itself, is the value checked against
                // the opened reader below.
                let pinned_dgv_number = partition_meta.current_domain_group_version.ok_or(
                    CoreError::UnresolvedPartitionVersion {
                        domain_id: domain_id.as_u32(),
                        partition_number: partition_number.as_u32(),
                        domain_group_version: effective_version,
                    },
                )?;
                let pinned_dgv = domain_group
                    .version_by_number(pinned_dgv_number)
                    .ok_or(CoreError::UnresolvedPartitionVersion {
                        domain_id: domain_id.as_u32(),
                        partition_number: partition_number.as_u32(),
                        domain_group_version: pinned_dgv_number,
                    })?;
                let expected_version = pinned_dgv
                    .domain_versions
                    .get(&domain_id)
                    .copied()
                    .ok_or(CoreError::UnresolvedPartitionVersion {
                        domain_id: domain_id.as_u32(),
                        partition_number: partition_number.as_u32(),
                        domain_group_version: pinned_dgv_number,
                    })?;

                let reader = domain
                    .storage_engine
                    .open_reader(partition_number)
                    .map_err(|detail| CoreError::ReaderOpen {
                        domain_id: domain_id.as_u32(),
                        partition_number: partition_number.as_u32(),
                        detail,
                    })?;

                if let Some(actual) = reader.version_number() {
                    if actual != expected_version {
                        return Err(CoreError::VersionMismatch {
                            domain_id: domain_id.as_u32(),
                            partition_number: partition_number.as_u32(),
                            expected: expected_version.as_u64(),
                            actual: actual.as_u64(),
                        });
                    }
                }

                let identity = PartitionIdentity::new(domain_id, partition_number);
                partition_slots[partition_number.as_u32() as usize] =
                    Some(PartitionAccessor::new(identity, reader));
            }

            let domain_accessor = DomainAccessor::new(
                domain.name.clone(),
                partition_slots,
                Arc::clone(&domain.partitioner),
            );
            domain_slots[domain_id.as_u32() as usize] = Some(domain_accessor);
        }

        info!(num_domains = domain_slots.len(), "handler assembled");
        Ok(Handler::new(domain_slots, configurator.num_concurrent_gets()))
    }
}
