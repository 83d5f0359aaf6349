//! Integration tests for [`HandlerAssembler::assemble`].
//!
//! Exercises the failure modes in the assembly algorithm against
//! hand-built [`StaticCoordinator`]/[`StaticConfigurator`] fixtures — no
//! network, no real storage engine.

use partition_serve::metadata::{
    Domain, DomainGroup, DomainGroupVersion, Host, HostDomain, PartitionMetadata, Ring, RingGroup,
    StaticCoordinator, StorageEngine,
};
use partition_serve::{
    CoreError, DomainId, HandlerAssembler, HashModPartitioner, HostAddress,
    InMemoryPartitionReader, PartitionNumber, PartitionReader, StaticConfigurator, Version,
};
use std::collections::HashMap;
use std::sync::Arc;

struct FixedReader;

impl StorageEngine for FixedReader {
    fn open_reader(
        &self,
        _partition_number: PartitionNumber,
    ) -> Result<Box<dyn PartitionReader>, String> {
        Ok(Box::new(InMemoryPartitionReader::with_entries_unversioned(
            [],
        )))
    }
}

struct VersionedEngine {
    version: Version,
}

impl StorageEngine for VersionedEngine {
    fn open_reader(
        &self,
        _partition_number: PartitionNumber,
    ) -> Result<Box<dyn PartitionReader>, String> {
        Ok(Box::new(InMemoryPartitionReader::with_entries(
            [],
            self.version,
        )))
    }
}

fn configurator() -> StaticConfigurator {
    StaticConfigurator::new("ring-a", 4, HostAddress::from("host-1:9090")).unwrap()
}

fn one_domain_one_partition(
    domain_group_version: u64,
    domain_version: Version,
    engine: Arc<dyn StorageEngine>,
) -> StaticCoordinator {
    let domain_id = DomainId(0);
    let domain = Domain {
        id: domain_id,
        name: "fruit".to_string(),
        num_partitions: 1,
        partitioner: Arc::new(HashModPartitioner::new()),
        storage_engine: engine,
    };

    let host = Host {
        address: HostAddress::from("host-1:9090"),
        host_domains: vec![HostDomain {
            domain_id,
            partitions: vec![PartitionMetadata {
                partition_number: PartitionNumber(0),
                current_version: Some(domain_version),
                current_domain_group_version: Some(domain_group_version),
            }],
        }],
    };

    let ring = Ring {
        hosts: vec![host],
        current_version: Some(domain_group_version),
        updating_to_version: None,
    };

    let mut domain_versions = HashMap::new();
    domain_versions.insert(domain_id, domain_version);

    let domain_group = DomainGroup {
        versions: HashMap::from([(
            domain_group_version,
            DomainGroupVersion {
                version_number: domain_group_version,
                domain_versions,
            },
        )]),
    };

    StaticCoordinator::new()
        .with_ring_group(
            "ring-a",
            RingGroup {
                rings: vec![ring],
                domain_group: Some(domain_group),
            },
        )
        .with_domain(domain)
}

#[test]
fn assembles_successfully_when_reader_version_matches_metadata() {
    let config = configurator();
    let coordinator = one_domain_one_partition(1, Version(3), Arc::new(VersionedEngine {
        version: Version(3),
    }));

    let handler = HandlerAssembler::assemble(&config, &coordinator);
    assert!(handler.is_ok());
}

#[test]
fn fails_when_ring_group_is_unknown() {
    let config = configurator();
    let coordinator = StaticCoordinator::new();

    let result = HandlerAssembler::assemble(&config, &coordinator);
    assert!(matches!(result, Err(CoreError::MissingRing { .. })));
}

#[test]
fn fails_when_host_is_not_in_any_ring() {
    let config =
        StaticConfigurator::new("ring-a", 4, HostAddress::from("unknown-host:9090")).unwrap();
    let coordinator = one_domain_one_partition(
        1,
        Version(1),
        Arc::new(FixedReader),
    );

    let result = HandlerAssembler::assemble(&config, &coordinator);
    assert!(matches!(result, Err(CoreError::MissingRing { .. })));
}

#[test]
fn fails_on_reader_version_mismatch() {
    let config = configurator();
    let coordinator = one_domain_one_partition(1, Version(3), Arc::new(VersionedEngine {
        version: Version(4),
    }));

    let result = HandlerAssembler::assemble(&config, &coordinator);
    match result {
        Err(CoreError::VersionMismatch { expected, actual, .. }) => {
            assert_eq!(expected, 3);
            assert_eq!(actual, 4);
        }
        other => panic!("expected VersionMismatch, got {other:?}"),
    }
}

#[test]
fn skips_partition_with_no_current_version_without_failing() {
    let domain_id = DomainId(0);
    let domain = Domain {
        id: domain_id,
        name: "fruit".to_string(),
        num_partitions: 1,
        partitioner: Arc::new(HashModPartitioner::new()),
        storage_engine: Arc::new(FixedReader),
    };

    let host = Host {
        address: HostAddress::from("host-1:9090"),
        host_domains: vec![HostDomain {
            domain_id,
            partitions: vec![PartitionMetadata {
                partition_number: PartitionNumber(0),
                current_version: None,
                current_domain_group_version: None,
            }],
        }],
    };

    let ring = Ring {
        hosts: vec![host],
        current_version: Some(1),
        updating_to_version: None,
    };

    let mut domain_versions = HashMap::new();
    domain_versions.insert(domain_id, Version(1));

    let ring_group = RingGroup {
        rings: vec![ring],
        domain_group: Some(DomainGroup {
            versions: HashMap::from([(
                1,
                DomainGroupVersion {
                    version_number: 1,
                    domain_versions,
                },
            )]),
        }),
    };

    let coordinator = StaticCoordinator::new()
        .with_ring_group("ring-a", ring_group)
        .with_domain(domain);

    let handler = HandlerAssembler::assemble(&configurator(), &coordinator);
    assert!(handler.is_ok());
}

#[test]
fn fails_when_domain_group_version_is_missing() {
    let config = configurator();
    let domain_id = DomainId(0);
    let domain = Domain {
        id: domain_id,
        name: "fruit".to_string(),
        num_partitions: 1,
        partitioner: Arc::new(HashModPartitioner::new()),
        storage_engine: Arc::new(FixedReader),
    };
    let host = Host {
        address: HostAddress::from("host-1:9090"),
        host_domains: vec![],
    };
    let ring = Ring {
        hosts: vec![host],
        current_version: Some(42),
        updating_to_version: None,
    };
    let ring_group = RingGroup {
        rings: vec![ring],
        domain_group: Some(DomainGroup {
            versions: HashMap::new(),
        }),
    };
    let coordinator = StaticCoordinator::new()
        .with_ring_group("ring-a", ring_group)
        .with_domain(domain);

    let result = HandlerAssembler::assemble(&config, &coordinator);
    assert!(matches!(
        result,
        Err(CoreError::MissingDomainGroupVersion(42))
    ));
}

#[test]
fn fails_when_ring_group_has_no_domain_group() {
    let config = configurator();
    let host = Host {
        address: HostAddress::from("host-1:9090"),
        host_domains: vec![],
    };
    let ring = Ring {
        hosts: vec![host],
        current_version: Some(1),
        updating_to_version: None,
    };
    let ring_group = RingGroup {
        rings: vec![ring],
        domain_group: None,
    };
    let coordinator = StaticCoordinator::new().with_ring_group("ring-a", ring_group);

    let result = HandlerAssembler::assemble(&config, &coordinator);
    assert!(matches!(result, Err(CoreError::MissingDomainGroup(_))));
}
