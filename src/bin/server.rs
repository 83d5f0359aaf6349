//! partition-serve server process.
//!
//! Loads configuration from the environment, assembles a [`Handler`] against
//! an in-memory coordinator, and serves until interrupted.
//!
//! This binary's coordinator is a fixture, not a client for any real
//! metadata store — a production deployment swaps [`StaticCoordinator`] for
//! whatever talks to its actual cluster coordinator, without changing
//! anything downstream of [`HandlerAssembler::assemble`].
//!
//! ## Usage
//!
//! ```bash
//! RING_GROUP_NAME=main HOST_ADDRESS=localhost:9090 NUM_CONCURRENT_GETS=8 server
//! ```

use partition_serve::config::EnvConfigurator;
use partition_serve::handler::Handler;
use partition_serve::metadata::{
    Domain, DomainGroup, DomainGroupVersion, Host, HostDomain, PartitionMetadata, Ring, RingGroup,
    StaticCoordinator, StorageEngine,
};
use partition_serve::{
    Configurator, DomainId, HandlerAssembler, HashModPartitioner, InMemoryPartitionReader,
    PartitionNumber, PartitionReader, Version,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// A [`StorageEngine`] that opens the same fixed, versioned, empty reader
/// for every partition it's asked about. Stands in for a real on-disk engine
/// in this example process.
struct FixtureStorageEngine {
    version: Version,
}

impl StorageEngine for FixtureStorageEngine {
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

fn build_fixture_coordinator(configurator: &dyn Configurator) -> StaticCoordinator {
    const NUM_PARTITIONS: u32 = 4;
    const DOMAIN_GROUP_VERSION: u64 = 1;
    const DOMAIN_VERSION: Version = Version(1);

    let domain_id = DomainId(0);

    let domain = Domain {
        id: domain_id,
        name: "example".to_string(),
        num_partitions: NUM_PARTITIONS,
        partitioner: Arc::new(HashModPartitioner::new()),
        storage_engine: Arc::new(FixtureStorageEngine {
            version: DOMAIN_VERSION,
        }),
    };

    let partitions = (0..NUM_PARTITIONS)
        .map(|p| PartitionMetadata {
            partition_number: PartitionNumber(p),
            current_version: Some(DOMAIN_VERSION),
            current_domain_group_version: Some(DOMAIN_GROUP_VERSION),
        })
        .collect();

    let host = Host {
        address: configurator.host_address().clone(),
        host_domains: vec![HostDomain {
            domain_id,
            partitions,
        }],
    };

    let ring = Ring {
        hosts: vec![host],
        current_version: Some(DOMAIN_GROUP_VERSION),
        updating_to_version: None,
    };

    let mut domain_versions = HashMap::new();
    domain_versions.insert(domain_id, DOMAIN_VERSION);

    let domain_group = DomainGroup {
        versions: HashMap::from([(
            DOMAIN_GROUP_VERSION,
            DomainGroupVersion {
                version_number: DOMAIN_GROUP_VERSION,
                domain_versions,
            },
        )]),
    };

    let ring_group = RingGroup {
        rings: vec![ring],
        domain_group: Some(domain_group),
    };

    StaticCoordinator::new()
        .with_ring_group(configurator.ring_group_name(), ring_group)
        .with_domain(domain)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("partition-serve server starting");

    let configurator = EnvConfigurator::from_env()?;
    let coordinator = build_fixture_coordinator(&configurator);

    let handler = Arc::new(HandlerAssembler::assemble(&configurator, &coordinator)?);
    info!(
        ring_group = configurator.ring_group_name(),
        host = %configurator.host_address(),
        "handler ready"
    );

    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");

    info!("shutdown signal received, draining handler");
    shut_down(&handler);

    Ok(())
}

fn shut_down(handler: &Handler) {
    handler.shut_down();
    info!("handler terminated");
}
