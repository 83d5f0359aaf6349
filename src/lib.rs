//! # partition-serve
//!
//! On-host serving core for a partitioned, versioned, read-mostly
//! key-value store.
//!
//! A process embedding this crate answers `get`/`get_bulk` for the domains
//! and partitions assigned to it, against whatever the cluster coordinator
//! last published. The core itself never talks to a network: it is handed
//! a [`config::Configurator`] and a [`metadata::Coordinator`], and produces
//! a [`handler::Handler`] that a transport layer (gRPC, HTTP, whatever) then
//! wraps.
//!
//! ## Architecture
//!
//! ```text
//! Configurator + Coordinator
//!            │
//!            ▼
//!   HandlerAssembler::assemble     (resolves metadata, opens readers, fails fast)
//!            │
//!            ▼
//!         Handler                  (async facade: get / get_bulk / shut_down)
//!            │
//!            ▼
//!    RequestExecutor                (fixed OS-thread pool, blocking reader I/O)
//!            │
//!            ▼
//!   DomainAccessor → PartitionAccessor → PartitionReader
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use partition_serve::config::EnvConfigurator;
//! use partition_serve::assembler::HandlerAssembler;
//!
//! let configurator = EnvConfigurator::from_env()?;
//! let coordinator = build_coordinator(); // application-specific
//! let handler = HandlerAssembler::assemble(&configurator, &coordinator)?;
//!
//! let response = handler.get(domain_id, b"some-key").await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod assembler;
pub mod config;
pub mod error;
pub mod executor;
pub mod handler;
pub mod ids;
pub mod metadata;
pub mod partitioner;
pub mod reader;

// Re-exports for convenience.
pub use accessor::{DomainAccessor, PartitionAccessor};
pub use assembler::HandlerAssembler;
pub use config::{Configurator, EnvConfigurator, StaticConfigurator};
pub use error::{CoreError, CoreResult};
pub use executor::RequestExecutor;
pub use handler::{BulkResponse, Handler, Response};
pub use ids::{DomainId, HostAddress, PartitionIdentity, PartitionNumber, Version};
pub use metadata::{Coordinator, Domain, StaticCoordinator, StorageEngine};
pub use partitioner::{HashModPartitioner, Partitioner};
pub use reader::{InMemoryPartitionReader, PartitionReader, ReadOutcome};
