//! The [`PartitionReader`] external contract.
//!
//! A reader is an opened, immutable view of one partition at one version.
//! The serving core never constructs readers directly — they are produced by
//! a [`crate::metadata::StorageEngine`] during assembly and owned
//! exclusively by a [`crate::accessor::PartitionAccessor`] for the lifetime
//! of the handler.

use crate::ids::Version;

/// Outcome of a single `read` call against a [`PartitionReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The key was present; the value bytes are returned by copy.
    Found(Vec<u8>),
    /// The key is not present in this partition.
    NotFound,
    /// The underlying storage failed to answer the read.
    IoFailure(String),
}

/// An opened, immutable partition reader.
///
/// Implementations must be safely callable from multiple threads
/// concurrently **as long as each call is against a distinct reader
/// instance**. A single instance need not be safe to call concurrently with
/// itself — callers (the [`crate::executor::RequestExecutor`]) give every
/// worker its own scratch buffer specifically so that a reader implementation
/// is free to serialize internally if it must.
pub trait PartitionReader: Send + Sync {
    /// Look up `key`, using `scratch` as a reusable destination buffer for
    /// the value bytes. `scratch` is owned by the calling worker thread and
    /// is never observed concurrently.
    fn read(&self, key: &[u8], scratch: &mut Vec<u8>) -> ReadOutcome;

    /// The version this reader believes it is serving, or `None` if the
    /// reader cannot report one. Checked once, at assembly time, against the
    /// version metadata dictates; never consulted again afterward.
    fn version_number(&self) -> Option<Version>;
}

/// An in-memory [`PartitionReader`] used by tests and by the example
/// `server` binary. Backed by a plain map; never touches disk.
#[derive(Debug, Default)]
pub struct InMemoryPartitionReader {
    data: std::collections::HashMap<Vec<u8>, Vec<u8>>,
    version: Option<Version>,
}

impl InMemoryPartitionReader {
    /// Create an empty reader reporting no version.
    pub fn new() -> Self {
        Self {
            data: std::collections::HashMap::new(),
            version: None,
        }
    }

    /// Create a reader pre-populated with `entries`, reporting `version`.
    pub fn with_entries(
        entries: impl IntoIterator<Item = (Vec<u8>, Vec<u8>)>,
        version: Version,
    ) -> Self {
        Self {
            data: entries.into_iter().collect(),
            version: Some(version),
        }
    }

    /// Create a reader that reports no version at all ("unknown").
    pub fn with_entries_unversioned(
        entries: impl IntoIterator<Item = (Vec<u8>, Vec<u8>)>,
    ) -> Self {
        Self {
            data: entries.into_iter().collect(),
            version: None,
        }
    }
}

impl PartitionReader for InMemoryPartitionReader {
    fn read(&self, key: &[u8], scratch: &mut Vec<u8>) -> ReadOutcome {
        match self.data.get(key) {
            Some(value) => {
                scratch.clear();
                scratch.extend_from_slice(value);
                ReadOutcome::Found(scratch.clone())
            }
            None => ReadOutcome::NotFound,
        }
    }

    fn version_number(&self) -> Option<Version> {
        self.version
    }
}
