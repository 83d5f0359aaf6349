//! [`Handler`]: the public facade answering `get` and `get_bulk`, and the
//! state machine governing its lifecycle.

use crate::accessor::DomainGetOutcome;
use crate::executor::RequestExecutor;
use crate::ids::DomainId;
use crate::reader::ReadOutcome;
use crate::DomainAccessor;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const READY: u8 = 0;
const SHUTTING_DOWN: u8 = 1;
const TERMINATED: u8 = 2;

/// Outcome of a single [`Handler::get`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The key was present; its value.
    Value(Vec<u8>),
    /// The key is not present in its partition.
    NotFound,
    /// `domain_id` does not name a known domain.
    NoSuchDomain,
    /// The waiter was interrupted (the handler began shutting down) before
    /// the underlying task completed. The task itself still ran to
    /// completion; its result was simply discarded.
    Interrupted,
    /// An unexpected failure occurred — reader I/O fault, an empty partition
    /// slot, a misbehaving partitioner, or a call outside the `Ready` state.
    InternalError(String),
}

/// Outcome of a single [`Handler::get_bulk`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkResponse {
    /// Per-key responses, same length and order as the input keys.
    Responses(Vec<Response>),
    /// `domain_id` does not name a known domain. Nothing was enqueued.
    NoSuchDomain,
    /// The first interrupted key collapsed the whole bulk response.
    Interrupted,
    /// An unexpected failure occurred before any keys could be dispatched.
    InternalError(String),
}

/// The per-process facade answering `get` and `get_bulk`.
///
/// Constructed once by [`crate::assembler::HandlerAssembler`], used
/// concurrently by many callers, and shut down exactly once. Between
/// construction and shutdown the accessor topology is read-only.
pub struct Handler {
    domains: Arc<RwLock<Vec<Option<DomainAccessor>>>>,
    executor: RequestExecutor,
    state: AtomicU8,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("state", &self.state.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Handler {
    /// Construct a `Handler` directly from an already-assembled domain table
    /// and worker-pool size. Used by [`crate::assembler::HandlerAssembler`];
    /// most callers should go through that instead.
    pub fn new(domains: Vec<Option<DomainAccessor>>, num_concurrent_gets: u32) -> Self {
        Self {
            domains: Arc::new(RwLock::new(domains)),
            executor: RequestExecutor::new(num_concurrent_gets),
            state: AtomicU8::new(READY),
            cancel: CancellationToken::new(),
        }
    }

    /// Look up a single key in `domain_id`.
    pub async fn get(&self, domain_id: DomainId, key: &[u8]) -> Response {
        let start = Instant::now();
        let response = self.get_inner(domain_id, key).await;
        debug!(
            %domain_id,
            elapsed_us = start.elapsed().as_micros() as u64,
            "get completed"
        );
        response
    }

    async fn get_inner(&self, domain_id: DomainId, key: &[u8]) -> Response {
        if self.state.load(Ordering::SeqCst) != READY {
            return Response::InternalError("handler is not in the Ready state".to_string());
        }

        let idx = domain_id.as_u32() as usize;
        if !self.domain_exists(idx) {
            return Response::NoSuchDomain;
        }

        let rx = self.submit_read(idx, key.to_vec());
        self.await_one(rx).await
    }

    /// Look up many keys in `domain_id`, preserving input order in the
    /// response.
    pub async fn get_bulk(&self, domain_id: DomainId, keys: &[Vec<u8>]) -> BulkResponse {
        if self.state.load(Ordering::SeqCst) != READY {
            return BulkResponse::InternalError("handler is not in the Ready state".to_string());
        }

        let idx = domain_id.as_u32() as usize;
        if !self.domain_exists(idx) {
            return BulkResponse::NoSuchDomain;
        }

        // Fan out one task per key before awaiting any of them, so bulk
        // latency is bounded by the slowest key, not the sum of all of them.
        let receivers: Vec<_> = keys
            .iter()
            .map(|key| self.submit_read(idx, key.clone()))
            .collect();

        let mut responses = Vec::with_capacity(receivers.len());
        for rx in receivers {
            let response = self.await_one(rx).await;
            if response == Response::Interrupted {
                return BulkResponse::Interrupted;
            }
            responses.push(response);
        }

        BulkResponse::Responses(responses)
    }

    fn domain_exists(&self, idx: usize) -> bool {
        let guard = self.domains.read();
        idx < guard.len() && guard[idx].is_some()
    }

    fn submit_read(
        &self,
        idx: usize,
        key: Vec<u8>,
    ) -> tokio::sync::oneshot::Receiver<Result<DomainGetOutcome, String>> {
        let domains = Arc::clone(&self.domains);
        self.executor.submit(move |scratch| {
            let guard = domains.read();
            match guard.get(idx).and_then(|slot| slot.as_ref()) {
                Some(accessor) => accessor.get(&key, scratch),
                None => Ok(DomainGetOutcome::PartitionUnavailable),
            }
        })
    }

    async fn await_one(
        &self,
        rx: tokio::sync::oneshot::Receiver<Result<DomainGetOutcome, String>>,
    ) -> Response {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Response::Interrupted,
            result = rx => match result {
                Ok(Ok(DomainGetOutcome::Read(ReadOutcome::Found(value)))) => Response::Value(value),
                Ok(Ok(DomainGetOutcome::Read(ReadOutcome::NotFound))) => Response::NotFound,
                Ok(Ok(DomainGetOutcome::Read(ReadOutcome::IoFailure(detail)))) => {
                    Response::InternalError(detail)
                }
                Ok(Ok(DomainGetOutcome::PartitionUnavailable)) => {
                    Response::InternalError("partition unavailable".to_string())
                }
                Ok(Err(detail)) => Response::InternalError(detail),
                Err(_) => Response::InternalError("worker channel closed".to_string()),
            },
        }
    }

    /// Shut down every domain-accessor, domain ascending, then shut down the
    /// executor. Idempotent: a second call is a no-op.
    pub fn shut_down(&self) {
        if self
            .state
            .compare_exchange(READY, SHUTTING_DOWN, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        self.cancel.cancel();

        {
            let mut guard = self.domains.write();
            for slot in guard.iter_mut() {
                if let Some(domain_accessor) = slot {
                    domain_accessor.shut_down();
                }
            }
        }

        self.executor.shut_down();
        self.state.store(TERMINATED, Ordering::SeqCst);
    }
}
