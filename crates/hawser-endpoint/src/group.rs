//! Endpoint groups: named endpoint sets with pluggable selection.
//!
//! A group keeps its membership as an immutable `Arc<[Endpoint]>` snapshot
//! behind a lock. Refreshing swaps the snapshot atomically, so a selection
//! in flight sees either the old complete list or the new complete list.
//! Listeners observe membership changes through a watch channel carrying a
//! version counter.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::Endpoint;
use crate::selection::{RoundRobin, SelectionHint, SelectionStrategy};

/// Selection was attempted against a group with no endpoints.
#[derive(Debug, Clone, Error)]
#[error("endpoint group {group:?} has no endpoints")]
pub struct EmptyGroupError {
    /// Name of the group that came up empty.
    pub group: String,
}

/// A named set of candidate endpoints with a selection strategy.
pub struct EndpointGroup {
    name: String,
    snapshot: RwLock<Arc<[Endpoint]>>,
    strategy: Box<dyn SelectionStrategy>,
    version: watch::Sender<u64>,
}

impl EndpointGroup {
    /// Group holding a single static endpoint; selection always returns it.
    pub fn of(endpoint: Endpoint) -> Self {
        let name = endpoint.authority();
        Self::with_strategy(name, vec![endpoint], RoundRobin::new())
    }

    /// Round-robin group over `endpoints`.
    pub fn new(name: impl Into<String>, endpoints: Vec<Endpoint>) -> Self {
        Self::with_strategy(name, endpoints, RoundRobin::new())
    }

    /// Group with an explicit selection strategy.
    pub fn with_strategy(
        name: impl Into<String>,
        endpoints: Vec<Endpoint>,
        strategy: impl SelectionStrategy + 'static,
    ) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            name: name.into(),
            snapshot: RwLock::new(endpoints.into()),
            strategy: Box::new(strategy),
            version,
        }
    }

    /// Group name, used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-copy snapshot of the current membership.
    pub fn endpoints(&self) -> Arc<[Endpoint]> {
        self.snapshot.read().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.read().is_empty()
    }

    /// Pick one endpoint from the current snapshot.
    ///
    /// Fails only when the snapshot is empty at the moment of selection.
    pub fn select(&self, hint: SelectionHint<'_>) -> Result<Endpoint, EmptyGroupError> {
        let snapshot = self.endpoints();
        if snapshot.is_empty() {
            return Err(EmptyGroupError {
                group: self.name.clone(),
            });
        }
        // Strategies never see an empty snapshot; a stray None falls back
        // to the first entry.
        let i = self.strategy.pick(&snapshot, hint).unwrap_or(0);
        Ok(snapshot[i % snapshot.len()].clone())
    }

    /// Atomically replace the membership.
    ///
    /// In-flight selections see the old snapshot or the new one, never a mix.
    pub fn set_endpoints(&self, endpoints: Vec<Endpoint>) {
        let next: Arc<[Endpoint]> = endpoints.into();
        let size = next.len();
        *self.snapshot.write() = next;
        self.version.send_modify(|v| *v += 1);
        debug!(group = %self.name, size, "endpoint group refreshed");
    }

    /// Subscribe to membership-change notifications.
    ///
    /// The payload is a monotonically increasing version; read the new
    /// membership with [`EndpointGroup::endpoints`] after each change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Waits until the group has at least one endpoint.
    ///
    /// Resolves immediately for non-empty groups; a group that starts empty
    /// becomes ready after its first non-empty refresh.
    pub async fn ready(&self) {
        let mut rx = self.subscribe();
        loop {
            if !self.is_empty() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl fmt::Debug for EndpointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointGroup")
            .field("name", &self.name)
            .field("size", &self.len())
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl From<Endpoint> for EndpointGroup {
    fn from(endpoint: Endpoint) -> Self {
        EndpointGroup::of(endpoint)
    }
}

impl From<Endpoint> for Arc<EndpointGroup> {
    fn from(endpoint: Endpoint) -> Self {
        Arc::new(EndpointGroup::of(endpoint))
    }
}
