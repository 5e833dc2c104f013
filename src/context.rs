//! The immutable per-request client context.
//!
//! Everything that identifies a request is fixed when the builder runs:
//! method, path, scheme, the selected endpoint, the event loop it is
//! pinned to, and the timeout. Only the lifecycle phase and the attribute
//! map change afterwards, and clones share both.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hawser_endpoint::{Endpoint, EndpointGroup, Scheme};
use hawser_executor::EventLoop;
use uuid::Uuid;

use crate::attrs::Attributes;
use crate::lifecycle::{Lifecycle, RequestPhase};
use crate::request::HttpMethod;

/// Per-request client context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub(crate) id: Uuid,
    pub(crate) method: HttpMethod,
    pub(crate) path: String,
    pub(crate) scheme: Scheme,
    pub(crate) endpoint_group: Arc<EndpointGroup>,
    pub(crate) endpoint: Endpoint,
    pub(crate) event_loop: EventLoop,
    pub(crate) timeout: Option<Duration>,
    pub(crate) lifecycle: Arc<Lifecycle>,
    pub(crate) attrs: Arc<Attributes>,
    pub(crate) created_at: Instant,
}

impl RequestContext {
    /// Unique id for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Group the endpoint was selected from.
    pub fn endpoint_group(&self) -> &Arc<EndpointGroup> {
        &self.endpoint_group
    }

    /// Endpoint selected at build time. A group refresh never moves an
    /// existing context.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Event loop this request is pinned to.
    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    /// Deadline configured for this request, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Absolute URI for this request, derived from the selected endpoint.
    pub fn uri(&self) -> String {
        self.endpoint.uri(self.scheme, &self.path)
    }

    /// Time since the context was built.
    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Current lifecycle phase.
    pub fn phase(&self) -> RequestPhase {
        self.lifecycle.phase()
    }

    /// Whether the deadline has fired for this request.
    ///
    /// Monotonic: once true it stays true, even after the request
    /// completes or is cancelled.
    pub fn is_timed_out(&self) -> bool {
        self.lifecycle.is_timed_out()
    }

    /// Mark the request completed.
    ///
    /// Returns whether this call performed the transition. Completing a
    /// request whose deadline already fired works, but keeps the timeout
    /// flag set.
    pub fn complete(&self) -> bool {
        self.lifecycle.try_complete()
    }

    /// Request cancellation.
    ///
    /// Returns whether this call performed the transition. Cancellation
    /// is cooperative: in-flight work observes it through
    /// [`RequestContext::cancellation_requested`] and stops at its own
    /// pace; nothing is force-killed.
    pub fn cancel(&self) -> bool {
        self.lifecycle.try_cancel()
    }

    /// Resolves once cancellation is requested: the deadline fired or
    /// [`RequestContext::cancel`] was called. Never resolves for requests
    /// that complete normally.
    pub async fn cancellation_requested(&self) {
        self.lifecycle.cancellation_requested().await
    }

    /// Request-scoped attributes, shared across clones.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }
}
