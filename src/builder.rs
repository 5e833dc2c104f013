//! Single-use builder for request contexts.
//!
//! Build order: validate the request identity, resolve the endpoint group,
//! select an endpoint, pin the request to an event loop, freeze the
//! lifecycle, arm the deadline watchdog. Every failure propagates
//! synchronously from [`ContextBuilder::build`]; once a context exists its
//! state changes never raise.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hawser_endpoint::{EmptyGroupError, EndpointGroup, Scheme, SelectionHint};
use hawser_executor::{EventLoopGroup, SpawnError};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::attrs::Attributes;
use crate::context::RequestContext;
use crate::lifecycle::{self, Lifecycle};
use crate::request::{HttpMethod, InvalidRequestError, validate_path};

/// Context construction failed; nothing was retained.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),
    #[error(transparent)]
    EmptyGroup(#[from] EmptyGroupError),
    #[error("no endpoint group configured and none supplied")]
    NoEndpointGroup,
    #[error("cannot arm the deadline watchdog: {0}")]
    EventLoopUnavailable(#[from] SpawnError),
}

/// One-shot builder for a [`RequestContext`].
///
/// Obtained from [`ClientFactory::context`](crate::ClientFactory::context)
/// and consumed by [`ContextBuilder::build`], so a builder cannot produce
/// two contexts.
pub struct ContextBuilder {
    executor: Arc<EventLoopGroup>,
    method: HttpMethod,
    path: String,
    scheme: Scheme,
    group: Option<Arc<EndpointGroup>>,
    timeout: Option<Duration>,
    timed_out: bool,
    attrs: Attributes,
}

impl ContextBuilder {
    pub(crate) fn new(
        executor: Arc<EventLoopGroup>,
        default_group: Option<Arc<EndpointGroup>>,
        scheme: Scheme,
        default_timeout: Option<Duration>,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            method,
            path: path.into(),
            scheme,
            group: default_group,
            timeout: default_timeout,
            timed_out: false,
            attrs: Attributes::new(),
        }
    }

    /// Route through `group` instead of the factory default.
    ///
    /// Accepts a bare [`crate::Endpoint`] as a single-member group.
    pub fn endpoint_group(mut self, group: impl Into<Arc<EndpointGroup>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Replace the timeout; the watchdog arms when the context is built.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build without a deadline, even if the factory has a default timeout.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Force the context to be born timed out.
    ///
    /// The timeout flag is set before the context is visible anywhere, and
    /// no watchdog is armed.
    pub fn timed_out(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }

    /// Override the URI scheme for this request.
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Seed a request attribute before the context exists.
    pub fn attr<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.attrs.set(value);
        self
    }

    /// Validate, select, pin, and freeze: produce the immutable context.
    pub fn build(self) -> Result<RequestContext, BuildError> {
        validate_path(&self.path)?;

        let group = self.group.ok_or(BuildError::NoEndpointGroup)?;
        let hint = SelectionHint {
            method: Some(self.method.as_str()),
            path: Some(&self.path),
        };
        let endpoint = group.select(hint)?;
        let event_loop = self.executor.select(&endpoint).clone();

        let lifecycle = Arc::new(Lifecycle::new(self.timed_out));
        let ctx = RequestContext {
            id: Uuid::new_v4(),
            method: self.method,
            path: self.path,
            scheme: self.scheme,
            endpoint_group: group,
            endpoint,
            event_loop,
            timeout: self.timeout,
            lifecycle: lifecycle.clone(),
            attrs: Arc::new(self.attrs),
            created_at: Instant::now(),
        };

        if let Some(after) = self.timeout
            && !self.timed_out
        {
            ctx.event_loop()
                .spawn(lifecycle::watchdog(ctx.id, lifecycle, after))?;
        }

        debug!(
            ctx = %ctx.id,
            method = %ctx.method,
            endpoint = %ctx.endpoint,
            event_loop = ctx.event_loop.id(),
            "request context built"
        );
        Ok(ctx)
    }
}
