//! hawser - Client Request Contexts
//!
//! Per-request contexts for RPC/HTTP clients: request identity, endpoint
//! selection, event-loop affinity, deadlines, and cooperative cancellation.
//!
//! A [`ClientFactory`] owns a fixed [`EventLoopGroup`] and per-client
//! defaults. Each request gets a single-use [`ContextBuilder`] that
//! validates the request identity, selects an [`Endpoint`] from an
//! [`EndpointGroup`], pins the request to one event loop, arms the
//! deadline watchdog, and freezes the result into an immutable
//! [`RequestContext`].

pub mod attrs;
pub mod builder;
pub mod context;
pub mod factory;
pub mod lifecycle;
pub mod request;

pub use attrs::Attributes;
pub use builder::{BuildError, ContextBuilder};
pub use context::RequestContext;
pub use factory::{ClientConfig, ClientFactory, FactoryError};
pub use lifecycle::RequestPhase;
pub use request::{HttpMethod, InvalidRequestError};

pub use hawser_endpoint::{
    EmptyGroupError, Endpoint, EndpointGroup, EndpointParseError, RoundRobin, Scheme,
    SelectionHint, SelectionStrategy, WeightedRandom,
};
pub use hawser_executor::{EventLoop, EventLoopGroup, ExecutorConfig, SpawnError};
