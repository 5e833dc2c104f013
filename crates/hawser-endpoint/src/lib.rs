//! hawser-endpoint - Destination Vocabulary
//!
//! Endpoints and endpoint groups for the hawser client. This crate is the
//! single source of truth for how destinations are named, compared,
//! selected, and refreshed: one [`Endpoint`] per host:port, grouped into a
//! refreshable [`EndpointGroup`] with a pluggable [`SelectionStrategy`].

pub mod endpoint;
pub mod group;
pub mod selection;

pub use endpoint::{Endpoint, EndpointParseError, Scheme};
pub use group::{EmptyGroupError, EndpointGroup};
pub use selection::{RoundRobin, SelectionHint, SelectionStrategy, WeightedRandom};
