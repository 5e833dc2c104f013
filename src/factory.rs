//! Client factory: owns the event loop pool and per-client defaults.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use hawser_endpoint::{Endpoint, EndpointGroup, EndpointParseError, Scheme};
use hawser_executor::{EventLoopGroup, ExecutorConfig};
use thiserror::Error;
use tracing::info;

use crate::builder::{BuildError, ContextBuilder};
use crate::context::RequestContext;
use crate::request::HttpMethod;

/// Factory startup failed.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("invalid server authority: {0}")]
    InvalidServer(#[from] EndpointParseError),
    #[error("event loop pool failed to start: {0}")]
    Executor(#[from] io::Error),
}

/// Client-wide configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Default destinations as `"host:port"` authorities, selected
    /// round-robin. Empty means every request must supply its own group.
    pub servers: Vec<String>,
    /// Event loops to run; 0 means one per available core.
    pub workers: usize,
    /// Scheme used when rendering request URIs.
    pub scheme: Scheme,
    /// Deadline applied to every request unless overridden.
    pub default_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            workers: 0,
            scheme: Scheme::Http,
            default_timeout: None,
        }
    }
}

/// Hands out request-context builders backed by one event loop pool.
#[derive(Debug)]
pub struct ClientFactory {
    executor: Arc<EventLoopGroup>,
    default_group: Option<Arc<EndpointGroup>>,
    scheme: Scheme,
    default_timeout: Option<Duration>,
}

impl ClientFactory {
    /// Parse the configured servers and spin up the loop pool.
    pub fn new(config: ClientConfig) -> Result<Self, FactoryError> {
        let executor = EventLoopGroup::with_config(ExecutorConfig {
            workers: config.workers,
            ..ExecutorConfig::default()
        })?;
        Self::with_executor(Arc::new(executor), config)
    }

    /// Factory over an existing pool.
    ///
    /// Lets tests and embedders share one pool between factories, or pin
    /// every request to a single loop.
    pub fn with_executor(
        executor: Arc<EventLoopGroup>,
        config: ClientConfig,
    ) -> Result<Self, FactoryError> {
        let default_group = if config.servers.is_empty() {
            None
        } else {
            let endpoints = config
                .servers
                .iter()
                .map(|authority| Endpoint::parse(authority))
                .collect::<Result<Vec<_>, _>>()?;
            Some(Arc::new(EndpointGroup::new("default", endpoints)))
        };

        info!(
            workers = executor.len(),
            servers = default_group.as_ref().map_or(0, |g| g.len()),
            "client factory ready"
        );
        Ok(Self {
            executor,
            default_group,
            scheme: config.scheme,
            default_timeout: config.default_timeout,
        })
    }

    /// Begin building a context for `method` and `path`.
    pub fn context(&self, method: HttpMethod, path: impl Into<String>) -> ContextBuilder {
        ContextBuilder::new(
            self.executor.clone(),
            self.default_group.clone(),
            self.scheme,
            self.default_timeout,
            method,
            path,
        )
    }

    /// Build a context with all defaults.
    pub fn request(
        &self,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Result<RequestContext, BuildError> {
        self.context(method, path).build()
    }

    /// The pool backing this factory.
    pub fn executor(&self) -> &Arc<EventLoopGroup> {
        &self.executor
    }

    /// The configured default endpoint group, if any.
    pub fn default_group(&self) -> Option<&Arc<EndpointGroup>> {
        self.default_group.as_ref()
    }
}
