//! Request identity: method, path, and build-time validation.
//!
//! A context is identified by its method and origin-form path. Validation
//! happens once, when a builder runs; a malformed identity is the only
//! request-shaped reason construction can fail.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = InvalidRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "CONNECT" => Ok(HttpMethod::Connect),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(InvalidRequestError::UnknownMethod(s.to_string())),
        }
    }
}

/// The request identity handed to a builder was malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequestError {
    #[error("request path is empty")]
    EmptyPath,
    #[error("request path {0:?} must start with '/'")]
    RelativePath(String),
    #[error("request path {0:?} contains whitespace or control characters")]
    IllegalPath(String),
    #[error("unknown HTTP method {0:?}")]
    UnknownMethod(String),
}

/// Validate an origin-form request path.
pub(crate) fn validate_path(path: &str) -> Result<(), InvalidRequestError> {
    if path.is_empty() {
        return Err(InvalidRequestError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(InvalidRequestError::RelativePath(path.to_string()));
    }
    if path
        .chars()
        .any(|c| c.is_ascii_whitespace() || c.is_ascii_control())
    {
        return Err(InvalidRequestError::IllegalPath(path.to_string()));
    }
    Ok(())
}
