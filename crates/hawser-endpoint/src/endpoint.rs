//! Endpoint identity, authority parsing, and URI rendering.
//!
//! An [`Endpoint`] names one destination a request can be routed to: host,
//! port, an advisory selection weight, and free-form string attributes.
//! Identity is host + port only; weight and attributes are routing metadata
//! and never participate in equality or hashing.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// URI scheme a request is addressed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    /// Scheme name as it appears in a URI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Port implied when an authority omits one.
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(EndpointParseError::UnknownScheme(s.to_string())),
        }
    }
}

/// Failure to parse an authority or scheme string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointParseError {
    #[error("authority {0:?} has an empty host")]
    EmptyHost(String),
    #[error("authority {0:?} is missing a port")]
    MissingPort(String),
    #[error("authority {0:?} has an invalid port")]
    InvalidPort(String),
    #[error("unknown scheme {0:?}")]
    UnknownScheme(String),
}

/// One destination a request can be routed to.
///
/// Two endpoints are equal when host and port match; the host comparison is
/// ASCII case-insensitive. Weight defaults to 1 and only influences
/// weight-aware selection strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(deserialize_with = "lowercase_host")]
    host: String,
    port: u16,
    #[serde(default = "default_weight")]
    weight: u32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    attributes: HashMap<String, String>,
}

fn default_weight() -> u32 {
    1
}

// Deserialized hosts get the same normalization as `Endpoint::new`.
fn lowercase_host<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut host = String::deserialize(deserializer)?;
    host.make_ascii_lowercase();
    Ok(host)
}

impl Endpoint {
    /// New endpoint with weight 1 and no attributes.
    ///
    /// The host is normalized to lowercase ASCII.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let mut host = host.into();
        host.make_ascii_lowercase();
        Self {
            host,
            port,
            weight: 1,
            attributes: HashMap::new(),
        }
    }

    /// Parse a `"host:port"` authority.
    pub fn parse(authority: &str) -> Result<Self, EndpointParseError> {
        let Some((host, port)) = authority.rsplit_once(':') else {
            return Err(EndpointParseError::MissingPort(authority.to_string()));
        };
        if host.is_empty() {
            return Err(EndpointParseError::EmptyHost(authority.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| EndpointParseError::InvalidPort(authority.to_string()))?;
        Ok(Self::new(host, port))
    }

    /// Replace the advisory weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Attach one attribute, replacing any previous value under `key`.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Attribute value under `key`, if set.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// `"host:port"`.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Render an absolute URI for `path` against this endpoint.
    ///
    /// The port is elided when it matches the scheme default, so
    /// `("example.com", 80)` renders as `http://example.com/`.
    pub fn uri(&self, scheme: Scheme, path: &str) -> String {
        if self.port == scheme.default_port() {
            format!("{}://{}{}", scheme, self.host, path)
        } else {
            format!("{}://{}:{}{}", scheme, self.host, self.port, path)
        }
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.port == other.port && self.host.eq_ignore_ascii_case(&other.host)
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.host.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u16(self.port);
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
