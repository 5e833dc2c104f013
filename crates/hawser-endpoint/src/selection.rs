//! Pluggable endpoint selection strategies.
//!
//! A [`SelectionStrategy`] picks an index into a group's current snapshot.
//! The whole snapshot is passed on every call, so a refresh that replaces
//! the membership simply changes what the next pick sees.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use crate::Endpoint;

/// Per-request hint forwarded to strategies.
///
/// Round-robin and weighted-random ignore it; affinity-style strategies can
/// key off the request identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionHint<'a> {
    pub method: Option<&'a str>,
    pub path: Option<&'a str>,
}

/// Picks one endpoint out of a snapshot.
pub trait SelectionStrategy: Send + Sync {
    /// Index of the chosen endpoint, or `None` when `endpoints` is empty.
    fn pick(&self, endpoints: &[Endpoint], hint: SelectionHint<'_>) -> Option<usize>;

    /// Strategy name for logs.
    fn name(&self) -> &'static str;
}

/// Cycles through the snapshot in membership order.
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for RoundRobin {
    fn pick(&self, endpoints: &[Endpoint], _hint: SelectionHint<'_>) -> Option<usize> {
        if endpoints.is_empty() {
            return None;
        }
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Some(n % endpoints.len())
    }

    fn name(&self) -> &'static str {
        "round-robin"
    }
}

/// Draws endpoints with probability proportional to their weight.
///
/// Zero-weight endpoints are skipped while any positive weight exists; a
/// snapshot whose weights are all zero degrades to a uniform draw.
#[derive(Debug, Default)]
pub struct WeightedRandom;

impl WeightedRandom {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionStrategy for WeightedRandom {
    fn pick(&self, endpoints: &[Endpoint], _hint: SelectionHint<'_>) -> Option<usize> {
        if endpoints.is_empty() {
            return None;
        }
        let total: u64 = endpoints.iter().map(|e| u64::from(e.weight())).sum();
        let mut rng = rand::rng();
        if total == 0 {
            return Some(rng.random_range(0..endpoints.len()));
        }
        let mut draw = rng.random_range(0..total);
        for (i, endpoint) in endpoints.iter().enumerate() {
            let weight = u64::from(endpoint.weight());
            if draw < weight {
                return Some(i);
            }
            draw -= weight;
        }
        Some(endpoints.len() - 1)
    }

    fn name(&self) -> &'static str {
        "weighted-random"
    }
}
