//! Single-threaded event loops and their handles.
//!
//! Each loop is one OS thread running a current-thread tokio runtime that
//! drains an unbounded task queue. Tasks submitted to the same loop share
//! that thread and interleave at await points.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::debug;

pub(crate) type BoxTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Task submission failed because the loop's thread has exited.
#[derive(Debug, Clone, Error)]
#[error("event loop {id} is no longer running")]
pub struct SpawnError {
    /// Index of the loop within its group.
    pub id: usize,
}

/// Cloneable handle to one event loop in a group.
#[derive(Debug, Clone)]
pub struct EventLoop {
    id: usize,
    tasks: mpsc::UnboundedSender<BoxTask>,
}

impl EventLoop {
    pub(crate) fn new(id: usize, tasks: mpsc::UnboundedSender<BoxTask>) -> Self {
        Self { id, tasks }
    }

    /// Index of this loop within its group, stable for the group lifetime.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Submit a future to run on this loop.
    pub fn spawn<F>(&self, future: F) -> Result<(), SpawnError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks
            .send(Box::pin(future))
            .map_err(|_| SpawnError { id: self.id })
    }
}

impl PartialEq for EventLoop {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tasks.same_channel(&other.tasks)
    }
}

impl Eq for EventLoop {}

/// Thread main for one loop: drain the queue until shutdown.
///
/// Spawned tasks still pending when the loop stops are dropped with the
/// runtime.
pub(crate) fn run(
    id: usize,
    runtime: tokio::runtime::Runtime,
    mut tasks: mpsc::UnboundedReceiver<BoxTask>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(id, "event loop started");
    runtime.block_on(async move {
        loop {
            tokio::select! {
                task = tasks.recv() => match task {
                    Some(task) => {
                        tokio::spawn(task);
                    }
                    None => break,
                },
                _ = shutdown.changed() => break,
            }
        }
    });
    debug!(id, "event loop stopped");
}
