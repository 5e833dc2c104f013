//! Fixed pools of event loops with deterministic endpoint routing.
//!
//! A group spins up `workers` OS threads at construction. Requests are
//! pinned to a loop by hashing the endpoint's host and port, so one
//! destination always lands on the same loop for the process lifetime.
//! The pool size never changes after construction.

use std::io;
use std::thread::JoinHandle;

use hawser_endpoint::Endpoint;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::event_loop::{self, EventLoop};

/// Pool sizing and thread naming.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of event loops; 0 means one per available core.
    pub workers: usize,
    /// Loop thread names are this prefix suffixed with the loop index.
    pub thread_name_prefix: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            thread_name_prefix: "hawser-loop".to_string(),
        }
    }
}

impl ExecutorConfig {
    fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Fixed-size pool of single-threaded event loops.
#[derive(Debug)]
pub struct EventLoopGroup {
    loops: Box<[EventLoop]>,
    threads: Vec<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl EventLoopGroup {
    /// Pool with default sizing.
    pub fn new() -> io::Result<Self> {
        Self::with_config(ExecutorConfig::default())
    }

    /// Pool sized and named per `config`.
    ///
    /// Fails when a runtime cannot be built or a loop thread cannot be
    /// spawned.
    pub fn with_config(config: ExecutorConfig) -> io::Result<Self> {
        let workers = config.effective_workers();
        let (shutdown, _) = watch::channel(false);
        let mut loops = Vec::with_capacity(workers);
        let mut threads = Vec::with_capacity(workers);

        for id in 0..workers {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let (tx, rx) = mpsc::unbounded_channel();
            let shutdown_rx = shutdown.subscribe();
            let thread = std::thread::Builder::new()
                .name(format!("{}-{id}", config.thread_name_prefix))
                .spawn(move || event_loop::run(id, runtime, rx, shutdown_rx))?;
            loops.push(EventLoop::new(id, tx));
            threads.push(thread);
        }

        info!(workers, "event loop group started");
        Ok(Self {
            loops: loops.into_boxed_slice(),
            threads,
            shutdown,
        })
    }

    /// Deterministic loop for `endpoint`: same host and port, same loop.
    pub fn select(&self, endpoint: &Endpoint) -> &EventLoop {
        &self.loops[route(endpoint, self.loops.len())]
    }

    /// All loop handles, in index order.
    pub fn loops(&self) -> &[EventLoop] {
        &self.loops
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Signal every loop and wait for the threads to finish.
    ///
    /// Tasks that have not completed are dropped. Later `spawn` calls on
    /// surviving handles fail with `SpawnError`.
    pub fn shutdown(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        if self.threads.is_empty() {
            return;
        }
        let _ = self.shutdown.send(true);
        for thread in self.threads.drain(..) {
            if thread.join().is_err() {
                warn!("event loop thread panicked during shutdown");
            }
        }
        info!("event loop group stopped");
    }
}

impl Drop for EventLoopGroup {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Route an endpoint to a loop index.
///
/// FNV-1a over the lowercased host bytes and the big-endian port, reduced
/// modulo the pool size. Host case is folded the same way `Endpoint`'s
/// `Hash` impl folds it, so equal endpoints land on the same loop. Weight
/// and attributes never participate.
fn route(endpoint: &Endpoint, pool_size: usize) -> usize {
    if pool_size <= 1 {
        return 0;
    }
    let mut hash = FNV_OFFSET;
    for byte in endpoint.host().bytes() {
        hash = fnv1a_step(hash, byte.to_ascii_lowercase());
    }
    for byte in endpoint.port().to_be_bytes() {
        hash = fnv1a_step(hash, byte);
    }
    (hash as usize) % pool_size
}

fn fnv1a_step(hash: u32, byte: u8) -> u32 {
    (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
}
