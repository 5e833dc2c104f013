//! hawser-executor - Event Loop Pool
//!
//! Fixed pools of single-threaded tokio event loops with deterministic
//! endpoint-to-loop routing. A request pinned to an endpoint always runs
//! its timers and callbacks on the same loop.

pub mod event_loop;
pub mod group;

pub use event_loop::{EventLoop, SpawnError};
pub use group::{EventLoopGroup, ExecutorConfig};
