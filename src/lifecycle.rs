//! Request lifecycle: terminal transitions, the timeout flag, the watchdog.
//!
//! A context is born READY (or TIMED_OUT when forced by its builder) and
//! ends in exactly one of COMPLETED or CANCELLED. All transitions run
//! through one watch channel, so concurrent attempts race inside the
//! channel's write lock and a single writer wins; the rest become no-ops.
//! The timeout flag is monotonic: once a deadline fires it stays set, even
//! if the request later completes or is cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

/// Observable lifecycle phase of a request context.
///
/// The building phase never escapes the builder, so it has no variant
/// here; a context value exists from `Ready` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// Built and usable; no terminal transition yet.
    Ready,
    /// The deadline fired, or the context was built pre-timed-out.
    TimedOut,
    /// The request finished with a response.
    Completed,
    /// The request was cancelled before completing.
    Cancelled,
}

impl RequestPhase {
    /// Completed or cancelled; no further transition can apply.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestPhase::Completed | RequestPhase::Cancelled)
    }
}

#[derive(Debug)]
pub(crate) struct Lifecycle {
    phase: watch::Sender<RequestPhase>,
    timed_out: AtomicBool,
}

impl Lifecycle {
    pub(crate) fn new(timed_out: bool) -> Self {
        let initial = if timed_out {
            RequestPhase::TimedOut
        } else {
            RequestPhase::Ready
        };
        let (phase, _) = watch::channel(initial);
        Self {
            phase,
            timed_out: AtomicBool::new(timed_out),
        }
    }

    pub(crate) fn phase(&self) -> RequestPhase {
        *self.phase.borrow()
    }

    pub(crate) fn is_timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Acquire)
    }

    /// READY -> TIMED_OUT, setting the monotonic timeout flag.
    pub(crate) fn try_timeout(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == RequestPhase::Ready {
                *phase = RequestPhase::TimedOut;
                self.timed_out.store(true, Ordering::Release);
                true
            } else {
                false
            }
        })
    }

    /// READY | TIMED_OUT -> COMPLETED. The timeout flag is left as is.
    pub(crate) fn try_complete(&self) -> bool {
        self.transition_to(RequestPhase::Completed)
    }

    /// READY | TIMED_OUT -> CANCELLED. The timeout flag is left as is.
    pub(crate) fn try_cancel(&self) -> bool {
        self.transition_to(RequestPhase::Cancelled)
    }

    fn transition_to(&self, target: RequestPhase) -> bool {
        self.phase.send_if_modified(|phase| {
            if phase.is_terminal() {
                false
            } else {
                *phase = target;
                true
            }
        })
    }

    /// Resolves when cancellation is requested: the deadline fired or the
    /// request was cancelled. Never resolves for requests that complete
    /// normally.
    pub(crate) async fn cancellation_requested(&self) {
        let mut rx = self.phase.subscribe();
        if rx
            .wait_for(|phase| matches!(phase, RequestPhase::TimedOut | RequestPhase::Cancelled))
            .await
            .is_err()
        {
            // Sender gone without a cancellation; stay pending.
            std::future::pending::<()>().await;
        }
    }

    fn subscribe(&self) -> watch::Receiver<RequestPhase> {
        self.phase.subscribe()
    }
}

/// Deadline watchdog, run on the context's own event loop.
///
/// Marks the lifecycle timed out once `after` elapses. Disarms silently
/// when a terminal transition wins first; a timer that fires late is a
/// no-op.
pub(crate) async fn watchdog(id: Uuid, lifecycle: Arc<Lifecycle>, after: Duration) {
    let mut rx = lifecycle.subscribe();
    tokio::select! {
        _ = tokio::time::sleep(after) => {
            if lifecycle.try_timeout() {
                debug!(ctx = %id, timeout_ms = after.as_millis() as u64, "request deadline fired");
            }
        }
        _ = rx.wait_for(|phase| *phase != RequestPhase::Ready) => {}
    }
}
