//! On-demand cycle triggering.
//!
//! [`CycleTrigger`] lets callers (a timer, a signal, a request handler) ask
//! for a crawl without waiting for it. Requests go through a single-slot work
//! queue drained by one worker task, and an in-flight flag makes sure at most
//! one cycle is queued or running at any time. Requests arriving while a
//! cycle is in flight are refused, not queued behind it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::CrawlOrchestrator;

/// Result of a trigger request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new cycle was queued.
    Started,
    /// A cycle is already queued or running; nothing was queued.
    AlreadyRunning,
    /// The worker has stopped and no longer accepts work.
    Unavailable,
}

/// Resets the in-flight flag when a cycle ends, even by panic.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Fire-and-forget front end for a [`CrawlOrchestrator`].
#[derive(Debug)]
pub struct CycleTrigger {
    sender: mpsc::Sender<()>,
    in_flight: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

impl CycleTrigger {
    /// Spawns the worker task that runs cycles for `orchestrator`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(orchestrator: Arc<CrawlOrchestrator>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<()>(1);
        let in_flight = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&in_flight);

        let worker = tokio::spawn(async move {
            while receiver.recv().await.is_some() {
                let _guard = InFlightGuard(&flag);
                let stats = orchestrator.run_cycle().await;
                info!(
                    saved = stats.saved(),
                    empty = stats.empty(),
                    failed = stats.failed(),
                    "triggered cycle finished"
                );
            }
            debug!("cycle worker stopped");
        });

        Self {
            sender,
            in_flight,
            worker,
        }
    }

    /// Requests a cycle without waiting for it.
    pub fn trigger(&self) -> TriggerOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("cycle already in flight; trigger ignored");
            return TriggerOutcome::AlreadyRunning;
        }

        match self.sender.try_send(()) {
            Ok(()) => {
                info!("crawl cycle triggered");
                TriggerOutcome::Started
            }
            // A queued request will clear the flag when it runs.
            Err(TrySendError::Full(())) => TriggerOutcome::AlreadyRunning,
            Err(TrySendError::Closed(())) => {
                self.in_flight.store(false, Ordering::SeqCst);
                warn!("cycle worker is gone; trigger refused");
                TriggerOutcome::Unavailable
            }
        }
    }

    /// Returns true while a cycle is queued or running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Stops accepting work and waits for the in-flight cycle, if any.
    pub async fn shutdown(self) {
        let Self { sender, worker, .. } = self;
        drop(sender);
        if let Err(e) = worker.await {
            warn!(error = %e, "cycle worker panicked");
        }
    }
}
