//! Dispatcher - the one serialized context every subscriber runs on
//!
//! A single tokio task drains a FIFO job queue. Two jobs never run at the same
//! time, so subscriber state needs no extra locking.

use crate::runtime::Shutdown;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl Dispatcher {
    /// Spawn the dispatch loop on the current runtime.
    pub fn spawn(shutdown: &Shutdown) -> Self {
        Self::spawn_on(&tokio::runtime::Handle::current(), shutdown)
    }

    pub fn spawn_on(handle: &tokio::runtime::Handle, shutdown: &Shutdown) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let stopped = shutdown.triggered();
        handle.spawn(async move {
            tokio::pin!(stopped);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    job = rx.recv() => match job {
                        Some(job) => run(job),
                        None => break,
                    },
                }
            }
            tracing::debug!("session dispatcher stopped");
        });
        Self { tx }
    }

    /// Queue `job` behind everything already posted. Returns false once the
    /// loop has stopped.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(job)).is_ok()
    }

    /// Resolve after every job posted before this call has run.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.post(move || {
            let _ = done.send(());
        }) {
            let _ = wait.await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn run(job: Job) {
    if catch_unwind(AssertUnwindSafe(job)).is_err() {
        tracing::error!("subscriber panicked; dispatcher continues");
    }
}
