//! Push adapter - backend callbacks in, serialized stream out
//!
//! ```text
//! engine thread ──notify()──► read current value ──► bounded queue ──► forwarder task
//!                                                   (overflow, in order)       │
//!                                                                              ▼
//!                                                              Signal::publish (dispatcher)
//! ```
//!
//! The value is taken when `notify()` runs, on the caller's thread, so a burst
//! of notifications yields one value per notification. Nothing is dropped and
//! `notify()` never blocks: when the queue is full, notices wait in an ordered
//! overflow that a task drains into the queue.

use super::dispatcher::Dispatcher;
use super::signal::{Signal, Stream};
use crate::runtime::Shutdown;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

enum Notice<T> {
    Changed(T),
    Barrier(oneshot::Sender<()>),
}

struct Overflow<T> {
    queue: VecDeque<Notice<T>>,
    draining: bool,
}

/// Ordered entry into the forwarder queue.
struct Outbox<T> {
    tx: mpsc::Sender<Notice<T>>,
    overflow: Mutex<Overflow<T>>,
    runtime: Handle,
}

impl<T: Send + 'static> Outbox<T> {
    fn lock(&self) -> MutexGuard<'_, Overflow<T>> {
        self.overflow.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// `make` runs under the lock: creation order is queue order.
    fn push(self: &Arc<Self>, make: impl FnOnce() -> Notice<T>) {
        let mut overflow = self.lock();
        let mut notice = make();
        if !overflow.draining {
            match self.tx.try_send(notice) {
                Ok(()) => return,
                Err(TrySendError::Closed(_)) => {
                    tracing::trace!("notification after stream closed");
                    return;
                }
                Err(TrySendError::Full(full)) => notice = full,
            }
        }
        overflow.queue.push_back(notice);
        if !overflow.draining {
            overflow.draining = true;
            tracing::debug!("notification queue full; draining overflow");
            let outbox = self.clone();
            self.runtime.spawn(async move { outbox.drain().await });
        }
    }

    async fn drain(&self) {
        loop {
            let next = {
                let mut overflow = self.lock();
                match overflow.queue.pop_front() {
                    Some(notice) => notice,
                    None => {
                        overflow.draining = false;
                        return;
                    }
                }
            };
            if self.tx.send(next).await.is_err() {
                let mut overflow = self.lock();
                overflow.queue.clear();
                overflow.draining = false;
                return;
            }
        }
    }
}

trait Raise: Send + Sync {
    fn raise(&self);
    fn is_closed(&self) -> bool;
}

struct Source<T> {
    outbox: Arc<Outbox<T>>,
    read: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T: Send + 'static> Raise for Source<T> {
    fn raise(&self) {
        let read = self.read.clone();
        self.outbox.push(move || Notice::Changed(read()));
    }

    fn is_closed(&self) -> bool {
        self.outbox.tx.is_closed()
    }
}

/// Cheap handle handed to the backend's raw notification hook.
#[derive(Clone)]
pub struct Notifier {
    source: Arc<dyn Raise>,
}

impl Notifier {
    /// Callable from any thread. Reads the current value before returning.
    pub fn notify(&self) {
        self.source.raise();
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_closed()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").field("closed", &self.is_closed()).finish()
    }
}

/// Multi-subscriber stream fed by a `Notifier`.
pub struct PushStream<T> {
    signal: Signal<T>,
    outbox: Arc<Outbox<T>>,
    notifier: Notifier,
    dispatcher: Dispatcher,
}

impl<T: Send + Sync + 'static> PushStream<T> {
    /// Spawn the forwarder on the current runtime. It stops on `shutdown` or
    /// when every notifier is gone.
    pub fn spawn(
        dispatcher: &Dispatcher,
        capacity: usize,
        shutdown: &Shutdown,
        read: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel(capacity.max(1));
        let signal = Signal::new(dispatcher.clone());
        let out = signal.clone();
        let barrier_dispatcher = dispatcher.clone();
        let stopped = shutdown.triggered();
        let runtime = Handle::current();
        runtime.spawn(async move {
            tokio::pin!(stopped);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    notice = rx.recv() => match notice {
                        Some(Notice::Changed(value)) => out.publish(value),
                        Some(Notice::Barrier(done)) => {
                            barrier_dispatcher.post(move || {
                                let _ = done.send(());
                            });
                        }
                        None => break,
                    },
                }
            }
            tracing::debug!("push stream forwarder stopped");
        });
        let outbox = Arc::new(Outbox {
            tx,
            overflow: Mutex::new(Overflow { queue: VecDeque::new(), draining: false }),
            runtime,
        });
        let source: Arc<dyn Raise> = Arc::new(Source { outbox: outbox.clone(), read: Arc::new(read) });
        Self { signal, outbox, notifier: Notifier { source }, dispatcher: dispatcher.clone() }
    }

    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    pub fn stream(&self) -> Stream<T> {
        self.signal.stream()
    }

    pub fn subscriber_count(&self) -> usize {
        self.signal.subscriber_count()
    }

    /// Resolve once everything notified before this call has been delivered.
    pub async fn settle(&self) {
        let (done, wait) = oneshot::channel();
        self.outbox.push(move || Notice::Barrier(done));
        if wait.await.is_err() {
            self.dispatcher.flush().await;
        }
    }
}
