//! Signal / Stream - explicit publish/subscribe on the dispatcher
//!
//! ```text
//! publish(v) ──► watermark = next subscriber id
//!            └─► dispatcher job: call every handler with id < watermark
//! ```
//!
//! A subscriber attached after `publish` returns never sees that value.
//! Nothing is replayed.

use super::dispatcher::Dispatcher;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// What a handler wants after seeing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Continue,
    /// Detach this handler; it will not be called again.
    Retire,
}

type Handler<T> = Arc<dyn Fn(&T) -> Delivery + Send + Sync>;
type SubscribeFn<T> = dyn Fn(Handler<T>) -> Subscription + Send + Sync;

struct Registry<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

fn lock<T>(registry: &Mutex<Registry<T>>) -> MutexGuard<'_, Registry<T>> {
    registry.lock().unwrap_or_else(|p| p.into_inner())
}

/// Hot multi-subscriber event source.
pub struct Signal<T> {
    registry: Arc<Mutex<Registry<T>>>,
    dispatcher: Dispatcher,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self { registry: self.registry.clone(), dispatcher: self.dispatcher.clone() }
    }
}

impl<T: Send + Sync + 'static> Signal<T> {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry { next_id: 0, handlers: Vec::new() })),
            dispatcher,
        }
    }

    /// Queue `value` for everyone attached right now.
    pub fn publish(&self, value: T) {
        let watermark = lock(&self.registry).next_id;
        let registry = self.registry.clone();
        if !self.dispatcher.post(move || deliver(&registry, &value, watermark)) {
            tracing::debug!("publish after dispatcher stopped; value dropped");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).handlers.len()
    }

    pub fn stream(&self) -> Stream<T> {
        let registry = self.registry.clone();
        Stream {
            subscribe: Arc::new(move |handler: Handler<T>| attach(&registry, handler)),
        }
    }
}

fn attach<T: Send + Sync + 'static>(registry: &Arc<Mutex<Registry<T>>>, handler: Handler<T>) -> Subscription {
    let id = {
        let mut guard = lock(registry);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.handlers.push((id, handler));
        id
    };
    let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(registry);
    Subscription::new(move || {
        if let Some(registry) = weak.upgrade() {
            lock(&registry).handlers.retain(|(hid, _)| *hid != id);
        }
    })
}

fn deliver<T>(registry: &Mutex<Registry<T>>, value: &T, watermark: u64) {
    // Call handlers without holding the lock so they may (un)subscribe.
    let targets: Vec<(u64, Handler<T>)> = lock(registry)
        .handlers
        .iter()
        .filter(|(id, _)| *id < watermark)
        .cloned()
        .collect();
    let retired: Vec<u64> = targets
        .into_iter()
        .filter_map(|(id, handler)| (handler(value) == Delivery::Retire).then_some(id))
        .collect();
    if !retired.is_empty() {
        lock(registry).handlers.retain(|(id, _)| !retired.contains(id));
    }
}

/// Read-only view of a signal, possibly mapped or filtered.
pub struct Stream<T> {
    subscribe: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self { subscribe: self.subscribe.clone() }
    }
}

impl<T: 'static> Stream<T> {
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.subscribe_until(move |value| {
            handler(value);
            Delivery::Continue
        })
    }

    /// Like `subscribe`, but the handler decides when to detach.
    pub fn subscribe_until(&self, handler: impl Fn(&T) -> Delivery + Send + Sync + 'static) -> Subscription {
        (self.subscribe)(Arc::new(handler))
    }

    /// Projection evaluated in the same delivery as the source value.
    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + Send + Sync + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Arc::new(f);
        Stream {
            subscribe: Arc::new(move |handler: Handler<U>| {
                let f = f.clone();
                source.subscribe_until(move |value| handler(&f(value)))
            }),
        }
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Stream<T> {
        let source = self.clone();
        let predicate = Arc::new(predicate);
        Stream {
            subscribe: Arc::new(move |handler: Handler<T>| {
                let predicate = predicate.clone();
                source.subscribe_until(move |value| {
                    if predicate(value) { handler(value) } else { Delivery::Continue }
                })
            }),
        }
    }
}

/// Detaches its handler on `unsubscribe()` or drop.
#[must_use = "dropping a Subscription detaches the handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() { cancel(); }
    }

    /// Keep the handler attached for as long as the signal lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() { cancel(); }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
    }
}
