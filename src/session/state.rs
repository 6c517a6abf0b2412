//! StateStream - the engine's state-changed hook as a serialized stream

use crate::backend::{WalletBackend, WalletState};
use crate::events::{Dispatcher, PushStream, Stream};
use crate::runtime::Shutdown;
use std::sync::Arc;

pub struct StateStream {
    push: PushStream<WalletState>,
}

impl StateStream {
    /// Registers a notifier with the backend. The state is read inside
    /// `notify()`, on the engine's thread, so every raise carries the state
    /// of that moment.
    pub fn attach(
        backend: &Arc<dyn WalletBackend>,
        dispatcher: &Dispatcher,
        capacity: usize,
        shutdown: &Shutdown,
    ) -> Self {
        // the backend owns the notifier; a strong handle here would be a cycle
        let reader = Arc::downgrade(backend);
        let push = PushStream::spawn(dispatcher, capacity, shutdown, move || {
            reader.upgrade().map(|b| b.state()).unwrap_or_default()
        });
        backend.on_state_changed(push.notifier());
        Self { push }
    }

    pub fn stream(&self) -> Stream<WalletState> {
        self.push.stream()
    }

    /// Only the `Started` emissions.
    pub fn started(&self) -> Stream<WalletState> {
        self.push.stream().filter(WalletState::is_started)
    }

    pub fn subscriber_count(&self) -> usize {
        self.push.subscriber_count()
    }

    pub async fn settle(&self) {
        self.push.settle().await;
    }
}
