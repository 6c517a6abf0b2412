//! BalanceProjector - transaction feed → `Amount` stream
//!
//! ```text
//! on_transaction_processed ──► read coins() ──► AmountProvider ──► balances
//!                                                                    │ map
//!                                                                    ▼
//!                                                               has_balance
//! ```
//!
//! The coin total is read inside `notify()`, once per transaction event.
//! `has_balance` is a projection of each published `Amount`, delivered in the
//! same dispatcher job. It never reads the backend on its own.

use crate::backend::{total_amount, WalletBackend};
use crate::core::amount::{Amount, AmountProvider};
use crate::events::{Dispatcher, PushStream, Stream};
use crate::runtime::Shutdown;
use std::sync::Arc;

pub struct BalanceProjector {
    push: PushStream<Amount>,
}

impl BalanceProjector {
    pub fn attach(
        backend: &Arc<dyn WalletBackend>,
        provider: Arc<dyn AmountProvider>,
        dispatcher: &Dispatcher,
        capacity: usize,
        shutdown: &Shutdown,
    ) -> Self {
        let reader = Arc::downgrade(backend);
        let push = PushStream::spawn(dispatcher, capacity, shutdown, move || {
            let coins = reader.upgrade().map(|b| b.coins()).unwrap_or_default();
            let total = total_amount(&coins);
            tracing::trace!(sats = total.to_sat(), "balance read");
            provider.create(total)
        });
        backend.on_transaction_processed(push.notifier());
        Self { push }
    }

    pub fn balances(&self) -> Stream<Amount> {
        self.push.stream()
    }

    pub fn has_balance(&self) -> Stream<bool> {
        self.push.stream().map(Amount::has_balance)
    }

    pub async fn settle(&self) {
        self.push.settle().await;
    }
}
