//! Auth gate - the "logged in" signal of one wallet.
//!
//! Every change is published, repeats included; the session decides which
//! values matter.

use crate::backend::WalletBackend;
use crate::error::SessionResult;
use crate::events::{Dispatcher, Signal, Stream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct AuthGate {
    backend: Arc<dyn WalletBackend>,
    logged_in: AtomicBool,
    signal: Signal<bool>,
}

impl AuthGate {
    pub fn new(backend: Arc<dyn WalletBackend>, dispatcher: Dispatcher) -> Self {
        Self { backend, logged_in: AtomicBool::new(false), signal: Signal::new(dispatcher) }
    }

    /// Hardware and watch-only wallets have no password to check.
    pub fn login(&self, password: &str) -> SessionResult<bool> {
        let key_manager = self.backend.key_manager();
        let accepted = if key_manager.is_hardware_wallet() || key_manager.is_watch_only() {
            true
        } else {
            self.backend.verify_password(password)?
        };
        if accepted {
            tracing::info!(wallet = %self.backend.name(), "logged in");
            self.set_logged_in(true);
        } else {
            tracing::warn!(wallet = %self.backend.name(), "login rejected: wrong password");
        }
        Ok(accepted)
    }

    pub fn logout(&self) {
        tracing::info!(wallet = %self.backend.name(), "logged out");
        self.set_logged_in(false);
    }

    /// Set and publish, even if unchanged.
    pub fn set_logged_in(&self, value: bool) {
        self.logged_in.store(value, Ordering::SeqCst);
        self.signal.publish(value);
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    pub fn logged_in(&self) -> Stream<bool> {
        self.signal.stream()
    }
}
