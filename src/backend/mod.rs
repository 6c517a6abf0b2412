//! Backend - the wallet engine as seen by a session
//!
//! Implemented by the wallet engine, never by this crate. Key derivation,
//! encryption, sync and coin selection stay behind these traits.
//!
//! # Notifications
//!
//! | Hook | Fires when | Payload |
//! |------|-----------|---------|
//! | `on_state_changed` | engine state moved | none, read `state()` |
//! | `on_transaction_processed` | coin set changed | none, read `coins()` |
//!
//! `notify()` calls `state()` / `coins()` before it returns. Raise hooks
//! after the new value is visible and without holding locks those getters take.

use crate::core::Network;
use crate::error::SessionResult;
use crate::events::Notifier;
use bitcoin::CompressedPublicKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type WalletId = u32;

/// Engine lifecycle. Only `Started` means anything to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletState {
    #[default]
    Uninitialized,
    WaitingForInit,
    Initialized,
    Starting,
    Started,
    Stopping,
    Stopped,
}

impl WalletState {
    pub fn is_started(&self) -> bool {
        *self == WalletState::Started
    }
}

/// Label ranking query context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent { Receive, Send }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    pub txid: String,
    pub vout: u32,
    pub amount: bitcoin::Amount,
    pub confirmed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeyCounts {
    pub generated: usize,
    pub clean: usize,
    pub locked: usize,
    pub used: usize,
}

/// Key manager capabilities and metadata.
pub trait KeyManager: Send + Sync {
    fn is_hardware_wallet(&self) -> bool;
    fn is_watch_only(&self) -> bool;
    fn master_fingerprint(&self) -> Option<String> { None }
    fn extended_account_public_key(&self) -> Option<String> { None }
    fn account_key_path(&self) -> Option<String> { None }
    fn key_counts(&self) -> KeyCounts { KeyCounts::default() }
    fn labels_of(&self, pubkey: &CompressedPublicKey) -> Vec<String>;
    /// Mark a generated key as not to be shown again.
    fn hide_key(&self, pubkey: &CompressedPublicKey) -> SessionResult<()>;
}

pub trait WalletBackend: Send + Sync {
    fn id(&self) -> WalletId;
    fn name(&self) -> String;
    /// Only called after the wallet files were moved.
    fn set_name(&self, name: &str);
    fn network(&self) -> Network;
    fn state(&self) -> WalletState;

    /// Register the raw state-changed hook.
    fn on_state_changed(&self, notifier: Notifier);
    /// Register the raw transaction-processed hook.
    fn on_transaction_processed(&self, notifier: Notifier);

    /// Snapshot of current coins. Must not tear under concurrent updates.
    fn coins(&self) -> Vec<Coin>;
    fn transaction_count(&self) -> usize { 0 }

    fn key_manager(&self) -> Arc<dyn KeyManager>;
    fn next_receive_address(&self, labels: &[String]) -> SessionResult<CompressedPublicKey>;
    fn labels_with_ranking(&self, intent: Intent) -> Vec<(String, u32)>;

    /// `Ok(false)` on wrong password.
    fn verify_password(&self, password: &str) -> SessionResult<bool>;
}

pub fn total_amount(coins: &[Coin]) -> bitcoin::Amount {
    bitcoin::Amount::from_sat(coins.iter().map(|c| c.amount.to_sat()).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(sats: u64, confirmed: bool) -> Coin {
        Coin { txid: "00".repeat(32), vout: 0, amount: bitcoin::Amount::from_sat(sats), confirmed }
    }

    #[test]
    fn total_sums_all_coins() {
        assert_eq!(total_amount(&[]), bitcoin::Amount::ZERO);
        assert_eq!(total_amount(&[coin(5, true), coin(7, false)]).to_sat(), 12);
    }

    #[test]
    fn only_started_is_started() {
        assert!(WalletState::Started.is_started());
        assert!(!WalletState::Starting.is_started());
        assert!(!WalletState::default().is_started());
    }
}
