//! Read models handed out by a session.

use crate::backend::{total_amount, Coin, KeyManager, WalletBackend};
use crate::core::amount::{Amount, AmountProvider};
use crate::core::network::Network;
use crate::error::SessionResult;
use bitcoin::CompressedPublicKey;
use serde::Serialize;
use std::sync::Arc;

/// A freshly derived receive address.
#[derive(Clone)]
pub struct Address {
    key_manager: Arc<dyn KeyManager>,
    pubkey: CompressedPublicKey,
    network: Network,
}

impl Address {
    pub fn new(key_manager: Arc<dyn KeyManager>, pubkey: CompressedPublicKey, network: Network) -> Self {
        Self { key_manager, pubkey, network }
    }

    pub fn pubkey(&self) -> &CompressedPublicKey { &self.pubkey }
    pub fn network(&self) -> Network { self.network }
    pub fn key_manager(&self) -> &Arc<dyn KeyManager> { &self.key_manager }

    /// Native segwit (P2WPKH) encoding for the wallet's network.
    pub fn text(&self) -> String {
        bitcoin::Address::p2wpkh(&self.pubkey, self.network.to_bitcoin()).to_string()
    }

    pub fn labels(&self) -> Vec<String> {
        self.key_manager.labels_of(&self.pubkey)
    }

    pub fn hide(&self) -> SessionResult<()> {
        self.key_manager.hide_key(&self.pubkey)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Address").field("text", &self.text()).field("network", &self.network).finish()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.pubkey == other.pubkey && self.network == other.network
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletInfo {
    pub network: Network,
    pub is_hardware_wallet: bool,
    pub is_watch_only: bool,
    pub master_fingerprint: Option<String>,
    pub extended_account_public_key: Option<String>,
    pub account_key_path: Option<String>,
}

impl WalletInfo {
    pub(crate) fn read(backend: &dyn WalletBackend) -> Self {
        let km = backend.key_manager();
        Self {
            network: backend.network(),
            is_hardware_wallet: km.is_hardware_wallet(),
            is_watch_only: km.is_watch_only(),
            master_fingerprint: km.master_fingerprint(),
            extended_account_public_key: km.extended_account_public_key(),
            account_key_path: km.account_key_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletStats {
    pub coin_count: usize,
    pub balance: Amount,
    pub confirmed_balance: Amount,
    pub unconfirmed_balance: Amount,
    pub generated_keys: usize,
    pub clean_keys: usize,
    pub locked_keys: usize,
    pub used_keys: usize,
    pub transaction_count: usize,
}

impl WalletStats {
    /// One coin snapshot feeds every balance figure.
    pub(crate) fn read(backend: &dyn WalletBackend, provider: &dyn AmountProvider) -> Self {
        let coins = backend.coins();
        let (confirmed, unconfirmed): (Vec<Coin>, Vec<Coin>) = coins.iter().cloned().partition(|c| c.confirmed);
        let keys = backend.key_manager().key_counts();
        Self {
            coin_count: coins.len(),
            balance: provider.create(total_amount(&coins)),
            confirmed_balance: provider.create(total_amount(&confirmed)),
            unconfirmed_balance: provider.create(total_amount(&unconfirmed)),
            generated_keys: keys.generated,
            clean_keys: keys.clean,
            locked_keys: keys.locked,
            used_keys: keys.used,
            transaction_count: backend.transaction_count(),
        }
    }
}

/// Live view over the backend's coin set.
pub struct WalletCoins {
    backend: Arc<dyn WalletBackend>,
    provider: Arc<dyn AmountProvider>,
}

impl WalletCoins {
    pub(crate) fn new(backend: Arc<dyn WalletBackend>, provider: Arc<dyn AmountProvider>) -> Self {
        tracing::debug!(wallet = %backend.name(), "coins view created");
        Self { backend, provider }
    }

    pub fn list(&self) -> Vec<Coin> {
        self.backend.coins()
    }

    pub fn count(&self) -> usize {
        self.backend.coins().len()
    }

    pub fn total(&self) -> Amount {
        self.provider.create(total_amount(&self.backend.coins()))
    }

    pub fn confirmed_total(&self) -> Amount {
        let confirmed: Vec<Coin> = self.backend.coins().into_iter().filter(|c| c.confirmed).collect();
        self.provider.create(total_amount(&confirmed))
    }
}
