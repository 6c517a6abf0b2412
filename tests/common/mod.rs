//! Shared fixtures: an in-memory engine, a counting load workflow and a
//! filesystem mover that can fail on the backup directory.

#![allow(dead_code)]

use beewallet_session::session::{FileMover, StdFileMover};
use beewallet_session::{
    AppContext, Coin, Intent, KeyCounts, KeyManager, LoadPhase, LoadWorkflow, Network, Notifier,
    SessionConfig, SessionError, SessionResult, UsdAmountProvider, WalletBackend, WalletId, WalletState,
};
use bitcoin::CompressedPublicKey;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// secp256k1 generator point.
pub const TEST_PUBKEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
pub const TEST_ADDRESS: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

pub fn test_pubkey() -> CompressedPublicKey {
    CompressedPublicKey::from_slice(&hex::decode(TEST_PUBKEY).expect("hex")).expect("pubkey")
}

// =============================================================================
// Key manager
// =============================================================================

#[derive(Default)]
pub struct FakeKeyManager {
    pub hardware: bool,
    pub watch_only: bool,
    pub labels: Mutex<Vec<(CompressedPublicKey, Vec<String>)>>,
    pub hidden: Mutex<Vec<CompressedPublicKey>>,
}

impl KeyManager for FakeKeyManager {
    fn is_hardware_wallet(&self) -> bool { self.hardware }
    fn is_watch_only(&self) -> bool { self.watch_only }
    fn master_fingerprint(&self) -> Option<String> { Some("73c5da0a".into()) }
    fn account_key_path(&self) -> Option<String> { Some("m/84'/0'/0'".into()) }
    fn key_counts(&self) -> KeyCounts {
        KeyCounts { generated: 21, clean: 20, locked: 0, used: 1 }
    }

    fn labels_of(&self, pubkey: &CompressedPublicKey) -> Vec<String> {
        self.labels
            .lock()
            .unwrap()
            .iter()
            .find(|(pk, _)| pk == pubkey)
            .map(|(_, labels)| labels.clone())
            .unwrap_or_default()
    }

    fn hide_key(&self, pubkey: &CompressedPublicKey) -> SessionResult<()> {
        self.hidden.lock().unwrap().push(*pubkey);
        Ok(())
    }
}

// =============================================================================
// Backend
// =============================================================================

pub struct FakeBackend {
    name: Mutex<String>,
    state: Mutex<WalletState>,
    coins: Mutex<Vec<Coin>>,
    state_hook: Mutex<Option<Notifier>>,
    tx_hook: Mutex<Option<Notifier>>,
    pub key_manager: Arc<FakeKeyManager>,
    password: String,
    pub fail_derivation: Mutex<bool>,
}

impl FakeBackend {
    pub fn new(name: &str) -> Arc<Self> {
        Self::with_key_manager(name, FakeKeyManager::default())
    }

    pub fn with_key_manager(name: &str, key_manager: FakeKeyManager) -> Arc<Self> {
        Arc::new(Self {
            name: Mutex::new(name.to_string()),
            state: Mutex::new(WalletState::Uninitialized),
            coins: Mutex::new(Vec::new()),
            state_hook: Mutex::new(None),
            tx_hook: Mutex::new(None),
            key_manager: Arc::new(key_manager),
            password: TEST_PASSWORD.to_string(),
            fail_derivation: Mutex::new(false),
        })
    }

    /// Change state and fire the raw hook, like the engine thread would.
    pub fn set_state(&self, state: WalletState) {
        *self.state.lock().unwrap() = state;
        if let Some(hook) = self.state_hook.lock().unwrap().as_ref() {
            hook.notify();
        }
    }

    /// Replace the coin set with one coin per amount and fire the feed.
    pub fn process_transaction(&self, coins: &[(u64, bool)]) {
        *self.coins.lock().unwrap() = coins
            .iter()
            .enumerate()
            .map(|(i, (sats, confirmed))| Coin {
                txid: format!("{:064x}", i),
                vout: i as u32,
                amount: bitcoin::Amount::from_sat(*sats),
                confirmed: *confirmed,
            })
            .collect();
        if let Some(hook) = self.tx_hook.lock().unwrap().as_ref() {
            hook.notify();
        }
    }

    pub fn hooks_registered(&self) -> bool {
        self.state_hook.lock().unwrap().is_some() && self.tx_hook.lock().unwrap().is_some()
    }
}

impl WalletBackend for FakeBackend {
    fn id(&self) -> WalletId { 7 }
    fn name(&self) -> String { self.name.lock().unwrap().clone() }
    fn set_name(&self, name: &str) { *self.name.lock().unwrap() = name.to_string(); }
    fn network(&self) -> Network { Network::Bitcoin }
    fn state(&self) -> WalletState { *self.state.lock().unwrap() }

    fn on_state_changed(&self, notifier: Notifier) {
        *self.state_hook.lock().unwrap() = Some(notifier);
    }

    fn on_transaction_processed(&self, notifier: Notifier) {
        *self.tx_hook.lock().unwrap() = Some(notifier);
    }

    fn coins(&self) -> Vec<Coin> { self.coins.lock().unwrap().clone() }
    fn transaction_count(&self) -> usize { self.coins.lock().unwrap().len() }
    fn key_manager(&self) -> Arc<dyn KeyManager> { self.key_manager.clone() }

    fn next_receive_address(&self, labels: &[String]) -> SessionResult<CompressedPublicKey> {
        if *self.fail_derivation.lock().unwrap() {
            return Err(SessionError::Backend("key pool exhausted".into()));
        }
        let pubkey = test_pubkey();
        self.key_manager.labels.lock().unwrap().push((pubkey, labels.to_vec()));
        Ok(pubkey)
    }

    fn labels_with_ranking(&self, intent: Intent) -> Vec<(String, u32)> {
        match intent {
            Intent::Receive => vec![("exchange".into(), 5), ("friend".into(), 2)],
            Intent::Send => vec![("rent".into(), 12)],
        }
    }

    fn verify_password(&self, password: &str) -> SessionResult<bool> {
        Ok(password == self.password)
    }
}

// =============================================================================
// Load workflow
// =============================================================================

/// Counts raw calls; no idempotency of its own.
#[derive(Default)]
pub struct CountingWorkflow {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl CountingWorkflow {
    pub fn starts(&self) -> usize { self.starts.load(Ordering::SeqCst) }
    pub fn stops(&self) -> usize { self.stops.load(Ordering::SeqCst) }
}

impl LoadWorkflow for CountingWorkflow {
    fn start(&self) { self.starts.fetch_add(1, Ordering::SeqCst); }
    fn stop(&self) { self.stops.fetch_add(1, Ordering::SeqCst); }
    fn phase(&self) -> LoadPhase {
        match (self.starts(), self.stops()) {
            (0, _) => LoadPhase::Idle,
            (_, 0) => LoadPhase::Running,
            _ => LoadPhase::Stopped,
        }
    }
}

// =============================================================================
// Filesystem
// =============================================================================

/// Real moves, except under `deny_dir` where it answers PermissionDenied.
pub struct RecordingMover {
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    pub deny_dir: Option<PathBuf>,
}

impl RecordingMover {
    pub fn new() -> Self { Self { calls: Mutex::new(Vec::new()), deny_dir: None } }
    pub fn denying(dir: &Path) -> Self { Self { calls: Mutex::new(Vec::new()), deny_dir: Some(dir.to_path_buf()) } }
    pub fn call_count(&self) -> usize { self.calls.lock().unwrap().len() }
}

impl FileMover for RecordingMover {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.calls.lock().unwrap().push((from.to_path_buf(), to.to_path_buf()));
        if let Some(deny) = &self.deny_dir {
            if from.starts_with(deny) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied"));
            }
        }
        StdFileMover.rename(from, to)
    }
}

// =============================================================================
// Context
// =============================================================================

/// Must run inside a tokio runtime.
pub fn context(dir: &TempDir) -> AppContext {
    context_with_capacity(dir, beewallet_session::session::DEFAULT_NOTIFICATION_CAPACITY)
}

pub fn context_with_capacity(dir: &TempDir, capacity: usize) -> AppContext {
    let config = SessionConfig::new("beewallet-test")
        .with_data_dir(dir.path())
        .with_notification_capacity(capacity);
    let ctx = AppContext::new(config, Arc::new(UsdAmountProvider::new())).expect("context");
    ctx.ensure_directories().expect("dirs");
    ctx
}

/// Write `<name>.json` into both wallet directories.
pub fn write_wallet_files(ctx: &AppContext, name: &str) {
    std::fs::write(ctx.directories().wallet_file(name), br#"{"wallet":"primary"}"#).expect("primary");
    std::fs::write(ctx.directories().backup_file(name), br#"{"wallet":"backup"}"#).expect("backup");
}
