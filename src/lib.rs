//! Beewallet session: the orchestrated view of one active wallet.
//!
//! # Architecture
//!
//! ```text
//! AppContext (config, directories, dispatcher, amount provider)
//!   │
//!   └── Session (one per opened wallet)
//!         ├── AuthGate ─────────► LoadWorkflow (start on first login)
//!         ├── StateStream ──────► LoadWorkflow (stop on every Started)
//!         ├── BalanceProjector ─► balances / has_balance
//!         └── RenameCoordinator ► Wallets/ + WalletBackups/
//!
//! WalletBackend (engine, external) ──notify()──► PushStream ──► Dispatcher
//! ```
//!
//! # Operations
//!
//! | Operation | Method | Fails with |
//! |-----------|--------|------------|
//! | next address | `session.get_next_receive_address(labels)` | backend error |
//! | info | `session.get_wallet_info()` | never |
//! | stats | `session.get_wallet_stats()` | never |
//! | labels | `session.get_most_used_labels(intent)` | never |
//! | rename | `session.rename(name)` | `InvalidOperation`, `Io` |
//!
//! # Usage
//!
//! ```ignore
//! use beewallet_session::{AppContext, Session, SessionConfig, UsdAmountProvider};
//!
//! let ctx = AppContext::new(SessionConfig::new("beewallet"), Arc::new(UsdAmountProvider::new()))?;
//! let session = Session::new(&ctx, backend, workflow);
//! let _sub = session.balances().subscribe(|amount| println!("{}", amount.format_btc()));
//! session.auth().login("password")?;
//! ```

pub mod auth;
pub mod backend;
pub mod core;
pub mod error;
pub mod events;
pub mod load;
pub mod logging;
pub mod runtime;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================
pub use auth::AuthGate;
pub use backend::{Coin, Intent, KeyCounts, KeyManager, WalletBackend, WalletId, WalletState};
pub use crate::core::{Amount, AmountProvider, Network, UsdAmountProvider, WalletDirectories};
pub use error::{SessionError, SessionResult};
pub use events::{Delivery, Dispatcher, Notifier, Stream, Subscription};
pub use load::{LoadPhase, LoadProgress, LoadWorkflow, ProgressReporter, WalletLoadWorkflow, WalletLoader};
pub use logging::init_logging;
pub use runtime::Shutdown;
pub use session::{
    Address, AppContext, BackupRename, FileMover, RenameOutcome, Session, SessionConfig, WalletCoins, WalletInfo,
    WalletStats,
};
