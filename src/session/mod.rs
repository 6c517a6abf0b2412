//! Session - one active wallet, wired to its auth, state and load signals
//!
//! ```text
//! AuthGate ──first true──► LoadWorkflow::start()   (then retired)
//!          └─every value─► is_logged_in mirror
//! StateStream ──Started──► LoadWorkflow::stop()    (every time)
//! tx feed ──► BalanceProjector ──► balances / has_balance
//! rename() ──► RenameCoordinator ──► name_changed
//! ```
//!
//! All handlers run on the context's dispatcher, one at a time.

mod balance;
mod config;
mod models;
mod rename;
mod state;

pub use balance::BalanceProjector;
pub use config::{AppContext, SessionConfig, DEFAULT_NOTIFICATION_CAPACITY};
pub use models::{Address, WalletCoins, WalletInfo, WalletStats};
pub use rename::{BackupRename, FileMover, RenameCoordinator, RenameOutcome, RenamePlan, StdFileMover};
pub use state::StateStream;

use crate::auth::AuthGate;
use crate::backend::{Intent, WalletBackend, WalletId, WalletState};
use crate::core::amount::{Amount, AmountProvider};
use crate::core::network::Network;
use crate::error::SessionResult;
use crate::events::{Delivery, Stream, Subscription};
use crate::load::LoadWorkflow;
use crate::runtime::Shutdown;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct Session {
    ctx: AppContext,
    backend: Arc<dyn WalletBackend>,
    auth: Arc<AuthGate>,
    workflow: Arc<dyn LoadWorkflow>,
    state: StateStream,
    balances: BalanceProjector,
    renamer: RenameCoordinator,
    logged_in: Arc<AtomicBool>,
    coins: OnceCell<WalletCoins>,
    /// Stops this session's forwarder tasks.
    shutdown: Shutdown,
    _subscriptions: Vec<Subscription>,
}

impl Session {
    pub fn new(ctx: &AppContext, backend: Arc<dyn WalletBackend>, workflow: Arc<dyn LoadWorkflow>) -> Self {
        Self::with_renamer(
            ctx,
            backend,
            workflow,
            RenameCoordinator::new(ctx.directories().clone(), ctx.dispatcher().clone()),
        )
    }

    pub fn with_renamer(
        ctx: &AppContext,
        backend: Arc<dyn WalletBackend>,
        workflow: Arc<dyn LoadWorkflow>,
        renamer: RenameCoordinator,
    ) -> Self {
        let _enter = ctx.runtime().enter();
        let dispatcher = ctx.dispatcher();
        let capacity = ctx.config().notification_capacity;
        let shutdown = Shutdown::new();

        let auth = Arc::new(AuthGate::new(backend.clone(), dispatcher.clone()));
        let state = StateStream::attach(&backend, dispatcher, capacity, &shutdown);
        let balances = BalanceProjector::attach(&backend, ctx.amount_provider(), dispatcher, capacity, &shutdown);
        let logged_in = Arc::new(AtomicBool::new(false));

        let start_on_login = {
            let workflow = workflow.clone();
            auth.logged_in().filter(|v| *v).subscribe_until(move |_| {
                workflow.start();
                Delivery::Retire
            })
        };
        let stop_on_started = {
            let workflow = workflow.clone();
            state.started().subscribe(move |_| workflow.stop())
        };
        let mirror_login = {
            let flag = logged_in.clone();
            auth.logged_in().subscribe(move |v| flag.store(*v, Ordering::SeqCst))
        };

        tracing::info!(wallet = %backend.name(), id = backend.id(), network = %backend.network(), "session opened");

        Self {
            ctx: ctx.clone(),
            backend,
            auth,
            workflow,
            state,
            balances,
            renamer,
            logged_in,
            coins: OnceCell::new(),
            shutdown,
            _subscriptions: vec![start_on_login, stop_on_started, mirror_login],
        }
    }

    // Identity
    pub fn id(&self) -> WalletId { self.backend.id() }
    pub fn name(&self) -> String { self.backend.name() }
    pub fn network(&self) -> Network { self.backend.network() }
    pub fn is_hardware_wallet(&self) -> bool { self.backend.key_manager().is_hardware_wallet() }
    pub fn is_watch_only_wallet(&self) -> bool { self.backend.key_manager().is_watch_only() }

    /// Last value published by the auth gate, as seen by the dispatcher.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    pub fn auth(&self) -> &Arc<AuthGate> { &self.auth }
    pub fn loader(&self) -> &Arc<dyn LoadWorkflow> { &self.workflow }
    pub fn backend(&self) -> &Arc<dyn WalletBackend> { &self.backend }
    pub fn amount_provider(&self) -> Arc<dyn AmountProvider> { self.ctx.amount_provider() }

    // Streams
    pub fn current_state(&self) -> WalletState { self.backend.state() }
    pub fn state(&self) -> Stream<WalletState> { self.state.stream() }
    pub fn balances(&self) -> Stream<Amount> { self.balances.balances() }
    pub fn has_balance(&self) -> Stream<bool> { self.balances.has_balance() }
    pub fn name_changed(&self) -> Stream<String> { self.renamer.name_changed() }

    /// Built on first access, once.
    pub fn coins(&self) -> &WalletCoins {
        self.coins.get_or_init(|| WalletCoins::new(self.backend.clone(), self.ctx.amount_provider()))
    }

    // Operations
    pub fn get_next_receive_address(&self, destination_labels: &[String]) -> SessionResult<Address> {
        let pubkey = self.backend.next_receive_address(destination_labels)?;
        Ok(Address::new(self.backend.key_manager(), pubkey, self.backend.network()))
    }

    pub fn get_wallet_info(&self) -> WalletInfo {
        WalletInfo::read(self.backend.as_ref())
    }

    pub fn get_wallet_stats(&self) -> WalletStats {
        WalletStats::read(self.backend.as_ref(), self.ctx.amount_provider().as_ref())
    }

    pub fn get_most_used_labels(&self, intent: Intent) -> Vec<(String, u32)> {
        self.backend.labels_with_ranking(intent)
    }

    /// `None` is rejected before any filesystem access.
    pub fn rename<'a>(&self, new_name: impl Into<Option<&'a str>>) -> SessionResult<RenameOutcome> {
        self.renamer.rename(self.backend.as_ref(), new_name.into())
    }

    /// Resolve once everything raised before this call has been delivered.
    pub async fn settle(&self) {
        self.state.settle().await;
        self.balances.settle().await;
        self.ctx.dispatcher().flush().await;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown.trigger();
        self.workflow.stop();
        tracing::info!(wallet = %self.backend.name(), "session closed");
    }
}
