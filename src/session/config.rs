//! Session configuration - passed from higher layers

use crate::core::amount::AmountProvider;
use crate::core::paths::{resolve_root, WalletDirectories, WALLET_FILE_EXTENSION};
use crate::error::{SessionError, SessionResult};
use crate::events::Dispatcher;
use crate::runtime::Shutdown;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;

pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 256;

/// Session configuration. Higher layers construct this.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub app: String,
    pub data_dir: Option<PathBuf>,
    pub wallet_file_extension: String,
    /// Queue bound of each backend notification adapter.
    pub notification_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app: String::new(),
            data_dir: None,
            wallet_file_extension: WALLET_FILE_EXTENSION.to_string(),
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into(), ..Default::default() }
    }
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self { self.data_dir = Some(path.into()); self }
    pub fn with_wallet_file_extension(mut self, ext: impl Into<String>) -> Self { self.wallet_file_extension = ext.into(); self }
    pub fn with_notification_capacity(mut self, capacity: usize) -> Self { self.notification_capacity = capacity.max(1); self }

    pub fn root(&self) -> PathBuf {
        resolve_root(&self.app, self.data_dir.as_deref())
    }

    pub fn directories(&self) -> WalletDirectories {
        WalletDirectories::new(self.root()).with_extension(self.wallet_file_extension.clone())
    }
}

/// Everything sessions share, passed explicitly instead of a global.
///
/// Cloning is cheap; all clones drive the same dispatcher.
#[derive(Clone)]
pub struct AppContext {
    config: SessionConfig,
    directories: WalletDirectories,
    dispatcher: Dispatcher,
    shutdown: Shutdown,
    runtime: Handle,
    amount_provider: Arc<dyn AmountProvider>,
}

impl AppContext {
    /// Must be called inside a tokio runtime.
    pub fn new(config: SessionConfig, amount_provider: Arc<dyn AmountProvider>) -> SessionResult<Self> {
        let runtime = Handle::try_current().map_err(|e| SessionError::Runtime(e.to_string()))?;
        Ok(Self::with_runtime(config, amount_provider, runtime))
    }

    pub fn with_runtime(config: SessionConfig, amount_provider: Arc<dyn AmountProvider>, runtime: Handle) -> Self {
        let shutdown = Shutdown::new();
        let dispatcher = Dispatcher::spawn_on(&runtime, &shutdown);
        let directories = config.directories();
        tracing::debug!(
            wallets = %directories.wallets_dir.display(),
            backups = %directories.backup_dir.display(),
            "app context ready"
        );
        Self { config, directories, dispatcher, shutdown, runtime, amount_provider }
    }

    pub fn config(&self) -> &SessionConfig { &self.config }
    pub fn directories(&self) -> &WalletDirectories { &self.directories }
    pub fn dispatcher(&self) -> &Dispatcher { &self.dispatcher }
    pub fn runtime(&self) -> &Handle { &self.runtime }
    pub fn amount_provider(&self) -> Arc<dyn AmountProvider> { self.amount_provider.clone() }

    pub fn ensure_directories(&self) -> SessionResult<()> {
        Ok(self.directories.ensure()?)
    }

    /// Stop the dispatcher. Sessions built on this context stop delivering.
    pub fn close(&self) {
        self.shutdown.trigger();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_triggered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::UsdAmountProvider;
    use crate::core::paths::ROOT_ENV;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner())
    }

    #[test]
    fn defaults() {
        let config = SessionConfig::new("bee");
        assert_eq!(config.wallet_file_extension, "json");
        assert_eq!(config.notification_capacity, DEFAULT_NOTIFICATION_CAPACITY);
        assert_eq!(SessionConfig::new("bee").with_notification_capacity(0).notification_capacity, 1);
    }

    #[test]
    fn root_from_env_when_no_data_dir() {
        let _guard = lock_env();
        let dir = TempDir::new().expect("tempdir");
        std::env::set_var(ROOT_ENV, dir.path());
        let config = SessionConfig::new("bee");
        assert_eq!(config.root(), dir.path().to_path_buf());
        assert_eq!(config.directories().wallets_dir, dir.path().join("Wallets"));

        let explicit = SessionConfig::new("bee").with_data_dir("/elsewhere");
        assert_eq!(explicit.root(), PathBuf::from("/elsewhere"));
        std::env::remove_var(ROOT_ENV);
    }

    #[test]
    fn context_needs_a_runtime() {
        let result = AppContext::new(SessionConfig::new("bee"), Arc::new(UsdAmountProvider::new()));
        assert!(matches!(result, Err(SessionError::Runtime(_))));
    }

    #[tokio::test]
    async fn context_creates_directories_and_closes() {
        let dir = TempDir::new().expect("tempdir");
        let config = SessionConfig::new("bee").with_data_dir(dir.path()).with_wallet_file_extension("wallet");
        let ctx = AppContext::new(config, Arc::new(UsdAmountProvider::new())).expect("context");
        ctx.ensure_directories().expect("dirs");
        assert!(ctx.directories().backup_dir.is_dir());
        assert_eq!(ctx.directories().file_name("a"), "a.wallet");

        ctx.close();
        assert!(ctx.is_closed());
        for _ in 0..50 {
            if ctx.dispatcher().is_closed() { break; }
            tokio::task::yield_now().await;
        }
        assert!(ctx.dispatcher().is_closed());
    }
}
