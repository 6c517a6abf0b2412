//! RenameCoordinator - moves a wallet's files to a new name
//!
//! | Step | On failure |
//! |------|-----------|
//! | null / invalid name | `InvalidOperation`, no I/O |
//! | primary `<wallets>/<old>.<ext>` → `<new>.<ext>` | error returned, name unchanged |
//! | backup `<backups>/<old>.<ext>` → `<new>.<ext>` | warning, primary stands |
//! | `set_name` + `name_changed` | - |
//!
//! Renames of one coordinator run one at a time.

use crate::backend::WalletBackend;
use crate::core::name::validate_wallet_name;
use crate::core::paths::WalletDirectories;
use crate::error::{SessionError, SessionResult};
use crate::events::{Dispatcher, Signal, Stream};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Single-file move. Implementations must not overwrite `to`.
pub trait FileMover: Send + Sync {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// `std::fs::rename` that refuses an existing destination.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileMover;

impl FileMover for StdFileMover {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if to.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        std::fs::rename(from, to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub old_file_name: String,
    pub new_file_name: String,
    pub primary_dir: PathBuf,
    pub backup_dir: PathBuf,
}

impl RenamePlan {
    pub fn new(directories: &WalletDirectories, current: &str, candidate: &str) -> Self {
        Self {
            old_file_name: directories.file_name(current),
            new_file_name: directories.file_name(candidate),
            primary_dir: directories.wallets_dir.clone(),
            backup_dir: directories.backup_dir.clone(),
        }
    }

    pub fn primary_paths(&self) -> (PathBuf, PathBuf) {
        (self.primary_dir.join(&self.old_file_name), self.primary_dir.join(&self.new_file_name))
    }

    pub fn backup_paths(&self) -> (PathBuf, PathBuf) {
        (self.backup_dir.join(&self.old_file_name), self.backup_dir.join(&self.new_file_name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupRename {
    Renamed,
    /// The backup still sits under the old name.
    Orphaned { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub old_name: String,
    pub new_name: String,
    pub backup: BackupRename,
}

pub struct RenameCoordinator {
    directories: WalletDirectories,
    mover: Arc<dyn FileMover>,
    name_changed: Signal<String>,
    guard: Mutex<()>,
}

impl RenameCoordinator {
    pub fn new(directories: WalletDirectories, dispatcher: Dispatcher) -> Self {
        Self {
            directories,
            mover: Arc::new(StdFileMover),
            name_changed: Signal::new(dispatcher),
            guard: Mutex::new(()),
        }
    }

    pub fn with_mover(mut self, mover: Arc<dyn FileMover>) -> Self {
        self.mover = mover;
        self
    }

    pub fn directories(&self) -> &WalletDirectories {
        &self.directories
    }

    pub fn name_changed(&self) -> Stream<String> {
        self.name_changed.stream()
    }

    pub fn rename(&self, backend: &dyn WalletBackend, new_name: Option<&str>) -> SessionResult<RenameOutcome> {
        let candidate = new_name.ok_or_else(|| SessionError::invalid("wallet name can't be null"))?;
        let _guard = self.guard.lock().unwrap_or_else(|p| p.into_inner());

        let current = backend.name();
        if let Err(e) = validate_wallet_name(candidate) {
            tracing::warn!(wallet = %current, candidate, error = %e, "rename rejected");
            return Err(e);
        }
        if candidate == current {
            return Err(SessionError::invalid(format!("wallet is already named '{current}'")));
        }

        let plan = RenamePlan::new(&self.directories, &current, candidate);
        let (from, to) = plan.primary_paths();
        self.mover.rename(&from, &to)?;

        let (from, to) = plan.backup_paths();
        let backup = match self.mover.rename(&from, &to) {
            Ok(()) => BackupRename::Renamed,
            Err(e) => {
                tracing::warn!(
                    wallet = %current,
                    backup = %from.display(),
                    error = %e,
                    "backup rename failed; backup keeps the old name"
                );
                BackupRename::Orphaned { reason: e.to_string() }
            }
        };

        backend.set_name(candidate);
        self.name_changed.publish(candidate.to_string());
        tracing::info!(from = %current, to = candidate, "wallet renamed");

        Ok(RenameOutcome { old_name: current, new_name: candidate.to_string(), backup })
    }
}
