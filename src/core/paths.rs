//! Wallet directory layout
//!
//! Every wallet lives as `<wallets_dir>/<name>.<ext>` with a best-effort copy
//! at `<backup_dir>/<name>.<ext>`.

use std::path::{Path, PathBuf};

/// Fixed extension of wallet files.
pub const WALLET_FILE_EXTENSION: &str = "json";

/// Primary wallet directory name under the data root.
pub const WALLETS_DIR: &str = "Wallets";

/// Backup directory name under the data root.
pub const WALLET_BACKUPS_DIR: &str = "WalletBackups";

/// Environment override for the data root.
pub const ROOT_ENV: &str = "BEEWALLET_ROOT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletDirectories {
    pub wallets_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub extension: String,
}

impl WalletDirectories {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            wallets_dir: root.join(WALLETS_DIR),
            backup_dir: root.join(WALLET_BACKUPS_DIR),
            extension: WALLET_FILE_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// `<name>.<ext>`
    pub fn file_name(&self, wallet_name: &str) -> String {
        format!("{}.{}", wallet_name, self.extension)
    }

    pub fn wallet_file(&self, wallet_name: &str) -> PathBuf {
        self.wallets_dir.join(self.file_name(wallet_name))
    }

    pub fn backup_file(&self, wallet_name: &str) -> PathBuf {
        self.backup_dir.join(self.file_name(wallet_name))
    }

    /// Create both directories if missing.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.wallets_dir)?;
        std::fs::create_dir_all(&self.backup_dir)
    }
}

/// Data root: explicit dir, then `BEEWALLET_ROOT`, then the platform data dir.
pub fn resolve_root(app: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    std::env::var(ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join(app))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_under_root() {
        let dirs = WalletDirectories::new("/data/bee");
        assert_eq!(dirs.wallets_dir, PathBuf::from("/data/bee/Wallets"));
        assert_eq!(dirs.backup_dir, PathBuf::from("/data/bee/WalletBackups"));
        assert_eq!(dirs.wallet_file("alice"), PathBuf::from("/data/bee/Wallets/alice.json"));
        assert_eq!(dirs.backup_file("alice"), PathBuf::from("/data/bee/WalletBackups/alice.json"));
    }

    #[test]
    fn explicit_root_wins() {
        let root = resolve_root("app", Some(Path::new("/tmp/explicit")));
        assert_eq!(root, PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn ensure_creates_both_dirs() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let dirs = WalletDirectories::new(tmp.path());
        dirs.ensure().unwrap();
        assert!(dirs.wallets_dir.is_dir());
        assert!(dirs.backup_dir.is_dir());
    }
}
