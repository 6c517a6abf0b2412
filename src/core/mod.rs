//! Shared value types: amounts, networks, wallet names and directory layout.

pub mod amount;
pub mod name;
pub mod network;
pub mod paths;

pub use amount::{Amount, AmountProvider, UsdAmountProvider};
pub use name::validate_wallet_name;
pub use network::Network;
pub use paths::{WalletDirectories, WALLET_FILE_EXTENSION};
