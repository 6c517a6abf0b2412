//! Wallet name rules. Pure: never touches the filesystem.

use crate::error::{SessionError, SessionResult};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_WALLET_NAME_LENGTH: usize = 250;

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

static RESERVED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(con|prn|aux|nul|com[1-9]|lpt[1-9])(\..*)?$").unwrap_or_else(|e| panic!("reserved name regex: {e}"))
});

/// Check `candidate` as a wallet file stem.
pub fn validate_wallet_name(candidate: &str) -> SessionResult<()> {
    if candidate.trim().is_empty() {
        return Err(SessionError::invalid("wallet name can't be empty"));
    }
    if candidate.trim() != candidate {
        return Err(SessionError::invalid("wallet name can't start or end with whitespace"));
    }
    if candidate.chars().count() > MAX_WALLET_NAME_LENGTH {
        return Err(SessionError::invalid(format!(
            "wallet name can't be longer than {} characters",
            MAX_WALLET_NAME_LENGTH
        )));
    }
    if let Some(c) = candidate.chars().find(|c| RESERVED_CHARS.contains(c) || c.is_control()) {
        return Err(SessionError::invalid(format!("wallet name contains invalid character {:?}", c)));
    }
    if candidate.ends_with('.') {
        return Err(SessionError::invalid("wallet name can't end with '.'"));
    }
    if RESERVED_NAME.is_match(candidate) {
        return Err(SessionError::invalid(format!("'{}' is a reserved name", candidate)));
    }
    Ok(())
}
