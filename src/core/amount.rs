//! Display amounts
//!
//! `Amount` carries its own `has_balance` flag, computed once at construction
//! from the satoshi value, so every consumer sees the same answer.

use serde::Serialize;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Amount {
    sats: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    usd: Option<f64>,
    has_balance: bool,
}

impl Amount {
    pub fn new(btc: bitcoin::Amount, usd_rate: Option<f64>) -> Self {
        let sats = btc.to_sat();
        Self {
            sats,
            usd: usd_rate.map(|rate| btc.to_btc() * rate),
            has_balance: sats > 0,
        }
    }

    pub fn zero() -> Self { Self::new(bitcoin::Amount::ZERO, None) }

    pub fn btc(&self) -> bitcoin::Amount { bitcoin::Amount::from_sat(self.sats) }
    pub fn sats(&self) -> u64 { self.sats }
    pub fn usd(&self) -> Option<f64> { self.usd }
    pub fn has_balance(&self) -> bool { self.has_balance }

    /// `0.00012345 BTC`
    pub fn format_btc(&self) -> String {
        format!("{}.{:08} BTC", self.sats / 100_000_000, self.sats % 100_000_000)
    }
}

/// Turns a raw balance into a display `Amount`. Must be pure.
pub trait AmountProvider: Send + Sync {
    fn create(&self, btc: bitcoin::Amount) -> Amount;
}

/// Converts with the last known BTC/USD rate, if any.
#[derive(Debug, Default)]
pub struct UsdAmountProvider {
    rate: RwLock<Option<f64>>,
}

impl UsdAmountProvider {
    pub fn new() -> Self { Self::default() }

    pub fn with_rate(rate: f64) -> Self {
        Self { rate: RwLock::new(Some(rate)) }
    }

    pub fn set_exchange_rate(&self, rate: Option<f64>) {
        *self.rate.write().unwrap_or_else(|p| p.into_inner()) = rate;
    }

    pub fn exchange_rate(&self) -> Option<f64> {
        *self.rate.read().unwrap_or_else(|p| p.into_inner())
    }
}

impl AmountProvider for UsdAmountProvider {
    fn create(&self, btc: bitcoin::Amount) -> Amount {
        Amount::new(btc, self.exchange_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_balance_follows_sats() {
        assert!(!Amount::zero().has_balance());
        assert!(Amount::new(bitcoin::Amount::from_sat(1), None).has_balance());
    }

    #[test]
    fn usd_uses_current_rate() {
        let provider = UsdAmountProvider::with_rate(50_000.0);
        let amount = provider.create(bitcoin::Amount::from_sat(50_000_000));
        assert_eq!(amount.usd(), Some(25_000.0));

        provider.set_exchange_rate(None);
        assert_eq!(provider.create(bitcoin::Amount::from_sat(1)).usd(), None);
    }

    #[test]
    fn format_pads_fraction() {
        let amount = Amount::new(bitcoin::Amount::from_sat(100_012_345), None);
        assert_eq!(amount.format_btc(), "1.00012345 BTC");
    }

    #[test]
    fn serializes_sats_and_flag() {
        let json = serde_json::to_value(Amount::new(bitcoin::Amount::from_sat(5), None)).unwrap();
        assert_eq!(json, serde_json::json!({"sats": 5, "has_balance": true}));
    }
}
