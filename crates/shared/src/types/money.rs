//! Currency types for amounts in integer minor units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `i64` minor units (pence/fen); exchange rates use
//! `rust_decimal::Decimal`.

use serde::{Deserialize, Serialize};

/// Currencies handled by the treasury.
///
/// GBP is the reporting currency: budget ceilings and aggregated
/// spent/received totals are kept in GBP minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Pound sterling (reporting currency).
    Gbp,
    /// Chinese yuan.
    Cny,
}

impl Currency {
    /// All supported currencies, in display order.
    pub const ALL: [Self; 2] = [Self::Gbp, Self::Cny];

    /// The single currency used for budget ceiling comparisons.
    #[must_use]
    pub const fn reporting() -> Self {
        Self::Gbp
    }

    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gbp => "GBP",
            Self::Cny => "CNY",
        }
    }

    /// Parses an ISO 4217 code.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GBP" => Some(Self::Gbp),
            "CNY" => Some(Self::Cny),
            _ => None,
        }
    }

    /// Returns the currency symbol for display.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Gbp => "£",
            Self::Cny => "¥",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown currency: {s}"))
    }
}

/// Per-currency running totals in minor units.
///
/// A fixed-size record keyed by the closed [`Currency`] enum, so a missing
/// or unknown currency key is unrepresentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyTotals {
    /// GBP minor units (pence).
    pub gbp: i64,
    /// CNY minor units (fen).
    pub cny: i64,
}

impl CurrencyTotals {
    /// All-zero totals.
    pub const ZERO: Self = Self { gbp: 0, cny: 0 };

    /// Returns the total for one currency.
    #[must_use]
    pub const fn get(&self, currency: Currency) -> i64 {
        match currency {
            Currency::Gbp => self.gbp,
            Currency::Cny => self.cny,
        }
    }

    /// Adds a signed delta to one currency's total.
    pub const fn add(&mut self, currency: Currency, amount: i64) {
        match currency {
            Currency::Gbp => self.gbp += amount,
            Currency::Cny => self.cny += amount,
        }
    }

    /// Returns true if every currency's total is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.gbp == 0 && self.cny == 0
    }

    /// Iterates over (currency, amount) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, i64)> + '_ {
        Currency::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_currency_roundtrip() {
        assert_eq!(Currency::parse("GBP"), Some(Currency::Gbp));
        assert_eq!(Currency::parse("gbp"), Some(Currency::Gbp));
        assert_eq!(Currency::parse("CNY"), Some(Currency::Cny));
        assert_eq!(Currency::parse("USD"), None);
        assert_eq!(Currency::Gbp.to_string(), "GBP");
        assert_eq!(Currency::Cny.to_string(), "CNY");
        assert!(Currency::from_str("XXX").is_err());
    }

    #[test]
    fn test_reporting_currency() {
        assert_eq!(Currency::reporting(), Currency::Gbp);
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(Currency::Gbp.symbol(), "£");
        assert_eq!(Currency::Cny.symbol(), "¥");
    }

    #[test]
    fn test_totals_add_and_get() {
        let mut totals = CurrencyTotals::ZERO;
        assert!(totals.is_zero());

        totals.add(Currency::Gbp, 5000);
        totals.add(Currency::Cny, 2000);
        totals.add(Currency::Cny, -500);

        assert_eq!(totals.get(Currency::Gbp), 5000);
        assert_eq!(totals.get(Currency::Cny), 1500);
        assert!(!totals.is_zero());
    }

    #[test]
    fn test_totals_iter_covers_all_currencies() {
        let totals = CurrencyTotals { gbp: 1, cny: 2 };
        let pairs: Vec<_> = totals.iter().collect();
        assert_eq!(pairs, vec![(Currency::Gbp, 1), (Currency::Cny, 2)]);
    }
}
