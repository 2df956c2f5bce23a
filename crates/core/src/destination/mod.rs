//! Payee destination validation.
//!
//! A destination is where money goes: a UK bank account (sort code +
//! account number) or a card/e-wallet (card number, optionally the issuing
//! bank). Which fields are required depends on the platform, so the
//! combination is validated before anything is persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payment platform for a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// UK bank transfer: sort code and account number.
    Bank,
    /// Card or e-wallet transfer: card number plus issuing bank.
    Card,
}

impl Platform {
    /// Returns the string representation of the platform.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Card => "card",
        }
    }

    /// Parses a platform from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bank" => Some(Self::Bank),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination fields as submitted; validated against the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Payee display name.
    pub name: String,
    /// Payment platform.
    pub platform: Option<Platform>,
    /// Six-digit sort code (bank).
    pub sort_code: Option<String>,
    /// Eight-digit account number (bank).
    pub account_number: Option<String>,
    /// Business account flag (bank).
    pub business: bool,
    /// Card or wallet number (card).
    pub card_number: Option<String>,
    /// Issuing bank name (card).
    pub bank_name: Option<String>,
}

/// Destination validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DestinationError {
    /// Payee name missing.
    #[error("Payee name is required")]
    NameRequired,

    /// Platform missing.
    #[error("Payment platform is required")]
    PlatformRequired,

    /// A field the platform requires is missing or malformed.
    #[error("Field {field} is required for {platform} destinations")]
    MissingField {
        /// The missing field.
        field: &'static str,
        /// The platform that requires it.
        platform: Platform,
    },

    /// Sort code is not six digits.
    #[error("Sort code must be exactly 6 digits")]
    BadSortCode,

    /// Account number is not eight digits.
    #[error("Account number must be exactly 8 digits")]
    BadAccountNumber,
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

impl PaymentDetails {
    /// Validates that the fields required by the chosen platform are
    /// present and well-formed.
    ///
    /// # Errors
    ///
    /// Returns the first `DestinationError` found; nothing is persisted
    /// on failure.
    pub fn validate(&self) -> Result<(), DestinationError> {
        if self.name.trim().is_empty() {
            return Err(DestinationError::NameRequired);
        }
        let platform = self.platform.ok_or(DestinationError::PlatformRequired)?;
        match platform {
            Platform::Bank => {
                let sort_code = self.sort_code.as_deref().filter(|s| !s.is_empty()).ok_or(
                    DestinationError::MissingField {
                        field: "sort_code",
                        platform,
                    },
                )?;
                let account_number = self
                    .account_number
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or(DestinationError::MissingField {
                        field: "account_number",
                        platform,
                    })?;
                if !is_digits(sort_code, 6) {
                    return Err(DestinationError::BadSortCode);
                }
                if !is_digits(account_number, 8) {
                    return Err(DestinationError::BadAccountNumber);
                }
            }
            Platform::Card => {
                self.card_number
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(DestinationError::MissingField {
                        field: "card_number",
                        platform,
                    })?;
            }
        }
        Ok(())
    }
}
