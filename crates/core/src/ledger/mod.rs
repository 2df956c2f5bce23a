//! Budget ledger rules.
//!
//! Each qualifying workflow transition contributes exactly one delta to
//! its request's budget; the delta is a pure function of the triggering
//! action, never of the request's history.

pub mod delta;

#[cfg(test)]
mod delta_props;

pub use delta::{BudgetDelta, LedgerService};
