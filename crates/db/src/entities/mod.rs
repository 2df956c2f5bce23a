//! `SeaORM` entity definitions.
//!
//! Enum-valued columns are stored as short strings (kind, action,
//! department, currency) or as the cursor's numeric level; the typed
//! views live in `bursar-core` and the repositories convert at the
//! boundary.

pub mod audit_entries;
pub mod budgets;
pub mod destinations;
pub mod exchange_rates;
pub mod requests;
