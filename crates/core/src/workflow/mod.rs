//! Request lifecycle management.
//!
//! This module implements the approval-chain state machine for financial
//! requests: expense applications descend the privilege hierarchy one tier
//! per approval; income contracts collect receipts until completed.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (Cursor, Action, RequestKind)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::{TransitionOutcome, WorkflowEngine};
pub use types::{Action, Category, Cursor, RequestKind};
