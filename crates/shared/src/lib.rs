//! Shared types, errors, and configuration for Bursar.
//!
//! This crate provides common types used across all other crates:
//! - Currency and per-currency total types (integer minor units)
//! - Organization tiers and departments
//! - Application-wide error types
//! - Configuration management
//! - JWT validation for identity-provider tokens

pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
