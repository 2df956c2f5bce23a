//! Minor-unit currency conversion arithmetic.

pub mod conversion;

pub use conversion::{convert_minor, rate_lookup_date};
