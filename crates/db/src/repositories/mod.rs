//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod budget;
pub mod destination;
pub mod exchange_rate;
pub mod request;

pub use budget::{BudgetError, BudgetRepository, CreateBudgetInput};
pub use destination::{CreateDestinationInput, DestinationRepository};
pub use exchange_rate::{ExchangeRateRepository, UpsertRateInput};
pub use request::{
    PostActionInput, RequestRepository, SubmitRequestInput, TransitionRecord, request_facts,
};
