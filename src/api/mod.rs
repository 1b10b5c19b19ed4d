//! HTTP API module for the Entitlement Engine.
//!
//! This module provides the REST API endpoints for computing a person's
//! leave ledger and answering ad hoc allowance and usage queries.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AllocationRequest, CategoryQueryRequest, LedgerRequest, MAX_REQUEST_DAYS, PersonRequest,
    PolicyRequest, TripRequest,
};
pub use response::{AllowanceResponse, ApiError, UsageResponse};
pub use state::AppState;
