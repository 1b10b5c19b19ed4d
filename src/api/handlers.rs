//! HTTP request handlers for the Entitlement Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{LedgerPass, compute_ledger};
use crate::error::{EngineError, EngineResult};
use crate::models::{Person, Snapshot};

use super::request::{CategoryQueryRequest, LedgerRequest, trips_for};
use super::response::{AllowanceResponse, ApiError, ApiErrorResponse, UsageResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ledger", post(ledger_handler))
        .route("/allowance", post(allowance_handler))
        .route("/usage", post(usage_handler))
        .with_state(state)
}

/// Handler for POST /ledger endpoint.
///
/// Accepts a person with their trips and returns the ledger of the year.
async fn ledger_handler(
    State(state): State<AppState>,
    payload: Result<Json<LedgerRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing ledger request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let person = match Person::try_from(request.person) {
        Ok(person) => person,
        Err(err) => return error_response(correlation_id, err),
    };
    let trips = match trips_for(&person.id, request.trips) {
        Ok(trips) => trips,
        Err(err) => return error_response(correlation_id, err),
    };
    let snapshot = state.workspace().snapshot(vec![person.clone()], trips);

    let start_time = Instant::now();
    let result = compute_ledger(&snapshot, &person, request.year);
    let duration = start_time.elapsed();

    info!(
        correlation_id = %correlation_id,
        person_id = %person.id,
        year = request.year,
        entries = result.entries.len(),
        total_allowance = %result.totals.total_allowance,
        total_used = %result.totals.total_used,
        warnings = result.audit_trace.warnings.len(),
        duration_us = duration.as_micros(),
        "Ledger computed successfully"
    );

    json_response(StatusCode::OK, result)
}

/// Handler for POST /allowance endpoint.
///
/// Resolves a single (category, year) allowance for the person.
async fn allowance_handler(
    State(state): State<AppState>,
    payload: Result<Json<CategoryQueryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allowance request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let query = match CategoryQuery::prepare(&state, request) {
        Ok(query) => query,
        Err(err) => return error_response(correlation_id, err),
    };

    let mut pass = LedgerPass::new(&query.snapshot, &query.person, query.year);
    let resolution = pass.allowance(&query.category_id, query.year);

    info!(
        correlation_id = %correlation_id,
        person_id = %query.person.id,
        category_id = %query.category_id,
        year = query.year,
        allowance = %resolution.allowance,
        "Allowance resolved successfully"
    );

    json_response(
        StatusCode::OK,
        AllowanceResponse {
            person_id: query.person.id.clone(),
            category_id: query.category_id.clone(),
            year: query.year,
            allowance: resolution.allowance,
            breakdown: resolution.breakdown,
            warnings: pass.into_warnings(),
        },
    )
}

/// Handler for POST /usage endpoint.
///
/// Accumulates the days the person used in a (category, year).
async fn usage_handler(
    State(state): State<AppState>,
    payload: Result<Json<CategoryQueryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing usage request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    let query = match CategoryQuery::prepare(&state, request) {
        Ok(query) => query,
        Err(err) => return error_response(correlation_id, err),
    };

    let mut pass = LedgerPass::new(&query.snapshot, &query.person, query.year);
    let used = pass.usage(&query.category_id, query.year);

    info!(
        correlation_id = %correlation_id,
        person_id = %query.person.id,
        category_id = %query.category_id,
        year = query.year,
        used = %used,
        "Usage accumulated successfully"
    );

    json_response(
        StatusCode::OK,
        UsageResponse {
            person_id: query.person.id.clone(),
            category_id: query.category_id.clone(),
            year: query.year,
            used,
            warnings: pass.into_warnings(),
        },
    )
}

/// A validated ad hoc query with the snapshot it runs against.
struct CategoryQuery {
    snapshot: Snapshot,
    person: Person,
    category_id: String,
    year: i32,
}

impl CategoryQuery {
    /// Converts the request, rejecting categories the workspace does not define.
    fn prepare(state: &AppState, request: CategoryQueryRequest) -> EngineResult<Self> {
        let workspace = state.workspace();
        workspace.get_category(&request.category_id)?;

        let person = Person::try_from(request.person)?;
        let trips = trips_for(&person.id, request.trips)?;
        let snapshot = workspace.snapshot(vec![person.clone()], trips);

        Ok(Self {
            snapshot,
            person,
            category_id: request.category_id,
            year: request.year,
        })
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request rejected"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Maps a JSON extraction failure to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}
