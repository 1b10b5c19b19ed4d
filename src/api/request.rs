//! Request types for the Entitlement Engine API.
//!
//! This module defines the JSON request structures for the `/ledger`,
//! `/allowance` and `/usage` endpoints. The workspace (categories, calendars
//! and working days) comes from the server configuration; requests carry the
//! person, their policies and their trips.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AccrualRule, Allocation, CarryOverRule, DayPortion, DurationMode, Person, Policy, Trip,
    TripStatus, WeekendRule,
};

/// Largest day count, positive or negative, accepted in a request.
pub const MAX_REQUEST_DAYS: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Request body for the `/ledger` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRequest {
    /// The person whose ledger is computed.
    pub person: PersonRequest,
    /// The person's trips.
    #[serde(default)]
    pub trips: Vec<TripRequest>,
    /// The selected year.
    pub year: i32,
}

/// Request body for the `/allowance` and `/usage` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryQueryRequest {
    /// The person queried.
    pub person: PersonRequest,
    /// The person's trips.
    #[serde(default)]
    pub trips: Vec<TripRequest>,
    /// The category queried.
    pub category_id: String,
    /// The year queried.
    pub year: i32,
}

/// Person information in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRequest {
    /// Unique identifier for the person.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Weekend-observance rule for public holidays.
    #[serde(default)]
    pub weekend_rule: WeekendRule,
    /// Ids of the holiday calendars that apply to the person.
    #[serde(default)]
    pub holiday_config_ids: Vec<String>,
    /// The person's policies, one per (category, year).
    #[serde(default)]
    pub policies: Vec<PolicyRequest>,
}

/// Policy information in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRequest {
    /// The category the policy configures.
    pub category_id: String,
    /// The year the policy applies to.
    pub year: i32,
    /// The accrual rule.
    #[serde(default)]
    pub accrual: AccrualRule,
    /// Overrides the category's unlimited flag when set.
    #[serde(default)]
    pub is_unlimited: Option<bool>,
    /// Inactive policies are hidden from the ledger.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// The carry-over rule.
    #[serde(default)]
    pub carry_over: CarryOverRule,
}

fn default_active() -> bool {
    true
}

/// Trip information in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    /// Unique identifier for the trip.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// First day of the trip (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the trip (inclusive).
    pub end_date: NaiveDate,
    /// Day-portion mode.
    #[serde(default)]
    pub duration_mode: Option<DurationMode>,
    /// Portion of the first day for custom-duration trips.
    #[serde(default)]
    pub start_portion: Option<DayPortion>,
    /// Portion of the last day for custom-duration trips.
    #[serde(default)]
    pub end_portion: Option<DayPortion>,
    /// Dates inside the range that are not charged.
    #[serde(default)]
    pub excluded_dates: Vec<NaiveDate>,
    /// Lifecycle status.
    #[serde(default = "default_status")]
    pub status: TripStatus,
    /// Ids of the people taking the trip; the requesting person when empty.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Category charged by a simple trip.
    #[serde(default)]
    pub category_id: Option<String>,
    /// Split allocations.
    #[serde(default)]
    pub allocations: Vec<AllocationRequest>,
}

fn default_status() -> TripStatus {
    TripStatus::Planning
}

/// Allocation information in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// The category charged.
    pub category_id: String,
    /// Days charged.
    pub days: Decimal,
    /// Year the days are pinned to.
    #[serde(default)]
    pub target_year: Option<i32>,
}

impl TryFrom<PersonRequest> for Person {
    type Error = EngineError;

    fn try_from(req: PersonRequest) -> EngineResult<Self> {
        let mut person = Person::new(req.id);
        person.name = req.name;
        person.weekend_rule = req.weekend_rule;
        person.holiday_config_ids = req.holiday_config_ids;

        for policy in req.policies {
            if person.policy(&policy.category_id, policy.year).is_some() {
                return Err(EngineError::InvalidRequest {
                    field: "person.policies".to_string(),
                    message: format!(
                        "more than one policy for category '{}' in {}",
                        policy.category_id, policy.year
                    ),
                });
            }
            check_days("person.policies.accrual.amount", policy.accrual.amount)?;
            check_days("person.policies.carry_over.max_days", policy.carry_over.max_days)?;
            let category_id = policy.category_id.clone();
            let year = policy.year;
            person.set_policy(category_id, year, policy.into());
        }

        Ok(person)
    }
}

impl From<PolicyRequest> for Policy {
    fn from(req: PolicyRequest) -> Self {
        Policy {
            accrual: req.accrual,
            is_unlimited: req.is_unlimited,
            is_active: req.is_active,
            carry_over: req.carry_over,
        }
    }
}

impl From<TripRequest> for Trip {
    fn from(req: TripRequest) -> Self {
        Trip {
            id: req.id,
            name: req.name,
            start_date: req.start_date,
            end_date: req.end_date,
            duration_mode: req.duration_mode,
            start_portion: req.start_portion,
            end_portion: req.end_portion,
            excluded_dates: req.excluded_dates,
            status: req.status,
            participants: req.participants,
            category_id: req.category_id,
            allocations: req.allocations.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<AllocationRequest> for Allocation {
    fn from(req: AllocationRequest) -> Self {
        Allocation {
            category_id: req.category_id,
            days: req.days,
            target_year: req.target_year,
        }
    }
}

/// Converts request trips, assigning trips without participants to `person_id`.
pub(super) fn trips_for(person_id: &str, trips: Vec<TripRequest>) -> EngineResult<Vec<Trip>> {
    trips
        .into_iter()
        .map(|req| {
            for allocation in &req.allocations {
                check_days("trips.allocations.days", allocation.days)?;
            }
            let mut trip: Trip = req.into();
            if trip.participants.is_empty() {
                trip.participants.push(person_id.to_string());
            }
            Ok(trip)
        })
        .collect()
}

fn check_days(field: &str, days: Decimal) -> EngineResult<()> {
    if days.abs() > MAX_REQUEST_DAYS {
        return Err(EngineError::InvalidRequest {
            field: field.to_string(),
            message: format!("{} days exceeds the limit of {}", days, MAX_REQUEST_DAYS),
        });
    }
    Ok(())
}
