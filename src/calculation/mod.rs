//! Calculation logic for the Entitlement Engine.
//!
//! This module contains the calendar resolver, the trip day weigher, the usage
//! accumulator, the allowance resolver with its bounded carry-over recursion,
//! and the ledger that orchestrates them. All of them read an immutable
//! [`Snapshot`](crate::models::Snapshot) and share caches only through a
//! per-call [`LedgerPass`].

mod allowance;
mod ledger;
mod non_working_days;
mod pass;
mod trip_days;
mod usage;

pub use allowance::{MAX_CARRY_OVER_DEPTH, resolve_allowance};
pub use ledger::{ALLOWANCE_RESOLUTION_RULE, compute_ledger};
pub use non_working_days::{
    PersonHolidays, count_weekend_holidays, person_holidays, resolve_non_working_days,
};
pub use pass::{
    CALENDAR_NOT_FOUND, CARRY_OVER_DEPTH_EXCEEDED, CATEGORY_NOT_FOUND, INVALID_DATE_RANGE,
    LedgerPass, Resolution,
};
pub use trip_days::{
    ChargeableDay, HALF_DAY, TripDays, allocation_contribution, chargeable_days, weigh_trip_days,
};
pub use usage::{accumulate_usage, trip_usage};
