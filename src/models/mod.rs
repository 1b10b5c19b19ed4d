//! Core data models for the Entitlement Engine.
//!
//! This module contains all the domain models used throughout the engine,
//! from the input [`Snapshot`] to the output [`LedgerResult`].

mod calendar;
mod category;
mod ledger_result;
mod person;
mod policy;
mod snapshot;
mod trip;

pub use calendar::{HolidayCalendar, HolidayEntry, WorkingDaySet};
pub use category::{Category, CategoryClass};
pub use ledger_result::{
    Allowance, AllowanceBreakdown, AuditStep, AuditTrace, AuditWarning, LedgerEntry,
    LedgerResult, LedgerTotals,
};
pub use person::{Person, PolicyBook, WeekendRule};
pub use policy::{AccrualPeriod, AccrualRule, CarryOverRule, ExpiryType, ExpiryValue, Policy};
pub use snapshot::{CategoryRemoval, Snapshot};
pub use trip::{Allocation, DayPortion, DurationMode, Trip, TripStatus};
