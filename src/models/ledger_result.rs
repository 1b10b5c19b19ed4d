//! Ledger result models for the Entitlement Engine.
//!
//! This module contains the [`LedgerResult`] type and its associated structures
//! that capture all outputs of a ledger computation: per-category entries,
//! totals and the audit trace.

use std::fmt;
use std::ops::Sub;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A total entitlement: a finite number of days, or unbounded.
///
/// Unbounded allowances never take part in arithmetic; helpers such as
/// [`Allowance::finite_or_zero`] make the intended treatment explicit.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::Allowance;
/// use rust_decimal::Decimal;
///
/// let annual = Allowance::Finite(Decimal::new(22, 0));
/// assert_eq!(annual - Decimal::new(5, 0), Allowance::Finite(Decimal::new(17, 0)));
/// assert_eq!(Allowance::Unbounded - Decimal::new(5, 0), Allowance::Unbounded);
/// assert_eq!(Allowance::Unbounded.finite_or_zero(), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allowance {
    /// A finite number of days.
    Finite(Decimal),
    /// No limit.
    Unbounded,
}

impl Allowance {
    /// Zero days.
    pub const ZERO: Allowance = Allowance::Finite(Decimal::ZERO);

    /// Returns true for the unbounded variant.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Allowance::Unbounded)
    }

    /// Returns the finite value, if any.
    pub fn finite(&self) -> Option<Decimal> {
        match self {
            Allowance::Finite(days) => Some(*days),
            Allowance::Unbounded => None,
        }
    }

    /// Returns the finite value, treating unbounded as zero.
    ///
    /// Used for aggregate totals, which cannot include unbounded allowances.
    pub fn finite_or_zero(&self) -> Decimal {
        self.finite().unwrap_or(Decimal::ZERO)
    }
}

impl Sub<Decimal> for Allowance {
    type Output = Allowance;

    fn sub(self, used: Decimal) -> Allowance {
        match self {
            Allowance::Finite(days) => Allowance::Finite(days.saturating_sub(used)),
            Allowance::Unbounded => Allowance::Unbounded,
        }
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allowance::Finite(days) => write!(f, "{}", days.normalize()),
            Allowance::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// How a finite allowance was assembled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllowanceBreakdown {
    /// The policy's accrual amount.
    pub base: Decimal,
    /// Days carried in from the previous year.
    pub carry_over: Decimal,
    /// Weekend holidays accrued to lieu.
    pub lieu: Decimal,
    /// Expiry of the carried-over days, from the source policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_label: Option<String>,
}

/// One category line of the ledger.
///
/// # Example
///
/// ```
/// use entitlement_engine::models::{Allowance, AllowanceBreakdown, LedgerEntry};
/// use rust_decimal::Decimal;
///
/// let entry = LedgerEntry {
///     category_id: "annual".to_string(),
///     category_name: "Annual Leave".to_string(),
///     used: Decimal::new(3, 0),
///     allowance: Allowance::Finite(Decimal::new(22, 0)),
///     remaining: Allowance::Finite(Decimal::new(19, 0)),
///     breakdown: AllowanceBreakdown {
///         base: Decimal::new(20, 0),
///         carry_over: Decimal::new(2, 0),
///         lieu: Decimal::ZERO,
///         expiry_label: None,
///     },
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// The category of this line.
    pub category_id: String,
    /// The category's display name.
    pub category_name: String,
    /// Days consumed in the year.
    pub used: Decimal,
    /// Total entitlement for the year.
    pub allowance: Allowance,
    /// Allowance minus used.
    pub remaining: Allowance,
    /// Components of the allowance.
    pub breakdown: AllowanceBreakdown,
}

/// Aggregated totals of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of finite allowances; unbounded categories contribute nothing.
    pub total_allowance: Decimal,
    /// Sum of used days across all entries.
    pub total_used: Decimal,
    /// Number of entries with an unbounded allowance.
    pub unbounded_categories: usize,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A degraded state met during calculation.
///
/// Warnings never stop a computation; they explain why a value was treated
/// as zero or truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The complete audit trace for a ledger computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a ledger computation for one person and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The person the ledger is for.
    pub person_id: String,
    /// The selected year.
    pub year: i32,
    /// One entry per active policy, in workspace category order.
    pub entries: Vec<LedgerEntry>,
    /// Aggregated totals.
    pub totals: LedgerTotals,
    /// Audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl LedgerResult {
    /// Finds the entry for a category.
    pub fn entry(&self, category_id: &str) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.category_id == category_id)
    }

    /// Returns true if any warning with the given code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.audit_trace.warnings.iter().any(|w| w.code == code)
    }
}
