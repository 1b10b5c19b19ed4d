//! Entitlement ledger computation.
//!
//! This module drives calendar resolution, trip weighing, usage accumulation
//! and allowance resolution for every active policy of a person's year, and
//! assembles the result with its totals and audit trace.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    AuditStep, AuditTrace, Category, LedgerEntry, LedgerResult, LedgerTotals, Person, Policy,
    Snapshot,
};

use super::pass::{CATEGORY_NOT_FOUND, LedgerPass, Resolution};

/// The rule id recorded on every ledger audit step.
pub const ALLOWANCE_RESOLUTION_RULE: &str = "allowance_resolution";

/// Computes a person's entitlement ledger for a year.
///
/// Produces one entry per active policy of the year, in workspace category
/// order. Policies that reference a category missing from the workspace are
/// skipped with a `CATEGORY_NOT_FOUND` warning. Every cache used is scoped to
/// this call, so repeated calls against the same snapshot agree.
///
/// # Arguments
///
/// * `snapshot` - The workspace data, read-only for the call
/// * `person` - The person whose ledger is computed
/// * `year` - The selected year
///
/// # Example
///
/// ```
/// use entitlement_engine::calculation::compute_ledger;
/// use entitlement_engine::models::{Category, CategoryClass, Person, Policy, Snapshot};
/// use rust_decimal::Decimal;
///
/// let snapshot = Snapshot {
///     categories: vec![Category {
///         id: "annual".to_string(),
///         name: "Annual Leave".to_string(),
///         class: CategoryClass::Annual,
///         is_unlimited: false,
///         default_accrual: Default::default(),
///         default_carry_over: Default::default(),
///     }],
///     ..Default::default()
/// };
/// let mut person = Person::new("p1");
/// person.set_policy("annual", 2024, Policy::with_amount(Decimal::new(20, 0)));
///
/// let ledger = compute_ledger(&snapshot, &person, 2024);
/// assert_eq!(ledger.entries.len(), 1);
/// assert_eq!(ledger.totals.total_allowance, Decimal::new(20, 0));
/// ```
pub fn compute_ledger(snapshot: &Snapshot, person: &Person, year: i32) -> LedgerResult {
    let start_time = Instant::now();
    let mut pass = LedgerPass::new(snapshot, person, year);

    for (category_id, policy) in person.policies_for_year(year) {
        if policy.is_active && snapshot.category(category_id).is_none() {
            pass.warn(
                CATEGORY_NOT_FOUND,
                format!(
                    "Policy for {} references unknown category '{}'",
                    year, category_id
                ),
                "low",
            );
        }
    }

    let mut entries = Vec::new();
    let mut steps = Vec::new();
    let mut step_number: u32 = 1;

    for category in &snapshot.categories {
        let Some(policy) = person.policy(&category.id, year) else {
            continue;
        };
        if !policy.is_active {
            continue;
        }

        let resolution = pass.allowance(&category.id, year);
        let used = pass.usage(&category.id, year);
        let entry = LedgerEntry {
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            used,
            allowance: resolution.allowance,
            remaining: resolution.allowance - used,
            breakdown: resolution.breakdown.clone(),
        };

        steps.push(audit_step(step_number, category, policy, year, &resolution, &entry));
        step_number += 1;
        entries.push(entry);
    }

    let totals = ledger_totals(&entries);
    let duration_us = start_time.elapsed().as_micros() as u64;

    debug!(
        person_id = %person.id,
        year,
        entries = entries.len(),
        total_allowance = %totals.total_allowance,
        total_used = %totals.total_used,
        deepest_depth = ?pass.deepest_depth(),
        duration_us,
        "Computed ledger"
    );

    LedgerResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        person_id: person.id.clone(),
        year,
        entries,
        totals,
        audit_trace: AuditTrace {
            steps,
            warnings: pass.into_warnings(),
            duration_us,
        },
    }
}

/// Sums finite allowances and used days; unbounded entries are only counted.
fn ledger_totals(entries: &[LedgerEntry]) -> LedgerTotals {
    LedgerTotals {
        total_allowance: entries
            .iter()
            .fold(Decimal::ZERO, |sum, e| sum.saturating_add(e.allowance.finite_or_zero())),
        total_used: entries
            .iter()
            .fold(Decimal::ZERO, |sum, e| sum.saturating_add(e.used)),
        unbounded_categories: entries.iter().filter(|e| e.allowance.is_unbounded()).count(),
    }
}

fn audit_step(
    step_number: u32,
    category: &Category,
    policy: &Policy,
    year: i32,
    resolution: &Resolution,
    entry: &LedgerEntry,
) -> AuditStep {
    let breakdown = &resolution.breakdown;
    let reasoning = if resolution.allowance.is_unbounded() {
        format!(
            "{} is unlimited in {}; {} days used",
            category.name,
            year,
            entry.used.normalize()
        )
    } else {
        format!(
            "{}: base {} + lieu {} + carry-over {} = {}; {} used, {} remaining",
            category.name,
            breakdown.base.normalize(),
            breakdown.lieu.normalize(),
            breakdown.carry_over.normalize(),
            entry.allowance,
            entry.used.normalize(),
            entry.remaining
        )
    };

    AuditStep {
        step_number,
        rule_id: ALLOWANCE_RESOLUTION_RULE.to_string(),
        rule_name: "Allowance Resolution".to_string(),
        input: serde_json::json!({
            "category_id": category.id,
            "year": year,
            "accrual_amount": policy.accrual.amount.to_string(),
            "carry_over_enabled": policy.carry_over.enabled,
            "is_unlimited": policy.is_unlimited_with(category.is_unlimited)
        }),
        output: serde_json::json!({
            "allowance": entry.allowance,
            "used": entry.used.to_string(),
            "remaining": entry.remaining,
            "breakdown": breakdown
        }),
        reasoning,
    }
}
