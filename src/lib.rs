//! Entitlement Engine for leave accrual and usage
//!
//! This crate computes how many leave days a person is entitled to per category
//! and year, how many they have used across their trips, and what remains.
//! Allowances combine a yearly accrual, weekend holidays accrued to lieu and
//! days carried over from the previous year, resolved through a bounded
//! recursion over earlier years.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
