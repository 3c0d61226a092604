//! # Cost Calculations
//!
//! Pricing of individual work items. Each calculation follows the pattern:
//!
//! - `*Input` - what to price (JSON-serializable)
//! - `*Result` - the priced breakdown (JSON-serializable)
//! - `calculate(...)` - a pure function that never fails; bad input prices
//!   to zero instead of returning an error
//!
//! ## Available Calculations
//!
//! - [`line_item`] - resource breakdown, markups and unit price of one work item
//! - [`unit_rules`] - the measurement unit a work item is priced in

pub mod line_item;
pub mod unit_rules;

// Re-export commonly used types
pub use line_item::{
    apply_markups, calculate, rate_key, LineItemInput, LineItemResult, RateOverrides, ResourceLine,
};
pub use unit_rules::{correct_unit, rule_unit};
