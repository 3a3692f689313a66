//! Leave decision engine: validation, normalization and category rules.
//!
//! # Modules
//!
//! - `types` - Verdicts and decision reasons
//! - `rules` - Pure eligibility rules per leave category
//! - `engine` - Store-backed `apply` entry point

pub mod engine;
pub mod rules;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::DecisionEngine;
pub use rules::{Assessment, RuleInputs, evaluate, generic_checks, normalize_type};
pub use types::{DecisionReason, Verdict, VerdictStatus};
