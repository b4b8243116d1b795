//! Transaction groups.
//!
//! A transaction is not stored on its own: it is the planned movement used as
//! estimate plus every paid movement whose `transaction_id` points at it.

use serde::Serialize;

use crate::Movement;

/// Estimated vs realized comparison for one group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Consolidation {
    pub estimated: f64,
    pub realized: f64,
    pub remaining: f64,
}

impl Consolidation {
    pub fn from_parts(estimate: Option<&Movement>, realized: &[Movement]) -> Self {
        let estimated = estimate.map_or(0.0, |m| m.amount);
        let realized: f64 = realized.iter().map(|m| m.amount).sum();

        Self {
            estimated,
            realized,
            remaining: estimated - realized,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionView {
    /// `None` for an ungrouped paid movement.
    pub estimate: Option<Movement>,
    pub movements: Vec<Movement>,
    pub consolidation: Consolidation,
}

impl TransactionView {
    pub fn new(estimate: Option<Movement>, movements: Vec<Movement>) -> Self {
        let consolidation = Consolidation::from_parts(estimate.as_ref(), &movements);
        Self {
            estimate,
            movements,
            consolidation,
        }
    }
}
