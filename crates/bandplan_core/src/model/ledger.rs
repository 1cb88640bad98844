//! Profit/loss line items.
//!
//! # Invariants
//! - `revenue` and `cost` are finite and `>= 0`.
//! - Entries are immutable; changing an amount produces a new entry.

use crate::model::interval_set::{Instant, IntervalSet};
use crate::model::validation::{check_amount, ValidationError};
use crate::selection::{Selection, Selector};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLedgerEntry")]
pub struct LedgerEntry {
    revenue: f64,
    cost: f64,
    label: String,
    date: Instant,
}

#[derive(Deserialize)]
struct RawLedgerEntry {
    revenue: f64,
    cost: f64,
    label: String,
    date: Instant,
}

impl TryFrom<RawLedgerEntry> for LedgerEntry {
    type Error = ValidationError;

    fn try_from(raw: RawLedgerEntry) -> Result<Self, Self::Error> {
        Self::new(raw.revenue, raw.cost, raw.label, raw.date)
    }
}

impl LedgerEntry {
    /// # Errors
    /// - `InvalidAmount` when `revenue` or `cost` is negative or not finite.
    pub fn new(
        revenue: f64,
        cost: f64,
        label: impl Into<String>,
        date: Instant,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            revenue: check_amount("revenue", revenue)?,
            cost: check_amount("cost", cost)?,
            label: label.into(),
            date,
        })
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn profit(&self) -> f64 {
        self.revenue - self.cost
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn date(&self) -> Instant {
        self.date
    }

    /// Copy of this entry with a different revenue.
    pub fn with_revenue(&self, revenue: f64) -> Result<Self, ValidationError> {
        Self::new(revenue, self.cost, self.label.clone(), self.date)
    }

    /// Copy of this entry with a different cost.
    pub fn with_cost(&self, cost: f64) -> Result<Self, ValidationError> {
        Self::new(self.revenue, cost, self.label.clone(), self.date)
    }

    /// Copy of this entry booked on another date.
    pub fn with_date(&self, date: Instant) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }

    /// `date: label (+revenue/-cost)`.
    pub fn detail(&self) -> String {
        format!(
            "{}: {} (+{:.2}/-{:.2})",
            self.date.format("%Y-%m-%d"),
            self.label,
            self.revenue,
            self.cost
        )
    }
}

impl Display for LedgerEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:+.2}", self.label, self.profit())
    }
}

/// Selects entries booked inside a period.
#[derive(Debug, Clone)]
pub struct EntryPeriodSelector {
    period: IntervalSet,
}

impl EntryPeriodSelector {
    pub fn new(period: IntervalSet) -> Self {
        Self { period }
    }
}

impl Selector<LedgerEntry> for EntryPeriodSelector {
    fn select(&self, item: &LedgerEntry) -> bool {
        self.period.point_in(item.date)
    }
}

/// Stand-alone ledger entries.
pub type Ledger = Selection<LedgerEntry>;
