//! Per-person contribution summary.
//!
//! # Responsibility
//! - Walk project trees into per-person totals (`engine`).
//! - Regroup one person's sources by project/phase for display (`presenter`).
//! - Gate which projects take part and memoize the result (`selection`,
//!   `cache`).
//!
//! # Invariants
//! - Every view here is derived from a project snapshot and never mutated
//!   after it is produced.
//! - `PersonStats::total_amount` equals the exact sum of its sources.

use crate::model::Amount;
use serde::Serialize;

pub mod cache;
pub mod engine;
pub mod presenter;
pub mod selection;

pub use cache::{SummaryCache, SummarySnapshot};
pub use engine::{aggregate, aggregate_with_report, reachable_total, AggregateReport};
pub use presenter::{
    detail_label, format_money, group, group_key, GroupedSource, ProjectLookup,
};
pub use selection::{empty_state, EmptyState, SelectionFilter};

/// One contribution flattened with its project/phase/path context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceData {
    pub project_id: String,
    pub phase_id: String,
    /// Labels from below the phase root down to the owning node.
    /// Empty for root-level contributions.
    pub path: Vec<String>,
    pub person: String,
    pub amount: Amount,
}

/// Aggregated contributions for one person key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonStats {
    pub person: String,
    pub total_amount: Amount,
    pub sources: Vec<SourceData>,
}

impl PersonStats {
    fn empty(person: impl Into<String>) -> Self {
        Self {
            person: person.into(),
            total_amount: Amount::ZERO,
            sources: Vec::new(),
        }
    }

    fn push(&mut self, source: SourceData) {
        self.total_amount += source.amount;
        self.sources.push(source);
    }

    /// Recomputes the total from `sources`; equals `total_amount`.
    pub fn sources_total(&self) -> Amount {
        self.sources.iter().map(|source| source.amount).sum()
    }
}
