//! Memoized summary view.
//!
//! # Responsibility
//! - Re-run aggregation only when the project snapshot or the selection
//!   changes, never on unrelated render passes.
//!
//! # Invariants
//! - Cache keys are structural fingerprints of `(projects, selection)`; any
//!   edit to either produces a fresh, from-scratch recomputation.
//! - The name lookup depends on projects only and survives selection changes.

use crate::model::Project;
use crate::summary::engine::{aggregate_with_report, AggregateReport};
use crate::summary::presenter::ProjectLookup;
use crate::summary::selection::{empty_state, EmptyState, SelectionFilter};
use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Everything one render pass of the summary needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummarySnapshot {
    pub report: AggregateReport,
    /// Built from all projects, so excluded ones still resolve names.
    pub lookup: ProjectLookup,
    pub empty_state: Option<EmptyState>,
}

/// Single-entry cache keyed on `(projects, selection)` fingerprints.
#[derive(Debug, Default)]
pub struct SummaryCache {
    key: Option<(u64, u64)>,
    lookup_key: Option<u64>,
    snapshot: SummarySnapshot,
    computations: u64,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot, recomputing it when inputs changed.
    pub fn get_or_compute(
        &mut self,
        projects: &[Project],
        selection: &SelectionFilter,
    ) -> &SummarySnapshot {
        let projects_key = fingerprint(projects);
        let key = (projects_key, fingerprint(selection));
        if self.key == Some(key) {
            return &self.snapshot;
        }

        if self.lookup_key != Some(projects_key) {
            self.snapshot.lookup = ProjectLookup::build(projects);
            self.lookup_key = Some(projects_key);
        }
        let report = aggregate_with_report(selection.apply(projects));
        self.snapshot.empty_state = empty_state(projects, selection, &report.stats);
        self.snapshot.report = report;
        self.key = Some(key);
        self.computations += 1;

        debug!(
            "event=summary_recomputed module=summary status=ok projects={} excluded={} computations={}",
            projects.len(),
            selection.excluded_count(),
            self.computations
        );
        &self.snapshot
    }

    /// Forces the next call to recompute.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.lookup_key = None;
    }

    /// Number of recomputations performed so far.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::SummaryCache;
    use crate::model::{Amount, Node, Phase, Project};
    use crate::summary::selection::{EmptyState, SelectionFilter};

    fn projects() -> Vec<Project> {
        vec![
            Project::with_id("a", "A").with_phase(Phase::with_id(
                "ph",
                "Phase",
                Node::root().with_contribution("甲", 100.0),
            )),
            Project::with_id("b", "B").with_phase(Phase::with_id(
                "ph",
                "Phase",
                Node::root().with_contribution("甲", 1000.0),
            )),
        ]
    }

    #[test]
    fn reuses_snapshot_for_unchanged_inputs() {
        let projects = projects();
        let selection = SelectionFilter::new();
        let mut cache = SummaryCache::new();

        cache.get_or_compute(&projects, &selection);
        cache.get_or_compute(&projects, &selection);
        assert_eq!(cache.computations(), 1);
    }

    #[test]
    fn recomputes_when_selection_changes() {
        let projects = projects();
        let mut selection = SelectionFilter::new();
        let mut cache = SummaryCache::new();

        let total = cache.get_or_compute(&projects, &selection).report.stats[0].total_amount;
        assert_eq!(total, Amount::from_minor_units(110_000));

        selection.toggle("b");
        let snapshot = cache.get_or_compute(&projects, &selection);
        assert_eq!(
            snapshot.report.stats[0].total_amount,
            Amount::from_minor_units(10_000)
        );
        assert_eq!(snapshot.lookup.project_name("b"), Some("B"));
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn recomputes_when_a_contribution_is_edited() {
        let mut projects = projects();
        let selection = SelectionFilter::new();
        let mut cache = SummaryCache::new();
        cache.get_or_compute(&projects, &selection);

        projects[0].phases[0].root_node.contributions[0].amount = Some(200.0);
        let snapshot = cache.get_or_compute(&projects, &selection);
        assert_eq!(
            snapshot.report.stats[0].total_amount,
            Amount::from_minor_units(120_000)
        );
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn records_empty_state_and_supports_invalidate() {
        let projects = projects();
        let mut selection = SelectionFilter::new();
        selection.deselect_all(&projects);
        let mut cache = SummaryCache::new();

        let snapshot = cache.get_or_compute(&projects, &selection);
        assert_eq!(snapshot.empty_state, Some(EmptyState::NothingSelected));

        cache.invalidate();
        cache.get_or_compute(&projects, &selection);
        assert_eq!(cache.computations(), 2);
    }
}
