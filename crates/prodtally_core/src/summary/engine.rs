//! Contribution aggregation engine.
//!
//! # Responsibility
//! - Depth-first walk of every phase root, emitting one [`SourceData`] per
//!   valid contribution.
//! - Merge sources into per-person [`PersonStats`] in O(1) amortized time.
//!
//! # Invariants
//! - The engine is filter-agnostic: callers pass only included projects.
//! - Output order is first-seen order of each person key (project order, phase
//!   order, pre-order node walk, record order).
//! - Malformed records are skipped and logged; the engine never fails.
//! - Every valid record is counted. A non-root node without a label adds no
//!   path segment, and its records and children keep the parent's path.

use crate::model::{Amount, Node, Phase, Project};
use crate::summary::{PersonStats, SourceData};
use log::{debug, warn};
use std::collections::HashMap;

/// Engine output plus counts of ignored input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    pub stats: Vec<PersonStats>,
    /// Contributions dropped for a missing, non-finite, negative or oversized
    /// amount.
    pub skipped_records: usize,
    /// Non-root nodes with no label. Their records are still counted under
    /// the parent's path.
    pub unlabeled_nodes: usize,
}

impl AggregateReport {
    pub fn has_skips(&self) -> bool {
        self.skipped_records > 0 || self.unlabeled_nodes > 0
    }
}

/// Aggregates contributions of `projects` into per-person stats.
pub fn aggregate<'a, I>(projects: I) -> Vec<PersonStats>
where
    I: IntoIterator<Item = &'a Project>,
{
    aggregate_with_report(projects).stats
}

/// Same as [`aggregate`], also reporting how much input was skipped.
pub fn aggregate_with_report<'a, I>(projects: I) -> AggregateReport
where
    I: IntoIterator<Item = &'a Project>,
{
    let mut walker = Walker::default();
    let mut project_count = 0usize;
    for project in projects {
        project_count += 1;
        for phase in &project.phases {
            walker.walk_phase(project, phase);
        }
    }

    let report = walker.finish();
    debug!(
        "event=aggregate module=summary status=ok projects={} persons={} skipped_records={} unlabeled_nodes={}",
        project_count,
        report.stats.len(),
        report.skipped_records,
        report.unlabeled_nodes
    );
    report
}

/// Sum of every valid contribution reachable from `projects`.
///
/// Labels play no part here; only amount validity does.
pub fn reachable_total<'a, I>(projects: I) -> Amount
where
    I: IntoIterator<Item = &'a Project>,
{
    fn subtree_total(node: &Node) -> Amount {
        let own: Amount = node
            .contributions
            .iter()
            .filter_map(|record| record.amount().ok())
            .sum();
        own + node
            .children
            .iter()
            .map(subtree_total)
            .sum::<Amount>()
    }

    projects
        .into_iter()
        .flat_map(|project| project.phases.iter())
        .map(|phase| subtree_total(&phase.root_node))
        .sum()
}

#[derive(Default)]
struct Walker {
    index_by_person: HashMap<String, usize>,
    stats: Vec<PersonStats>,
    path: Vec<String>,
    skipped_records: usize,
    unlabeled_nodes: usize,
}

impl Walker {
    fn walk_phase(&mut self, project: &Project, phase: &Phase) {
        self.path.clear();
        self.visit(project, phase, &phase.root_node);
    }

    fn visit(&mut self, project: &Project, phase: &Phase, node: &Node) {
        for record in &node.contributions {
            let amount = match record.amount() {
                Ok(amount) => amount,
                Err(err) => {
                    self.skipped_records += 1;
                    warn!(
                        "event=contribution_skipped module=summary status=skip project_id={} phase_id={} node_id={} reason={}",
                        project.id,
                        phase.id,
                        node.id,
                        err.code()
                    );
                    continue;
                }
            };
            self.record(SourceData {
                project_id: project.id.clone(),
                phase_id: phase.id.clone(),
                path: self.path.clone(),
                person: record.person.clone(),
                amount,
            });
        }

        for child in &node.children {
            match child.path_label() {
                Some(label) => {
                    self.path.push(label.to_string());
                    self.visit(project, phase, child);
                    self.path.pop();
                }
                None => {
                    self.unlabeled_nodes += 1;
                    warn!(
                        "event=node_unlabeled module=summary status=skip project_id={} phase_id={} node_id={} reason=missing_label",
                        project.id, phase.id, child.id
                    );
                    self.visit(project, phase, child);
                }
            }
        }
    }

    fn record(&mut self, source: SourceData) {
        let index = match self.index_by_person.get(source.person.as_str()) {
            Some(index) => *index,
            None => {
                let index = self.stats.len();
                self.index_by_person.insert(source.person.clone(), index);
                self.stats.push(PersonStats::empty(source.person.clone()));
                index
            }
        };
        self.stats[index].push(source);
    }

    fn finish(self) -> AggregateReport {
        AggregateReport {
            stats: self.stats,
            skipped_records: self.skipped_records,
            unlabeled_nodes: self.unlabeled_nodes,
        }
    }
}
