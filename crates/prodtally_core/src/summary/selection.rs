//! Project inclusion state for the summary view.
//!
//! # Responsibility
//! - Track which projects are excluded from aggregation.
//! - Tell "nothing selected" apart from "no data" for empty results.
//!
//! # Invariants
//! - Selection is ephemeral UI state; it is never persisted.
//! - A project is included unless its id is in the excluded set.

use crate::config::DisplayConfig;
use crate::model::Project;
use crate::summary::PersonStats;
use std::collections::BTreeSet;

/// Excluded-project set. Everything is included by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SelectionFilter {
    excluded: BTreeSet<String>,
}

impl SelectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips inclusion of one project.
    pub fn toggle(&mut self, project_id: &str) {
        if !self.excluded.remove(project_id) {
            self.excluded.insert(project_id.to_string());
        }
    }

    /// Includes every project.
    pub fn select_all(&mut self) {
        self.excluded.clear();
    }

    /// Excludes every currently known project.
    pub fn deselect_all<'a, I>(&mut self, projects: I)
    where
        I: IntoIterator<Item = &'a Project>,
    {
        self.excluded = projects
            .into_iter()
            .map(|project| project.id.clone())
            .collect();
    }

    /// Drops all exclusions, e.g. when the summary dialog closes.
    pub fn reset(&mut self) {
        self.select_all();
    }

    pub fn is_included(&self, project_id: &str) -> bool {
        !self.excluded.contains(project_id)
    }

    pub fn excluded_ids(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }

    /// Included projects, in input order.
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects
            .iter()
            .filter(|project| self.is_included(&project.id))
            .collect()
    }

    /// True when at least one project exists and all of them are excluded.
    pub fn excludes_everything(&self, projects: &[Project]) -> bool {
        !projects.is_empty() && projects.iter().all(|project| !self.is_included(&project.id))
    }
}

/// Why a summary has no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Projects exist but every one is excluded.
    NothingSelected,
    /// No projects, or the included ones carry no contributions.
    NoData,
}

impl EmptyState {
    pub fn message<'a>(&self, config: &'a DisplayConfig) -> &'a str {
        match self {
            Self::NothingSelected => config.nothing_selected_message.as_str(),
            Self::NoData => config.no_data_message.as_str(),
        }
    }
}

/// Classifies an aggregation result; `None` when there are rows to show.
pub fn empty_state(
    projects: &[Project],
    selection: &SelectionFilter,
    stats: &[PersonStats],
) -> Option<EmptyState> {
    if !stats.is_empty() {
        return None;
    }
    if selection.excludes_everything(projects) {
        Some(EmptyState::NothingSelected)
    } else {
        Some(EmptyState::NoData)
    }
}
