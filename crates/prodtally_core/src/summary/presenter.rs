//! Per-person source grouping and display helpers.
//!
//! # Responsibility
//! - Regroup one person's sources by `(project, phase)` with sub-totals.
//! - Resolve display names from the full, unfiltered project list.
//!
//! # Invariants
//! - Grouping is a partition: each source lands in exactly one group.
//! - Groups are sorted by total, descending; ties keep first-seen order.
//! - Detail rows keep encounter order.
//! - Group keys are `projectId_phaseId`; ids must not contain `_`.

use crate::config::DisplayConfig;
use crate::model::project::GROUP_KEY_SEPARATOR;
use crate::model::{Amount, Project};
use crate::summary::SourceData;
use serde::Serialize;
use std::collections::HashMap;

/// Name table built once per render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectLookup {
    projects: HashMap<String, ProjectNames>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProjectNames {
    name: String,
    phases: HashMap<String, String>,
}

impl ProjectLookup {
    /// Builds the table from every known project, included or not.
    pub fn build<'a, I>(projects: I) -> Self
    where
        I: IntoIterator<Item = &'a Project>,
    {
        let projects = projects
            .into_iter()
            .map(|project| {
                let phases = project
                    .phases
                    .iter()
                    .map(|phase| (phase.id.clone(), phase.name.clone()))
                    .collect();
                (
                    project.id.clone(),
                    ProjectNames {
                        name: project.name.clone(),
                        phases,
                    },
                )
            })
            .collect();
        Self { projects }
    }

    pub fn project_name(&self, project_id: &str) -> Option<&str> {
        self.projects
            .get(project_id)
            .map(|names| names.name.as_str())
    }

    pub fn phase_name(&self, project_id: &str, phase_id: &str) -> Option<&str> {
        self.projects
            .get(project_id)
            .and_then(|names| names.phases.get(phase_id))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Sources of one person for one `(project, phase)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedSource {
    pub key: String,
    pub project_name: String,
    pub phase_name: String,
    pub total: Amount,
    pub details: Vec<SourceData>,
}

/// Builds the `projectId_phaseId` group key.
pub fn group_key(project_id: &str, phase_id: &str) -> String {
    format!("{project_id}{GROUP_KEY_SEPARATOR}{phase_id}")
}

/// Groups `sources` by project/phase and sorts groups by total, descending.
pub fn group(
    sources: &[SourceData],
    lookup: &ProjectLookup,
    config: &DisplayConfig,
) -> Vec<GroupedSource> {
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupedSource> = Vec::new();

    for source in sources {
        let key = group_key(&source.project_id, &source.phase_id);
        let index = match index_by_key.get(key.as_str()) {
            Some(index) => *index,
            None => {
                let project_name = lookup
                    .project_name(&source.project_id)
                    .unwrap_or(config.unknown_project_label.as_str())
                    .to_string();
                let phase_name = lookup
                    .phase_name(&source.project_id, &source.phase_id)
                    .unwrap_or(config.unknown_phase_label.as_str())
                    .to_string();
                index_by_key.insert(key.clone(), groups.len());
                groups.push(GroupedSource {
                    key,
                    project_name,
                    phase_name,
                    total: Amount::ZERO,
                    details: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        group.total += source.amount;
        group.details.push(source.clone());
    }

    // `sort_by` is stable, so equal totals keep first-seen order.
    groups.sort_by(|left, right| right.total.cmp(&left.total));
    groups
}

/// Detail-row label: path joined by the separator, or the base-item label.
pub fn detail_label(source: &SourceData, config: &DisplayConfig) -> String {
    if source.path.is_empty() {
        config.base_item_label.clone()
    } else {
        source.path.join(config.path_separator.as_str())
    }
}

/// Formats money as whole major units with digit grouping, e.g. `¥1,235`.
pub fn format_money(amount: Amount, config: &DisplayConfig) -> String {
    let whole = amount.rounded_major();
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push_str(&config.thousands_separator);
        }
        grouped.push(digit);
    }

    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}{}{grouped}", config.currency_symbol)
}

#[cfg(test)]
mod tests {
    use super::{detail_label, format_money, group, group_key, ProjectLookup};
    use crate::config::DisplayConfig;
    use crate::model::{Amount, Node, Phase, Project};
    use crate::summary::SourceData;

    fn source(project_id: &str, phase_id: &str, path: &[&str], minor: i64) -> SourceData {
        SourceData {
            project_id: project_id.to_string(),
            phase_id: phase_id.to_string(),
            path: path.iter().map(|label| label.to_string()).collect(),
            person: "甲".to_string(),
            amount: Amount::from_minor_units(minor),
        }
    }

    fn lookup() -> ProjectLookup {
        let projects = vec![
            Project::with_id("p1", "一号楼")
                .with_phase(Phase::with_id("a", "一期", Node::root()))
                .with_phase(Phase::with_id("b", "二期", Node::root())),
            Project::with_id("p2", "二号楼").with_phase(Phase::with_id("a", "首期", Node::root())),
        ];
        ProjectLookup::build(&projects)
    }

    #[test]
    fn groups_by_project_and_phase_sorted_by_total() {
        let sources = vec![
            source("p1", "a", &[], 100),
            source("p2", "a", &["x"], 500),
            source("p1", "a", &["y"], 50),
            source("p1", "b", &[], 300),
        ];

        let groups = group(&sources, &lookup(), &DisplayConfig::default());
        let keys: Vec<_> = groups.iter().map(|group| group.key.as_str()).collect();
        assert_eq!(keys, vec!["p2_a", "p1_b", "p1_a"]);
        assert_eq!(groups[2].total, Amount::from_minor_units(150));
        assert_eq!(groups[2].details.len(), 2);
        assert_eq!(groups[2].details[0].amount, Amount::from_minor_units(100));
        assert_eq!(groups[0].project_name, "二号楼");
        assert_eq!(groups[0].phase_name, "首期");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let sources = vec![source("p1", "b", &[], 10), source("p1", "a", &[], 10)];
        let groups = group(&sources, &lookup(), &DisplayConfig::default());
        assert_eq!(groups[0].key, "p1_b");
        assert_eq!(groups[1].key, "p1_a");
    }

    #[test]
    fn unresolved_ids_use_placeholder_names() {
        let config = DisplayConfig::default();
        let sources = vec![source("gone", "a", &[], 1), source("p1", "gone", &[], 1)];
        let groups = group(&sources, &lookup(), &config);

        assert_eq!(groups[0].project_name, config.unknown_project_label);
        assert_eq!(groups[0].phase_name, config.unknown_phase_label);
        assert_eq!(groups[1].project_name, "一号楼");
        assert_eq!(groups[1].phase_name, config.unknown_phase_label);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group(&[], &lookup(), &DisplayConfig::default()).is_empty());
    }

    #[test]
    fn detail_label_falls_back_to_base_item() {
        let config = DisplayConfig::default();
        assert_eq!(detail_label(&source("p", "a", &[], 1), &config), "基础项");
        assert_eq!(
            detail_label(&source("p", "a", &["主体", "二层"], 1), &config),
            "主体 - 二层"
        );
    }

    #[test]
    fn format_money_rounds_and_groups_digits() {
        let config = DisplayConfig::default();
        assert_eq!(format_money(Amount::ZERO, &config), "¥0");
        assert_eq!(format_money(Amount::from_minor_units(15_000), &config), "¥150");
        assert_eq!(
            format_money(Amount::from_minor_units(123_456_789), &config),
            "¥1,234,568"
        );
        assert_eq!(format_money(Amount::from_minor_units(100_000), &config), "¥1,000");
    }

    #[test]
    fn group_key_joins_with_separator() {
        assert_eq!(group_key("p1", "a"), "p1_a");
    }
}
