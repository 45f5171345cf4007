//! Text and JSON rendering of summary snapshots.

use prodtally_core::summary::{detail_label, format_money, reachable_total};
use prodtally_core::{group, DisplayConfig, GroupedSource, Project, SummarySnapshot};
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersonRow<'a> {
    person: &'a str,
    /// Minor units.
    total_amount: i64,
    total_display: String,
    groups: Vec<GroupedSource>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDocument<'a> {
    people: Vec<PersonRow<'a>>,
    empty_message: Option<&'a str>,
    skipped_records: usize,
    unlabeled_nodes: usize,
}

pub fn summary_text(snapshot: &SummarySnapshot, config: &DisplayConfig, expand: bool) -> String {
    let mut out = String::new();
    if let Some(state) = snapshot.empty_state {
        let _ = writeln!(out, "{}", state.message(config));
        return out;
    }

    for stats in &snapshot.report.stats {
        let _ = writeln!(
            out,
            "{}  {}",
            stats.person,
            format_money(stats.total_amount, config)
        );
        for grouped in group(&stats.sources, &snapshot.lookup, config) {
            let _ = writeln!(
                out,
                "  {} / {}  {}",
                grouped.project_name,
                grouped.phase_name,
                format_money(grouped.total, config)
            );
            if !expand {
                continue;
            }
            for detail in &grouped.details {
                let _ = writeln!(
                    out,
                    "    {}  {}",
                    detail_label(detail, config),
                    format_money(detail.amount, config)
                );
            }
        }
    }
    out
}

pub fn summary_json(
    snapshot: &SummarySnapshot,
    config: &DisplayConfig,
) -> Result<String, serde_json::Error> {
    let people = snapshot
        .report
        .stats
        .iter()
        .map(|stats| PersonRow {
            person: &stats.person,
            total_amount: stats.total_amount.minor_units(),
            total_display: format_money(stats.total_amount, config),
            groups: group(&stats.sources, &snapshot.lookup, config),
        })
        .collect();
    let document = SummaryDocument {
        people,
        empty_message: snapshot.empty_state.map(|state| state.message(config)),
        skipped_records: snapshot.report.skipped_records,
        unlabeled_nodes: snapshot.report.unlabeled_nodes,
    };
    serde_json::to_string_pretty(&document)
}

pub fn project_list(projects: &[Project], config: &DisplayConfig) -> String {
    let mut out = String::new();
    for project in projects {
        let _ = writeln!(
            out,
            "{}  {}  phases={}  total={}",
            project.id,
            project.name,
            project.phases.len(),
            format_money(reachable_total([project]), config)
        );
    }
    out
}
