//! Project / phase / node tree types.
//!
//! # Responsibility
//! - Mirror the `.prod` document shape (`camelCase` JSON keys).
//! - Provide small builders used by the editor boundary and tests.
//!
//! # Invariants
//! - Every phase owns exactly one root node.
//! - Contribution amounts stay raw (`Option<f64>`) here; validation into
//!   [`Amount`](crate::model::Amount) happens in the summary engine so that
//!   hand-edited files degrade instead of failing to load.

use crate::model::amount::{Amount, AmountError};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Separator used by presenter group keys (`projectId_phaseId`).
pub const GROUP_KEY_SEPARATOR: char = '_';

/// Generates a fresh stable id.
///
/// UUID text only contains hex digits and `-`, so generated ids are always
/// safe to join with [`GROUP_KEY_SEPARATOR`].
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns whether `id` can be used in a group key without ambiguity.
pub fn is_separator_safe(id: &str) -> bool {
    !id.contains(GROUP_KEY_SEPARATOR)
}

/// One project document.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Stable id, unique for the process lifetime.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Project {
    /// Creates an empty project with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(generate_id(), name)
    }

    /// Creates an empty project with a caller-provided id.
    ///
    /// Used by document import where identity already exists.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phases: Vec::new(),
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    pub fn phase(&self, phase_id: &str) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.id == phase_id)
    }
}

/// One phase (stage) of a project.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    pub name: String,
    /// Contributions on the root itself are "root-level" (empty path).
    pub root_node: Node,
}

impl Phase {
    /// Creates a phase with a generated id and an empty root.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(generate_id(), name, Node::root())
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, root_node: Node) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            root_node,
        }
    }

    pub fn with_root(mut self, root_node: Node) -> Self {
        self.root_node = root_node;
        self
    }
}

/// Work-breakdown tree node.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    /// User-facing label. Ignored on the phase root; required elsewhere.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl Node {
    /// Creates an unlabeled root node with a generated id.
    pub fn root() -> Self {
        Self {
            id: generate_id(),
            label: None,
            children: Vec::new(),
            contributions: Vec::new(),
        }
    }

    /// Creates a labeled node with a generated id.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(generate_id(), label)
    }

    pub fn with_id(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            children: Vec::new(),
            contributions: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_contribution(mut self, person: impl Into<String>, amount: f64) -> Self {
        self.contributions.push(Contribution::new(person, amount));
        self
    }

    /// Label as written, used verbatim as a path segment. `None` when absent.
    pub fn path_label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// One (person, amount) record attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Person or team key. Compared by exact string equality.
    pub person: String,
    /// Major-unit amount as written in the document.
    #[serde(default)]
    pub amount: Option<f64>,
}

impl Contribution {
    pub fn new(person: impl Into<String>, amount: f64) -> Self {
        Self {
            person: person.into(),
            amount: Some(amount),
        }
    }

    /// Validates the raw document amount.
    pub fn amount(&self) -> Result<Amount, AmountError> {
        match self.amount {
            Some(value) => Amount::from_major(value),
            None => Err(AmountError::Missing),
        }
    }
}

// f64 has no `Hash`; hash the bit pattern so structural fingerprints see any
// edit to an amount.
impl Hash for Contribution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.person.hash(state);
        self.amount.map(f64::to_bits).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_id, is_separator_safe, Contribution, Node, Phase, Project};
    use crate::model::{Amount, AmountError};

    #[test]
    fn generated_ids_are_unique_and_separator_safe() {
        let first = generate_id();
        let second = generate_id();
        assert_ne!(first, second);
        assert!(is_separator_safe(&first));
        assert!(!is_separator_safe("phase_1"));
    }

    #[test]
    fn path_label_keeps_text_verbatim() {
        let mut node = Node::with_id("n1", "  基坑  ");
        assert_eq!(node.path_label(), Some("  基坑  "));

        node.label = Some(String::new());
        assert_eq!(node.path_label(), Some(""));

        node.label = None;
        assert_eq!(node.path_label(), None);
    }

    #[test]
    fn contribution_amount_reports_missing_value() {
        let record = Contribution {
            person: "甲".to_string(),
            amount: None,
        };
        assert_eq!(record.amount(), Err(AmountError::Missing));
        assert_eq!(
            Contribution::new("甲", 1.5).amount(),
            Ok(Amount::from_minor_units(150))
        );
    }

    #[test]
    fn project_serialization_uses_document_field_names() {
        let project = Project::with_id("p1", "Tower").with_phase(Phase::with_id(
            "ph1",
            "Phase 1",
            Node::with_id("root", "root").with_contribution("甲", 100.0),
        ));

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["phases"][0]["rootNode"]["id"], "root");
        assert_eq!(
            json["phases"][0]["rootNode"]["contributions"][0]["person"],
            "甲"
        );

        let decoded: Project = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, project);
    }

    #[test]
    fn phase_lookup_finds_by_id() {
        let project = Project::with_id("p1", "Tower")
            .with_phase(Phase::with_id("a", "A", Node::root()))
            .with_phase(Phase::with_id("b", "B", Node::root()));
        assert_eq!(project.phase("b").map(|phase| phase.name.as_str()), Some("B"));
        assert!(project.phase("c").is_none());
    }
}
