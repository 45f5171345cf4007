//! Project document loading and schema validation.
//!
//! # Responsibility
//! - Parse `.prod` JSON documents into [`Project`] values.
//! - Reject structurally broken documents before they reach the engine.
//!
//! # Invariants
//! - Ids are non-empty and free of the group-key separator.
//! - Phase ids are unique within a project; node ids are unique within a
//!   phase; project ids are unique across one loaded set.
//! - Contribution amounts and node labels are not checked here. The engine
//!   skips malformed ones locally.

use crate::model::{is_separator_safe, Node, Project, GROUP_KEY_SEPARATOR};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Structural problem found in an otherwise well-formed JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    EmptyId { kind: &'static str },
    SeparatorInId { kind: &'static str, id: String },
    DuplicatePhase { project_id: String, phase_id: String },
    DuplicateNode { phase_id: String, node_id: String },
    DuplicateProject { project_id: String },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId { kind } => write!(f, "{kind} id cannot be empty"),
            Self::SeparatorInId { kind, id } => write!(
                f,
                "{kind} id `{id}` must not contain `{GROUP_KEY_SEPARATOR}`"
            ),
            Self::DuplicatePhase {
                project_id,
                phase_id,
            } => write!(
                f,
                "duplicate phase id `{phase_id}` in project `{project_id}`"
            ),
            Self::DuplicateNode { phase_id, node_id } => {
                write!(f, "duplicate node id `{node_id}` in phase `{phase_id}`")
            }
            Self::DuplicateProject { project_id } => {
                write!(f, "project id `{project_id}` is loaded more than once")
            }
        }
    }
}

impl Error for SchemaError {}

/// Failure to turn a document into a usable [`Project`].
#[derive(Debug)]
pub enum DocumentError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Schema(SchemaError),
}

impl DocumentError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Parse(_) => "parse",
            Self::Schema(_) => "schema",
        }
    }
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid project document: {err}"),
            Self::Schema(err) => write!(f, "invalid project document: {err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Schema(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<SchemaError> for DocumentError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

/// Parses and validates one project document.
pub fn parse_project(json: &str) -> DocumentResult<Project> {
    let project: Project = serde_json::from_str(json)?;
    validate_project(&project)?;
    Ok(project)
}

/// Reads, parses and validates the document at `path`.
pub fn load_project_file(path: impl AsRef<Path>) -> DocumentResult<Project> {
    let path = path.as_ref();
    let loaded = std::fs::read_to_string(path)
        .map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|json| parse_project(&json));

    match &loaded {
        Ok(project) => info!(
            "event=document_load module=document status=ok phases={}",
            project.phases.len()
        ),
        Err(err) => warn!(
            "event=document_load module=document status=error code={} path={}",
            err.code(),
            path.display()
        ),
    }
    loaded
}

/// Loads several documents as one project set, rejecting repeated project ids.
pub fn load_project_files<P: AsRef<Path>>(paths: &[P]) -> DocumentResult<Vec<Project>> {
    let mut seen = HashSet::new();
    let mut projects = Vec::with_capacity(paths.len());
    for path in paths {
        let project = load_project_file(path)?;
        if !seen.insert(project.id.clone()) {
            return Err(SchemaError::DuplicateProject {
                project_id: project.id,
            }
            .into());
        }
        projects.push(project);
    }
    Ok(projects)
}

/// Checks id structure of an in-memory project.
pub fn validate_project(project: &Project) -> Result<(), SchemaError> {
    check_id("project", &project.id)?;

    let mut phase_ids = HashSet::new();
    for phase in &project.phases {
        check_id("phase", &phase.id)?;
        if !phase_ids.insert(phase.id.as_str()) {
            return Err(SchemaError::DuplicatePhase {
                project_id: project.id.clone(),
                phase_id: phase.id.clone(),
            });
        }

        let mut node_ids = HashSet::new();
        let mut pending: Vec<&Node> = vec![&phase.root_node];
        while let Some(node) = pending.pop() {
            check_id("node", &node.id)?;
            if !node_ids.insert(node.id.as_str()) {
                return Err(SchemaError::DuplicateNode {
                    phase_id: phase.id.clone(),
                    node_id: node.id.clone(),
                });
            }
            pending.extend(node.children.iter());
        }
    }
    Ok(())
}

fn check_id(kind: &'static str, id: &str) -> Result<(), SchemaError> {
    if id.trim().is_empty() {
        return Err(SchemaError::EmptyId { kind });
    }
    // Node ids never take part in group keys.
    if kind != "node" && !is_separator_safe(id) {
        return Err(SchemaError::SeparatorInId {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}
