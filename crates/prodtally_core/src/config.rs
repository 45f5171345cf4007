//! Display configuration for summary rendering.
//!
//! # Responsibility
//! - Hold user-facing labels and money formatting knobs used by the
//!   presenter and empty-state messages.
//!
//! # Invariants
//! - `Default` reproduces the shipped Chinese UI wording.
//! - Missing keys in a deserialized config fall back to defaults.

use serde::{Deserialize, Serialize};

/// Labels and formatting used when rendering a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConfig {
    /// Shown when a source's project id cannot be resolved.
    pub unknown_project_label: String,
    /// Shown when a source's phase id cannot be resolved.
    pub unknown_phase_label: String,
    /// Shown instead of an empty path for root-level contributions.
    pub base_item_label: String,
    /// Joins path labels in detail rows.
    pub path_separator: String,
    /// Prefix for formatted money.
    pub currency_symbol: String,
    /// Digit group separator for formatted money.
    pub thousands_separator: String,
    /// Empty result because every project is excluded.
    pub nothing_selected_message: String,
    /// Empty result for any other reason.
    pub no_data_message: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            unknown_project_label: "未知项目".to_string(),
            unknown_phase_label: "未知分期".to_string(),
            base_item_label: "基础项".to_string(),
            path_separator: " - ".to_string(),
            currency_symbol: "¥".to_string(),
            thousands_separator: ",".to_string(),
            nothing_selected_message: "请勾选至少一个项目".to_string(),
            no_data_message: "暂无数据".to_string(),
        }
    }
}

impl DisplayConfig {
    /// Parses a JSON config; absent keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
