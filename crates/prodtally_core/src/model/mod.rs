//! Work-breakdown contribution model.
//!
//! # Responsibility
//! - Define the project → phase → node tree read by the summary engine.
//! - Keep money in exact integer minor units once it enters the core.
//!
//! # Invariants
//! - Trees are strictly owned parent → child; no shared or back references.
//! - Ids produced by [`generate_id`] never contain the group-key separator.
//!
//! # See also
//! - crate::summary

pub mod amount;
pub mod project;

pub use amount::{Amount, AmountError};
pub use project::{
    generate_id, is_separator_safe, Contribution, Node, Phase, Project, GROUP_KEY_SEPARATOR,
};
