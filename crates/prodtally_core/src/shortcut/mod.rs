//! Keyboard shortcut routing.
//!
//! # Responsibility
//! - Encode key events into platform-neutral combo ids (`combo`).
//! - Route each combo to its most recently registered live handler
//!   (`registry`), with scoped ownership for UI regions (`binding`).
//! - Provide the single root-level listener (`host`).
//!
//! # Invariants
//! - Exactly one handler runs per event: the top of that combo's stack.
//! - The registry is an explicitly owned service, not global state.

pub mod binding;
pub mod combo;
pub mod host;
pub mod registry;

pub use binding::ShortcutBinding;
pub use combo::{encode, KeyEvent, Platform};
pub use host::ShortcutHost;
pub use registry::{DispatchOutcome, HandlerToken, KeyHandler, ShortcutError, ShortcutRegistry};
