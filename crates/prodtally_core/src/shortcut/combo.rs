//! Key event to combo-id codec.
//!
//! # Responsibility
//! - Encode a physical key event as a canonical, layout-independent combo id.
//! - Remap Command/Control per platform so one id means the OS-idiomatic
//!   chord everywhere.
//!
//! # Invariants
//! - Prefix order is fixed: `Ctrl+`, `Win+`, `Alt+`, `Shift+`, then the key
//!   code.
//! - Encoding is pure and total over every event.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::cell::Cell;

static APPLE_USER_AGENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mac").expect("valid user agent regex"));

/// Host platform family for modifier remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// macOS/iOS: primary = Command (Meta), secondary = Control.
    Apple,
    /// Everything else: primary = Control, secondary = Meta/Super.
    Other,
}

impl Platform {
    /// Platform of the compile target.
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Apple
        } else {
            Self::Other
        }
    }

    /// Classifies a web-view user agent; any `mac` substring means Apple.
    pub fn from_user_agent(user_agent: &str) -> Self {
        if APPLE_USER_AGENT_RE.is_match(user_agent) {
            Self::Apple
        } else {
            Self::Other
        }
    }
}

/// One key-down event as delivered by the host window.
///
/// Field names follow the DOM `KeyboardEvent` so web-view hosts can forward
/// events as JSON unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    /// Physical key code, e.g. `KeyC`, `Backspace`, `Digit1`.
    pub code: String,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(skip)]
    default_prevented: Cell<bool>,
}

impl KeyEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    /// Suppresses the host's default action for this event.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Encodes `event` as a combo id for `platform`.
pub fn encode(event: &KeyEvent, platform: Platform) -> String {
    let (primary, secondary) = match platform {
        Platform::Apple => (event.meta_key, event.ctrl_key),
        Platform::Other => (event.ctrl_key, event.meta_key),
    };

    let mut combo = String::with_capacity(event.code.len() + 20);
    if primary {
        combo.push_str("Ctrl+");
    }
    if secondary {
        combo.push_str("Win+");
    }
    if event.alt_key {
        combo.push_str("Alt+");
    }
    if event.shift_key {
        combo.push_str("Shift+");
    }
    combo.push_str(&event.code);
    combo
}
