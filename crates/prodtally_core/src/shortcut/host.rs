//! Application-root shortcut host.
//!
//! # Responsibility
//! - Own the registry for one application root.
//! - Act as the single key-down listener: encode, then dispatch.
//!
//! # Invariants
//! - The listener is attached at most once per host.
//! - `shutdown` detaches the listener and closes the registry; it runs on
//!   drop if the owner did not call it.

use crate::shortcut::combo::{encode, KeyEvent, Platform};
use crate::shortcut::registry::{DispatchOutcome, ShortcutError, ShortcutRegistry};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerState {
    Detached,
    Attached,
    ShutDown,
}

/// Root-level key listener plus the registry it routes into.
#[derive(Debug)]
pub struct ShortcutHost {
    registry: ShortcutRegistry,
    platform: Platform,
    listener: ListenerState,
}

impl ShortcutHost {
    pub fn new(platform: Platform) -> Self {
        Self {
            registry: ShortcutRegistry::new(),
            platform,
            listener: ListenerState::Detached,
        }
    }

    /// Host for the compile-target platform.
    pub fn for_current_platform() -> Self {
        Self::new(Platform::current())
    }

    /// Registry handle to pass down to UI regions.
    pub fn registry(&self) -> &ShortcutRegistry {
        &self.registry
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Installs the key-down listener.
    ///
    /// # Errors
    /// - `ListenerAlreadyAttached` on a second call.
    /// - `RegistryClosed` after shutdown.
    pub fn attach(&mut self) -> Result<(), ShortcutError> {
        match self.listener {
            ListenerState::Detached => {
                self.listener = ListenerState::Attached;
                info!(
                    "event=shortcut_listener_attach module=shortcut status=ok platform={:?}",
                    self.platform
                );
                Ok(())
            }
            ListenerState::Attached => Err(ShortcutError::ListenerAlreadyAttached),
            ListenerState::ShutDown => Err(ShortcutError::RegistryClosed),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.listener == ListenerState::Attached
    }

    /// Listener entry point for one key-down event.
    ///
    /// Events arriving while detached are left to the host's default handling.
    pub fn handle_key_down(&self, event: &KeyEvent) -> DispatchOutcome {
        if self.listener != ListenerState::Attached {
            return DispatchOutcome::Unhandled;
        }
        let combo = encode(event, self.platform);
        let outcome = self.registry.dispatch(&combo, event);
        if !outcome.is_handled() {
            debug!(
                "event=shortcut_key module=shortcut status=unhandled combo={}",
                combo
            );
        }
        outcome
    }

    /// Detaches the listener and closes the registry. Idempotent.
    pub fn shutdown(&mut self) {
        if self.listener == ListenerState::ShutDown {
            return;
        }
        self.listener = ListenerState::ShutDown;
        self.registry.close();
        info!("event=shortcut_listener_detach module=shortcut status=ok");
    }
}

impl Drop for ShortcutHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}
