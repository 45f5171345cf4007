//! Scoped shortcut ownership for UI regions.
//!
//! A [`ShortcutBinding`] registers once and keeps the latest handler behind a
//! long-lived cell, so swapping the handler (e.g. one closing over fresh
//! state) does not touch the registry. Registry traffic only happens when the
//! combo changes or the binding is created/dropped.

use crate::shortcut::combo::KeyEvent;
use crate::shortcut::registry::{HandlerToken, KeyHandler, ShortcutError, ShortcutRegistry};
use log::{error, warn};
use std::cell::RefCell;
use std::rc::Rc;

type HandlerCell = Rc<RefCell<KeyHandler>>;

/// Registration guard; unregisters on drop.
pub struct ShortcutBinding {
    registry: ShortcutRegistry,
    combo: String,
    token: Option<HandlerToken>,
    current: HandlerCell,
}

impl ShortcutBinding {
    /// Registers `handler` for `combo` on `registry`.
    pub fn bind(
        registry: &ShortcutRegistry,
        combo: impl Into<String>,
        handler: impl FnMut(&KeyEvent) + 'static,
    ) -> Result<Self, ShortcutError> {
        let handler: KeyHandler = Rc::new(RefCell::new(handler));
        let current: HandlerCell = Rc::new(RefCell::new(handler));
        let combo = combo.into();
        let token = registry.register_shared(&combo, trampoline(&current))?;
        Ok(Self {
            registry: registry.clone(),
            combo,
            token: Some(token),
            current,
        })
    }

    /// Replaces the handler without re-registering.
    ///
    /// Safe to call from inside the handler being replaced; the new handler
    /// takes effect on the next event.
    pub fn set_handler(&self, handler: impl FnMut(&KeyEvent) + 'static) {
        let handler: KeyHandler = Rc::new(RefCell::new(handler));
        *self.current.borrow_mut() = handler;
    }

    /// Moves the binding to another combo. No-op when unchanged.
    ///
    /// The new registration lands on top of the new combo's stack.
    pub fn set_combo(&mut self, combo: impl Into<String>) -> Result<(), ShortcutError> {
        let combo = combo.into();
        if combo == self.combo && self.token.is_some() {
            return Ok(());
        }
        let token = self.registry.register_shared(&combo, trampoline(&self.current))?;
        if let Some(previous) = self.token.replace(token) {
            let released = self.registry.unregister(&self.combo, previous);
            self.combo = combo;
            released?;
        } else {
            self.combo = combo;
        }
        Ok(())
    }

    pub fn combo(&self) -> &str {
        &self.combo
    }

    pub fn token(&self) -> Option<HandlerToken> {
        self.token
    }

    /// Unregisters now, surfacing misuse instead of logging it on drop.
    pub fn release(mut self) -> Result<(), ShortcutError> {
        match self.token.take() {
            Some(token) => self.registry.unregister(&self.combo, token),
            None => Ok(()),
        }
    }
}

impl Drop for ShortcutBinding {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        if let Err(err) = self.registry.unregister(&self.combo, token) {
            error!(
                "event=shortcut_release module=shortcut status=error combo={} token={} error={}",
                self.combo,
                token.get(),
                err
            );
        }
    }
}

/// Registered once per combo; forwards to whatever handler is current.
///
/// The event's default is prevented only when the handler actually runs. A
/// handler that is already running on this thread is skipped.
fn trampoline(current: &HandlerCell) -> KeyHandler {
    let current = Rc::clone(current);
    Rc::new(RefCell::new(move |event: &KeyEvent| {
        let handler = Rc::clone(&*current.borrow());
        let Ok(mut running) = handler.try_borrow_mut() else {
            warn!("event=shortcut_handler module=shortcut status=skip reason=reentrant");
            return;
        };
        event.prevent_default();
        (*running)(event);
    }))
}
