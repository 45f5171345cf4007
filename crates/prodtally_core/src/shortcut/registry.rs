//! Last-registered-wins shortcut registry.
//!
//! # Responsibility
//! - Keep one LIFO handler stack per combo id.
//! - Dispatch each event to the top handler of its combo only.
//!
//! # Invariants
//! - Handler identity is the [`HandlerToken`] issued at registration, never
//!   closure identity.
//! - Unregistering the top handler re-exposes the next most recent one.
//! - The internal borrow is released before a handler runs, so handlers may
//!   register/unregister while being dispatched.
//! - After `close`, register/unregister fail and dispatch is a no-op.

use crate::shortcut::combo::KeyEvent;
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// Shared, interior-mutable key handler.
pub type KeyHandler = Rc<RefCell<dyn FnMut(&KeyEvent)>>;

/// Identity of one registration. Monotonically increasing per registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerToken(u64);

impl HandlerToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for HandlerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of routing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The top handler for the combo ran.
    Handled(HandlerToken),
    /// No live handler; host default behavior is left alone.
    Unhandled,
}

impl DispatchOutcome {
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// Registry contract violations. These indicate a lifecycle bug in the
/// caller and are surfaced instead of absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutError {
    /// Combo id is empty.
    EmptyCombo,
    /// Token is not registered under this combo.
    UnknownHandler { combo: String, token: HandlerToken },
    /// The registry was shut down with its owning host.
    RegistryClosed,
    /// The host listener is already installed.
    ListenerAlreadyAttached,
}

impl Display for ShortcutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCombo => write!(f, "shortcut combo must not be empty"),
            Self::UnknownHandler { combo, token } => {
                write!(f, "handler {token} is not registered for `{combo}`")
            }
            Self::RegistryClosed => write!(f, "shortcut registry is closed"),
            Self::ListenerAlreadyAttached => {
                write!(f, "shortcut listener can only be attached once")
            }
        }
    }
}

impl Error for ShortcutError {}

#[derive(Default)]
struct RegistryState {
    stacks: HashMap<String, Vec<HandlerToken>>,
    handlers: HashMap<HandlerToken, KeyHandler>,
    next_token: u64,
    closed: bool,
}

/// Cheap-to-clone handle to one registry; clones share state.
#[derive(Clone, Default)]
pub struct ShortcutRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl Debug for ShortcutRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ShortcutRegistry")
            .field("combos", &state.stacks.len())
            .field("handlers", &state.handlers.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `handler` on top of the stack for `combo`.
    ///
    /// The new handler shadows, but does not remove, earlier handlers.
    pub fn register(
        &self,
        combo: &str,
        handler: impl FnMut(&KeyEvent) + 'static,
    ) -> Result<HandlerToken, ShortcutError> {
        let handler: KeyHandler = Rc::new(RefCell::new(handler));
        self.register_shared(combo, handler)
    }

    /// Same as [`register`](Self::register) for an already shared handler.
    pub fn register_shared(
        &self,
        combo: &str,
        handler: KeyHandler,
    ) -> Result<HandlerToken, ShortcutError> {
        if combo.is_empty() {
            return Err(ShortcutError::EmptyCombo);
        }
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(ShortcutError::RegistryClosed);
        }

        state.next_token += 1;
        let token = HandlerToken(state.next_token);
        state.handlers.insert(token, handler);
        let stack = state.stacks.entry(combo.to_string()).or_default();
        stack.push(token);
        debug!(
            "event=shortcut_register module=shortcut status=ok combo={} token={} depth={}",
            combo,
            token.get(),
            stack.len()
        );
        Ok(token)
    }

    /// Removes the registration `token` from `combo`, wherever it sits.
    pub fn unregister(&self, combo: &str, token: HandlerToken) -> Result<(), ShortcutError> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(ShortcutError::RegistryClosed);
        }

        let unknown = || ShortcutError::UnknownHandler {
            combo: combo.to_string(),
            token,
        };
        let stack = state.stacks.get_mut(combo).ok_or_else(unknown)?;
        let position = stack
            .iter()
            .rposition(|candidate| *candidate == token)
            .ok_or_else(unknown)?;
        stack.remove(position);
        let depth = stack.len();
        if depth == 0 {
            state.stacks.remove(combo);
        }
        state.handlers.remove(&token);

        debug!(
            "event=shortcut_unregister module=shortcut status=ok combo={} token={} depth={}",
            combo,
            token.get(),
            depth
        );
        Ok(())
    }

    /// Invokes only the most recently registered live handler for `combo`.
    pub fn dispatch(&self, combo: &str, event: &KeyEvent) -> DispatchOutcome {
        let top = {
            let state = self.state.borrow();
            if state.closed {
                return DispatchOutcome::Unhandled;
            }
            state
                .stacks
                .get(combo)
                .and_then(|stack| stack.last())
                .and_then(|token| {
                    state
                        .handlers
                        .get(token)
                        .map(|handler| (*token, Rc::clone(handler)))
                })
        };

        let Some((token, handler)) = top else {
            return DispatchOutcome::Unhandled;
        };
        let Ok(mut handler) = handler.try_borrow_mut() else {
            warn!(
                "event=shortcut_dispatch module=shortcut status=skip combo={} token={} reason=reentrant",
                combo,
                token.get()
            );
            return DispatchOutcome::Unhandled;
        };
        debug!(
            "event=shortcut_dispatch module=shortcut status=ok combo={} token={}",
            combo,
            token.get()
        );
        (*handler)(event);
        DispatchOutcome::Handled(token)
    }

    /// Number of live handlers for `combo`.
    pub fn depth(&self, combo: &str) -> usize {
        self.state
            .borrow()
            .stacks
            .get(combo)
            .map_or(0, Vec::len)
    }

    /// Token that would receive the next event for `combo`.
    pub fn active_handler(&self, combo: &str) -> Option<HandlerToken> {
        self.state
            .borrow()
            .stacks
            .get(combo)
            .and_then(|stack| stack.last().copied())
    }

    /// Combos with at least one live handler, sorted.
    pub fn active_combos(&self) -> Vec<String> {
        let mut combos: Vec<String> = self.state.borrow().stacks.keys().cloned().collect();
        combos.sort();
        combos
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Drops every handler and rejects further registry calls.
    pub(crate) fn close(&self) {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return;
        }
        let leaked = state.handlers.len();
        state.stacks.clear();
        state.handlers.clear();
        state.closed = true;
        if leaked > 0 {
            warn!(
                "event=shortcut_registry_closed module=shortcut status=leak handlers={}",
                leaked
            );
        } else {
            debug!("event=shortcut_registry_closed module=shortcut status=ok");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DispatchOutcome, ShortcutError, ShortcutRegistry};
    use crate::shortcut::combo::KeyEvent;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn latest_registration_wins_until_unregistered() {
        let registry = ShortcutRegistry::new();
        let calls = recorder();
        let event = KeyEvent::new("KeyC").with_ctrl();

        let log = Rc::clone(&calls);
        let h1 = registry
            .register("Ctrl+KeyC", move |_| log.borrow_mut().push("h1"))
            .expect("h1 should register");
        let log = Rc::clone(&calls);
        let h2 = registry
            .register("Ctrl+KeyC", move |_| log.borrow_mut().push("h2"))
            .expect("h2 should register");

        assert_eq!(
            registry.dispatch("Ctrl+KeyC", &event),
            DispatchOutcome::Handled(h2)
        );
        registry.unregister("Ctrl+KeyC", h2).expect("h2 should unregister");
        assert_eq!(
            registry.dispatch("Ctrl+KeyC", &event),
            DispatchOutcome::Handled(h1)
        );
        registry.unregister("Ctrl+KeyC", h1).expect("h1 should unregister");
        assert_eq!(
            registry.dispatch("Ctrl+KeyC", &event),
            DispatchOutcome::Unhandled
        );

        assert_eq!(*calls.borrow(), vec!["h2", "h1"]);
        assert!(registry.active_combos().is_empty());
    }

    #[test]
    fn unregistering_a_shadowed_handler_keeps_the_top_active() {
        let registry = ShortcutRegistry::new();
        let h1 = registry.register("Delete", |_| {}).unwrap();
        let h2 = registry.register("Delete", |_| {}).unwrap();
        let h3 = registry.register("Delete", |_| {}).unwrap();

        registry.unregister("Delete", h2).unwrap();
        assert_eq!(registry.depth("Delete"), 2);
        assert_eq!(registry.active_handler("Delete"), Some(h3));

        registry.unregister("Delete", h3).unwrap();
        assert_eq!(registry.active_handler("Delete"), Some(h1));
    }

    #[test]
    fn combos_are_independent() {
        let registry = ShortcutRegistry::new();
        let copy = registry.register("Ctrl+KeyC", |_| {}).unwrap();
        let paste = registry.register("Ctrl+KeyV", |_| {}).unwrap();

        assert_eq!(
            registry.dispatch("Ctrl+KeyV", &KeyEvent::new("KeyV")),
            DispatchOutcome::Handled(paste)
        );
        assert_eq!(registry.active_handler("Ctrl+KeyC"), Some(copy));
        assert_eq!(registry.active_combos(), vec!["Ctrl+KeyC", "Ctrl+KeyV"]);
    }

    #[test]
    fn misuse_fails_loudly() {
        let registry = ShortcutRegistry::new();
        let token = registry.register("Ctrl+KeyC", |_| {}).unwrap();

        let wrong_combo = registry
            .unregister("Ctrl+KeyV", token)
            .expect_err("token is not registered under this combo");
        assert!(matches!(wrong_combo, ShortcutError::UnknownHandler { .. }));

        registry.unregister("Ctrl+KeyC", token).unwrap();
        let twice = registry
            .unregister("Ctrl+KeyC", token)
            .expect_err("double unregister must fail");
        assert!(matches!(twice, ShortcutError::UnknownHandler { .. }));

        assert_eq!(
            registry.register("", |_| {}),
            Err(ShortcutError::EmptyCombo)
        );
    }

    #[test]
    fn handlers_may_register_while_dispatched() {
        let registry = ShortcutRegistry::new();
        let inner = registry.clone();
        let nested = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&nested);

        registry
            .register("Escape", move |_| {
                let token = inner.register("Escape", |_| {}).expect("nested register");
                *slot.borrow_mut() = Some(token);
            })
            .unwrap();

        assert!(registry
            .dispatch("Escape", &KeyEvent::new("Escape"))
            .is_handled());
        let nested_token = nested.borrow().expect("nested handler registered");
        assert_eq!(registry.active_handler("Escape"), Some(nested_token));
    }

    #[test]
    fn reentrant_dispatch_of_the_same_handler_is_skipped() {
        let registry = ShortcutRegistry::new();
        let inner = registry.clone();
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outcomes);

        registry
            .register("KeyR", move |event| {
                sink.borrow_mut().push(inner.dispatch("KeyR", event));
            })
            .unwrap();

        assert!(registry.dispatch("KeyR", &KeyEvent::new("KeyR")).is_handled());
        assert_eq!(*outcomes.borrow(), vec![DispatchOutcome::Unhandled]);
    }

    #[test]
    fn closed_registry_rejects_calls() {
        let registry = ShortcutRegistry::new();
        let token = registry.register("KeyA", |_| {}).unwrap();
        registry.close();

        assert!(registry.is_closed());
        assert_eq!(
            registry.unregister("KeyA", token),
            Err(ShortcutError::RegistryClosed)
        );
        assert_eq!(
            registry.register("KeyA", |_| {}),
            Err(ShortcutError::RegistryClosed)
        );
        assert_eq!(
            registry.dispatch("KeyA", &KeyEvent::new("KeyA")),
            DispatchOutcome::Unhandled
        );
    }
}
