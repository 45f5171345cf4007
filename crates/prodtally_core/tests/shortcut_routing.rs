use prodtally_core::{
    DispatchOutcome, KeyEvent, Platform, ShortcutBinding, ShortcutError, ShortcutHost,
    ShortcutRegistry,
};
use std::cell::RefCell;
use std::rc::Rc;

fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> impl FnMut(&KeyEvent) {
    let log = Rc::clone(log);
    move |_: &KeyEvent| log.borrow_mut().push(name)
}

#[test]
fn latest_registration_wins_and_unregister_restores_previous() {
    let registry = ShortcutRegistry::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let event = KeyEvent::new("KeyC").with_ctrl();

    let h1 = registry.register("Ctrl+KeyC", recorder(&log, "h1")).unwrap();
    let h2 = registry.register("Ctrl+KeyC", recorder(&log, "h2")).unwrap();

    assert_eq!(registry.dispatch("Ctrl+KeyC", &event), DispatchOutcome::Handled(h2));
    registry.unregister("Ctrl+KeyC", h2).unwrap();
    assert_eq!(registry.dispatch("Ctrl+KeyC", &event), DispatchOutcome::Handled(h1));
    registry.unregister("Ctrl+KeyC", h1).unwrap();
    assert_eq!(registry.dispatch("Ctrl+KeyC", &event), DispatchOutcome::Unhandled);

    assert_eq!(*log.borrow(), vec!["h2", "h1"]);
    assert!(registry.active_combos().is_empty());
}

#[test]
fn dialog_takes_over_combos_while_open() {
    let mut host = ShortcutHost::new(Platform::Apple);
    host.attach().unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));

    let _page_delete = ShortcutBinding::bind(host.registry(), "Delete", recorder(&log, "page")).unwrap();
    let _page_save = ShortcutBinding::bind(host.registry(), "Ctrl+KeyS", recorder(&log, "save")).unwrap();
    {
        let _dialog_delete =
            ShortcutBinding::bind(host.registry(), "Delete", recorder(&log, "dialog")).unwrap();
        host.handle_key_down(&KeyEvent::new("Delete"));
        host.handle_key_down(&KeyEvent::new("KeyS").with_meta());
    }
    host.handle_key_down(&KeyEvent::new("Delete"));

    assert_eq!(*log.borrow(), vec!["dialog", "save", "page"]);
}

#[test]
fn shutdown_closes_registry_for_late_bindings() {
    let mut host = ShortcutHost::new(Platform::Other);
    let registry = host.registry().clone();
    host.shutdown();

    let err = ShortcutBinding::bind(&registry, "Escape", |_| {}).err();
    assert_eq!(err, Some(ShortcutError::RegistryClosed));
}
