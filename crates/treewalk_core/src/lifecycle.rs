//! Begin/end notifications for whole traversals.

use std::cell::RefCell;
use std::rc::Rc;

/// Observer of traversal boundaries.
pub trait LifecycleListener {
    /// Called once before the first node event.
    fn on_begin(&self) {}

    /// Called once after the last node event of a traversal that completed
    /// without error.
    fn on_end(&self) {}
}

/// Ordered, identity de-duplicated set of lifecycle listeners.
///
/// Notifications go to a snapshot of the set, so a listener may add or
/// remove listeners while it is being notified. The change applies to the
/// next notification.
#[derive(Default)]
pub struct LifecycleNotifier {
    listeners: RefCell<Vec<Rc<dyn LifecycleListener>>>,
}

impl LifecycleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `listener` unless it is already present. Returns whether it was
    /// added.
    pub fn add(&self, listener: Rc<dyn LifecycleListener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        if listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    pub fn remove(&self, listener: &Rc<dyn LifecycleListener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| !Rc::ptr_eq(l, listener));
        listeners.len() != before
    }

    pub fn fire_begin(&self) {
        for listener in self.snapshot() {
            listener.on_begin();
        }
    }

    pub fn fire_end(&self) {
        for listener in self.snapshot() {
            listener.on_end();
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    fn snapshot(&self) -> Vec<Rc<dyn LifecycleListener>> {
        self.listeners.borrow().clone()
    }
}
