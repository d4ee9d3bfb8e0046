//! Listener registry.
//!
//! Listeners subscribe to exactly one node kind. Those that do not name a
//! kind are filed under [`NodeKind::Other`], which is also the kind of every
//! node outside the fixed grammar.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;
use treewalk_ast::NodeKind;

use crate::{ListenerError, TraversalContext, TraversalEvent};

/// Observer of traversal events for one node kind.
///
/// Both callbacks default to doing nothing, so a listener implements only
/// the side it cares about.
pub trait NodeListener {
    /// The kind this listener subscribes to. `None` means
    /// [`NodeKind::Other`].
    fn kind(&self) -> Option<NodeKind>;

    /// Called when the walker reaches a node of the subscribed kind, before
    /// its children.
    fn on_enter<'a>(
        &self,
        _event: &TraversalEvent<'a, '_>,
        _cx: &mut TraversalContext<'a, '_>,
    ) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called after all children of the node have been visited.
    fn on_exit<'a>(
        &self,
        _event: &TraversalEvent<'a, '_>,
        _cx: &mut TraversalContext<'a, '_>,
    ) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Normalised subscription kind of a listener.
pub fn subscription_kind(listener: &dyn NodeListener) -> NodeKind {
    listener.kind().unwrap_or(NodeKind::Other)
}

/// Listeners grouped by kind, each group in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<NodeKind, Vec<Rc<dyn NodeListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `listener` under its kind. Registering the same listener twice
    /// has no effect. Returns whether it was added.
    pub fn register(&mut self, listener: Rc<dyn NodeListener>) -> bool {
        let kind = subscription_kind(listener.as_ref());
        let group = self.listeners.entry(kind).or_default();
        if group.iter().any(|existing| Rc::ptr_eq(existing, &listener)) {
            debug!("{} already registered for {}", listener.name(), kind);
            return false;
        }
        debug!("Registered {} for {}", listener.name(), kind);
        group.push(listener);
        true
    }

    /// Removes `listener` from its kind. Returns `false` if it was not
    /// registered.
    pub fn unregister(&mut self, listener: &Rc<dyn NodeListener>) -> bool {
        let kind = subscription_kind(listener.as_ref());
        let Some(group) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let Some(position) = group.iter().position(|existing| Rc::ptr_eq(existing, listener))
        else {
            return false;
        };
        group.remove(position);
        if group.is_empty() {
            self.listeners.remove(&kind);
        }
        debug!("Unregistered {} from {}", listener.name(), kind);
        true
    }

    /// Listeners registered for exactly `kind`, in registration order.
    pub fn lookup(&self, kind: NodeKind) -> &[Rc<dyn NodeListener>] {
        self.listeners.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if at least one listener is registered for `kind`.
    pub fn has_listeners(&self, kind: NodeKind) -> bool {
        !self.lookup(kind).is_empty()
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Kinds with at least one listener, in declaration order.
    pub fn kinds(&self) -> Vec<NodeKind> {
        let mut kinds: Vec<_> = self.listeners.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for kind in self.kinds() {
            let names: Vec<_> = self.lookup(kind).iter().map(|l| l.name()).collect();
            map.entry(&kind, &names);
        }
        map.finish()
    }
}
