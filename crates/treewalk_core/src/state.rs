//! Shared state store.
//!
//! Listeners that react to many nodes often need to remember what they have
//! already done across those nodes, e.g. "the logger field of this class has
//! been added; reuse it". A [`SharedState`] is that memory. The caller
//! decides its scope (one per class, one per file, one per run) by deciding
//! how long to keep it and which traversals to pass it to; the store itself
//! never expires entries.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use treewalk_ast::JavaNode;

/// A value held in a [`SharedState`].
#[derive(Clone)]
pub enum StateValue<'a> {
    /// A node, typically one a listener created and wants to reuse.
    Node(&'a JavaNode<'a>),
    Text(String),
    Bool(bool),
    Number(i64),
    /// Anything else. Retrieve with [`StateValue::downcast_ref`].
    Opaque(Rc<dyn Any>),
}

impl<'a> StateValue<'a> {
    pub fn as_node(&self) -> Option<&'a JavaNode<'a>> {
        match self {
            StateValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            StateValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Downcasts an opaque value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            StateValue::Opaque(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for StateValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateValue::Node(node) => f.debug_tuple("Node").field(&node.kind()).finish(),
            StateValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            StateValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            StateValue::Number(value) => f.debug_tuple("Number").field(value).finish(),
            StateValue::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl<'a> From<&'a JavaNode<'a>> for StateValue<'a> {
    fn from(node: &'a JavaNode<'a>) -> Self {
        StateValue::Node(node)
    }
}

impl From<String> for StateValue<'_> {
    fn from(text: String) -> Self {
        StateValue::Text(text)
    }
}

impl From<&str> for StateValue<'_> {
    fn from(text: &str) -> Self {
        StateValue::Text(text.to_string())
    }
}

impl From<bool> for StateValue<'_> {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue<'_> {
    fn from(value: i64) -> Self {
        StateValue::Number(value)
    }
}

/// Key/value store plus a single "initialized" latch.
///
/// A fresh store is empty and not initialized.
///
/// # Example
///
/// ```rust
/// use treewalk_core::SharedState;
///
/// let mut state = SharedState::new();
/// assert!(!state.is_initialized());
///
/// let first = state.get_or_init("logger", || "LOGGER".into());
/// assert_eq!(first.as_text(), Some("LOGGER"));
///
/// // The second call does not run the initializer.
/// let again = state.get_or_init("logger", || unreachable!());
/// assert_eq!(again.as_text(), Some("LOGGER"));
/// ```
#[derive(Debug, Default)]
pub struct SharedState<'a> {
    values: HashMap<String, StateValue<'a>>,
    initialized: bool,
}

impl<'a> SharedState<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&StateValue<'a>> {
        self.values.get(key)
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<StateValue<'a>>,
    ) -> Option<StateValue<'a>> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<StateValue<'a>> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the value under `key`, computing and storing it first if the
    /// key is absent.
    pub fn get_or_init(
        &mut self,
        key: &str,
        init: impl FnOnce() -> StateValue<'a>,
    ) -> &StateValue<'a> {
        self.values.entry(key.to_string()).or_insert_with(init)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn unset_initialized(&mut self) {
        self.initialized = false;
    }

    pub fn set_initialization_status(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drops every entry and resets the latch.
    pub fn clear(&mut self) {
        self.values.clear();
        self.initialized = false;
    }
}
