//! Session-wide variable memory: values bound to node identifiers, plus the
//! bound-variable listener registry.
//!
//! One memory is shared (not owned) by every token traversing a tree over the
//! session's lifetime: a value memorized by a read is recalled by a later
//! write through the same memory. Sharing is `Rc<RefCell<_>>` — the engine is
//! single-threaded and the caller enforces one traversal at a time.

use crate::binding::{BindingRegistry, BoundVariable};
use crate::node::NodeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Shared handle to a [`Memory`], as carried by processing tokens.
pub type SharedMemory = Rc<RefCell<Memory>>;

/// Variable-binding storage: node id → resolved value, and the notification
/// registry for bound variables.
#[derive(Default)]
pub struct Memory {
    values: HashMap<NodeId, Vec<u8>>,
    registry: BindingRegistry,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// New memory behind a shared handle.
    pub fn shared() -> SharedMemory {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Bind `value` to `id`, replacing any previous value.
    pub fn memorize(&mut self, id: NodeId, value: Vec<u8>) {
        self.values.insert(id, value);
    }

    /// The value currently bound to `id`, if any.
    pub fn recall(&self, id: NodeId) -> Option<&[u8]> {
        self.values.get(&id).map(Vec::as_slice)
    }

    pub fn has_value(&self, id: NodeId) -> bool {
        self.values.contains_key(&id)
    }

    /// Remove and return the value bound to `id`.
    pub fn forget(&mut self, id: NodeId) -> Option<Vec<u8>> {
        self.values.remove(&id)
    }

    /// Register a bound-variable listener for notifications from `source`.
    pub fn bind(&mut self, source: NodeId, listener: Weak<dyn BoundVariable>) {
        self.registry.bind(source, listener);
    }

    /// Drop every listener bound to `source`.
    pub fn unbind_all(&mut self, source: NodeId) {
        self.registry.unbind_all(source);
    }

    pub fn bound_count(&self, source: NodeId) -> usize {
        self.registry.bound_count(source)
    }

    pub(crate) fn listeners_of(&mut self, source: NodeId) -> Vec<Rc<dyn BoundVariable>> {
        self.registry.listeners_of(source)
    }
}
