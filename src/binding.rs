//! Bound-variable notification: listeners registered against a node identifier
//! are told, synchronously, when that node resolves a value during a traversal.
//!
//! The registry holds weak back-references only: registering a listener never
//! extends its lifetime, and a listener dropped elsewhere is pruned the next
//! time its source node notifies. Fan-out is a plain synchronous call per
//! listener, in registration order.

use crate::node::NodeId;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Which access a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableAccess {
    Read,
    Write,
}

/// A listener bound to one or more source nodes.
///
/// `value` is the resolved value for read accesses; write accesses pass `None`
/// (the produced bytes are already in the writing token).
pub trait BoundVariable {
    fn notified(&self, access: VariableAccess, source: NodeId, value: Option<&[u8]>);
}

/// Weak listener references keyed by source node identifier.
#[derive(Default)]
pub struct BindingRegistry {
    listeners: HashMap<NodeId, Vec<Weak<dyn BoundVariable>>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for notifications from `source`.
    pub fn bind(&mut self, source: NodeId, listener: Weak<dyn BoundVariable>) {
        self.listeners.entry(source).or_default().push(listener);
    }

    /// Drop every listener registered for `source`.
    pub fn unbind_all(&mut self, source: NodeId) {
        self.listeners.remove(&source);
    }

    /// Number of live listeners currently bound to `source`.
    pub fn bound_count(&self, source: NodeId) -> usize {
        self.listeners
            .get(&source)
            .map(|l| l.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Upgrade the live listeners of `source`, pruning dead entries.
    ///
    /// Returns owned handles so the caller can release any surrounding borrow
    /// before invoking listener code (listeners may touch the memory again).
    pub(crate) fn listeners_of(&mut self, source: NodeId) -> Vec<Rc<dyn BoundVariable>> {
        match self.listeners.get_mut(&source) {
            Some(entries) => {
                entries.retain(|w| w.strong_count() > 0);
                entries.iter().filter_map(Weak::upgrade).collect()
            }
            None => Vec::new(),
        }
    }
}
