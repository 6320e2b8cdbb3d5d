//! Variable nodes: the typed tree describing a message format.
//!
//! Every node carries the shared state (identifier, name, mutability flag)
//! and one [`VariableKind`] deciding how its children combine:
//!
//! - [`VariableKind::Agg`] — ordered AND: every child must succeed in
//!   sequence (the core combinator).
//! - [`VariableKind::Alt`] — OR: first child to succeed wins.
//! - [`VariableKind::Repeat`] — one child, repeated `min..=max` times.
//! - [`VariableKind::Data`] — terminal leaf over opaque bytes.
//!
//! The kind set is closed: dispatch is a `match`, not open polymorphism.
//!
//! A tree is mutable over its own lifetime (`add_child` / `remove_child`),
//! but traversal borrows the tree shared (`&self`), so structural mutation
//! during an in-flight read or write is rejected at compile time.

use crate::binding::VariableAccess;
use crate::data::DataSpec;
use crate::memory::SharedMemory;
use crate::pattern::Pattern;
use crate::token::{ProcessingToken, ReadingToken, WritingToken};
use crate::{agg, alt, data, repeat};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable node identity, assigned at construction, never changed.
///
/// Cloning a subtree preserves identifiers: a clone shares memory slots and
/// bound-variable listeners with its original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// How a node combines its children.
#[derive(Debug, Clone)]
pub enum VariableKind {
    /// Ordered AND over the children.
    Agg { children: Vec<Variable> },
    /// OR over the children: first success wins.
    Alt { children: Vec<Variable> },
    /// One child repeated between `min` and `max` times.
    Repeat {
        child: Box<Variable>,
        min: usize,
        max: usize,
    },
    /// Terminal leaf over opaque bytes.
    Data { spec: DataSpec },
}

/// A grammar node: shared state plus a combining kind.
#[derive(Debug, Clone)]
pub struct Variable {
    id: NodeId,
    name: String,
    mutable: bool,
    kind: VariableKind,
}

impl Variable {
    fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Variable {
            id: NodeId::fresh(),
            name: name.into(),
            mutable: false,
            kind,
        }
    }

    /// Aggregate (ordered AND) over `children`.
    pub fn agg(name: impl Into<String>, children: Vec<Variable>) -> Self {
        Variable::new(name, VariableKind::Agg { children })
    }

    /// Alternative (OR) over `children`.
    pub fn alt(name: impl Into<String>, children: Vec<Variable>) -> Self {
        Variable::new(name, VariableKind::Alt { children })
    }

    /// `child` repeated between `min` and `max` times.
    ///
    /// Contract: `min <= max`.
    pub fn repeat(name: impl Into<String>, child: Variable, min: usize, max: usize) -> Self {
        assert!(min <= max, "inverted repetition bounds");
        Variable::new(
            name,
            VariableKind::Repeat {
                child: Box::new(child),
                min,
                max,
            },
        )
    }

    /// Terminal leaf with the given byte spec.
    pub fn data(name: impl Into<String>, spec: DataSpec) -> Self {
        Variable::new(name, VariableKind::Data { spec })
    }

    /// Leaf matching exactly the literal `bytes`.
    pub fn fixed(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Variable::data(name, DataSpec::Fixed(bytes.into()))
    }

    /// Leaf accepting any run of `min` to `max` bytes.
    pub fn bytes(name: impl Into<String>, min: usize, max: usize) -> Self {
        assert!(min <= max, "inverted size bounds");
        Variable::data(name, DataSpec::Sized { min, max })
    }

    /// Enable randomized/reordered traversal of this node's children at
    /// read/write time. Pattern derivation is unaffected.
    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn kind(&self) -> &VariableKind {
        &self.kind
    }

    /// Children in declaration order. Empty for leaves; the repetition kind
    /// exposes its single child.
    pub fn children(&self) -> &[Variable] {
        match &self.kind {
            VariableKind::Agg { children } | VariableKind::Alt { children } => children,
            VariableKind::Repeat { child, .. } => std::slice::from_ref(&**child),
            VariableKind::Data { .. } => &[],
        }
    }

    /// Append a child. Only valid between traversals.
    ///
    /// Contract: the node must be an aggregate or an alternative.
    pub fn add_child(&mut self, child: Variable) {
        match &mut self.kind {
            VariableKind::Agg { children } | VariableKind::Alt { children } => {
                children.push(child)
            }
            _ => panic!("add_child on a non-container node"),
        }
    }

    /// Remove and return the child with identity `id`, if present.
    pub fn remove_child(&mut self, id: NodeId) -> Option<Variable> {
        match &mut self.kind {
            VariableKind::Agg { children } | VariableKind::Alt { children } => children
                .iter()
                .position(|c| c.id == id)
                .map(|i| children.remove(i)),
            _ => None,
        }
    }

    /// Whether this node can resolve to a known value under `token`'s memory.
    ///
    /// An aggregate is defined iff it has at least one child and every child
    /// is defined; an alternative needs one defined child; a repetition is
    /// defined when it may repeat zero times or its child is defined; a leaf
    /// is defined when its value is fixed or memorized.
    pub fn is_defined(&self, token: &dyn ProcessingToken) -> bool {
        match &self.kind {
            VariableKind::Agg { children } => agg::is_defined(children, token),
            VariableKind::Alt { children } => alt::is_defined(children, token),
            VariableKind::Repeat { child, min, .. } => {
                *min == 0 || child.is_defined(token)
            }
            VariableKind::Data { spec } => data::is_defined(self, spec, token),
        }
    }

    /// Parse a share of the token's input with this node's grammar.
    ///
    /// Failure is reported through the token's success flag; the cursor is
    /// not rolled back (snapshot with [`ReadingToken::checkpoint`] first if
    /// a retry is needed).
    pub fn read(&self, token: &mut ReadingToken) {
        match &self.kind {
            VariableKind::Agg { children } => agg::read(self, children, token),
            VariableKind::Alt { children } => alt::read(self, children, token),
            VariableKind::Repeat { child, min, max } => {
                repeat::read(self, child, *min, *max, token)
            }
            VariableKind::Data { spec } => data::read(self, spec, token),
        }
    }

    /// Produce this node's bytes into the token's output.
    pub fn write(&self, token: &mut WritingToken) {
        match &self.kind {
            VariableKind::Agg { children } => agg::write(self, children, token),
            VariableKind::Alt { children } => alt::write(self, children, token),
            VariableKind::Repeat { child, min, max } => {
                repeat::write(self, child, *min, *max, token)
            }
            VariableKind::Data { spec } => data::write(self, spec, token),
        }
    }

    /// Broadcast an access event to the bound variables registered for this
    /// node in `memory`. Traversal calls this on success; external node
    /// kinds implementing the same interface use it the same way.
    pub fn notify(&self, memory: &SharedMemory, access: VariableAccess, value: Option<&[u8]>) {
        notify_bound(memory, self.id, access, value);
    }

    /// Derive the matcher for this node's grammar. Pure: no token, no side
    /// effects, no caching; declaration order regardless of mutability.
    pub fn build_pattern(&self) -> Pattern {
        match &self.kind {
            VariableKind::Agg { children } => agg::build_pattern(children),
            VariableKind::Alt { children } => alt::build_pattern(children),
            VariableKind::Repeat { child, min, max } => {
                repeat::build_pattern(child, *min, *max)
            }
            VariableKind::Data { spec } => data::build_pattern(spec),
        }
    }
}

/// Read-side ordering for a mutable node: children already resolvable to a
/// known value parse first (they are the likeliest to match), declaration
/// order preserved within each group.
pub(crate) fn read_order(children: &[Variable], token: &ReadingToken) -> Vec<usize> {
    let mut defined = Vec::new();
    let mut free = Vec::new();
    for (i, child) in children.iter().enumerate() {
        if child.is_defined(token) {
            defined.push(i);
        } else {
            free.push(i);
        }
    }
    defined.extend(free);
    defined
}

/// Write-side ordering for a mutable node: a traversal-local shuffle.
pub(crate) fn shuffled_order(len: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

/// Declaration order.
pub(crate) fn declared_order(len: usize) -> Vec<usize> {
    (0..len).collect()
}

/// Synchronous fan-out to the live listeners bound to `source`.
///
/// Listener handles are collected first so the memory borrow is released
/// before any listener runs.
pub(crate) fn notify_bound(
    memory: &SharedMemory,
    source: NodeId,
    access: VariableAccess,
    value: Option<&[u8]>,
) {
    let targets = memory.borrow_mut().listeners_of(source);
    for target in targets {
        target.notified(access, source, value);
    }
}
