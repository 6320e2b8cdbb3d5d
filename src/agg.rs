//! Aggregate (ordered AND) combination: every child must succeed, in
//! sequence, for the node to succeed.
//!
//! Composition is all-or-nothing but without rollback: when a child fails
//! mid-sequence the remaining children are never attempted and the overall
//! result is failure, while the token keeps the cursor and output advanced
//! by the children that did run. Callers needing atomicity snapshot the
//! token with `checkpoint` before invoking a fallible aggregate.

use crate::binding::VariableAccess;
use crate::node::{declared_order, notify_bound, read_order, shuffled_order, Variable};
use crate::pattern::Pattern;
use crate::token::{ProcessingToken, ReadingToken, WritingToken};

/// An aggregate is defined iff it has at least one child and every child is
/// defined. Short-circuits on the first undefined child.
pub(crate) fn is_defined(children: &[Variable], token: &dyn ProcessingToken) -> bool {
    !children.is_empty() && children.iter().all(|c| c.is_defined(token))
}

/// Each child parses its share of the input, in sequence. A node with no
/// children fails outright; once a child fails, no further child runs.
pub(crate) fn read(var: &Variable, children: &[Variable], token: &mut ReadingToken) {
    if children.is_empty() {
        token.fail();
        return;
    }

    let start = token.index();
    let order = if var.is_mutable() {
        read_order(children, token)
    } else {
        declared_order(children.len())
    };

    for i in order {
        children[i].read(token);
        if !token.is_ok() {
            break;
        }
    }

    if token.is_ok() {
        let value = token.data()[start..token.index()].to_vec();
        token.set_current_value(value.clone());
        notify_bound(token.memory(), var.id(), VariableAccess::Read, Some(&value));
    }
}

/// Each child writes its value, in sequence. A new write access first
/// invalidates the node's previously computed final value and its index
/// references, before anything else — including the no-children check.
pub(crate) fn write(var: &Variable, children: &[Variable], token: &mut WritingToken) {
    token.reset_chopped_indexes(var.id());

    if children.is_empty() {
        token.fail();
        return;
    }

    let start = token.len();
    let order = if var.is_mutable() {
        shuffled_order(children.len(), token.rng_mut())
    } else {
        declared_order(children.len())
    };

    for i in order {
        children[i].write(token);
        if !token.is_ok() {
            break;
        }
    }

    if token.is_ok() {
        token.record_segment(var.id(), start, token.len() - start);
        let value = token.value()[start..].to_vec();
        token.set_current_value(value);
        notify_bound(token.memory(), var.id(), VariableAccess::Write, None);
    }
}

/// Ordered concatenation of the child patterns, in declaration order. The
/// mutable flag never affects pattern derivation, and an aggregate with no
/// children yields the neutral pattern rather than failing.
pub(crate) fn build_pattern(children: &[Variable]) -> Pattern {
    let parts: Vec<Pattern> = children.iter().map(Variable::build_pattern).collect();
    Pattern::concat(&parts)
}
