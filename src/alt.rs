//! Alternative (OR) combination: children are tried in order and the first
//! to succeed decides the node's value.
//!
//! Unlike the aggregate, trials here are transactional: the token is
//! checkpointed before each attempt and restored after a failed one, so a
//! losing child leaves no cursor or output residue. With no child matching,
//! the node fails with the token back at the position it started from.

use crate::binding::VariableAccess;
use crate::node::{declared_order, notify_bound, read_order, shuffled_order, Variable};
use crate::pattern::Pattern;
use crate::token::{ProcessingToken, ReadingToken, WritingToken};

/// An alternative is defined iff at least one child is defined.
pub(crate) fn is_defined(children: &[Variable], token: &dyn ProcessingToken) -> bool {
    children.iter().any(|c| c.is_defined(token))
}

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

    let mut matched = false;
    for i in order {
        let checkpoint = token.checkpoint();
        children[i].read(token);
        if token.is_ok() {
            matched = true;
            break;
        }
        token.restore(checkpoint);
    }

    if !matched {
        token.fail();
        return;
    }

    let value = token.data()[start..token.index()].to_vec();
    token.set_current_value(value.clone());
    notify_bound(token.memory(), var.id(), VariableAccess::Read, Some(&value));
}

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

    let mut matched = false;
    for i in order {
        let checkpoint = token.checkpoint();
        children[i].write(token);
        if token.is_ok() {
            matched = true;
            break;
        }
        token.restore(checkpoint);
    }

    if !matched {
        token.fail();
        return;
    }

    token.record_segment(var.id(), start, token.len() - start);
    let value = token.value()[start..].to_vec();
    token.set_current_value(value);
    notify_bound(token.memory(), var.id(), VariableAccess::Write, None);
}

/// Grouped alternation of the child patterns, declaration order.
pub(crate) fn build_pattern(children: &[Variable]) -> Pattern {
    let parts: Vec<Pattern> = children.iter().map(Variable::build_pattern).collect();
    Pattern::alternation(&parts)
}
