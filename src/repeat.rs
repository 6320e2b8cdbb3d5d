//! Repetition: one child repeated between `min` and `max` times.
//!
//! Reading is greedy: the child is attempted up to `max` times and the first
//! failing attempt is rolled back via checkpoint; fewer than `min` successes
//! fail the node. Writing emits exactly `min` copies when the node is not
//! mutable (keeping generation deterministic) and a random count in
//! `[min, max]` when it is.

use crate::binding::VariableAccess;
use crate::node::{notify_bound, Variable};
use crate::pattern::Pattern;
use crate::token::{ProcessingToken, ReadingToken, WritingToken};
use rand::Rng;

pub(crate) fn read(
    var: &Variable,
    child: &Variable,
    min: usize,
    max: usize,
    token: &mut ReadingToken,
) {
    let start = token.index();
    let mut count = 0;
    while count < max {
        let checkpoint = token.checkpoint();
        child.read(token);
        if !token.is_ok() {
            token.restore(checkpoint);
            break;
        }
        count += 1;
    }

    if count < min {
        token.fail();
        return;
    }

    let value = token.data()[start..token.index()].to_vec();
    token.set_current_value(value.clone());
    notify_bound(token.memory(), var.id(), VariableAccess::Read, Some(&value));
}

pub(crate) fn write(
    var: &Variable,
    child: &Variable,
    min: usize,
    max: usize,
    token: &mut WritingToken,
) {
    token.reset_chopped_indexes(var.id());

    let count = if var.is_mutable() {
        token.rng_mut().gen_range(min..=max)
    } else {
        min
    };

    let start = token.len();
    for _ in 0..count {
        child.write(token);
        if !token.is_ok() {
            return;
        }
    }

    token.record_segment(var.id(), start, token.len() - start);
    let value = token.value()[start..].to_vec();
    token.set_current_value(value);
    notify_bound(token.memory(), var.id(), VariableAccess::Write, None);
}

pub(crate) fn build_pattern(child: &Variable, min: usize, max: usize) -> Pattern {
    Pattern::repetition(&child.build_pattern(), min, max)
}
