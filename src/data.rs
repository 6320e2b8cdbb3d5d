//! Terminal data leaves: opaque bytes, either a fixed literal or a
//! size-bounded free value.
//!
//! Typed terminal encodings (numbers, strings) live outside this layer; a
//! leaf only compares, consumes, and produces raw bytes. Free-value leaves
//! interact with the session memory: a read memorizes what it consumed, a
//! write recalls the memorized value and only generates (and memorizes) a
//! fresh random value when none is bound yet.

use crate::binding::VariableAccess;
use crate::node::{notify_bound, Variable};
use crate::pattern::Pattern;
use crate::token::{ProcessingToken, ReadingToken, WritingToken};
use rand::Rng;

/// Byte spec of a terminal leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSpec {
    /// Exactly these bytes.
    Fixed(Vec<u8>),
    /// Any run of `min` to `max` bytes.
    Sized { min: usize, max: usize },
}

/// A fixed leaf is always defined; a sized leaf is defined once a value is
/// memorized for it.
pub(crate) fn is_defined(var: &Variable, spec: &DataSpec, token: &dyn ProcessingToken) -> bool {
    match spec {
        DataSpec::Fixed(_) => true,
        DataSpec::Sized { .. } => token.memory().borrow().has_value(var.id()),
    }
}

/// Consume this leaf's share of the input.
///
/// A sized leaf with no memorized value takes greedily, up to `max` bytes of
/// whatever remains (no backtracking at this layer), and memorizes what it
/// consumed; with a memorized value the input must start with that value.
pub(crate) fn read(var: &Variable, spec: &DataSpec, token: &mut ReadingToken) {
    let consumed = match spec {
        DataSpec::Fixed(expected) => {
            if token.remaining().len() >= expected.len()
                && &token.remaining()[..expected.len()] == expected.as_slice()
            {
                token.advance(expected.len()).to_vec()
            } else {
                token.fail();
                return;
            }
        }
        DataSpec::Sized { min, max } => {
            let memorized = token.memory().borrow().recall(var.id()).map(<[u8]>::to_vec);
            match memorized {
                Some(value) => {
                    if token.remaining().starts_with(&value) {
                        token.advance(value.len()).to_vec()
                    } else {
                        token.fail();
                        return;
                    }
                }
                None => {
                    let take = token.remaining().len().min(*max);
                    if take < *min {
                        token.fail();
                        return;
                    }
                    let value = token.advance(take).to_vec();
                    token.memory().borrow_mut().memorize(var.id(), value.clone());
                    value
                }
            }
        }
    };

    token.set_current_value(consumed.clone());
    notify_bound(
        token.memory(),
        var.id(),
        VariableAccess::Read,
        Some(&consumed),
    );
}

/// Produce this leaf's bytes into the output.
pub(crate) fn write(var: &Variable, spec: &DataSpec, token: &mut WritingToken) {
    token.reset_chopped_indexes(var.id());

    let start = token.len();
    let value = match spec {
        DataSpec::Fixed(bytes) => bytes.clone(),
        DataSpec::Sized { min, max } => {
            let memorized = token.memory().borrow().recall(var.id()).map(<[u8]>::to_vec);
            match memorized {
                Some(value) => value,
                None => {
                    let len = token.rng_mut().gen_range(*min..=*max);
                    let mut generated = vec![0u8; len];
                    token.rng_mut().fill(&mut generated[..]);
                    token
                        .memory()
                        .borrow_mut()
                        .memorize(var.id(), generated.clone());
                    generated
                }
            }
        }
    };

    token.push_bytes(&value);
    token.record_segment(var.id(), start, value.len());
    token.set_current_value(value);
    notify_bound(token.memory(), var.id(), VariableAccess::Write, None);
}

pub(crate) fn build_pattern(spec: &DataSpec) -> Pattern {
    match spec {
        DataSpec::Fixed(bytes) => Pattern::fixed(bytes),
        DataSpec::Sized { min, max } => Pattern::sized(*min, *max),
    }
}
