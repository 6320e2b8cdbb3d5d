//! Processing tokens: the mutable state of one read or one write traversal.
//!
//! A token belongs to exactly one traversal of one tree. Both kinds carry a
//! success flag (`ok`), a cursor, the value most recently resolved by a node,
//! and a shared handle to the session [`Memory`]. The flag starts true and is
//! set false on the first unrecoverable failure; no operation forges it back
//! to true — [`ReadingToken::restore`] / [`WritingToken::restore`] only
//! reinstate an earlier snapshot, which is how trial-based combinators
//! (alternatives, repetitions) back out of a failed attempt.
//!
//! The writing token additionally owns the traversal-local random generator
//! used for mutable-order shuffles and free-value generation. Seeding it
//! ([`WritingToken::with_seed`]) makes a generation run reproducible.

use crate::memory::SharedMemory;
use crate::node::NodeId;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Contract shared by reading and writing tokens.
pub trait ProcessingToken {
    /// Success flag for the traversal so far.
    fn is_ok(&self) -> bool;
    /// Record an unrecoverable failure. Idempotent.
    fn fail(&mut self);
    /// Cursor: input index for reads, produced length for writes.
    fn position(&self) -> usize;
    /// Value most recently resolved by a node, if any.
    fn current_value(&self) -> Option<&[u8]>;
    /// Session memory shared across traversals.
    fn memory(&self) -> &SharedMemory;
}

/// State of one read (parse) traversal over an input buffer.
pub struct ReadingToken<'a> {
    data: &'a [u8],
    index: usize,
    ok: bool,
    current_value: Option<Vec<u8>>,
    memory: SharedMemory,
}

/// Snapshot of a reading token, for trial-based combinators or callers that
/// want to retry after a failed subtree.
#[derive(Clone)]
pub struct ReadCheckpoint {
    index: usize,
    ok: bool,
    current_value: Option<Vec<u8>>,
}

impl<'a> ReadingToken<'a> {
    pub fn new(data: &'a [u8], memory: SharedMemory) -> Self {
        ReadingToken {
            data,
            index: 0,
            ok: true,
            current_value: None,
            memory,
        }
    }

    /// Full input buffer under parse.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Current cursor into the input.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Unconsumed input from the cursor to the end.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.index..]
    }

    pub fn at_end(&self) -> bool {
        self.index == self.data.len()
    }

    /// Consume `n` bytes, returning the consumed slice.
    ///
    /// Contract: `n` must not exceed the remaining input.
    pub(crate) fn advance(&mut self, n: usize) -> &'a [u8] {
        assert!(
            self.index + n <= self.data.len(),
            "advance past end of input"
        );
        let consumed = &self.data[self.index..self.index + n];
        self.index += n;
        consumed
    }

    pub(crate) fn set_current_value(&mut self, value: Vec<u8>) {
        self.current_value = Some(value);
    }

    /// Snapshot cursor, flag, and current value.
    pub fn checkpoint(&self) -> ReadCheckpoint {
        ReadCheckpoint {
            index: self.index,
            ok: self.ok,
            current_value: self.current_value.clone(),
        }
    }

    /// Reinstate an earlier snapshot. Intended for alternative/repetition
    /// trials and for callers snapshotting before a fallible subtree; linear
    /// (aggregate) traversal never restores.
    pub fn restore(&mut self, checkpoint: ReadCheckpoint) {
        self.index = checkpoint.index;
        self.ok = checkpoint.ok;
        self.current_value = checkpoint.current_value;
    }
}

impl ProcessingToken for ReadingToken<'_> {
    fn is_ok(&self) -> bool {
        self.ok
    }

    fn fail(&mut self) {
        self.ok = false;
    }

    fn position(&self) -> usize {
        self.index
    }

    fn current_value(&self) -> Option<&[u8]> {
        self.current_value.as_deref()
    }

    fn memory(&self) -> &SharedMemory {
        &self.memory
    }
}

/// Span of the produced value contributed by one node during a write.
///
/// These are the "chopped index" references: they locate each node's final
/// value inside the token's accumulated output and are invalidated, per node,
/// at the start of every new write access to that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub node: NodeId,
    pub start: usize,
    pub len: usize,
}

/// State of one write (generate) traversal.
pub struct WritingToken {
    value: Vec<u8>,
    segments: Vec<Segment>,
    ok: bool,
    current_value: Option<Vec<u8>>,
    memory: SharedMemory,
    rng: StdRng,
}

/// Snapshot of a writing token; see [`ReadCheckpoint`].
#[derive(Clone)]
pub struct WriteCheckpoint {
    value_len: usize,
    segments_len: usize,
    ok: bool,
    current_value: Option<Vec<u8>>,
}

impl WritingToken {
    /// New token with an entropy-seeded generator.
    pub fn new(memory: SharedMemory) -> Self {
        Self::with_rng(memory, StdRng::from_entropy())
    }

    /// New token with a fixed seed, for reproducible generation.
    pub fn with_seed(memory: SharedMemory, seed: u64) -> Self {
        Self::with_rng(memory, StdRng::seed_from_u64(seed))
    }

    fn with_rng(memory: SharedMemory, rng: StdRng) -> Self {
        WritingToken {
            value: Vec::new(),
            segments: Vec::new(),
            ok: true,
            current_value: None,
            memory,
            rng,
        }
    }

    /// Output produced so far.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consume the token, returning the produced output.
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Spans recorded by nodes into the produced value, in completion order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The span most recently recorded for `node`, if any.
    pub fn segment_of(&self, node: NodeId) -> Option<Segment> {
        self.segments.iter().rev().find(|s| s.node == node).copied()
    }

    /// Drop every span recorded for `node`. A new write access to a node
    /// always invalidates its previously computed final value and the index
    /// references pointing at it.
    pub fn reset_chopped_indexes(&mut self, node: NodeId) {
        self.segments.retain(|s| s.node != node);
    }

    pub(crate) fn push_bytes(&mut self, bytes: &[u8]) {
        self.value.extend_from_slice(bytes);
    }

    pub(crate) fn record_segment(&mut self, node: NodeId, start: usize, len: usize) {
        self.segments.push(Segment { node, start, len });
    }

    pub(crate) fn set_current_value(&mut self, value: Vec<u8>) {
        self.current_value = Some(value);
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Snapshot produced length, recorded spans, flag, and current value.
    pub fn checkpoint(&self) -> WriteCheckpoint {
        WriteCheckpoint {
            value_len: self.value.len(),
            segments_len: self.segments.len(),
            ok: self.ok,
            current_value: self.current_value.clone(),
        }
    }

    /// Reinstate an earlier snapshot, truncating output produced since.
    /// Spans removed by `reset_chopped_indexes` after the snapshot stay
    /// removed; only appends are undone.
    pub fn restore(&mut self, checkpoint: WriteCheckpoint) {
        self.value.truncate(checkpoint.value_len);
        self.segments
            .truncate(checkpoint.segments_len.min(self.segments.len()));
        self.ok = checkpoint.ok;
        self.current_value = checkpoint.current_value;
    }
}

impl ProcessingToken for WritingToken {
    fn is_ok(&self) -> bool {
        self.ok
    }

    fn fail(&mut self) {
        self.ok = false;
    }

    fn position(&self) -> usize {
        self.value.len()
    }

    fn current_value(&self) -> Option<&[u8]> {
        self.current_value.as_deref()
    }

    fn memory(&self) -> &SharedMemory {
        &self.memory
    }
}
