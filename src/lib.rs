//! # vargram — Variable-Node Grammar Engine
//!
//! A tree of typed variable nodes describes the structure of a message
//! format. The same tree can **read** (parse a raw byte buffer against the
//! grammar, binding values to leaves), **write** (serialize bound or
//! generated values back into bytes), and derive a **pattern** usable to
//! locate instances of the format inside unstructured data.
//!
//! ## Node kinds
//!
//! - `agg(...)`: ordered AND, every child must succeed in sequence
//! - `alt(...)`: OR, first child to succeed wins
//! - `repeat(expr, min..max)`: one child repeated a bounded number of times
//! - `data "..."` / `hex "..."`: fixed terminal bytes
//! - `bytes(min..max)`: free terminal bytes, size-bounded
//!
//! Nodes flagged `mutable` traverse their children in a randomized or
//! reordered order at read/write time (format-variant exploration); pattern
//! derivation always uses declaration order.
//!
//! ## Example definition
//!
//! ```text
//! symbol Greeting = agg(data "hello", bytes(5..10))
//! symbol Answer = alt(data "yes", data "no")
//! symbol Framed = agg(use Greeting, repeat(hex "00", 0..4))
//! ```
//!
//! ## Traversal model
//!
//! A caller holds a root [`Variable`] and a fresh token; read and write
//! delegate recursively through the tree against that single token, which
//! carries the cursor, the success flag, and a shared handle to the session
//! [`Memory`]. Matching failures travel on the token's flag, not as errors;
//! a child failure stops the traversal without rolling the cursor back.
//! Successful accesses notify bound-variable listeners registered in the
//! memory.
//!
//! ## Usage
//!
//! See `tests/integration.rs` for full read/write/pattern examples and
//! `tests/dsl.rs` for the definition notation.

mod agg;
mod alt;
pub mod binding;
pub mod data;
pub mod memory;
pub mod node;
pub mod parser;
pub mod pattern;
mod repeat;
pub mod token;

pub use binding::{BindingRegistry, BoundVariable, VariableAccess};
pub use data::DataSpec;
pub use memory::{Memory, SharedMemory};
pub use node::{NodeId, Variable, VariableKind};
pub use parser::{parse, Definition, Symbol};
pub use pattern::{hex_text, Pattern, PatternError};
pub use token::{
    ProcessingToken, ReadCheckpoint, ReadingToken, Segment, WriteCheckpoint, WritingToken,
};
