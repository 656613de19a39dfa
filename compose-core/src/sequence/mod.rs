//! Sequence tables: the trie of key sequences, how it is built, and how a
//! rebuilt table is published to the hook thread.

mod tree;
mod loader;
mod shared;

pub use tree::{SequenceTree, Lookup, Cursor};
pub use loader::{SequenceEntry, LoadReport, Rejection, load_sequences};
pub use shared::SharedSequences;
