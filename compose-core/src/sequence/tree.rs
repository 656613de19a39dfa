//! Trie of key sequences

use std::collections::HashMap;

use crate::error::LoadError;
use crate::types::Key;

type NodeId = u32;

const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
struct Output {
    text: String,
    /// Index of the entry that defined it, for duplicate reports
    source: usize,
}

#[derive(Debug, Clone, Default)]
struct Node {
    output: Option<Output>,
    children: HashMap<Key, NodeId>,
}

/// Arena-allocated trie; node 0 is the root.
#[derive(Debug, Clone)]
struct Trie {
    nodes: Vec<Node>,
}

impl Trie {
    fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    fn is_empty(&self) -> bool {
        self.nodes[ROOT as usize].children.is_empty()
    }

    fn child(&self, id: NodeId, key: &Key) -> Option<NodeId> {
        self.nodes.get(id as usize)?.children.get(key).copied()
    }

    fn output(&self, id: NodeId) -> Option<&str> {
        self.nodes
            .get(id as usize)?
            .output
            .as_ref()
            .map(|output| output.text.as_str())
    }

    fn has_children(&self, id: NodeId) -> bool {
        self.nodes
            .get(id as usize)
            .map_or(false, |node| !node.children.is_empty())
    }

    /// Index of the entry whose output sits at the end of `keys`
    fn owner<'k>(&self, keys: impl IntoIterator<Item = &'k Key>) -> Option<usize> {
        let mut id = ROOT;
        for key in keys {
            id = self.child(id, key)?;
        }
        self.nodes[id as usize].output.as_ref().map(|output| output.source)
    }

    /// Inserts unless the path already carries an output, in which case the
    /// index of the entry owning it is returned.
    fn insert(&mut self, keys: impl IntoIterator<Item = Key>, text: &str, source: usize) -> Result<(), usize> {
        let mut id = ROOT;
        for key in keys {
            id = match self.nodes[id as usize].children.get(&key) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len() as NodeId;
                    self.nodes.push(Node::default());
                    self.nodes[id as usize].children.insert(key, child);
                    child
                }
            };
        }

        let node = &mut self.nodes[id as usize];
        if let Some(existing) = &node.output {
            return Err(existing.source);
        }
        node.output = Some(Output {
            text: text.to_string(),
            source,
        });
        Ok(())
    }
}

/// Position of a partial walk through a [`SequenceTree`].
///
/// A cursor is only meaningful for the tree that produced it. Stepping a
/// cursor that does not belong to the tree yields [`Lookup::NoMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    exact: Option<NodeId>,
    folded: Option<NodeId>,
}

impl Cursor {
    /// A cursor matching nothing
    pub const DEAD: Cursor = Cursor {
        exact: None,
        folded: None,
    };
}

/// Result of stepping through the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// No sequence starts with these keys
    NoMatch,
    /// Some sequences continue past this point, none ends here
    Partial(Cursor),
    /// A sequence ends here and nothing continues
    Complete(&'a str),
    /// A sequence ends here and longer ones continue
    CompleteAndPartial(&'a str, Cursor),
}

impl<'a> Lookup<'a> {
    /// Output of a sequence ending exactly here
    pub fn output(&self) -> Option<&'a str> {
        match *self {
            Lookup::Complete(output) | Lookup::CompleteAndPartial(output, _) => Some(output),
            _ => None,
        }
    }

    /// Cursor to continue the walk from, if anything continues
    pub fn cursor(&self) -> Option<Cursor> {
        match *self {
            Lookup::Partial(cursor) | Lookup::CompleteAndPartial(_, cursor) => Some(cursor),
            _ => None,
        }
    }
}

/// Immutable-after-load map from key sequences to output strings.
///
/// Sequences are held in two tries: the exact one, holding every sequence
/// as written, and the folded one, holding case-insensitive sequences keyed
/// by their lower-cased keys. Exact matches always take priority.
#[derive(Debug, Clone)]
pub struct SequenceTree {
    exact: Trie,
    folded: Trie,
    len: usize,
}

impl Default for SequenceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceTree {
    pub fn new() -> Self {
        Self {
            exact: Trie::new(),
            folded: Trie::new(),
            len: 0,
        }
    }

    /// Number of sequences with an exact path
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds one mapping. The first definition of a path wins; redefining it
    /// is refused.
    pub fn insert(&mut self, keys: &[Key], output: &str) -> Result<(), LoadError> {
        let source = self.len;
        self.insert_exact(keys, output, source)
    }

    pub(crate) fn insert_exact(&mut self, keys: &[Key], output: &str, source: usize) -> Result<(), LoadError> {
        if keys.is_empty() {
            return Err(LoadError::EmptySequence);
        }
        self.exact
            .insert(keys.iter().cloned(), output, source)
            .map_err(|first| LoadError::Duplicate { first })?;
        self.len += 1;
        Ok(())
    }

    /// Fails if typing `keys` would already reach an earlier sequence,
    /// either literally or through a case-insensitive one.
    pub(crate) fn check_vacant(&self, keys: &[Key]) -> Result<(), LoadError> {
        if let Some(first) = self.exact.owner(keys) {
            return Err(LoadError::Duplicate { first });
        }
        let folded: Vec<Key> = keys.iter().map(|key| key.folded().into_owned()).collect();
        if let Some(first) = self.folded.owner(&folded) {
            return Err(LoadError::CaseFoldedDuplicate { first });
        }
        Ok(())
    }

    pub(crate) fn insert_folded(&mut self, keys: &[Key], output: &str, source: usize) -> Result<(), LoadError> {
        self.folded
            .insert(keys.iter().map(|key| key.folded().into_owned()), output, source)
            .map_err(|first| LoadError::CaseFoldedDuplicate { first })
    }

    /// Whether any case-insensitive sequence was loaded
    pub fn has_case_insensitive(&self) -> bool {
        !self.folded.is_empty()
    }

    /// Cursor positioned before the first key
    pub fn root(&self) -> Cursor {
        Cursor {
            exact: Some(ROOT),
            folded: (!self.folded.is_empty()).then_some(ROOT),
        }
    }

    /// Steps a walk by one key.
    ///
    /// With `fold` set, a key that fails to match literally is retried in
    /// its lower-cased form against the case-insensitive sequences.
    pub fn advance(&self, cursor: Cursor, key: &Key, fold: bool) -> Lookup<'_> {
        let exact = cursor.exact.and_then(|id| self.exact.child(id, key));
        let folded = if fold {
            cursor
                .folded
                .and_then(|id| self.folded.child(id, &key.folded()))
        } else {
            None
        };

        let output = exact
            .and_then(|id| self.exact.output(id))
            .or_else(|| folded.and_then(|id| self.folded.output(id)));

        let next = Cursor {
            exact: exact.filter(|&id| self.exact.has_children(id)),
            folded: folded.filter(|&id| self.folded.has_children(id)),
        };
        let continues = next != Cursor::DEAD;

        match (output, continues) {
            (None, false) => Lookup::NoMatch,
            (None, true) => Lookup::Partial(next),
            (Some(output), false) => Lookup::Complete(output),
            (Some(output), true) => Lookup::CompleteAndPartial(output, next),
        }
    }

    /// Looks up a whole prefix against the exact sequences
    pub fn lookup(&self, prefix: &[Key]) -> Lookup<'_> {
        let mut result = if self.exact.is_empty() {
            Lookup::NoMatch
        } else {
            Lookup::Partial(Cursor {
                exact: Some(ROOT),
                folded: None,
            })
        };
        for key in prefix {
            result = match result.cursor() {
                Some(cursor) => self.advance(cursor, key, false),
                None => return Lookup::NoMatch,
            };
        }
        result
    }

    /// Output of the exact sequence `keys`, if defined
    pub fn get(&self, keys: &[Key]) -> Option<&str> {
        if keys.is_empty() {
            return None;
        }
        self.lookup(keys).output()
    }
}
