//! Building a sequence tree from a list of definitions

use log::debug;
use serde::{Deserialize, Serialize};

use super::SequenceTree;
use crate::error::LoadError;
use crate::types::Key;

/// One sequence definition as delivered by the definition loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceEntry {
    pub keys: Vec<Key>,
    pub output: String,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl SequenceEntry {
    pub fn new(keys: Vec<Key>, output: impl Into<String>) -> Self {
        Self {
            keys,
            output: output.into(),
            case_insensitive: false,
        }
    }

    /// Convenience for sequences made only of printable characters
    pub fn from_chars(chars: &str, output: impl Into<String>) -> Self {
        Self::new(chars.chars().map(Key::from).collect(), output)
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.keys.is_empty() {
            return Err(LoadError::EmptySequence);
        }
        if self.output.is_empty() {
            return Err(LoadError::EmptyOutput);
        }
        for (position, key) in self.keys.iter().enumerate() {
            if key.text() == Some("") {
                return Err(LoadError::EmptyKey { position });
            }
            if key.is_ambiguous() {
                return Err(LoadError::AmbiguousKey { position });
            }
        }
        Ok(())
    }
}

/// A definition that did not make it into the tree as given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position of the entry in the loaded list
    pub index: usize,
    pub keys: Vec<Key>,
    pub error: LoadError,
}

/// Result of a load: the tree built from everything that was valid, and
/// the list of refused entries.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub tree: SequenceTree,
    pub rejected: Vec<Rejection>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Builds a tree from `entries`.
///
/// The first definition of a path wins, and a later entry is rejected as a
/// whole. Same keys as an earlier entry is [`LoadError::Duplicate`]. Keys
/// that an earlier case-insensitive entry already matches in some casing
/// are [`LoadError::CaseFoldedDuplicate`]. A later case-insensitive entry
/// may fold onto an earlier case-sensitive one: exact matches take
/// priority, so the earlier entry keeps its path.
pub fn load_sequences<I>(entries: I) -> LoadReport
where
    I: IntoIterator<Item = SequenceEntry>,
{
    let mut tree = SequenceTree::new();
    let mut rejected = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let result = entry
            .validate()
            .and_then(|()| tree.check_vacant(&entry.keys))
            .and_then(|()| {
                if entry.case_insensitive {
                    tree.insert_folded(&entry.keys, &entry.output, index)
                } else {
                    Ok(())
                }
            })
            .and_then(|()| tree.insert_exact(&entry.keys, &entry.output, index));
        if let Err(error) = result {
            debug!("rejected sequence #{} {:?}: {}", index, entry.keys, error);
            rejected.push(Rejection {
                index,
                keys: entry.keys,
                error,
            });
        }
    }

    LoadReport { tree, rejected }
}
