//! Publishing rebuilt sequence tables to the hook thread

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, TryLockError};

use log::info;

use super::{load_sequences, Rejection, SequenceEntry, SequenceTree};

/// Swap-on-write holder for the active sequence tree.
///
/// Trees are built completely before being published, and publishing only
/// replaces a pointer, so readers see either the old or the new tree in
/// full. The hook thread reads with [`try_snapshot`](Self::try_snapshot)
/// and never waits on a writer.
#[derive(Debug)]
pub struct SharedSequences {
    current: RwLock<Arc<SequenceTree>>,
    generation: AtomicU64,
}

impl Default for SharedSequences {
    fn default() -> Self {
        Self::new(SequenceTree::new())
    }
}

impl SharedSequences {
    pub fn new(tree: SequenceTree) -> Self {
        Self {
            current: RwLock::new(Arc::new(tree)),
            generation: AtomicU64::new(0),
        }
    }

    /// Incremented on every publish
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Current tree, waiting for a concurrent publish to finish
    pub fn snapshot(&self) -> Arc<SequenceTree> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Current tree, or `None` if a publish is in progress right now
    pub fn try_snapshot(&self) -> Option<Arc<SequenceTree>> {
        match self.current.try_read() {
            Ok(guard) => Some(Arc::clone(&*guard)),
            Err(TryLockError::Poisoned(poisoned)) => Some(Arc::clone(&*poisoned.into_inner())),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Replaces the active tree
    pub fn publish(&self, tree: SequenceTree) {
        let tree = Arc::new(tree);
        let previous = {
            let mut guard = match self.current.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::replace(&mut *guard, tree)
        };
        self.generation.fetch_add(1, Ordering::AcqRel);
        // The old tree is freed here, outside the lock, unless a composing
        // session still holds it.
        drop(previous);
    }

    /// Builds a tree from `entries` on the calling thread, publishes it and
    /// returns what was rejected.
    pub fn reload<I>(&self, entries: I) -> Vec<Rejection>
    where
        I: IntoIterator<Item = SequenceEntry>,
    {
        let report = load_sequences(entries);
        info!(
            "publishing {} sequences ({} rejected)",
            report.tree.len(),
            report.rejected.len()
        );
        self.publish(report.tree);
        report.rejected
    }
}
