//! Per-session composing state

use std::sync::Arc;
use std::time::Instant;

use crate::sequence::{Cursor, SequenceTree};
use crate::types::Key;

/// Output of a complete prefix that longer sequences continue past, kept in
/// case the longer sequence never completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fallback {
    pub output: String,
    /// Number of typed keys the output covers
    pub len: usize,
}

/// What a finished session leaves behind
#[derive(Debug, Default)]
pub(crate) struct Resolution {
    pub typed: Vec<Key>,
    pub fallback: Option<Fallback>,
}

/// State of one composing session.
///
/// Owned by a single caller (the hook thread) and passed by reference into
/// the [`MatchEngine`](super::MatchEngine). The session keeps the sequence
/// tree it started with, so a table published mid-session only affects the
/// next session.
#[derive(Debug, Clone, Default)]
pub struct ComposingState {
    /// Tree of the session and the position reached in it
    walk: Option<(Arc<SequenceTree>, Cursor)>,
    typed: Vec<Key>,
    fallback: Option<Fallback>,
    last_activity: Option<Instant>,
}

impl ComposingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session on `tree`, discarding any previous one
    pub fn begin(&mut self, tree: Arc<SequenceTree>, now: Instant) {
        let root = tree.root();
        self.walk = Some((tree, root));
        self.typed.clear();
        self.fallback = None;
        self.last_activity = Some(now);
    }

    /// Records a matched key and the cursor it led to. Ignored outside a
    /// session.
    pub fn push(&mut self, key: Key, cursor: Cursor, now: Instant) {
        if let Some((_, position)) = &mut self.walk {
            *position = cursor;
            self.typed.push(key);
            self.last_activity = Some(now);
        }
    }

    /// Back to idle
    pub fn reset(&mut self) {
        self.walk = None;
        self.typed.clear();
        self.fallback = None;
        self.last_activity = None;
    }

    pub fn is_active(&self) -> bool {
        self.walk.is_some()
    }

    /// Keys matched so far in this session
    pub fn typed(&self) -> &[Key] {
        &self.typed
    }

    /// Output that will be emitted if the sequence stops here
    pub fn pending(&self) -> Option<&str> {
        self.fallback.as_ref().map(|fallback| fallback.output.as_str())
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    /// The session's tree and current cursor, `None` when idle
    pub(crate) fn walk(&self) -> Option<(&Arc<SequenceTree>, Cursor)> {
        self.walk.as_ref().map(|(tree, cursor)| (tree, *cursor))
    }

    /// Remembers the output of the prefix typed so far
    pub(crate) fn set_fallback(&mut self, output: &str) {
        self.fallback = Some(Fallback {
            output: output.to_string(),
            len: self.typed.len(),
        });
    }

    /// Ends the session, handing back what was typed
    pub(crate) fn take_resolution(&mut self) -> Resolution {
        let resolution = Resolution {
            typed: std::mem::take(&mut self.typed),
            fallback: self.fallback.take(),
        };
        self.reset();
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let tree = Arc::new(SequenceTree::new());
        let now = Instant::now();
        let mut state = ComposingState::new();
        assert!(!state.is_active());

        state.begin(Arc::clone(&tree), now);
        assert!(state.is_active());
        assert!(state.typed().is_empty());
        assert_eq!(state.last_activity(), Some(now));

        state.push(Key::from('e'), tree.root(), now);
        state.set_fallback("é");
        assert_eq!(state.pending(), Some("é"));

        let resolution = state.take_resolution();
        assert_eq!(resolution.typed, vec![Key::from('e')]);
        assert_eq!(
            resolution.fallback,
            Some(Fallback {
                output: "é".into(),
                len: 1
            })
        );
        assert!(!state.is_active());
        assert!(state.walk().is_none());
    }

    #[test]
    fn test_begin_clears_previous_session() {
        let tree = Arc::new(SequenceTree::new());
        let now = Instant::now();
        let mut state = ComposingState::new();
        state.begin(Arc::clone(&tree), now);
        state.push(Key::from('a'), tree.root(), now);
        state.set_fallback("x");

        state.begin(tree, now);
        assert!(state.typed().is_empty());
        assert_eq!(state.pending(), None);
    }

    #[test]
    fn test_push_outside_session_is_ignored() {
        let tree = SequenceTree::new();
        let mut state = ComposingState::new();
        state.push(Key::from('a'), tree.root(), Instant::now());

        assert!(!state.is_active());
        assert!(state.typed().is_empty());
        assert_eq!(state.last_activity(), None);
    }

    #[test]
    fn test_walk_follows_pushed_cursor() {
        let mut tree = SequenceTree::new();
        tree.insert(&[Key::from('o'), Key::from('e')], "œ").unwrap();
        let tree = Arc::new(tree);
        let now = Instant::now();
        let mut state = ComposingState::new();
        state.begin(Arc::clone(&tree), now);

        let next = tree.advance(tree.root(), &Key::from('o'), false).cursor().unwrap();
        state.push(Key::from('o'), next, now);

        let (walk_tree, cursor) = state.walk().unwrap();
        assert!(Arc::ptr_eq(walk_tree, &tree));
        assert_eq!(cursor, next);
    }
}
