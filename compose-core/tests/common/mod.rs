#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Instant;

use compose_core::{
    load_sequences, ChannelSink, ComposingState, EngineConfig, EngineEvent, FeedbackEvent,
    HookAdapter, HookDecision, Key, MatchEngine, ModifierState, RawKeyEvent, RecordingInjector,
    SequenceEntry, SequenceTree, SharedSequences, Step, UsLayout, VirtualKey,
};

/// Entries typed one character per key
pub fn entries(pairs: &[(&str, &str)]) -> Vec<SequenceEntry> {
    pairs
        .iter()
        .map(|(keys, output)| SequenceEntry::from_chars(keys, *output))
        .collect()
}

/// Builds a tree, failing the test on any rejection
pub fn tree(pairs: &[(&str, &str)]) -> Arc<SequenceTree> {
    let report = load_sequences(entries(pairs));
    assert!(report.is_clean(), "unexpected rejections: {:?}", report.rejected);
    Arc::new(report.tree)
}

/// The default compose key
pub fn compose_key() -> Key {
    Key::Virtual(VirtualKey::RMENU)
}

/// Drives a `MatchEngine` directly, one key at a time
pub struct EngineDriver {
    pub engine: MatchEngine,
    pub state: ComposingState,
    pub tree: Arc<SequenceTree>,
}

impl EngineDriver {
    pub fn new(config: EngineConfig, tree: Arc<SequenceTree>) -> Self {
        Self {
            engine: MatchEngine::new(config),
            state: ComposingState::new(),
            tree,
        }
    }

    pub fn key(&mut self, key: Key) -> Step {
        self.engine
            .handle(&mut self.state, &self.tree, EngineEvent::KeyDown(key), Instant::now())
    }

    pub fn compose(&mut self) -> Step {
        self.key(compose_key())
    }

    /// Feeds every character of `text` as a key, merging the steps
    pub fn chars(&mut self, text: &str) -> Step {
        let mut step = Step::default();
        for ch in text.chars() {
            step.append(self.key(Key::from(ch)));
        }
        step
    }
}

/// A `HookAdapter` wired to a recording injector and the US layout, with
/// feedback collected on a channel
pub struct HookHarness {
    pub adapter: HookAdapter<RecordingInjector, UsLayout>,
    pub sequences: Arc<SharedSequences>,
    pub feedback: Receiver<FeedbackEvent>,
}

impl HookHarness {
    pub fn new(config: EngineConfig, pairs: &[(&str, &str)]) -> Self {
        Self::with_entries(config, entries(pairs))
    }

    pub fn with_entries(config: EngineConfig, entries: Vec<SequenceEntry>) -> Self {
        let sequences = Arc::new(SharedSequences::default());
        let rejected = sequences.reload(entries);
        assert!(rejected.is_empty(), "unexpected rejections: {:?}", rejected);

        let (tx, rx) = mpsc::channel();
        let mut adapter = HookAdapter::new(
            config,
            Arc::clone(&sequences),
            RecordingInjector::new(),
            UsLayout::new(),
        );
        adapter.subscribe(Box::new(ChannelSink::new(tx)));

        Self {
            adapter,
            sequences,
            feedback: rx,
        }
    }

    pub fn send(&mut self, event: RawKeyEvent) -> HookDecision {
        self.adapter.on_key_event(&event)
    }

    pub fn down(&mut self, vk: VirtualKey) -> HookDecision {
        self.send(RawKeyEvent::down(vk.raw()))
    }

    pub fn up(&mut self, vk: VirtualKey) -> HookDecision {
        self.send(RawKeyEvent::up(vk.raw()))
    }

    /// Presses and releases the compose key, returning the key-down decision
    pub fn compose(&mut self) -> HookDecision {
        let decision = self.down(VirtualKey::RMENU);
        self.up(VirtualKey::RMENU);
        decision
    }

    /// Types `ch` on the US layout, holding Shift when needed. Returns the
    /// decision for the character's key-down.
    pub fn type_char(&mut self, ch: char) -> HookDecision {
        let (vk, shift) = UsLayout::keystroke_for(ch)
            .unwrap_or_else(|| panic!("{:?} cannot be typed on the US layout", ch));
        let modifiers = ModifierState::new(shift, false, false, false);

        if shift {
            assert_eq!(self.down(VirtualKey::LSHIFT), HookDecision::PassThrough);
        }
        let decision = self.send(RawKeyEvent::down(vk.raw()).with_modifiers(modifiers));
        self.send(RawKeyEvent::up(vk.raw()).with_modifiers(modifiers));
        if shift {
            assert_eq!(self.up(VirtualKey::LSHIFT), HookDecision::PassThrough);
        }
        decision
    }

    pub fn type_str(&mut self, text: &str) -> Vec<HookDecision> {
        text.chars().map(|ch| self.type_char(ch)).collect()
    }

    /// Text injected so far
    pub fn output(&self) -> String {
        self.adapter.injector().typed_text()
    }

    /// Feedback events received since the last call
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.feedback.try_iter().collect()
    }
}
