use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, trace, warn};

use super::event::HeldKeys;
use super::{HookDecision, Injector, KeyTranslator, RawKeyEvent};
use crate::engine::{Action, ComposingState, EngineConfig, EngineEvent, MatchEngine, Step};
use crate::error::InjectError;
use crate::feedback::{FeedbackEvent, FeedbackHub, FeedbackSink};
use crate::sequence::{SequenceTree, SharedSequences};
use crate::types::{Key, VirtualKey};

/// Hook processing slower than this is logged
const SLOW_EVENT: Duration = Duration::from_millis(10);

/// Owns one composing session and decides the fate of every keyboard event.
///
/// The adapter is meant to live on the hook thread and be called for every
/// event, one at a time. It never blocks: the sequence table is read with a
/// non-blocking snapshot and all feedback sinks are expected to return
/// immediately.
pub struct HookAdapter<I, T> {
    engine: MatchEngine,
    state: ComposingState,
    sequences: Arc<SharedSequences>,
    snapshot: Arc<SequenceTree>,
    generation: u64,
    injector: I,
    translator: T,
    feedback: FeedbackHub,
    held: HeldKeys,
}

impl<I: Injector, T: KeyTranslator> HookAdapter<I, T> {
    pub fn new(config: EngineConfig, sequences: Arc<SharedSequences>, injector: I, translator: T) -> Self {
        let generation = sequences.generation();
        let snapshot = sequences.snapshot();
        Self {
            engine: MatchEngine::new(config),
            state: ComposingState::new(),
            sequences,
            snapshot,
            generation,
            injector,
            translator,
            feedback: FeedbackHub::new(),
            held: HeldKeys::default(),
        }
    }

    pub fn subscribe(&mut self, sink: Box<dyn FeedbackSink>) {
        self.feedback.subscribe(sink);
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// Replaces the configuration, abandoning any session in progress
    pub fn set_config(&mut self, config: EngineConfig) {
        self.engine.set_config(config);
        self.state.reset();
    }

    pub fn state(&self) -> &ComposingState {
        &self.state
    }

    pub fn is_composing(&self) -> bool {
        self.state.is_active()
    }

    pub fn sequences(&self) -> &Arc<SharedSequences> {
        &self.sequences
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    pub fn injector_mut(&mut self) -> &mut I {
        &mut self.injector
    }

    /// When the current session expires, if a timeout is configured
    pub fn deadline(&self) -> Option<Instant> {
        let timeout = self.engine.config().timeout?;
        if !self.state.is_active() {
            return None;
        }
        self.state.last_activity().map(|last| last + timeout)
    }

    /// Abandons any session in progress without output
    pub fn reset(&mut self) {
        self.state.reset();
        self.held.clear();
    }

    /// Processes one keyboard event
    pub fn on_key_event(&mut self, event: &RawKeyEvent) -> HookDecision {
        if event.is_injected {
            trace!("injected event for vk 0x{:02X}, passing through", event.vk);
            return HookDecision::PassThrough;
        }

        let result = catch_unwind(AssertUnwindSafe(|| self.process(event)));
        match result {
            Ok(decision) => decision,
            Err(e) => {
                error!("Panic while processing key event: {:?}", e);
                self.reset();
                HookDecision::PassThrough
            }
        }
    }

    /// Expires the session if its timeout has passed. Called by the
    /// platform timer on the hook thread.
    pub fn on_timer(&mut self, now: Instant) {
        let result = catch_unwind(AssertUnwindSafe(|| {
            if let Some(step) = self.engine.expire_if_due(&mut self.state, now) {
                self.perform(step);
            }
        }));
        if let Err(e) = result {
            error!("Panic while expiring sequence: {:?}", e);
            self.reset();
        }
    }

    fn process(&mut self, event: &RawKeyEvent) -> HookDecision {
        let start = Instant::now();

        let decision = if event.is_down {
            self.key_down(event)
        } else if self.held.remove(event.vk) {
            HookDecision::Suppress
        } else {
            HookDecision::PassThrough
        };

        let elapsed = start.elapsed();
        if elapsed > SLOW_EVENT {
            warn!("Keyboard hook processing took {:?}, this may cause issues", elapsed);
        }
        decision
    }

    fn key_down(&mut self, event: &RawKeyEvent) -> HookDecision {
        if self.held.contains(event.vk) {
            trace!("auto-repeat of suppressed vk 0x{:02X}", event.vk);
            return HookDecision::Suppress;
        }

        if let Some(step) = self.engine.expire_if_due(&mut self.state, event.timestamp) {
            self.perform(step);
        }

        let vk = VirtualKey(event.vk);
        let raw = Key::Virtual(vk);
        let config = self.engine.config();
        let key = if config.is_compose_key(&raw) || config.is_cancel_key(&raw) {
            raw
        } else if vk.is_modifier() {
            return HookDecision::PassThrough;
        } else {
            self.translator.translate(vk, event.scan_code, event.modifiers)
        };

        if !self.state.is_active() {
            if !self.engine.config().is_compose_key(&key) {
                return HookDecision::PassThrough;
            }
            self.refresh_snapshot();
        }

        let step = self
            .engine
            .handle(&mut self.state, &self.snapshot, EngineEvent::KeyDown(key), event.timestamp);
        let consumed = step.consumed;
        self.perform(step);

        if consumed {
            self.held.insert(event.vk);
            HookDecision::Suppress
        } else {
            HookDecision::PassThrough
        }
    }

    /// Picks up a newly published sequence table, unless a publish is in
    /// progress right now
    fn refresh_snapshot(&mut self) {
        let generation = self.sequences.generation();
        if generation == self.generation {
            return;
        }
        match self.sequences.try_snapshot() {
            Some(tree) => {
                trace!("using sequence table generation {}", generation);
                self.snapshot = tree;
                self.generation = generation;
            }
            None => trace!("sequence table busy, keeping generation {}", self.generation),
        }
    }

    /// Injects the step's actions, stopping at the first failure, then
    /// reports its events
    fn perform(&mut self, step: Step) {
        let mut failure = None;
        for action in &step.actions {
            let result = match action {
                Action::Text(text) => self.injector.inject_text(text),
                Action::Replay(key) => self.replay(key),
            };
            if let Err(e) = result {
                warn!("Failed to inject {:?}: {}", action, e);
                failure = Some(e);
                break;
            }
        }

        for event in &step.events {
            self.feedback.dispatch(event);
        }
        if let Some(e) = failure {
            self.feedback
                .dispatch(&FeedbackEvent::InjectionFailed { error: e.to_string() });
        }
    }

    fn replay(&mut self, key: &Key) -> Result<(), InjectError> {
        match key {
            Key::Printable(text) => self.injector.inject_text(text),
            Key::Virtual(vk) => {
                self.injector.inject_key(*vk, true)?;
                self.injector.inject_key(*vk, false)
            }
        }
    }
}
