use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};

use super::state::Resolution;
use super::{Action, ComposingState, EngineConfig, InvalidKeyPolicy, Step};
use crate::feedback::{CancelReason, FeedbackEvent};
use crate::sequence::{Lookup, SequenceTree};
use crate::types::Key;

/// An input to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A key was pressed
    KeyDown(Key),
    /// The composing session ran out of time
    Timeout,
}

/// The compose state machine.
///
/// Idle until a compose key arrives, then walks the sequence tree one key
/// at a time. When a complete sequence is also the prefix of longer ones,
/// its output is held back as a fallback and emitted if the longer sequence
/// breaks.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Feeds one event through the state machine.
    ///
    /// `tree` is only used when a new session starts; a session in progress
    /// keeps matching against the tree it started with. A session that has
    /// been idle past the configured timeout expires before `event` is
    /// handled.
    pub fn handle(
        &self,
        state: &mut ComposingState,
        tree: &Arc<SequenceTree>,
        event: EngineEvent,
        now: Instant,
    ) -> Step {
        let key = match event {
            EngineEvent::Timeout => return self.expire(state),
            EngineEvent::KeyDown(key) => key,
        };

        match self.expire_if_due(state, now) {
            Some(mut step) => {
                step.append(self.key_down(state, tree, key, now));
                step
            }
            None => self.key_down(state, tree, key, now),
        }
    }

    /// Expires the session if it has been idle longer than the timeout
    pub fn expire_if_due(&self, state: &mut ComposingState, now: Instant) -> Option<Step> {
        let timeout = self.config.timeout?;
        let last = state.last_activity()?;
        if !state.is_active() || now.saturating_duration_since(last) < timeout {
            return None;
        }
        Some(self.expire(state))
    }

    fn key_down(&self, state: &mut ComposingState, tree: &Arc<SequenceTree>, key: Key, now: Instant) -> Step {
        let (session_tree, cursor) = match state.walk() {
            Some((session_tree, cursor)) => (Arc::clone(session_tree), cursor),
            None => return self.idle_key(state, tree, key, now),
        };

        if self.config.is_compose_key(&key) {
            return self.cancel(state, CancelReason::ComposeKey);
        }
        if self.config.is_cancel_key(&key) {
            return self.cancel(state, CancelReason::CancelKey);
        }

        match session_tree.advance(cursor, &key, self.config.case_insensitive) {
            Lookup::NoMatch => self.broken(state, key),
            Lookup::Complete(output) => {
                trace!("sequence complete: {:?}", output);
                state.reset();
                let mut step = Step::consume();
                self.emit(&mut step, output.to_string());
                step
            }
            Lookup::Partial(next) => {
                state.push(key, next, now);
                Step::consume()
            }
            Lookup::CompleteAndPartial(output, next) => {
                state.push(key, next, now);
                state.set_fallback(output);
                Step::consume()
            }
        }
    }

    fn idle_key(&self, state: &mut ComposingState, tree: &Arc<SequenceTree>, key: Key, now: Instant) -> Step {
        if !self.config.is_compose_key(&key) {
            return Step::pass();
        }
        trace!("compose key {} pressed, starting sequence", key);
        state.begin(Arc::clone(tree), now);
        Step::consume().with_event(FeedbackEvent::SequenceStarted)
    }

    /// `key` matched nothing after the keys typed so far
    fn broken(&self, state: &mut ComposingState, key: Key) -> Step {
        let Resolution { typed, fallback } = state.take_resolution();
        let mut step = Step::consume();

        let leftover = match fallback {
            Some(fallback) => {
                trace!("{} breaks the sequence, falling back to {:?}", key, fallback.output);
                self.emit(&mut step, fallback.output);
                typed.into_iter().skip(fallback.len).collect()
            }
            None => {
                let mut invalid = typed.clone();
                invalid.push(key.clone());
                debug!("invalid sequence of {} keys", invalid.len());
                step.push_event(FeedbackEvent::SequenceInvalid { typed: invalid });
                typed
            }
        };

        match self.config.invalid_key {
            InvalidKeyPolicy::Discard => {}
            InvalidKeyPolicy::ReplayBreakingKey => step.push_action(Action::Replay(key)),
            InvalidKeyPolicy::ReplayAll => {
                step.actions.extend(leftover.into_iter().map(Action::Replay));
                step.push_action(Action::Replay(key));
            }
        }
        step
    }

    fn expire(&self, state: &mut ComposingState) -> Step {
        if !state.is_active() {
            return Step::pass();
        }
        let Resolution { typed, fallback } = state.take_resolution();
        let mut step = Step::pass();

        let leftover = match fallback {
            Some(fallback) => {
                trace!("sequence timed out, emitting {:?}", fallback.output);
                self.emit(&mut step, fallback.output);
                typed.into_iter().skip(fallback.len).collect()
            }
            None => {
                debug!("sequence timed out");
                step.push_event(FeedbackEvent::SequenceCancelled {
                    reason: CancelReason::Timeout,
                });
                typed
            }
        };

        if self.config.invalid_key == InvalidKeyPolicy::ReplayAll {
            step.actions.extend(leftover.into_iter().map(Action::Replay));
        }
        step
    }

    fn cancel(&self, state: &mut ComposingState, reason: CancelReason) -> Step {
        trace!("sequence cancelled: {:?}", reason);
        state.reset();
        Step::consume().with_event(FeedbackEvent::SequenceCancelled { reason })
    }

    fn emit(&self, step: &mut Step, output: String) {
        step.push_event(FeedbackEvent::SequenceCompleted {
            output: output.clone(),
        });
        step.push_action(Action::Text(output));
    }
}
