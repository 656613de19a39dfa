//! What the engine asks its collaborators to do

use crate::feedback::FeedbackEvent;
use crate::types::Key;

/// Something to send to the focused application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Insert literal text
    Text(String),
    /// Send a key that was held back during composing
    Replay(Key),
}

/// Result of feeding one event to the engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step {
    /// The triggering key must not reach the application
    pub consumed: bool,
    /// Actions to perform, in order
    pub actions: Vec<Action>,
    pub events: Vec<FeedbackEvent>,
}

impl Step {
    /// A step that leaves the key alone
    pub fn pass() -> Self {
        Self::default()
    }

    /// A step that swallows the key and does nothing else
    pub fn consume() -> Self {
        Self {
            consumed: true,
            ..Self::default()
        }
    }

    pub fn with_event(mut self, event: FeedbackEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn push_event(&mut self, event: FeedbackEvent) {
        self.events.push(event);
    }

    /// Appends the actions and events of a later step
    pub fn append(&mut self, later: Step) {
        self.consumed |= later.consumed;
        self.actions.extend(later.actions);
        self.events.extend(later.events);
    }

    /// All text this step inserts, concatenated
    pub fn emitted_text(&self) -> String {
        self.actions
            .iter()
            .filter_map(|action| match action {
                Action::Text(text) => Some(text.as_str()),
                Action::Replay(_) => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.consumed && self.actions.is_empty() && self.events.is_empty()
    }
}
