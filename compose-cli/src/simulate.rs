//! Replays keystrokes through the hook adapter without touching the system

use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{bail, Result};
use compose_core::{
    ChannelSink, FeedbackEvent, HookAdapter, HookDecision, Injection, Key, ModifierState,
    RawKeyEvent, RecordingInjector, SequenceTree, Settings, SharedSequences, UsLayout, VirtualKey,
};

/// One key press on the simulated keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stroke {
    /// The first configured compose key
    Compose,
    Key(VirtualKey),
    /// A character typed on the US layout, with Shift if needed
    Char(char),
}

impl Stroke {
    fn label(&self) -> String {
        match self {
            Stroke::Compose => "compose".to_string(),
            Stroke::Key(vk) => Key::Virtual(*vk).friendly_name().into_owned(),
            Stroke::Char(ch) => Key::from(*ch).friendly_name().into_owned(),
        }
    }
}

/// Parses command line tokens: `compose`, a `VK.` key name, or text typed
/// one character at a time
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Stroke>> {
    let mut strokes = Vec::new();
    for token in tokens {
        let token = token.as_ref();
        if token.eq_ignore_ascii_case("compose") {
            strokes.push(Stroke::Compose);
            continue;
        }
        if let Key::Virtual(vk) = token.parse::<Key>()? {
            strokes.push(Stroke::Key(vk));
            continue;
        }
        for ch in token.chars() {
            if UsLayout::keystroke_for(ch).is_none() {
                bail!("{:?} cannot be typed on the US layout", ch);
            }
            strokes.push(Stroke::Char(ch));
        }
    }
    Ok(strokes)
}

#[derive(Debug, Default)]
pub struct Transcript {
    /// Each stroke with the decision for its key-down
    pub decisions: Vec<(String, HookDecision)>,
    pub injections: Vec<Injection>,
    pub events: Vec<FeedbackEvent>,
    pub output: String,
}

pub fn run(settings: &Settings, tree: SequenceTree, strokes: &[Stroke]) -> Result<Transcript> {
    settings.validate()?;
    let sequences = Arc::new(SharedSequences::new(tree));

    let (tx, rx) = mpsc::channel();
    let mut adapter = HookAdapter::new(
        settings.engine_config(),
        sequences,
        RecordingInjector::new(),
        UsLayout::new(),
    );
    adapter.subscribe(Box::new(ChannelSink::new(tx)));

    let mut transcript = Transcript::default();
    for stroke in strokes {
        let (vk, modifiers) = match stroke {
            Stroke::Compose => match settings.compose_keys.first() {
                Some(Key::Virtual(vk)) => (*vk, ModifierState::default()),
                Some(Key::Printable(text)) => {
                    let ch = text.chars().next().unwrap_or(' ');
                    match UsLayout::keystroke_for(ch) {
                        Some((vk, shift)) => (vk, ModifierState::new(shift, false, false, false)),
                        None => bail!("compose key {:?} cannot be typed on the US layout", text),
                    }
                }
                None => bail!("no compose key configured"),
            },
            Stroke::Key(vk) => (*vk, ModifierState::default()),
            Stroke::Char(ch) => match UsLayout::keystroke_for(*ch) {
                Some((vk, shift)) => (vk, ModifierState::new(shift, false, false, false)),
                None => bail!("{:?} cannot be typed on the US layout", ch),
            },
        };

        let down = RawKeyEvent::down(vk.raw()).with_modifiers(modifiers);
        let decision = adapter.on_key_event(&down);
        adapter.on_key_event(&RawKeyEvent::up(vk.raw()).with_modifiers(modifiers));
        transcript.decisions.push((stroke.label(), decision));
    }

    transcript.injections = adapter.injector_mut().take();
    transcript.events = rx.try_iter().collect();
    transcript.output = transcript
        .injections
        .iter()
        .filter_map(|injection| match injection {
            Injection::Text(text) => Some(text.as_str()),
            Injection::Key { .. } => None,
        })
        .collect();
    Ok(transcript)
}
