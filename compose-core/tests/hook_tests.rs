mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::*;
use compose_core::{
    CancelReason, EngineConfig, FeedbackEvent, FeedbackLog, HookAdapter, HookDecision,
    InjectError, Injection, InvalidKeyPolicy, Key, KeyTranslator, ModifierState, RawKeyEvent,
    RecordingInjector, SequenceEntry, SharedSequences, VirtualKey,
};
use pretty_assertions::assert_eq;

use HookDecision::{PassThrough, Suppress};

const TABLE: &[(&str, &str)] = &[("e'", "é"), ("e'3", "ⅇ³"), ("oe", "œ"), ("<<", "«")];

fn harness() -> HookHarness {
    HookHarness::new(EngineConfig::default(), TABLE)
}

#[test]
fn test_typing_while_idle_passes_through() {
    let mut hook = harness();
    assert_eq!(hook.type_str("hello"), vec![PassThrough; 5]);
    assert_eq!(hook.output(), "");
    assert!(hook.events().is_empty());
}

#[test]
fn test_compose_sequence() {
    let mut hook = harness();
    assert_eq!(hook.compose(), Suppress);
    assert_eq!(hook.type_str("oe"), vec![Suppress, Suppress]);

    assert_eq!(hook.output(), "œ");
    assert_eq!(
        hook.events(),
        vec![
            FeedbackEvent::SequenceStarted,
            FeedbackEvent::SequenceCompleted { output: "œ".into() },
        ]
    );
    assert!(!hook.adapter.is_composing());
}

#[test]
fn test_compose_key_up_is_suppressed_with_its_down() {
    let mut hook = harness();
    assert_eq!(hook.down(VirtualKey::RMENU), Suppress);
    assert_eq!(hook.up(VirtualKey::RMENU), Suppress);
    // Nothing held any more, a stray key-up passes
    assert_eq!(hook.up(VirtualKey::RMENU), PassThrough);
}

#[test]
fn test_key_up_of_key_pressed_before_compose_passes() {
    let mut hook = harness();
    let o = VirtualKey::letter('o').unwrap();
    assert_eq!(hook.down(o), PassThrough);
    hook.compose();
    assert_eq!(hook.up(o), PassThrough);
}

#[test]
fn test_auto_repeat_of_suppressed_key() {
    let mut hook = harness();
    let e = VirtualKey::letter('e').unwrap();
    hook.compose();
    assert_eq!(hook.down(e), Suppress);
    // Held down: the repeats are swallowed without advancing the sequence
    assert_eq!(hook.down(e), Suppress);
    assert_eq!(hook.down(e), Suppress);
    assert_eq!(hook.up(e), Suppress);

    assert_eq!(hook.adapter.state().typed(), &[Key::from('e')]);
}

#[test]
fn test_injected_events_never_match() {
    let mut hook = harness();
    hook.compose();
    hook.type_char('o');

    let e = VirtualKey::letter('e').unwrap();
    assert_eq!(hook.send(RawKeyEvent::down(e.raw()).injected()), PassThrough);
    assert_eq!(hook.send(RawKeyEvent::up(e.raw()).injected()), PassThrough);

    assert_eq!(hook.adapter.state().typed(), &[Key::from('o')]);
    assert_eq!(hook.output(), "");
}

#[test]
fn test_injected_compose_key_does_not_start_sequence() {
    let mut hook = harness();
    let event = RawKeyEvent::down(VirtualKey::RMENU.raw()).injected();
    assert_eq!(hook.send(event), PassThrough);
    assert!(!hook.adapter.is_composing());
}

#[test]
fn test_modifiers_pass_while_composing() {
    let mut hook = harness();
    hook.compose();
    assert_eq!(hook.down(VirtualKey::LSHIFT), PassThrough);
    assert_eq!(hook.up(VirtualKey::LSHIFT), PassThrough);
    assert!(hook.adapter.is_composing());
}

#[test]
fn test_shifted_keys_use_the_layout() {
    let mut hook = HookHarness::with_entries(
        EngineConfig::default(),
        vec![SequenceEntry::from_chars("ss", "ß").case_insensitive()],
    );
    hook.compose();
    assert_eq!(hook.type_str("SS"), vec![Suppress, Suppress]);
    assert_eq!(hook.output(), "ß");
}

#[test]
fn test_invalid_sequence_discards_breaking_key() {
    let mut hook = harness();
    hook.compose();
    hook.type_str("e'x");

    assert_eq!(hook.output(), "é");
    assert!(hook.adapter.injector().injections().iter().all(|i| matches!(i, Injection::Text(_))));
}

#[test]
fn test_replayed_key_is_sent_as_keystrokes() {
    let config = EngineConfig {
        invalid_key: InvalidKeyPolicy::ReplayBreakingKey,
        ..EngineConfig::default()
    };
    let mut hook = HookHarness::new(config, TABLE);
    hook.compose();
    hook.type_char('<');
    assert_eq!(hook.down(VirtualKey::UP), Suppress);
    assert_eq!(hook.up(VirtualKey::UP), Suppress);

    assert_eq!(
        hook.adapter.injector().injections(),
        &[
            Injection::Key {
                vk: VirtualKey::UP,
                is_down: true
            },
            Injection::Key {
                vk: VirtualKey::UP,
                is_down: false
            },
        ]
    );
}

#[test]
fn test_replay_all_sends_typed_text() {
    let config = EngineConfig {
        invalid_key: InvalidKeyPolicy::ReplayAll,
        ..EngineConfig::default()
    };
    let mut hook = HookHarness::new(config, TABLE);
    hook.compose();
    hook.type_str("<q");
    assert_eq!(hook.output(), "<q");
}

#[test]
fn test_cancel_mid_sequence() {
    let mut hook = harness();
    hook.compose();
    hook.type_char('e');
    assert_eq!(hook.down(VirtualKey::ESCAPE), Suppress);
    assert_eq!(hook.up(VirtualKey::ESCAPE), Suppress);

    assert_eq!(hook.output(), "");
    assert_eq!(
        hook.events().last(),
        Some(&FeedbackEvent::SequenceCancelled {
            reason: CancelReason::CancelKey
        })
    );
    // Escape passes again once idle
    assert_eq!(hook.down(VirtualKey::ESCAPE), PassThrough);
}

#[test]
fn test_injection_failure_is_reported_and_resets() {
    let mut hook = harness();
    hook.adapter
        .injector_mut()
        .set_failure(Some(InjectError::Rejected { requested: 2, delivered: 0 }));

    hook.compose();
    hook.type_str("oe");

    assert!(!hook.adapter.is_composing());
    let events = hook.events();
    assert_eq!(
        events.last(),
        Some(&FeedbackEvent::InjectionFailed {
            error: "only 0 of 2 input events were delivered".into()
        })
    );

    // The next sequence works once injection recovers
    hook.adapter.injector_mut().set_failure(None);
    hook.compose();
    hook.type_str("oe");
    assert_eq!(hook.output(), "œ");
}

struct PanickingTranslator {
    calls: Arc<AtomicUsize>,
}

impl KeyTranslator for PanickingTranslator {
    fn translate(&mut self, _vk: VirtualKey, _scan_code: u16, _modifiers: ModifierState) -> Key {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("layout lookup failed");
    }
}

#[test]
fn test_panic_resets_and_passes_through() {
    let sequences = Arc::new(SharedSequences::default());
    sequences.reload(entries(TABLE));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut adapter = HookAdapter::new(
        EngineConfig::default(),
        sequences,
        RecordingInjector::new(),
        PanickingTranslator {
            calls: Arc::clone(&calls),
        },
    );

    let compose = RawKeyEvent::down(VirtualKey::RMENU.raw());
    assert_eq!(adapter.on_key_event(&compose), Suppress);
    assert!(adapter.is_composing());

    let o = RawKeyEvent::down(VirtualKey::letter('o').unwrap().raw());
    assert_eq!(adapter.on_key_event(&o), PassThrough);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!adapter.is_composing());
    assert!(adapter.injector().injections().is_empty());

    // The compose key-up is no longer tracked after the reset
    let compose_up = RawKeyEvent::up(VirtualKey::RMENU.raw());
    assert_eq!(adapter.on_key_event(&compose_up), PassThrough);
}

#[test]
fn test_hot_swap_applies_to_next_session() {
    let mut hook = harness();
    hook.compose();
    hook.type_char('o');

    let rejected = hook.sequences.reload(entries(&[("oe", "Œ"), ("ae", "æ")]));
    assert!(rejected.is_empty());

    hook.type_char('e');
    assert_eq!(hook.output(), "œ");

    hook.compose();
    hook.type_str("oe");
    assert_eq!(hook.output(), "œŒ");
}

#[test]
fn test_table_published_while_idle_is_used() {
    let mut hook = harness();
    let generation = hook.sequences.generation();
    hook.sequences.publish(compose_core::load_sequences(entries(&[("oe", "Œ")])).tree);
    assert_eq!(hook.sequences.generation(), generation + 1);

    hook.compose();
    hook.type_str("oe");
    assert_eq!(hook.output(), "Œ");
}

#[test]
fn test_timer_expires_session() {
    let config = EngineConfig {
        timeout: Some(Duration::from_millis(200)),
        ..EngineConfig::default()
    };
    let mut hook = HookHarness::new(config, TABLE);
    let start = Instant::now();
    hook.send(RawKeyEvent::down(VirtualKey::RMENU.raw()).at(start));
    assert_eq!(hook.adapter.deadline(), Some(start + Duration::from_millis(200)));

    hook.adapter.on_timer(start + Duration::from_millis(100));
    assert!(hook.adapter.is_composing());

    hook.adapter.on_timer(start + Duration::from_millis(300));
    assert!(!hook.adapter.is_composing());
    assert_eq!(hook.adapter.deadline(), None);
    assert_eq!(
        hook.events(),
        vec![
            FeedbackEvent::SequenceStarted,
            FeedbackEvent::SequenceCancelled {
                reason: CancelReason::Timeout
            },
        ]
    );
}

#[test]
fn test_feedback_log_subscriber() {
    let mut hook = harness();
    let log = Arc::new(FeedbackLog::new());
    hook.adapter.subscribe(Box::new(Arc::clone(&log)));

    hook.compose();
    hook.type_str("<x");

    let messages: Vec<_> = log.entries().into_iter().map(|entry| entry.message).collect();
    assert_eq!(
        messages,
        vec!["Compose sequence started".to_string(), "Invalid sequence: < x".to_string()]
    );
}
