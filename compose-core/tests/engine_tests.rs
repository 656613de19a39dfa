mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::*;
use compose_core::{
    load_sequences, Action, CancelReason, EngineConfig, EngineEvent, FeedbackEvent,
    InvalidKeyPolicy, Key, SequenceEntry, VirtualKey,
};
use pretty_assertions::assert_eq;

const TABLE: &[(&str, &str)] = &[
    ("e'", "é"),
    ("e'3", "ⅇ³"),
    ("a'", "á"),
    ("oe", "œ"),
    ("<<", "«"),
    ("ss", "ß"),
    ("--.", "–"),
    ("---", "—"),
];

fn driver(policy: InvalidKeyPolicy) -> EngineDriver {
    let config = EngineConfig {
        invalid_key: policy,
        ..EngineConfig::default()
    };
    EngineDriver::new(config, tree(TABLE))
}

fn text(s: &str) -> Action {
    Action::Text(s.to_string())
}

fn replay(ch: char) -> Action {
    Action::Replay(Key::from(ch))
}

#[test]
fn test_every_sequence_emits_its_output() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    for (keys, output) in TABLE {
        engine.compose();
        let mut step = engine.chars(keys);
        if engine.state.is_active() {
            // A prefix of a longer sequence completes on the next key
            step.append(engine.key(Key::Virtual(VirtualKey::SPACE)));
        }
        assert_eq!(step.emitted_text(), *output, "sequence {:?}", keys);
        assert!(!engine.state.is_active());
    }
}

#[test]
fn test_longest_match_falls_back_and_discards_breaking_key() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    engine.compose();
    let step = engine.chars("e'x");

    assert!(step.consumed);
    assert_eq!(step.actions, vec![text("é")]);
    assert_eq!(
        step.events,
        vec![FeedbackEvent::SequenceCompleted { output: "é".into() }]
    );
    assert!(!engine.state.is_active());
}

#[test]
fn test_longest_match_prefers_longer_sequence() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    engine.compose();
    let step = engine.chars("e'3");
    assert_eq!(step.actions, vec![text("ⅇ³")]);
}

#[test]
fn test_fallback_survives_partial_continuation() {
    // "e'" is complete; "e'3" exists only as a longer path once we add "e'3!"
    let tree = tree(&[("e'", "é"), ("e'3!", "‼")]);
    let mut engine = EngineDriver::new(
        EngineConfig {
            invalid_key: InvalidKeyPolicy::ReplayAll,
            ..EngineConfig::default()
        },
        tree,
    );
    engine.compose();
    let step = engine.chars("e'3x");

    assert_eq!(step.actions, vec![text("é"), replay('3'), replay('x')]);
}

#[test]
fn test_invalid_prefix() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    engine.compose();
    let step = engine.chars("q");

    assert!(step.consumed);
    assert!(step.actions.is_empty());
    assert_eq!(
        step.events,
        vec![FeedbackEvent::SequenceInvalid {
            typed: vec![Key::from('q')]
        }]
    );
    assert!(!engine.state.is_active());
}

#[test]
fn test_invalid_sequence_reports_all_typed_keys() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    engine.compose();
    let step = engine.chars("<x");

    assert_eq!(
        step.events,
        vec![FeedbackEvent::SequenceInvalid {
            typed: vec![Key::from('<'), Key::from('x')]
        }]
    );
}

#[test]
fn test_replay_breaking_key_policy() {
    let mut engine = driver(InvalidKeyPolicy::ReplayBreakingKey);

    engine.compose();
    let step = engine.chars("<x");
    assert_eq!(step.actions, vec![replay('x')]);

    engine.compose();
    let step = engine.chars("e'x");
    assert_eq!(step.actions, vec![text("é"), replay('x')]);
}

#[test]
fn test_replay_all_policy() {
    let mut engine = driver(InvalidKeyPolicy::ReplayAll);

    engine.compose();
    let step = engine.chars("--x");
    assert_eq!(step.actions, vec![replay('-'), replay('-'), replay('x')]);

    engine.compose();
    let step = engine.chars("e'x");
    assert_eq!(step.actions, vec![text("é"), replay('x')]);
}

#[test]
fn test_discard_policy_replays_nothing() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    engine.compose();
    let step = engine.chars("--x");
    assert!(step.actions.is_empty());
}

#[test]
fn test_case_insensitive_fallback() {
    let report = load_sequences(vec![SequenceEntry::from_chars("ss", "ß").case_insensitive()]);
    let mut engine = EngineDriver::new(EngineConfig::default(), Arc::new(report.tree));

    engine.compose();
    assert_eq!(engine.chars("SS").emitted_text(), "ß");

    engine.compose();
    assert_eq!(engine.chars("sS").emitted_text(), "ß");
}

#[test]
fn test_case_insensitive_disabled_in_config() {
    let report = load_sequences(vec![SequenceEntry::from_chars("ss", "ß").case_insensitive()]);
    let config = EngineConfig {
        case_insensitive: false,
        ..EngineConfig::default()
    };
    let mut engine = EngineDriver::new(config, Arc::new(report.tree));

    engine.compose();
    let step = engine.chars("SS");
    assert_eq!(step.emitted_text(), "");
    assert!(matches!(step.events[0], FeedbackEvent::SequenceInvalid { .. }));
}

#[test]
fn test_case_sensitive_entry_not_folded() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    engine.compose();
    let step = engine.chars("SS");
    assert!(step.actions.is_empty());
}

#[test]
fn test_cancel_with_compose_key_at_any_depth() {
    let sequence = "--.";
    for depth in 0..sequence.len() {
        let mut engine = driver(InvalidKeyPolicy::ReplayAll);
        engine.compose();
        engine.chars(&sequence[..depth]);
        assert!(engine.state.is_active());

        let step = engine.compose();
        assert!(step.consumed);
        assert!(step.actions.is_empty(), "depth {}", depth);
        assert_eq!(
            step.events,
            vec![FeedbackEvent::SequenceCancelled {
                reason: CancelReason::ComposeKey
            }]
        );
        assert!(!engine.state.is_active());
    }
}

#[test]
fn test_cancel_key() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    engine.compose();
    engine.chars("e'");
    let step = engine.key(Key::Virtual(VirtualKey::ESCAPE));

    assert!(step.actions.is_empty());
    assert_eq!(
        step.events,
        vec![FeedbackEvent::SequenceCancelled {
            reason: CancelReason::CancelKey
        }]
    );
}

#[test]
fn test_cancel_key_when_idle_passes() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    let step = engine.key(Key::Virtual(VirtualKey::ESCAPE));
    assert!(!step.consumed);
}

#[test]
fn test_idempotent_load() {
    let first = load_sequences(entries(TABLE)).tree;
    let second = load_sequences(entries(TABLE)).tree;

    let probes = ["e", "e'", "e'3", "e'x", "-", "--", "---", "q", "<", "<<", "s", "ss"];
    for probe in probes {
        let keys: Vec<Key> = probe.chars().map(Key::from).collect();
        assert_eq!(first.lookup(&keys), second.lookup(&keys), "probe {:?}", probe);
    }
    assert_eq!(first.len(), second.len());
}

#[test]
fn test_timeout_cancels_session() {
    let config = EngineConfig {
        timeout: Some(Duration::from_secs(2)),
        ..EngineConfig::default()
    };
    let mut engine = EngineDriver::new(config, tree(TABLE));
    engine.compose();
    engine.chars("<");

    let step = engine.engine.handle(
        &mut engine.state,
        &engine.tree,
        EngineEvent::Timeout,
        Instant::now(),
    );
    assert_eq!(
        step.events,
        vec![FeedbackEvent::SequenceCancelled {
            reason: CancelReason::Timeout
        }]
    );
    assert!(!engine.state.is_active());
}

#[test]
fn test_timeout_emits_pending_fallback() {
    let config = EngineConfig {
        timeout: Some(Duration::from_secs(2)),
        ..EngineConfig::default()
    };
    let mut engine = EngineDriver::new(config, tree(TABLE));
    engine.compose();
    engine.chars("e'");

    let later = Instant::now() + Duration::from_secs(3);
    let step = engine.engine.expire_if_due(&mut engine.state, later).unwrap();
    assert_eq!(step.actions, vec![text("é")]);
    assert!(!engine.state.is_active());
}

#[test]
fn test_stale_session_expires_before_next_key() {
    let config = EngineConfig {
        timeout: Some(Duration::from_secs(1)),
        ..EngineConfig::default()
    };
    let mut engine = EngineDriver::new(config, tree(TABLE));
    let start = Instant::now();
    engine.engine.handle(
        &mut engine.state,
        &engine.tree,
        EngineEvent::KeyDown(compose_key()),
        start,
    );

    // The key arrives after the session expired, so it is ordinary typing
    let step = engine.engine.handle(
        &mut engine.state,
        &engine.tree,
        EngineEvent::KeyDown(Key::from('o')),
        start + Duration::from_secs(5),
    );
    assert!(!step.consumed);
    assert_eq!(
        step.events,
        vec![FeedbackEvent::SequenceCancelled {
            reason: CancelReason::Timeout
        }]
    );
}

#[test]
fn test_session_keeps_its_tree() {
    let mut engine = driver(InvalidKeyPolicy::Discard);
    engine.compose();
    engine.chars("o");

    // A new table without "oe" arrives mid-session
    engine.tree = tree(&[("ae", "æ")]);
    assert_eq!(engine.chars("e").emitted_text(), "œ");

    engine.compose();
    assert_eq!(engine.chars("ae").emitted_text(), "æ");
}
