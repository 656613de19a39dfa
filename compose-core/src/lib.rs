//! Compose key sequence engine
//!
//! Press a compose key, then type a short sequence such as `e` `'`, and the
//! engine replaces it with the text it stands for (`é`). This crate holds
//! everything that does not depend on the operating system: the key model,
//! the sequence table, the matching state machine and the adapter that a
//! platform keyboard hook drives.

pub mod types;
pub mod error;
pub mod sequence;
pub mod engine;
pub mod feedback;
pub mod hook;
pub mod settings;

pub use types::*;

// Re-export commonly used types
pub use error::{Error, Result, LoadError, InjectError};
pub use sequence::{SequenceTree, SequenceEntry, Lookup, Cursor, LoadReport, Rejection, SharedSequences, load_sequences};
pub use engine::{MatchEngine, EngineConfig, EngineEvent, InvalidKeyPolicy, ComposingState, Step, Action};
pub use feedback::{FeedbackEvent, FeedbackSink, FeedbackHub, FeedbackLog, ChannelSink, LogEntry, CancelReason};
pub use hook::{HookAdapter, HookDecision, RawKeyEvent, ModifierState, Injector, KeyTranslator, RecordingInjector, Injection, UsLayout};
pub use settings::Settings;
