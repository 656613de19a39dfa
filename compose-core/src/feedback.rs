//! Feedback events published to UI and log collaborators
//!
//! The engine reports what happened to each composing session through
//! [`FeedbackEvent`]s. Anything may subscribe by implementing
//! [`FeedbackSink`]; sinks are called synchronously from the hook thread and
//! must return quickly.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, TryLockError};

use chrono::{DateTime, Local};

use crate::types::Key;

/// What ended a composing session without output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The compose key was pressed again
    ComposeKey,
    /// A configured cancel key was pressed
    CancelKey,
    /// No key arrived within the configured timeout
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    SequenceStarted,
    /// The keys typed so far, breaking key included, match no sequence
    SequenceInvalid { typed: Vec<Key> },
    SequenceCompleted { output: String },
    SequenceCancelled { reason: CancelReason },
    /// Output could not be delivered; the engine is back to idle regardless
    InjectionFailed { error: String },
}

impl fmt::Display for FeedbackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackEvent::SequenceStarted => write!(f, "Compose sequence started"),
            FeedbackEvent::SequenceInvalid { typed } => {
                write!(f, "Invalid sequence:")?;
                for key in typed {
                    write!(f, " {}", key.friendly_name())?;
                }
                Ok(())
            }
            FeedbackEvent::SequenceCompleted { output } => {
                write!(f, "Sequence completed, emitting {:?}", output)
            }
            FeedbackEvent::SequenceCancelled { reason } => {
                write!(f, "Sequence cancelled ({:?})", reason)
            }
            FeedbackEvent::InjectionFailed { error } => write!(f, "Could not send output: {}", error),
        }
    }
}

/// A subscriber to feedback events
pub trait FeedbackSink: Send {
    fn notify(&self, event: &FeedbackEvent);
}

impl<S: FeedbackSink + Sync + ?Sized> FeedbackSink for Arc<S> {
    fn notify(&self, event: &FeedbackEvent) {
        (**self).notify(event)
    }
}

/// The set of subscribers the hook adapter notifies
#[derive(Default)]
pub struct FeedbackHub {
    sinks: Vec<Box<dyn FeedbackSink>>,
}

impl FeedbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn FeedbackSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn dispatch(&self, event: &FeedbackEvent) {
        for sink in &self.sinks {
            sink.notify(event);
        }
    }
}

impl fmt::Debug for FeedbackHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackHub")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// Forwards events to another thread over a channel
pub struct ChannelSink {
    sender: Sender<FeedbackEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<FeedbackEvent>) -> Self {
        Self { sender }
    }
}

impl FeedbackSink for ChannelSink {
    fn notify(&self, event: &FeedbackEvent) {
        // A closed channel just means nobody listens any more
        let _ = self.sender.send(event.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.at.format("%Y/%m/%d %H:%M:%S%.3f"), self.message)
    }
}

/// Bounded, timestamped history of feedback events for display.
///
/// Recording never blocks: if a reader holds the history at that moment the
/// entry is dropped and counted instead.
#[derive(Debug)]
pub struct FeedbackLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    dropped: AtomicUsize,
}

impl Default for FeedbackLog {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackLog {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY))),
            capacity: capacity.max(1),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Copy of the retained entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.iter().cloned().collect()
    }

    /// Entries lost to contention
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    fn push(&self, entries: &mut VecDeque<LogEntry>, entry: LogEntry) {
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

impl FeedbackSink for FeedbackLog {
    fn notify(&self, event: &FeedbackEvent) {
        let entry = LogEntry {
            at: Local::now(),
            message: event.to_string(),
        };
        match self.entries.try_lock() {
            Ok(mut entries) => self.push(&mut entries, entry),
            Err(TryLockError::Poisoned(poisoned)) => self.push(&mut poisoned.into_inner(), entry),
            Err(TryLockError::WouldBlock) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
