//! The compose engine - matches typed keys against the sequence table
//!
//! The engine itself holds only configuration. Session state lives in a
//! [`ComposingState`] owned by the caller and passed in for every event.

mod config;
mod engine;
mod output;
mod state;

pub use config::{EngineConfig, InvalidKeyPolicy};
pub use engine::{EngineEvent, MatchEngine};
pub use output::{Action, Step};
pub use state::ComposingState;
