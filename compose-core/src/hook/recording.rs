//! An injector that records instead of typing

use super::Injector;
use crate::error::InjectError;
use crate::types::VirtualKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Injection {
    Text(String),
    Key { vk: VirtualKey, is_down: bool },
}

/// Records every injection in order. Used by tests and the simulator, and
/// able to fail on demand.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    injections: Vec<Injection>,
    failure: Option<InjectError>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// An injector whose every call fails with `error`
    pub fn failing(error: InjectError) -> Self {
        Self {
            injections: Vec::new(),
            failure: Some(error),
        }
    }

    pub fn set_failure(&mut self, failure: Option<InjectError>) {
        self.failure = failure;
    }

    pub fn injections(&self) -> &[Injection] {
        &self.injections
    }

    pub fn take(&mut self) -> Vec<Injection> {
        std::mem::take(&mut self.injections)
    }

    /// All injected text, concatenated
    pub fn typed_text(&self) -> String {
        self.injections
            .iter()
            .filter_map(|injection| match injection {
                Injection::Text(text) => Some(text.as_str()),
                Injection::Key { .. } => None,
            })
            .collect()
    }

    fn check(&self) -> Result<(), InjectError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Injector for RecordingInjector {
    fn inject_text(&mut self, text: &str) -> Result<(), InjectError> {
        self.check()?;
        self.injections.push(Injection::Text(text.to_string()));
        Ok(())
    }

    fn inject_key(&mut self, vk: VirtualKey, is_down: bool) -> Result<(), InjectError> {
        self.check()?;
        self.injections.push(Injection::Key { vk, is_down });
        Ok(())
    }
}
