//! User settings, stored as TOML

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{EngineConfig, InvalidKeyPolicy};
use crate::error::{Error, Result};
use crate::types::{Key, VirtualKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Keys that start a sequence
    pub compose_keys: Vec<Key>,
    /// Keys that abort a sequence
    pub cancel_keys: Vec<Key>,
    pub case_insensitive: bool,
    /// What to do with the key that breaks a sequence
    pub invalid_key: InvalidKeyPolicy,
    /// Milliseconds of inactivity after which a sequence is abandoned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    pub beep_on_invalid: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compose_keys: vec![Key::Virtual(VirtualKey::RMENU)],
            cancel_keys: vec![Key::Virtual(VirtualKey::ESCAPE)],
            case_insensitive: true,
            invalid_key: InvalidKeyPolicy::Discard,
            timeout_ms: None,
            beep_on_invalid: true,
        }
    }
}

impl Settings {
    /// Parses and validates settings
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.compose_keys.is_empty() {
            return Err(Error::InvalidSetting("at least one compose key is required".into()));
        }
        if let Some(key) = self.compose_keys.iter().find(|key| self.cancel_keys.contains(key)) {
            return Err(Error::InvalidSetting(format!(
                "{} cannot be both a compose key and a cancel key",
                key
            )));
        }
        for key in self.compose_keys.iter().chain(&self.cancel_keys) {
            if let Key::Printable(text) = key {
                if text.chars().count() != 1 {
                    return Err(Error::InvalidSetting(format!(
                        "{:?} is not a single key",
                        text
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            compose_keys: self.compose_keys.clone(),
            cancel_keys: self.cancel_keys.clone(),
            case_insensitive: self.case_insensitive,
            invalid_key: self.invalid_key,
            timeout: self.timeout(),
        }
    }
}
