//! The key model: anything that can be hit on the keyboard

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::VirtualKey;
use crate::error::Error;

/// Prefix distinguishing virtual keys from printable text in a key's
/// textual form.
pub const VK_PREFIX: &str = "VK.";

/// One keyboard input unit: either the text a key produces, or the virtual
/// key code of a key that produces no text.
///
/// Keys of different variants never compare equal, even when their text
/// forms happen to coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Printable(String),
    Virtual(VirtualKey),
}

impl Key {
    pub fn printable(text: impl Into<String>) -> Self {
        Key::Printable(text.into())
    }

    pub fn is_printable(&self) -> bool {
        matches!(self, Key::Printable(_))
    }

    pub fn virtual_key(&self) -> Option<VirtualKey> {
        match self {
            Key::Virtual(vk) => Some(*vk),
            Key::Printable(_) => None,
        }
    }

    /// The printable text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Key::Printable(text) => Some(text),
            Key::Virtual(_) => None,
        }
    }

    /// Lower-cased form of a printable key, or `None` if folding changes
    /// nothing.
    pub fn case_folded(&self) -> Option<Key> {
        match self {
            Key::Printable(text) => {
                let lower = text.to_lowercase();
                (lower != *text).then(|| Key::Printable(lower))
            }
            Key::Virtual(_) => None,
        }
    }

    /// The key used to index case-insensitive sequences
    pub fn folded(&self) -> Cow<'_, Key> {
        match self.case_folded() {
            Some(key) => Cow::Owned(key),
            None => Cow::Borrowed(self),
        }
    }

    /// A friendly name that can go in e.g. a dropdown menu.
    ///
    /// These are the built-in English names; localised names are supplied
    /// through [`KeyNames`](super::KeyNames).
    pub fn friendly_name(&self) -> Cow<'static, str> {
        match FRIENDLY_NAMES.get(self) {
            Some(name) => Cow::Borrowed(*name),
            None => Cow::Owned(self.to_string()),
        }
    }

    /// A label that can be printed on keycap icons
    pub fn label(&self) -> Cow<'static, str> {
        match self {
            Key::Virtual(VirtualKey::UP) => Cow::Borrowed("▲"),
            Key::Virtual(VirtualKey::DOWN) => Cow::Borrowed("▼"),
            Key::Virtual(VirtualKey::LEFT) => Cow::Borrowed("◀"),
            Key::Virtual(VirtualKey::RIGHT) => Cow::Borrowed("▶"),
            _ => Cow::Owned(self.to_string()),
        }
    }

    /// Printable text that would read back as a virtual key cannot be
    /// represented unambiguously.
    pub(crate) fn is_ambiguous(&self) -> bool {
        matches!(self, Key::Printable(text) if text.starts_with(VK_PREFIX) && text.len() > VK_PREFIX.len())
    }
}

impl From<VirtualKey> for Key {
    fn from(vk: VirtualKey) -> Self {
        Key::Virtual(vk)
    }
}

impl From<char> for Key {
    fn from(ch: char) -> Self {
        Key::Printable(ch.to_string())
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::Printable(text.to_string())
    }
}

impl fmt::Display for Key {
    /// Serialises to text that parses back into the same key
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Printable(text) => f.write_str(text),
            Key::Virtual(vk) => vk.fmt(f),
        }
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::InvalidKey(s.to_string()));
        }
        match s.strip_prefix(VK_PREFIX) {
            Some("") => Ok(Key::Printable(s.to_string())),
            Some(name) => VirtualKey::from_name(name)
                .map(Key::Virtual)
                .ok_or_else(|| Error::InvalidKey(s.to_string())),
            None => Ok(Key::Printable(s.to_string())),
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

static FRIENDLY_NAMES: Lazy<HashMap<Key, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (Key::Virtual(VirtualKey::LMENU), "Left Alt"),
        (Key::Virtual(VirtualKey::RMENU), "Right Alt"),
        (Key::Virtual(VirtualKey::LCONTROL), "Left Ctrl"),
        (Key::Virtual(VirtualKey::RCONTROL), "Right Ctrl"),
        (Key::Virtual(VirtualKey::LWIN), "Left Windows"),
        (Key::Virtual(VirtualKey::RWIN), "Right Windows"),
        (Key::Virtual(VirtualKey::CAPITAL), "Caps Lock"),
        (Key::Virtual(VirtualKey::NUMLOCK), "Num Lock"),
        (Key::Virtual(VirtualKey::PAUSE), "Pause"),
        (Key::Virtual(VirtualKey::APPS), "Menu"),
        (Key::Virtual(VirtualKey::ESCAPE), "Escape"),
        (Key::Virtual(VirtualKey::SCROLL), "Scroll Lock"),
        (Key::Virtual(VirtualKey::INSERT), "Insert"),
        (Key::printable(" "), "Space"),
        (Key::printable("\r"), "Return"),
        (Key::printable("\x1b"), "Escape"),
    ])
});
