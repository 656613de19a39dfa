//! Display names for keys supplied from outside the engine

use std::borrow::Cow;
use std::collections::HashMap;

use super::Key;

/// Overrides for [`Key::friendly_name`], typically localised strings
/// provided by the GUI.
#[derive(Debug, Clone, Default)]
pub struct KeyNames {
    names: HashMap<Key, String>,
}

impl KeyNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Key, name: impl Into<String>) {
        self.names.insert(key, name.into());
    }

    pub fn with(mut self, key: Key, name: impl Into<String>) -> Self {
        self.insert(key, name);
        self
    }

    pub fn name_of<'a>(&'a self, key: &Key) -> Cow<'a, str> {
        match self.names.get(key) {
            Some(name) => Cow::Borrowed(name),
            None => key.friendly_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VirtualKey;

    #[test]
    fn test_override_then_fallback() {
        let names = KeyNames::new().with(Key::Virtual(VirtualKey::RMENU), "Alt droite");
        assert_eq!(names.name_of(&Key::Virtual(VirtualKey::RMENU)), "Alt droite");
        assert_eq!(names.name_of(&Key::Virtual(VirtualKey::LMENU)), "Left Alt");
        assert_eq!(names.name_of(&Key::printable("x")), "x");
    }
}
