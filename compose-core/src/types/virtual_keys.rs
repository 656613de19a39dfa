//! Windows virtual-key codes and their textual names

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// A virtual-key code in the Windows `VK_*` code space.
///
/// Only a subset of codes has a name; any other code is still a valid key and
/// renders in hexadecimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualKey(pub u16);

impl VirtualKey {
    pub const BACK: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const CLEAR: Self = Self(0x0C);
    pub const RETURN: Self = Self(0x0D);
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    pub const MENU: Self = Self(0x12);
    pub const PAUSE: Self = Self(0x13);
    pub const CAPITAL: Self = Self(0x14);
    pub const KANA: Self = Self(0x15);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);
    pub const PRIOR: Self = Self(0x21);
    pub const NEXT: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const LEFT: Self = Self(0x25);
    pub const UP: Self = Self(0x26);
    pub const RIGHT: Self = Self(0x27);
    pub const DOWN: Self = Self(0x28);
    pub const SNAPSHOT: Self = Self(0x2C);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);
    pub const LWIN: Self = Self(0x5B);
    pub const RWIN: Self = Self(0x5C);
    pub const APPS: Self = Self(0x5D);
    pub const NUMPAD0: Self = Self(0x60);
    pub const NUMPAD9: Self = Self(0x69);
    pub const MULTIPLY: Self = Self(0x6A);
    pub const ADD: Self = Self(0x6B);
    pub const SEPARATOR: Self = Self(0x6C);
    pub const SUBTRACT: Self = Self(0x6D);
    pub const DECIMAL: Self = Self(0x6E);
    pub const DIVIDE: Self = Self(0x6F);
    pub const F1: Self = Self(0x70);
    pub const F12: Self = Self(0x7B);
    pub const F24: Self = Self(0x87);
    pub const NUMLOCK: Self = Self(0x90);
    pub const SCROLL: Self = Self(0x91);
    pub const LSHIFT: Self = Self(0xA0);
    pub const RSHIFT: Self = Self(0xA1);
    pub const LCONTROL: Self = Self(0xA2);
    pub const RCONTROL: Self = Self(0xA3);
    pub const LMENU: Self = Self(0xA4);
    pub const RMENU: Self = Self(0xA5);
    pub const OEM_1: Self = Self(0xBA);
    pub const OEM_PLUS: Self = Self(0xBB);
    pub const OEM_COMMA: Self = Self(0xBC);
    pub const OEM_MINUS: Self = Self(0xBD);
    pub const OEM_PERIOD: Self = Self(0xBE);
    pub const OEM_2: Self = Self(0xBF);
    pub const OEM_3: Self = Self(0xC0);
    pub const OEM_4: Self = Self(0xDB);
    pub const OEM_5: Self = Self(0xDC);
    pub const OEM_6: Self = Self(0xDD);
    pub const OEM_7: Self = Self(0xDE);
    pub const OEM_8: Self = Self(0xDF);
    pub const OEM_102: Self = Self(0xE2);

    /// Creates from raw value
    pub fn from_raw(value: u16) -> Self {
        Self(value)
    }

    /// Gets the raw value
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// Letter key for an ASCII letter, either case
    pub fn letter(ch: char) -> Option<Self> {
        ch.is_ascii_alphabetic()
            .then(|| Self(ch.to_ascii_uppercase() as u16))
    }

    /// Digit key on the main row for an ASCII digit
    pub fn digit(ch: char) -> Option<Self> {
        ch.is_ascii_digit().then(|| Self(ch as u16))
    }

    /// Shift, Ctrl, Alt, Win and the lock keys: keys that change what other
    /// keys produce rather than producing anything themselves.
    pub fn is_modifier(&self) -> bool {
        matches!(
            *self,
            Self::SHIFT
                | Self::CONTROL
                | Self::MENU
                | Self::CAPITAL
                | Self::LWIN
                | Self::RWIN
                | Self::NUMLOCK
                | Self::SCROLL
                | Self::LSHIFT
                | Self::RSHIFT
                | Self::LCONTROL
                | Self::RCONTROL
                | Self::LMENU
                | Self::RMENU
        )
    }

    /// Symbolic name without the `VK.` prefix, if the code has one
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            0x30..=0x39 | 0x41..=0x5A => DIGITS_AND_LETTERS
                .iter()
                .find(|(_, vk)| *vk == *self)
                .map(|(name, _)| *name),
            _ => NAMED_KEYS
                .iter()
                .find(|(_, vk)| *vk == *self)
                .map(|(name, _)| *name),
        }
    }

    /// Parses a name without the `VK.` prefix, or a `0x` hexadecimal code
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(hex) = name.strip_prefix("0x") {
            return u16::from_str_radix(hex, 16).ok().map(Self);
        }
        VK_MAP.get(name).copied()
    }

    /// Every named key, in code order
    pub fn named() -> impl Iterator<Item = (&'static str, VirtualKey)> {
        let mut all: Vec<_> = NAMED_KEYS
            .iter()
            .chain(DIGITS_AND_LETTERS.iter())
            .copied()
            .collect();
        all.sort_by_key(|(_, vk)| *vk);
        all.into_iter()
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "VK.{}", name),
            None => write!(f, "VK.0x{:02X}", self.0),
        }
    }
}

const NAMED_KEYS: &[(&str, VirtualKey)] = &[
    ("BACK", VirtualKey::BACK),
    ("TAB", VirtualKey::TAB),
    ("CLEAR", VirtualKey::CLEAR),
    ("RETURN", VirtualKey::RETURN),
    ("SHIFT", VirtualKey::SHIFT),
    ("CONTROL", VirtualKey::CONTROL),
    ("MENU", VirtualKey::MENU),
    ("PAUSE", VirtualKey::PAUSE),
    ("CAPITAL", VirtualKey::CAPITAL),
    ("KANA", VirtualKey::KANA),
    ("ESCAPE", VirtualKey::ESCAPE),
    ("SPACE", VirtualKey::SPACE),
    ("PRIOR", VirtualKey::PRIOR),
    ("NEXT", VirtualKey::NEXT),
    ("END", VirtualKey::END),
    ("HOME", VirtualKey::HOME),
    ("LEFT", VirtualKey::LEFT),
    ("UP", VirtualKey::UP),
    ("RIGHT", VirtualKey::RIGHT),
    ("DOWN", VirtualKey::DOWN),
    ("SNAPSHOT", VirtualKey::SNAPSHOT),
    ("INSERT", VirtualKey::INSERT),
    ("DELETE", VirtualKey::DELETE),
    ("LWIN", VirtualKey::LWIN),
    ("RWIN", VirtualKey::RWIN),
    ("APPS", VirtualKey::APPS),
    ("NUMPAD0", VirtualKey(0x60)),
    ("NUMPAD1", VirtualKey(0x61)),
    ("NUMPAD2", VirtualKey(0x62)),
    ("NUMPAD3", VirtualKey(0x63)),
    ("NUMPAD4", VirtualKey(0x64)),
    ("NUMPAD5", VirtualKey(0x65)),
    ("NUMPAD6", VirtualKey(0x66)),
    ("NUMPAD7", VirtualKey(0x67)),
    ("NUMPAD8", VirtualKey(0x68)),
    ("NUMPAD9", VirtualKey(0x69)),
    ("MULTIPLY", VirtualKey::MULTIPLY),
    ("ADD", VirtualKey::ADD),
    ("SEPARATOR", VirtualKey::SEPARATOR),
    ("SUBTRACT", VirtualKey::SUBTRACT),
    ("DECIMAL", VirtualKey::DECIMAL),
    ("DIVIDE", VirtualKey::DIVIDE),
    ("F1", VirtualKey(0x70)),
    ("F2", VirtualKey(0x71)),
    ("F3", VirtualKey(0x72)),
    ("F4", VirtualKey(0x73)),
    ("F5", VirtualKey(0x74)),
    ("F6", VirtualKey(0x75)),
    ("F7", VirtualKey(0x76)),
    ("F8", VirtualKey(0x77)),
    ("F9", VirtualKey(0x78)),
    ("F10", VirtualKey(0x79)),
    ("F11", VirtualKey(0x7A)),
    ("F12", VirtualKey(0x7B)),
    ("F13", VirtualKey(0x7C)),
    ("F14", VirtualKey(0x7D)),
    ("F15", VirtualKey(0x7E)),
    ("F16", VirtualKey(0x7F)),
    ("F17", VirtualKey(0x80)),
    ("F18", VirtualKey(0x81)),
    ("F19", VirtualKey(0x82)),
    ("F20", VirtualKey(0x83)),
    ("F21", VirtualKey(0x84)),
    ("F22", VirtualKey(0x85)),
    ("F23", VirtualKey(0x86)),
    ("F24", VirtualKey(0x87)),
    ("NUMLOCK", VirtualKey::NUMLOCK),
    ("SCROLL", VirtualKey::SCROLL),
    ("LSHIFT", VirtualKey::LSHIFT),
    ("RSHIFT", VirtualKey::RSHIFT),
    ("LCONTROL", VirtualKey::LCONTROL),
    ("RCONTROL", VirtualKey::RCONTROL),
    ("LMENU", VirtualKey::LMENU),
    ("RMENU", VirtualKey::RMENU),
    ("OEM_1", VirtualKey::OEM_1),
    ("OEM_PLUS", VirtualKey::OEM_PLUS),
    ("OEM_COMMA", VirtualKey::OEM_COMMA),
    ("OEM_MINUS", VirtualKey::OEM_MINUS),
    ("OEM_PERIOD", VirtualKey::OEM_PERIOD),
    ("OEM_2", VirtualKey::OEM_2),
    ("OEM_3", VirtualKey::OEM_3),
    ("OEM_4", VirtualKey::OEM_4),
    ("OEM_5", VirtualKey::OEM_5),
    ("OEM_6", VirtualKey::OEM_6),
    ("OEM_7", VirtualKey::OEM_7),
    ("OEM_8", VirtualKey::OEM_8),
    ("OEM_102", VirtualKey::OEM_102),
];

const DIGITS_AND_LETTERS: &[(&str, VirtualKey)] = &[
    ("0", VirtualKey(0x30)),
    ("1", VirtualKey(0x31)),
    ("2", VirtualKey(0x32)),
    ("3", VirtualKey(0x33)),
    ("4", VirtualKey(0x34)),
    ("5", VirtualKey(0x35)),
    ("6", VirtualKey(0x36)),
    ("7", VirtualKey(0x37)),
    ("8", VirtualKey(0x38)),
    ("9", VirtualKey(0x39)),
    ("A", VirtualKey(0x41)),
    ("B", VirtualKey(0x42)),
    ("C", VirtualKey(0x43)),
    ("D", VirtualKey(0x44)),
    ("E", VirtualKey(0x45)),
    ("F", VirtualKey(0x46)),
    ("G", VirtualKey(0x47)),
    ("H", VirtualKey(0x48)),
    ("I", VirtualKey(0x49)),
    ("J", VirtualKey(0x4A)),
    ("K", VirtualKey(0x4B)),
    ("L", VirtualKey(0x4C)),
    ("M", VirtualKey(0x4D)),
    ("N", VirtualKey(0x4E)),
    ("O", VirtualKey(0x4F)),
    ("P", VirtualKey(0x50)),
    ("Q", VirtualKey(0x51)),
    ("R", VirtualKey(0x52)),
    ("S", VirtualKey(0x53)),
    ("T", VirtualKey(0x54)),
    ("U", VirtualKey(0x55)),
    ("V", VirtualKey(0x56)),
    ("W", VirtualKey(0x57)),
    ("X", VirtualKey(0x58)),
    ("Y", VirtualKey(0x59)),
    ("Z", VirtualKey(0x5A)),
];

static VK_MAP: Lazy<HashMap<&'static str, VirtualKey>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, VirtualKey> = NAMED_KEYS
        .iter()
        .chain(DIGITS_AND_LETTERS.iter())
        .copied()
        .collect();

    // Aliases accepted on input, never produced on output
    map.insert("ENTER", VirtualKey::RETURN);
    map.insert("ESC", VirtualKey::ESCAPE);
    map.insert("ALT", VirtualKey::MENU);
    map.insert("LALT", VirtualKey::LMENU);
    map.insert("RALT", VirtualKey::RMENU);
    map.insert("ALT_GR", VirtualKey::RMENU);
    map.insert("CTRL", VirtualKey::CONTROL);
    map.insert("LCTRL", VirtualKey::LCONTROL);
    map.insert("RCTRL", VirtualKey::RCONTROL);
    map.insert("CAPSLOCK", VirtualKey::CAPITAL);
    map.insert("PAGE_UP", VirtualKey::PRIOR);
    map.insert("PAGE_DOWN", VirtualKey::NEXT);

    map
});
