//! US QWERTY key translation

use super::{KeyTranslator, ModifierState};
use crate::types::{Key, VirtualKey};

/// Unshifted and shifted characters of the US layout's punctuation keys
const PUNCTUATION: &[(VirtualKey, char, char)] = &[
    (VirtualKey::OEM_1, ';', ':'),
    (VirtualKey::OEM_PLUS, '=', '+'),
    (VirtualKey::OEM_COMMA, ',', '<'),
    (VirtualKey::OEM_MINUS, '-', '_'),
    (VirtualKey::OEM_PERIOD, '.', '>'),
    (VirtualKey::OEM_2, '/', '?'),
    (VirtualKey::OEM_3, '`', '~'),
    (VirtualKey::OEM_4, '[', '{'),
    (VirtualKey::OEM_5, '\\', '|'),
    (VirtualKey::OEM_6, ']', '}'),
    (VirtualKey::OEM_7, '\'', '"'),
];

const SHIFTED_DIGITS: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];

const NUMPAD_OPERATORS: &[(VirtualKey, char)] = &[
    (VirtualKey::MULTIPLY, '*'),
    (VirtualKey::ADD, '+'),
    (VirtualKey::SUBTRACT, '-'),
    (VirtualKey::DECIMAL, '.'),
    (VirtualKey::DIVIDE, '/'),
];

/// Translates virtual keys as the US English layout would, without asking
/// the operating system. Keys that type nothing, and any key pressed with
/// Ctrl or Alt, come out as [`Key::Virtual`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UsLayout;

impl UsLayout {
    pub fn new() -> Self {
        Self
    }

    /// The character typed by `vk` with the given modifiers
    pub fn char_for(vk: VirtualKey, modifiers: ModifierState) -> Option<char> {
        if modifiers.ctrl || modifiers.alt {
            return None;
        }
        let shift = modifiers.shift;
        match vk.raw() {
            code @ 0x41..=0x5A => {
                let ch = char::from(code as u8);
                Some(if shift != modifiers.caps_lock {
                    ch
                } else {
                    ch.to_ascii_lowercase()
                })
            }
            code @ 0x30..=0x39 => {
                let digit = (code - 0x30) as usize;
                Some(if shift {
                    SHIFTED_DIGITS[digit]
                } else {
                    char::from(code as u8)
                })
            }
            code @ 0x60..=0x69 => Some(char::from(b'0' + (code - 0x60) as u8)),
            0x20 => Some(' '),
            0x09 => Some('\t'),
            0x0D => Some('\r'),
            _ => PUNCTUATION
                .iter()
                .find(|(key, _, _)| *key == vk)
                .map(|&(_, plain, shifted)| if shift { shifted } else { plain })
                .or_else(|| {
                    NUMPAD_OPERATORS
                        .iter()
                        .find(|(key, _)| *key == vk)
                        .map(|&(_, ch)| ch)
                }),
        }
    }

    /// The key and Shift state that type `ch`, if the layout can type it
    pub fn keystroke_for(ch: char) -> Option<(VirtualKey, bool)> {
        match ch {
            'a'..='z' => Some((VirtualKey::letter(ch)?, false)),
            'A'..='Z' => Some((VirtualKey::letter(ch)?, true)),
            '0'..='9' => Some((VirtualKey::digit(ch)?, false)),
            ' ' => Some((VirtualKey::SPACE, false)),
            '\t' => Some((VirtualKey::TAB, false)),
            '\r' | '\n' => Some((VirtualKey::RETURN, false)),
            _ => {
                if let Some(index) = SHIFTED_DIGITS.iter().position(|&c| c == ch) {
                    let digit = char::from(b'0' + index as u8);
                    return Some((VirtualKey::digit(digit)?, true));
                }
                PUNCTUATION.iter().find_map(|&(vk, plain, shifted)| {
                    if ch == plain {
                        Some((vk, false))
                    } else if ch == shifted {
                        Some((vk, true))
                    } else {
                        None
                    }
                })
            }
        }
    }
}

impl KeyTranslator for UsLayout {
    fn translate(&mut self, vk: VirtualKey, _scan_code: u16, modifiers: ModifierState) -> Key {
        match Self::char_for(vk, modifiers) {
            Some(ch) => Key::from(ch),
            None => Key::Virtual(vk),
        }
    }
}
