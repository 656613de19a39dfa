//! Key translation through the active keyboard layout

use compose_core::{Key, KeyTranslator, ModifierState, VirtualKey};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyboardLayout, ToUnicodeEx, VK_CAPITAL, VK_CONTROL, VK_MENU, VK_SHIFT,
};
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId};

/// Leave the kernel-mode keyboard state alone, so dead keys typed by the
/// user are not consumed by our query (Windows 10 1607 and later)
const TOUNICODE_NO_STATE_CHANGE: u32 = 0x4;

/// Asks Windows which text a key produces in the foreground window's
/// keyboard layout
#[derive(Debug, Default)]
pub struct LayoutTranslator;

impl LayoutTranslator {
    pub fn new() -> Self {
        Self
    }

    fn key_state(modifiers: ModifierState) -> [u8; 256] {
        let mut state = [0u8; 256];
        if modifiers.shift {
            state[VK_SHIFT.0 as usize] = 0x80;
        }
        if modifiers.is_alt_gr() {
            state[VK_CONTROL.0 as usize] = 0x80;
            state[VK_MENU.0 as usize] = 0x80;
        }
        if modifiers.caps_lock {
            state[VK_CAPITAL.0 as usize] = 0x01;
        }
        state
    }
}

impl KeyTranslator for LayoutTranslator {
    fn translate(&mut self, vk: VirtualKey, scan_code: u16, modifiers: ModifierState) -> Key {
        // Shortcuts never type text
        if (modifiers.ctrl || modifiers.alt) && !modifiers.is_alt_gr() {
            return Key::Virtual(vk);
        }

        let state = Self::key_state(modifiers);
        let mut buffer = [0u16; 8];
        // SAFETY: plain queries on the foreground thread's layout; the
        // buffers outlive the calls
        let written = unsafe {
            let thread = GetWindowThreadProcessId(GetForegroundWindow(), None);
            let layout = GetKeyboardLayout(thread);
            ToUnicodeEx(
                vk.raw() as u32,
                scan_code as u32,
                &state,
                &mut buffer,
                TOUNICODE_NO_STATE_CHANGE,
                layout,
            )
        };

        // Negative for dead keys, zero for keys without text
        if written <= 0 {
            return Key::Virtual(vk);
        }
        let text = String::from_utf16_lossy(&buffer[..written as usize]);
        if text.chars().all(|ch| ch.is_control() && !matches!(ch, '\r' | '\t' | '\x1b')) {
            return Key::Virtual(vk);
        }
        Key::Printable(text)
    }
}
