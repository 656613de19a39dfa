//! Typing through `SendInput`

use compose_core::{InjectError, Injector, VirtualKey};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_UNICODE, VIRTUAL_KEY,
};

/// `dwExtraInfo` value carried by every event this crate injects, so the
/// hook can recognise its own output
pub const INJECTED_MARKER: usize = 0x434D_5053;

/// Keys that need `KEYEVENTF_EXTENDEDKEY` to be told apart from their
/// numeric keypad twins
const EXTENDED_KEYS: &[u16] = &[
    0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, // navigation
    0x2D, 0x2E, // Insert, Delete
    0x5B, 0x5C, 0x5D, // Windows keys, Apps
    0x6F, // numpad divide
    0xA3, 0xA5, // right Ctrl, right Alt
];

#[derive(Debug, Default)]
pub struct SendInputInjector;

impl SendInputInjector {
    pub fn new() -> Self {
        Self
    }

    fn keyboard_input(vk: u16, scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(vk),
                    wScan: scan,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: INJECTED_MARKER,
                },
            },
        }
    }

    fn send(inputs: &[INPUT]) -> Result<(), InjectError> {
        if inputs.is_empty() {
            return Ok(());
        }
        // SAFETY: every element is a fully initialised keyboard INPUT
        let delivered = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) } as usize;
        if delivered == inputs.len() {
            Ok(())
        } else {
            Err(InjectError::Rejected {
                requested: inputs.len(),
                delivered,
            })
        }
    }
}

impl Injector for SendInputInjector {
    fn inject_text(&mut self, text: &str) -> Result<(), InjectError> {
        let mut inputs = Vec::with_capacity(text.len() * 4);
        for unit in text.encode_utf16() {
            inputs.push(Self::keyboard_input(0, unit, KEYEVENTF_UNICODE));
            inputs.push(Self::keyboard_input(0, unit, KEYEVENTF_UNICODE | KEYEVENTF_KEYUP));
        }
        Self::send(&inputs)
    }

    fn inject_key(&mut self, vk: VirtualKey, is_down: bool) -> Result<(), InjectError> {
        let mut flags = KEYBD_EVENT_FLAGS(0);
        if !is_down {
            flags |= KEYEVENTF_KEYUP;
        }
        if EXTENDED_KEYS.contains(&vk.raw()) {
            flags |= KEYEVENTF_EXTENDEDKEY;
        }
        Self::send(&[Self::keyboard_input(vk.raw(), 0, flags)])
    }
}
