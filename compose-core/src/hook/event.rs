//! Raw keyboard events as delivered by the platform hook

use std::time::Instant;

/// State of modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub caps_lock: bool,
}

impl ModifierState {
    pub fn new(shift: bool, ctrl: bool, alt: bool, caps_lock: bool) -> Self {
        Self {
            shift,
            ctrl,
            alt,
            caps_lock,
        }
    }

    pub fn shifted() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    /// Checks if any modifier is active
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }

    /// Checks if no modifiers are active
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Ctrl and Alt together, which Windows reports for AltGr
    pub fn is_alt_gr(&self) -> bool {
        self.ctrl && self.alt
    }
}

/// One keyboard event seen by the hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// Windows virtual key code
    pub vk: u16,
    pub scan_code: u16,
    pub modifiers: ModifierState,
    pub is_down: bool,
    /// Generated by an injector rather than typed
    pub is_injected: bool,
    pub timestamp: Instant,
}

impl RawKeyEvent {
    pub fn new(vk: u16, is_down: bool) -> Self {
        Self {
            vk,
            scan_code: 0,
            modifiers: ModifierState::default(),
            is_down,
            is_injected: false,
            timestamp: Instant::now(),
        }
    }

    pub fn down(vk: u16) -> Self {
        Self::new(vk, true)
    }

    pub fn up(vk: u16) -> Self {
        Self::new(vk, false)
    }

    pub fn with_modifiers(mut self, modifiers: ModifierState) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_scan_code(mut self, scan_code: u16) -> Self {
        self.scan_code = scan_code;
        self
    }

    pub fn injected(mut self) -> Self {
        self.is_injected = true;
        self
    }

    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// What the platform hook should do with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    /// Swallow the event
    Suppress,
    /// Let the event through to the application
    PassThrough,
}

/// Set of virtual keys whose key-down was suppressed and which are still
/// held. Fixed size so that tracking never allocates on the hook path.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeldKeys {
    bits: [u64; 4],
}

impl HeldKeys {
    fn slot(vk: u16) -> (usize, u64) {
        let index = (vk & 0xFF) as usize;
        (index / 64, 1 << (index % 64))
    }

    pub fn insert(&mut self, vk: u16) {
        let (word, bit) = Self::slot(vk);
        self.bits[word] |= bit;
    }

    /// Removes `vk`, returning whether it was held
    pub fn remove(&mut self, vk: u16) -> bool {
        let (word, bit) = Self::slot(vk);
        let held = self.bits[word] & bit != 0;
        self.bits[word] &= !bit;
        held
    }

    pub fn contains(&self, vk: u16) -> bool {
        let (word, bit) = Self::slot(vk);
        self.bits[word] & bit != 0
    }

    pub fn clear(&mut self) {
        self.bits = [0; 4];
    }
}
