//! Bridge between a platform keyboard hook and the match engine
//!
//! The platform collaborator turns every raw keyboard event into a
//! [`RawKeyEvent`], hands it to [`HookAdapter::on_key_event`] and obeys the
//! returned [`HookDecision`]. Output goes back out through an [`Injector`].

mod adapter;
mod event;
mod recording;
mod us_layout;

pub use adapter::HookAdapter;
pub use event::{HookDecision, ModifierState, RawKeyEvent};
pub use recording::{Injection, RecordingInjector};
pub use us_layout::UsLayout;

use crate::error::InjectError;
use crate::types::{Key, VirtualKey};

/// Sends synthetic input to the focused application.
///
/// Events produced by an injector must reach the hook again flagged as
/// injected, otherwise the adapter would match its own output.
pub trait Injector {
    /// Types literal Unicode text
    fn inject_text(&mut self, text: &str) -> Result<(), InjectError>;

    fn inject_key(&mut self, vk: VirtualKey, is_down: bool) -> Result<(), InjectError>;
}

/// Turns a physical key press into the [`Key`] the user meant, according
/// to the active keyboard layout.
pub trait KeyTranslator {
    fn translate(&mut self, vk: VirtualKey, scan_code: u16, modifiers: ModifierState) -> Key;
}
