//! Windows collaborator for the compose engine
//!
//! Installs a low-level keyboard hook on a dedicated thread and feeds every
//! keyboard event through a [`compose_core::HookAdapter`]. Output is typed
//! with `SendInput`, key translation follows the foreground window's
//! keyboard layout.

#![cfg(windows)]

mod beep;
mod hook;
mod inject;
mod translate;

pub use beep::BeepSink;
pub use hook::ComposeService;
pub use inject::{SendInputInjector, INJECTED_MARKER};
pub use translate::LayoutTranslator;
