pub mod virtual_keys;
pub mod key;
pub mod key_names;

pub use virtual_keys::*;
pub use key::*;
pub use key_names::*;
