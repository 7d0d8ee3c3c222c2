//! Chat panel state.
//!
//! The panel is the only owner of the message array; the list engine and the
//! terminal binding read from it.

pub mod panel;

pub use panel::{ChatPanel, ChatSettings};
